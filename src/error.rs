// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error taxonomy for chain construction and exploit planning

use crate::chain::{CursorId, LayerId, TransformId};
use crate::types::{Consequence, PrimitiveId};

#[derive(Debug, thiserror::Error)]
pub enum AceError {
    #[error(
        "no suitable exploit found at layer {layer}; last consequence not fulfilled: {}",
        describe_needed(.last_needed)
    )]
    UnresolvedGoal {
        layer: LayerId,
        last_needed: Option<Consequence>,
    },

    #[error("malformed chain at layer {layer}: {reason}")]
    MalformedChain { layer: LayerId, reason: String },

    #[error("sub-goal recursion exceeded depth {depth}")]
    RecursionLimit { depth: usize },

    #[error("solver restarted {restarts} times without reaching the innermost layer")]
    RestartLimit { restarts: usize },

    #[error("solve called before a goal was set")]
    NoGoal,

    #[error("cursor {cursor} has already been peeled past the innermost layer")]
    CursorExhausted { cursor: CursorId },

    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    #[error("unknown transform {0}")]
    UnknownTransform(TransformId),

    #[error("unknown cursor {0}")]
    UnknownCursor(CursorId),

    #[error("unknown primitive {0}")]
    UnknownPrimitive(PrimitiveId),
}

fn describe_needed(needed: &Option<Consequence>) -> String {
    match needed {
        Some(consequence) => consequence.to_string(),
        None => "none (no constraint evaluated due to requirements)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, AceError>;
