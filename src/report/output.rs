// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for printed/exported plans

use crate::report::formatter::PlanFormatter;
use crate::report::PlanReport;
use anyhow::Result;
use clap::ValueEnum;
use serde_json;
use serde_yaml;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PlanOutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl PlanOutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(PlanOutputFormat::Text),
            "json" => Some(PlanOutputFormat::Json),
            "yaml" | "yml" => Some(PlanOutputFormat::Yaml),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PlanOutputFormat::Text => "txt",
            PlanOutputFormat::Json => "json",
            PlanOutputFormat::Yaml => "yaml",
        }
    }

    /// Infer the format from an output path, if its extension is known
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    pub fn serialize(&self, report: &PlanReport) -> Result<String> {
        match self {
            // Plain text only; colour codes never go to files.
            PlanOutputFormat::Text => Ok(PlanFormatter::new().render_plain(report)),
            PlanOutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            PlanOutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        }
    }
}
