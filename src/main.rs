// SPDX-License-Identifier: PMPL-1.0-or-later

//! ace: plan exploit chains against layered ciphertexts
//!
//! Reads a scenario describing how a ciphertext was built, then prints the
//! sequence of known attacks that reaches the scenario's goal.

use ace_chain::registry::catalog::load_registry;
use ace_chain::registry::CapabilityRegistry;
use ace_chain::report::{print_report, save_report, PlanOutputFormat};
use ace_chain::scenario::Scenario;
use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ace")]
#[command(version)]
#[command(about = "Automated exploit chaining for layered ciphertexts")]
#[command(long_about = None)]
struct Cli {
    /// Primitive catalog (JSON/YAML) replacing the built-in one
    #[arg(long, global = true, env = "ACE_CATALOG", value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a scenario and print the exploit plan
    Plan {
        /// Scenario file (.json, .yaml, .yml)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<PlanOutputFormat>,

        /// Write the plan to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List primitives in the catalog with their exploits and constraints
    Catalog {
        /// Show a single primitive
        #[arg(short, long, value_name = "ID")]
        primitive: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = load_registry(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Plan {
            scenario,
            format,
            output,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let report = scenario.plan(&registry)?;

            match output {
                Some(path) => {
                    let format = format
                        .or_else(|| PlanOutputFormat::from_path(&path))
                        .unwrap_or(PlanOutputFormat::Json);
                    save_report(&report, &path, format)?;
                    println!("Plan saved to: {}", path.display());
                }
                None => match format.unwrap_or_default() {
                    PlanOutputFormat::Text => print_report(&report),
                    other => println!("{}", other.serialize(&report)?),
                },
            }
        }

        Commands::Catalog { primitive } => match primitive {
            Some(id) => {
                let descriptor = registry
                    .primitive(&id)
                    .ok_or_else(|| anyhow!("primitive '{}' is not in the catalog", id))?;
                print_primitive(&registry, descriptor);
            }
            None => {
                println!(
                    "{} primitives, {} exploits, {} constraints\n",
                    registry.primitives().len(),
                    registry.exploit_count(),
                    registry.constraint_count()
                );
                for descriptor in registry.primitives() {
                    print_primitive(&registry, descriptor);
                }
            }
        },
    }

    Ok(())
}

fn print_primitive(registry: &CapabilityRegistry, descriptor: &ace_chain::PrimitiveDescriptor) {
    let generalizes: Vec<&str> = descriptor.generalizes.iter().map(|g| g.as_str()).collect();
    if generalizes.is_empty() {
        println!("{}", descriptor.id.as_str().bold());
    } else {
        println!("{} ({})", descriptor.id.as_str().bold(), generalizes.join(", ").dimmed());
    }
    for exploit in registry.exploits_for(descriptor) {
        println!("  + {} -> {}", exploit.name, exploit.consequence.to_string().yellow());
    }
    for constraint in registry.constraints_for(descriptor) {
        let prevents = constraint
            .prevents_consequence
            .map(|c| c.to_string())
            .unwrap_or_else(|| "nothing".to_string());
        println!(
            "  - {} needs {}, prevents {}",
            constraint.name,
            constraint.needed_consequence.to_string().red(),
            prevents
        );
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "ace_chain=warn",
        1 => "ace_chain=debug",
        _ => "ace_chain=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
