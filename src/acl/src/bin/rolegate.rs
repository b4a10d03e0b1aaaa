//! # Rolegate CLI
//!
//! Loads an access-control configuration and answers access queries.
//!
//! ## Commands
//!
//! - `check <role> <resource>...` - allow/deny per resource
//! - `explain <role> <resource>` - which rule or evaluator decided
//! - `roles` - registered roles and their parents
//!
//! ## Configuration
//!
//! - `ROLEGATE_CONFIG` - configuration file (default: `rolegate.toml`)
//! - `RUST_LOG` - log filter (default: info)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rolegate_acl::{AccessResolver, AclConfig, Registry};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Rolegate access-control CLI
#[derive(Parser)]
#[command(name = "rolegate")]
#[command(about = "Role-based access-control decisions from a TOML configuration")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rolegate.toml", env = "ROLEGATE_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check access of a role to one or more resources
    Check {
        role: String,

        #[arg(required = true)]
        resources: Vec<String>,

        /// Print one JSON object per resource
        #[arg(long)]
        json: bool,
    },

    /// Show which rule or evaluator decides a query
    Explain { role: String, resource: String },

    /// List roles and their parents
    Roles,
}

/// One line of `check --json` output
#[derive(Debug, Serialize)]
struct CheckLine<'a> {
    role: &'a str,
    resource: &'a str,
    allowed: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(all_allowed) if all_allowed => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every checked resource was allowed
fn run(cli: Cli) -> Result<bool> {
    let config = AclConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
    let acl = config
        .build(&Registry::new())
        .context("invalid access-control configuration")?;

    info!("Access resolver ready with {} roles", acl.role_names().len());

    match cli.command {
        Command::Check {
            role,
            resources,
            json,
        } => check(&acl, &role, &resources, json),
        Command::Explain { role, resource } => {
            let decision = acl.explain(&role, &resource)?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(decision.allowed)
        }
        Command::Roles => {
            for name in acl.role_names() {
                let role = acl.role(&name)?;
                let parents: Vec<&str> = role.parents().iter().map(|p| p.name()).collect();
                let rules = acl.rules_for(&name)?.len();

                println!("{}\tparents=[{}]\trules={}", name, parents.join(", "), rules);
            }
            Ok(true)
        }
    }
}

fn check(acl: &AccessResolver, role: &str, resources: &[String], json: bool) -> Result<bool> {
    let mut all_allowed = true;

    for resource in resources {
        let allowed = acl
            .is_allowed(role, resource)
            .with_context(|| format!("cannot check role '{}'", role))?;
        all_allowed &= allowed;

        if json {
            let line = CheckLine {
                role,
                resource,
                allowed,
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!("{}\t{}", if allowed { "allow" } else { "deny" }, resource);
        }
    }

    debug!("Cache stats: {:?}", acl.cache_stats());
    Ok(all_allowed)
}
