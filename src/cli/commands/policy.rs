use clap::Subcommand;
use serde_json::json;

use crate::auth::{authorize, is_gated, AuthDecision};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PolicyCommands {
    #[command(about = "Show what the session gate does with a path")]
    Check {
        #[arg(help = "Request path, e.g. /dashboard/invoices")]
        path: String,
        #[arg(long, help = "Evaluate as a signed-in user")]
        signed_in: bool,
    },
}

pub async fn handle(cmd: PolicyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PolicyCommands::Check { path, signed_in } => {
            let gated = is_gated(&path);
            let decision = if gated {
                authorize(signed_in, &path)
            } else {
                AuthDecision::Allow
            };

            let (label, target) = match &decision {
                AuthDecision::Allow => ("allow", None),
                AuthDecision::Deny => ("deny", Some("/login")),
                AuthDecision::Redirect(target) => ("redirect", Some(target.as_str())),
            };

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "path": path,
                            "signed_in": signed_in,
                            "gated": gated,
                            "decision": label,
                            "target": target
                        }))?
                    );
                }
                OutputFormat::Text => {
                    let who = if signed_in { "signed in" } else { "anonymous" };
                    match target {
                        Some(target) => println!("{} ({}): {} -> {}", path, who, label, target),
                        None => println!("{} ({}): {}", path, who, label),
                    }
                    if !gated {
                        println!("  not covered by the gate");
                    }
                }
            }
            Ok(())
        }
    }
}
