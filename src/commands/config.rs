use clap::{Args, Subcommand};
use serde::Serialize;

use solution_renamer::defaults::{self, RenamerConfig};
use solution_renamer::paths;
use solution_renamer::Error;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write the built-in defaults to the user config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConfigOutput {
    #[serde(rename = "config.show")]
    Show { path: String, config: RenamerConfig },
    #[serde(rename = "config.init")]
    Init { path: String, config: RenamerConfig },
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let path = paths::config_json()?;

    match args.command {
        ConfigCommand::Show => Ok((
            ConfigOutput::Show {
                path: path.display().to_string(),
                config: global.config.clone(),
            },
            0,
        )),
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(Error::validation_invalid_argument(
                    "force",
                    format!("{} already exists", path.display()),
                )
                .with_hint("Pass --force to overwrite it"));
            }

            let config = RenamerConfig::default();
            defaults::save_config(&config, &path)?;

            Ok((
                ConfigOutput::Init {
                    path: path.display().to_string(),
                    config,
                },
                0,
            ))
        }
    }
}
