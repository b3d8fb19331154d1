use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{clean, config, rename, tree, validate, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "solution-renamer")]
#[command(version = VERSION)]
#[command(about = "Rename a .NET solution folder: directories, files and their contents")]
struct Cli {
    /// Read configuration from this file instead of the user config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a name is usable as a solution name
    Validate(validate::ValidateArgs),
    /// Show the tree that a rename would walk
    Tree(tree::TreeArgs),
    /// Back up and rename a solution folder
    Rename(rename::RenameArgs),
    /// Empty build output folders (bin, obj, ...)
    Clean(clean::CleanArgs),
    /// Inspect or initialize the configuration file
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = match GlobalArgs::load(cli.config.as_deref()) {
        Ok(global) => global,
        Err(err) => {
            let (json_result, exit_code) =
                output::map_cmd_result_to_json::<serde_json::Value>(Err(err));
            let _ = output::print_json_result(json_result);
            return std::process::ExitCode::from(exit_code_to_u8(exit_code));
        }
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
