use clap::Args;
use serde::Serialize;

use solution_renamer::refactor::validate_name;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ValidateArgs {
    /// Candidate solution name
    pub name: String,
}

#[derive(Serialize)]
pub struct ValidateOutput {
    pub command: &'static str,
    pub name: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn run(args: ValidateArgs, global: &GlobalArgs) -> CmdResult<ValidateOutput> {
    let message = validate_name(&args.name, &global.config);
    let exit_code = if message.is_some() { 2 } else { 0 };

    Ok((
        ValidateOutput {
            command: "validate",
            name: args.name,
            valid: message.is_none(),
            message,
        },
        exit_code,
    ))
}
