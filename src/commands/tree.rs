use clap::Args;
use serde::Serialize;

use solution_renamer::local_files::LocalFs;
use solution_renamer::tree::{build_tree, FileType, RuleChain};

use crate::commands::{resolve_target, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct TreeArgs {
    /// Solution folder to scan
    #[arg(long)]
    pub path: String,
}

#[derive(Serialize)]
pub struct TreeOutput {
    pub command: &'static str,
    pub root: String,
    pub is_solution_folder: bool,
    pub total_items: usize,
    pub included_items: usize,
    pub rules: Vec<String>,
    pub entries: Vec<TreeEntry>,
}

#[derive(Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub file_type: FileType,
    pub included: bool,
}

pub fn run(args: TreeArgs, _global: &GlobalArgs) -> CmdResult<TreeOutput> {
    let path = resolve_target(&args.path)?;
    let rules = RuleChain::standard();
    let root = build_tree(&path, &rules, &LocalFs::new())?;

    let entries = root
        .iter()
        .skip(1)
        .map(|node| TreeEntry {
            path: node.path().display().to_string(),
            file_type: node.file_type,
            included: node.is_included,
        })
        .collect();

    Ok((
        TreeOutput {
            command: "tree",
            root: root.path().display().to_string(),
            is_solution_folder: root.contains_exactly_one_solution_file(),
            total_items: root.item_count(true),
            included_items: root.item_count(false),
            rules: rules.names().into_iter().map(str::to_string).collect(),
            entries,
        },
        0,
    ))
}
