use clap::{Args, ValueEnum};
use serde::Serialize;

use quizkit::log_status;
use quizkit::merge::{collect_files, dedup_by_key, merge_files, sort_files, to_json_string, FileOrder};
use quizkit::utils::io;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct MergeArgs {
    /// Directory containing the .json files
    dir: String,

    /// Output file
    #[arg(short, long, default_value = "merged.json")]
    output: String,

    /// Search subdirectories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Glob pattern matched against file names
    #[arg(short, long, default_value = "*.json")]
    pattern: String,

    /// File ordering
    #[arg(long, value_enum, default_value_t = OrderArg::Name)]
    sort: OrderArg,

    /// Indentation of the output JSON (0 for compact)
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Skip files with invalid JSON instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Remove duplicate items in the final array based on this key
    #[arg(long, value_name = "KEY")]
    dedup_key: Option<String>,

    /// Escape non-ASCII characters in the output
    #[arg(long)]
    ascii: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Name,
    Mtime,
    None,
}

impl From<OrderArg> for FileOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Name => FileOrder::Name,
            OrderArg::Mtime => FileOrder::Mtime,
            OrderArg::None => FileOrder::None,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum MergeOutput {
    #[serde(rename = "merge")]
    Merge {
        dir: String,
        output: String,
        files_read: usize,
        files_skipped: usize,
        items: usize,
    },
}

pub fn run(args: MergeArgs) -> CmdResult<MergeOutput> {
    let dir = io::expand_path(&args.dir);
    let out_path = io::expand_path(&args.output);

    let mut files = collect_files(&dir, &args.pattern, args.recursive)?;
    if files.is_empty() {
        log_status!("merge", "No files matched pattern '{}'", args.pattern);
    }
    sort_files(&mut files, args.sort.into());

    let result = merge_files(&files, args.skip_invalid)?;

    let items = match &args.dedup_key {
        Some(key) => dedup_by_key(result.items, key),
        None => result.items,
    };

    let payload = to_json_string(&items, args.indent, args.ascii)?;
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(quizkit::Error::Io)?;
        }
    }
    io::write_file(&out_path, &payload)?;

    log_status!("merge", "{} items written to {}", items.len(), out_path.display());

    Ok((
        MergeOutput::Merge {
            dir: dir.display().to_string(),
            output: out_path.display().to_string(),
            files_read: result.files_read,
            files_skipped: result.files_skipped,
            items: items.len(),
        },
        0,
    ))
}
