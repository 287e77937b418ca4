use clap::Args;
use serde::Serialize;

use quizkit::refactor::{self, RefactorOptions, RouteRename};
use quizkit::utils::io;
use quizkit::Error;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct RefactorArgs {
    /// Project root
    #[arg(long, default_value = ".")]
    root: String,

    /// Report intended actions without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Directory under src/ to rename from
    #[arg(long, default_value = "app")]
    from_dir: String,

    /// Directory under src/ to rename to
    #[arg(long, default_value = "core")]
    to_dir: String,

    /// Remove every line containing this marker (repeatable)
    #[arg(long, value_name = "MARKER")]
    strip_option: Vec<String>,

    /// Rename a route string literal, as OLD=NEW (repeatable)
    #[arg(long, value_name = "OLD=NEW")]
    rename_route: Vec<String>,

    /// Remove this package from the manifest's dependency sections
    #[arg(long, value_name = "PACKAGE")]
    remove_dep: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RefactorOutput {
    #[serde(rename = "refactor")]
    Refactor {
        root: String,
        dry_run: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        backup_path: Option<String>,
        restructured: bool,
        changed_count: usize,
        changed_files: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        manifest_changed: Option<bool>,
    },
}

fn parse_route_renames(raw: &[String]) -> quizkit::Result<Vec<RouteRename>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "--rename-route expects OLD=NEW, got '{}'",
                        pair
                    ))
                })
        })
        .collect()
}

pub fn run(args: RefactorArgs) -> CmdResult<RefactorOutput> {
    let root = io::expand_path(&args.root);
    if !root.is_dir() {
        return Err(Error::InputNotFound(format!(
            "Project root not found: {}",
            root.display()
        )));
    }

    let mut opts = RefactorOptions::new(root.clone());
    opts.dry_run = args.dry_run;
    opts.from_dir = args.from_dir;
    opts.to_dir = args.to_dir;
    opts.strip_markers = args.strip_option;
    opts.route_renames = parse_route_renames(&args.rename_route)?;
    opts.remove_dep = args.remove_dep;

    let summary = refactor::run(&opts)?;

    Ok((
        RefactorOutput::Refactor {
            root: root.display().to_string(),
            dry_run: summary.dry_run,
            backup_path: summary.backup_path,
            restructured: summary.restructured,
            changed_count: summary.changed_count,
            changed_files: summary.changed_files,
            manifest_changed: summary.manifest_changed,
        },
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_route_renames_splits_pairs() {
        let pairs = parse_route_renames(&["A=B".to_string(), "Old=New".to_string()]).unwrap();
        assert_eq!(pairs[0], ("A".to_string(), "B".to_string()));
        assert_eq!(pairs[1], ("Old".to_string(), "New".to_string()));
    }

    #[test]
    fn parse_route_renames_rejects_missing_separator() {
        let err = parse_route_renames(&["AB".to_string()]).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }
}
