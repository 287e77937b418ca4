use clap::Args;
use serde::Serialize;

use quizkit::dedup::{dedup, load_items, DedupOptions};
use quizkit::log_status;
use quizkit::utils::io;
use quizkit::Error;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct DedupArgs {
    /// Input quiz JSON file
    #[arg(short, long)]
    input: String,

    /// Output JSON file (deduplicated)
    #[arg(short, long)]
    output: String,

    /// Include 'quiz' together with 'question' in the dedup key
    #[arg(long)]
    include_quiz_in_key: bool,

    /// Do not fold accents during normalization
    #[arg(long)]
    keep_accents: bool,

    /// Keep the LAST occurrence of each question (default: keep the first)
    #[arg(long)]
    keep_last: bool,

    /// Include the removed duplicates in the output report
    #[arg(long)]
    list_removed: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum DedupOutput {
    #[serde(rename = "dedup")]
    Dedup {
        input: String,
        output: String,
        read: usize,
        kept: usize,
        removed: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        removed_items: Option<Vec<RemovedSummary>>,
    },
}

#[derive(Serialize)]
pub struct RemovedSummary {
    pub key: String,
    pub quiz: String,
    pub question: String,
}

pub fn run(args: DedupArgs) -> CmdResult<DedupOutput> {
    let in_path = io::expand_path(&args.input);
    let out_path = io::expand_path(&args.output);

    if !in_path.exists() {
        return Err(Error::InputNotFound(in_path.display().to_string()));
    }

    let raw = io::read_file(&in_path)?;
    let items = load_items(&raw)?;
    if items.is_empty() {
        return Err(Error::EmptyInput(in_path.display().to_string()));
    }

    let opts = DedupOptions {
        include_quiz_in_key: args.include_quiz_in_key,
        keep_accents: args.keep_accents,
        keep_last: args.keep_last,
    };
    let read = items.len();
    let result = dedup(items, &opts);

    let payload = format!("{}\n", serde_json::to_string_pretty(&result.kept)?);
    io::write_file_atomic(&out_path, &payload)?;

    log_status!("dedup", "Items read: {}", read);
    log_status!("dedup", "Items after dedup: {}", result.kept.len());
    log_status!("dedup", "Duplicates removed: {}", result.removed.len());

    let removed_items = if args.list_removed {
        Some(
            result
                .removed
                .iter()
                .map(|(key, item)| RemovedSummary {
                    key: key.clone(),
                    quiz: string_field(item, "quiz"),
                    question: truncate(&string_field(item, "question"), 80),
                })
                .collect(),
        )
    } else {
        None
    };

    Ok((
        DedupOutput::Dedup {
            input: in_path.display().to_string(),
            output: out_path.display().to_string(),
            read,
            kept: result.kept.len(),
            removed: result.removed.len(),
            removed_items,
        },
        0,
    ))
}

fn string_field(item: &serde_json::Value, field: &str) -> String {
    item.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate("short", 80), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        let long = "x".repeat(100);
        let cut = truncate(&long, 80);
        assert_eq!(cut.chars().count(), 81);
        assert!(cut.ends_with('…'));
    }
}
