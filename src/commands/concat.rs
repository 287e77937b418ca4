use clap::{Args, ValueEnum};
use serde::Serialize;

use quizkit::concat::{self, ConcatOptions, ConcatOrder};
use quizkit::log_status;
use quizkit::utils::io;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct ConcatArgs {
    /// Root directory to scan
    #[arg(long, default_value = ".")]
    root: String,

    /// Output file
    #[arg(short, long, default_value = "all_js.txt")]
    output: String,

    /// Extensions to include (e.g. .js .jsx .mjs)
    #[arg(long, num_args = 1.., default_value = ".js")]
    ext: Vec<String>,

    /// Extra folder names to exclude on top of the defaults
    #[arg(long, num_args = 0.., value_name = "NAME")]
    exclude: Vec<String>,

    /// Only scan the top level (no recursion)
    #[arg(long)]
    no_recursive: bool,

    /// File ordering (mtime and size are newest/biggest first)
    #[arg(long, value_enum, default_value_t = OrderArg::Path)]
    sort: OrderArg,

    /// Do not write the banner and per-file separators
    #[arg(long)]
    no_header: bool,

    /// Skip files larger than this size in MB
    #[arg(long, value_name = "MB")]
    max_size_mb: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Path,
    Name,
    Mtime,
    Size,
}

impl From<OrderArg> for ConcatOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Path => ConcatOrder::Path,
            OrderArg::Name => ConcatOrder::Name,
            OrderArg::Mtime => ConcatOrder::Mtime,
            OrderArg::Size => ConcatOrder::Size,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConcatOutput {
    #[serde(rename = "concat")]
    Concat {
        root: String,
        output: String,
        files: usize,
        combined_size_bytes: u64,
        combined_size: String,
    },
}

pub fn run(args: ConcatArgs) -> CmdResult<ConcatOutput> {
    let opts = ConcatOptions {
        root: io::expand_path(&args.root),
        output: io::expand_path(&args.output),
        extensions: args.ext,
        exclude_dirs: args.exclude,
        recursive: !args.no_recursive,
        order: args.sort.into(),
        with_header: !args.no_header,
        max_size_mb: args.max_size_mb,
    };

    let summary = concat::run(&opts)?;

    log_status!(
        "concat",
        "Concatenated {} file(s) into {}",
        summary.files_written,
        summary.output.display()
    );
    log_status!("concat", "Combined size: {}", concat::human_size(summary.total_size));

    Ok((
        ConcatOutput::Concat {
            root: opts.root.display().to_string(),
            output: summary.output.display().to_string(),
            files: summary.files_written,
            combined_size_bytes: summary.total_size,
            combined_size: concat::human_size(summary.total_size),
        },
        0,
    ))
}
