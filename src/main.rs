use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{concat, dedup, merge, refactor};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "quizkit")]
#[command(version = VERSION)]
#[command(about = "CLI toolkit for quiz-app content wrangling and project maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate questions from a quiz JSON file
    Dedup(dedup::DedupArgs),
    /// Merge every JSON file in a directory into one array
    Merge(merge::MergeArgs),
    /// Concatenate source files into a single text blob
    Concat(concat::ConcatArgs),
    /// Rename a source directory and rewrite the imports that point at it
    Refactor(refactor::RefactorArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    output::print_json_result(json_result);

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
