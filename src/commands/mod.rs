pub type CmdResult<T> = quizkit::Result<(T, i32)>;

pub mod concat;
pub mod dedup;
pub mod merge;
pub mod refactor;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (quizkit::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Dedup(args) => dispatch!(args, dedup),
        crate::Commands::Merge(args) => dispatch!(args, merge),
        crate::Commands::Concat(args) => dispatch!(args, concat),
        crate::Commands::Refactor(args) => dispatch!(args, refactor),
    }
}
