//! CLI subcommand implementations.

pub mod entry;
pub mod export;
pub mod history;
pub mod import;
pub mod list;
pub mod manual;
pub mod month;
pub mod report;
pub mod status;
pub mod task;
pub mod track;
pub mod util;
pub mod watch;
