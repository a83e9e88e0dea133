pub mod commands;

pub use commands::{apply_command, group_report, parse_command, stats_report, view_report, Outcome};
