// ABOUTME: Reqflow command-line entry points
// ABOUTME: Runs the HTTP server and the one-shot offline analysis used by the reqflow binary

pub mod analyze;
pub mod server;

pub use analyze::{analyze_files, AnalyzeOptions, AnalyzeReport};
pub use server::{build_app, run_server};
