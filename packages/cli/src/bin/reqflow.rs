// ABOUTME: The reqflow binary
// ABOUTME: Parses arguments, loads configuration and logging, then serves the API or runs an offline analysis

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use reqflow_api::AppState;
use reqflow_cli::{analyze_files, run_server, AnalyzeOptions};
use reqflow_config::Config;

#[derive(Parser)]
#[command(name = "reqflow")]
#[command(about = "Reqflow - healthcare requirements analysis and test generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides REQFLOW_API_PORT)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },
    /// Analyze requirement files once and print a JSON report
    Analyze {
        /// Requirement documents (.txt, .md, .pdf, .doc, .docx)
        #[arg(required_unless_present = "text")]
        files: Vec<PathBuf>,
        /// Additional requirements typed inline
        #[arg(long)]
        text: Option<String>,
        /// Also split the document into scenarios
        #[arg(long)]
        scenarios: bool,
        /// Also generate test cases for every scenario
        #[arg(long)]
        tests: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            eprintln!(
                "{} http://localhost:{}",
                "Reqflow API starting on".green().bold(),
                config.port
            );
            run_server(config).await
        }
        Commands::Analyze {
            files,
            text,
            scenarios,
            tests,
        } => {
            let state = AppState::from_config(&config).await?;
            let report = analyze_files(
                &state,
                AnalyzeOptions {
                    files,
                    text,
                    scenarios,
                    tests,
                },
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
