use anyhow::Result;
use clap::{Parser, Subcommand};
use kalosm::language::Llama;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::generation_service::GenerationService;
use crate::language::Language;
use crate::llm::{ensure_model_present, get_model, warm_model};
use crate::pipeline::{Outcome, Pipeline, ProductQuery};
use crate::prompt::build_prompt;
use crate::translation::{AppTranslator, GoogleTranslator, ModelTranslator, TranslatorKind};
use crate::tui::TuiApp;

mod config;
mod extract;
mod generation_service;
mod language;
mod llm;
mod pipeline;
mod prompt;
mod record;
mod translation;
mod tui;

/// Turn free-form product text into a translated title and description.
#[derive(Debug, Parser)]
#[command(name = "listing-scribe", version)]
struct Cli {
    /// Config file to use instead of ~/.config/listing-scribe/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive page (default)
    Ui,
    /// Generate one listing and print it
    Generate {
        /// Output language
        #[arg(short, long, value_enum)]
        lang: Option<Language>,
        /// Product information
        text: String,
    },
    /// Print the prompt that would be sent to the model
    Prompt { text: String },
    /// Download the model files
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);

    let default_filter = default_log_filter(&command, cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config)?;

    match command {
        Command::Ui => run_ui(&config).await,
        Command::Generate { lang, text } => {
            generate(&config, text, lang.unwrap_or(config.default_language)).await
        }
        Command::Prompt { text } => {
            print!("{}", build_prompt(&text));
            Ok(())
        }
        Command::Download => ensure_model_present().await,
    }
}

/// Filter used when `RUST_LOG` is unset. The terminal UI owns the screen, so
/// it logs nothing unless asked.
fn default_log_filter(command: &Command, verbose: bool) -> &'static str {
    match (command, verbose) {
        (_, true) => "debug",
        (Command::Ui, false) => "off",
        (_, false) => "warn",
    }
}

async fn build_pipeline(config: &Config) -> Result<Pipeline<Llama, AppTranslator>> {
    let model = get_model().await?;
    let translator = match config.translator {
        TranslatorKind::Google => {
            AppTranslator::Google(GoogleTranslator::new(&config.translate_endpoint)?)
        }
        TranslatorKind::Model => AppTranslator::Model(ModelTranslator::new(model.clone())),
    };

    Ok(Pipeline::new(model.clone(), translator))
}

async fn run_ui(config: &Config) -> Result<()> {
    ensure_model_present().await?;
    if config.warm_model {
        warm_model().await?;
    }

    let generation_service = GenerationService::new(build_pipeline(config).await?)?;
    let mut app = TuiApp::new(generation_service, config.default_language);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}

async fn generate(config: &Config, text: String, language: Language) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let output = pipeline.run(&ProductQuery::new(text, language)).await?;

    println!("JSON Format Answer:\n{}", output.json_answer);
    match output.outcome {
        Outcome::Translated(record) => {
            println!("\nProduct Title:\n{}", record.title);
            println!("\nProduct Description:\n{}", record.description);
        }
        Outcome::Malformed(message) => eprintln!("\n{message}"),
    }

    Ok(())
}
