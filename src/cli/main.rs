use clap::{Parser, Subcommand};
use comment_sentiment::{
    artifact::load_bundle,
    config::Config,
    ml::ModelKind,
    serving::SentimentEngine,
    tracking::list_runs,
    training::{evaluate_bundle, load_labeled_csv, Trainer},
};
use reqwest::Client;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentiment-cli")]
#[command(about = "Comment sentiment training and prediction CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a labeled CSV and write the artifact pair
    Train {
        /// Labeled training data (CSV with text,label columns)
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory for the artifact pair
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Model to train: logistic_regression or naive_bayes
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Evaluate the current artifact pair against a labeled CSV
    Evaluate {
        /// Labeled evaluation data (CSV with text,label columns)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory holding the artifact pair
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// Classify a single comment with the local artifact pair
    Predict {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Directory holding the artifact pair
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// List recorded training runs, newest first
    Runs,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comment_sentiment=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            artifacts,
            model,
        } => {
            let mut config = load_config();
            if let Some(dir) = artifacts {
                config.artifacts.dir = dir;
            }
            if let Some(kind) = model {
                config.training.model = kind.parse::<ModelKind>().unwrap_or_else(|_| {
                    eprintln!(
                        "Error: unknown model '{}' (expected logistic_regression or naive_bayes)",
                        kind
                    );
                    std::process::exit(1);
                });
            }

            let examples = load_labeled_csv(&data)?;
            let trainer = Trainer::new(config.training.clone());
            let outcome = trainer.run(&examples, &config.artifacts.dir)?;

            println!("Training run {} completed", outcome.run.run_id);
            println!("  Model: {}", outcome.manifest.model);
            println!("  Train examples: {}", outcome.n_train);
            println!("  Test examples: {}", outcome.n_test);
            println!("  Accuracy: {:.4}", outcome.report.accuracy);
            println!("  Macro F1: {:.4}", outcome.report.f1_score);
            println!("  Artifacts: {}", config.artifacts.dir.display());
        }

        Commands::Evaluate { data, artifacts } => {
            let mut config = load_config();
            if let Some(dir) = artifacts {
                config.artifacts.dir = dir;
            }

            let examples = load_labeled_csv(&data)?;
            let bundle = load_bundle(&config.artifacts.dir)?;
            let report = evaluate_bundle(&bundle, &examples)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Predict { text, artifacts } => {
            let mut config = load_config();
            if let Some(dir) = artifacts {
                config.artifacts.dir = dir;
            }

            let engine = SentimentEngine::load(&config.artifacts.dir)?;
            let result = engine.predict(&text)?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Runs => {
            let config = load_config();
            let runs = list_runs(&config.training.runs_dir)?;

            if runs.is_empty() {
                println!("No training runs recorded");
            } else {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            }
        }

        Commands::Health => {
            let client = Client::new();
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    })
}
