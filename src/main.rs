use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::ProgressBar;

use tally::config::Config;
use tally::model::pipeline::Pipeline;
use tally::output::terminal;
use tally::store::{self, ModelArtifact};

/// Tally: expense description categorization.
///
/// Learns spending categories from labeled descriptions like
/// "coffee at starbucks" and predicts them for new ones.
#[derive(Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a labeled CSV and save it
    Train {
        /// Training CSV with description and category columns (default: TALLY_DATA_PATH)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Where to write the model (default: TALLY_MODEL_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Predict categories for one or more descriptions
    Predict {
        /// Descriptions to classify
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// How many ranked categories to show (default: TALLY_TOP_K)
        #[arg(long)]
        top: Option<usize>,
    },

    /// List the categories the trained model knows
    Categories,

    /// Show model status (location, age, vocabulary, categories)
    Status,

    /// Serve predictions over HTTP
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 5001)
        #[arg(long, default_value = "5001")]
        port: u16,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tally=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Train { data, output } => {
            let data_path = data.unwrap_or_else(|| config.data_path.clone());
            let model_path = output.unwrap_or_else(|| config.model_path.clone());

            let set = tally::data::load_csv(&data_path)?;
            terminal::display_training_summary(&set);

            let spinner = ProgressBar::new_spinner();
            spinner.set_message(format!("Training on {} rows...", set.len()));
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
            let fitted = Pipeline::fit_pairs(&config.pipeline_params(), &set.rows);
            spinner.finish_and_clear();
            let pipeline = fitted?;

            println!(
                "\n{} {} features, {} categories",
                "Model trained:".bold(),
                pipeline.vectorizer().dim(),
                pipeline.categories().len()
            );

            let artifact = ModelArtifact::new(pipeline, set.len());
            store::save(&model_path, &artifact)?;
            println!("Saved model to {}", model_path.display());
            println!(
                "{}",
                "Next: `tally predict \"coffee at starbucks\"` or `tally serve`".dimmed()
            );
        }

        Commands::Predict { descriptions, top } => {
            config.require_model()?;
            let artifact = store::load(&config.model_path)?;
            let k = top.unwrap_or(config.top_k);

            let results = artifact.pipeline.predict_many(&descriptions);
            for (description, result) in descriptions.iter().zip(&results) {
                match result {
                    Ok(prediction) => terminal::display_prediction(description, prediction, k),
                    Err(e) => terminal::display_prediction_error(description, e),
                }
            }
            println!();
        }

        Commands::Categories => {
            config.require_model()?;
            let artifact = store::load(&config.model_path)?;
            terminal::display_categories(artifact.pipeline.categories());
        }

        Commands::Status => {
            tally::status::show(&config)?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let handle = tally::service::ModelHandle::empty();
            if config.model_path.exists() {
                let artifact = store::load(&config.model_path)?;
                handle.swap(std::sync::Arc::new(artifact.pipeline)).await;
            } else {
                tracing::warn!(
                    path = %config.model_path.display(),
                    "No trained model found; serving 503 until POST /model/reload succeeds"
                );
            }

            tracing::info!("Starting web server");
            tally::web::run_server(config, handle, port, &bind).await?;
        }
    }

    Ok(())
}
