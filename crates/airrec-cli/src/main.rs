//! CLI for airrec.
//!
//! Loads the model artifact once at startup, then answers a single prediction
//! (`predict`), serves the HTTP endpoint (`serve`) or describes the artifact
//! (`inspect`). Without a loadable model nothing is served.

mod server;

use airrec_core::{Prediction, RawRatings, RecommendationService};
use airrec_model::LoadedModel;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_MODEL_PATH: &str = "models/recommendation_model.json";
const MODEL_PATH_ENV: &str = "AIRREC_MODEL_PATH";
const LOG_ENV: &str = "AIRREC_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict whether the customer will recommend the airline
    Predict {
        #[command(flatten)]
        ratings: RatingArgs,

        /// Path to the model artifact (default: $AIRREC_MODEL_PATH or models/recommendation_model.json)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Print the prediction record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the prediction endpoint over HTTP
    Serve {
        /// Socket address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,

        /// Path to the model artifact
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Load the model artifact and describe it
    Inspect {
        /// Path to the model artifact
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

/// The five ratings. Range checks happen in the builder, not here, so that
/// every surface rejects the same inputs with the same error.
#[derive(Args, Debug)]
struct RatingArgs {
    /// Seat comfort (1-5)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    seat_comfort: i64,

    /// Food & beverage (1-5)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    food_bev: i64,

    /// Cabin service (1-5)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    cabin_service: i64,

    /// Entertainment (1-5)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    entertainment: i64,

    /// Ground service (1-5)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    ground_service: i64,
}

impl From<&RatingArgs> for RawRatings {
    fn from(a: &RatingArgs) -> Self {
        RawRatings::from([
            a.seat_comfort,
            a.food_bev,
            a.cabin_service,
            a.entertainment,
            a.ground_service,
        ])
    }
}

/// `--model` wins over the environment, the environment over the default.
fn resolve_model_path(flag: Option<PathBuf>, env_value: Option<OsString>) -> PathBuf {
    flag.or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}

fn load_service(path: &Path) -> Result<RecommendationService> {
    let model = LoadedModel::load(path).with_context(|| {
        format!(
            "refusing to start without a model (place the artifact at '{}' or pass --model)",
            path.display()
        )
    })?;
    Ok(RecommendationService::from_oracle(model))
}

/// Human-readable result card for `predict` without `--json`.
struct TextReport<'a>(&'a Prediction);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prediction = self.0;
        writeln!(f, "Prediction: {}", prediction.verdict.label)?;
        writeln!(f, "Probability: {:.2}", prediction.verdict.confidence)?;
        writeln!(f)?;
        writeln!(f, "Feature values used:")?;
        for (column, rating) in prediction.input.iter() {
            let marker = if prediction.highlighted.contains(&column) {
                " *"
            } else {
                ""
            };
            writeln!(f, "  {:<16} {}{}", column.title(), rating, marker)?;
        }
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Predict {
            ratings,
            model,
            json,
        } => {
            let path = resolve_model_path(model, std::env::var_os(MODEL_PATH_ENV));
            let service = load_service(&path)?;
            let prediction = service
                .evaluate(&RawRatings::from(&ratings))
                .context("prediction failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                print!("{}", TextReport(&prediction));
            }
        }
        Commands::Serve { addr, model } => {
            let path = resolve_model_path(model, std::env::var_os(MODEL_PATH_ENV));
            let service = load_service(&path)?;
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(server::serve(&addr, service))?;
        }
        Commands::Inspect { model } => {
            let path = resolve_model_path(model, std::env::var_os(MODEL_PATH_ENV));
            let loaded = LoadedModel::load(&path)
                .with_context(|| format!("failed to load '{}'", path.display()))?;
            println!("path: {}", path.display());
            println!(
                "format: {} v{}",
                loaded.artifact().format,
                loaded.artifact().version
            );
            println!("features: {}", loaded.artifact().feature_names.join(", "));
            println!("model: {}", loaded.summary());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airrec_core::{FeatureRecord, Label, Verdict};

    #[test]
    fn model_path_precedence() {
        let flag = Some(PathBuf::from("flag.json"));
        let env = Some(OsString::from("env.json"));

        assert_eq!(
            resolve_model_path(flag.clone(), env.clone()),
            PathBuf::from("flag.json")
        );
        assert_eq!(resolve_model_path(None, env), PathBuf::from("env.json"));
        assert_eq!(
            resolve_model_path(None, Some(OsString::new())),
            PathBuf::from(DEFAULT_MODEL_PATH)
        );
        assert_eq!(
            resolve_model_path(None, None),
            PathBuf::from(DEFAULT_MODEL_PATH)
        );
    }

    #[test]
    fn rating_args_default_to_three() {
        let cli = Cli::try_parse_from(["airrec", "predict"]).unwrap();
        match cli.command {
            Commands::Predict { ratings, .. } => {
                assert_eq!(RawRatings::from(&ratings), RawRatings::form_defaults());
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn negative_ratings_reach_the_builder() {
        let cli =
            Cli::try_parse_from(["airrec", "predict", "--food-bev", "-1"]).unwrap();
        match cli.command {
            Commands::Predict { ratings, .. } => assert_eq!(ratings.food_bev, -1),
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn text_output_marks_highest_ratings() {
        let input = FeatureRecord::try_from([4, 2, 4, 1, 3]).unwrap();
        let prediction = Prediction {
            verdict: Verdict {
                label: Label::NotRecommended,
                confidence: 0.8512,
            },
            input,
            highlighted: input.highlighted(),
            ts: "2026-01-01T00:00:00Z".to_string(),
        };
        let text = TextReport(&prediction).to_string();
        assert!(text.starts_with("Prediction: Not Recommended\nProbability: 0.85\n"));
        assert!(text.contains("Seat Comfort     4 *"));
        assert!(text.contains("Cabin Service    4 *"));
        assert!(text.contains("Food & Beverage  2\n"));
    }

    #[test]
    fn missing_model_refuses_to_start() {
        let path = std::env::temp_dir().join(format!(
            "airrec_cli_missing_{}.json",
            std::process::id()
        ));
        let err = load_service(&path).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("refusing to start without a model"));
        assert!(chain.contains("model file not found"));
    }
}
