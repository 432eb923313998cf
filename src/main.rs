//! Diacheck CLI
//!
//! Command-line front end for the diabetes prediction backend:
//! - Submit one prediction
//! - Fill the form interactively
//! - Check backend health
//! - Show model feature importance

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use diacheck::config::{generate_default_config, Config};
use diacheck::form::FormController;
use diacheck::prediction::{Field, FormValues, PredictionClient};
use diacheck::terminal::{OutputFormat, TerminalView};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "diacheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Diabetes risk prediction client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Prediction backend URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit one prediction
    Predict(PatientArgs),

    /// Fill the form field by field and submit, repeatedly
    Interactive,

    /// Check backend health
    Health,

    /// Show how strongly each feature influences the model
    Importance,

    /// Print a default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Raw field values; anything that is not a number is sent as null
#[derive(Args)]
pub struct PatientArgs {
    #[arg(long, default_value = "")]
    pub pregnancies: String,
    #[arg(long, default_value = "")]
    pub glucose: String,
    #[arg(long, default_value = "")]
    pub blood_pressure: String,
    #[arg(long, default_value = "")]
    pub skin_thickness: String,
    #[arg(long, default_value = "")]
    pub insulin: String,
    #[arg(long, default_value = "")]
    pub bmi: String,
    #[arg(long = "dpf", default_value = "")]
    pub diabetes_pedigree_function: String,
    #[arg(long, default_value = "")]
    pub age: String,
}

impl From<PatientArgs> for FormValues {
    fn from(args: PatientArgs) -> Self {
        FormValues::new()
            .with(Field::Pregnancies, args.pregnancies)
            .with(Field::Glucose, args.glucose)
            .with(Field::BloodPressure, args.blood_pressure)
            .with(Field::SkinThickness, args.skin_thickness)
            .with(Field::Insulin, args.insulin)
            .with(Field::Bmi, args.bmi)
            .with(Field::DiabetesPedigreeFunction, args.diabetes_pedigree_function)
            .with(Field::Age, args.age)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Errors here surface through anyhow; logging depends on the config
    let (mut config, source) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };
    if let Some(url) = cli.api_url.clone() {
        config.predictor.base_url = url;
    }

    diacheck::logging::init(&config.logging);
    tracing::debug!(backend = %config.predictor.base_url, "diacheck v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let client = PredictionClient::new(config.predictor.client_config())?;

    match cli.command {
        Commands::Predict(args) => {
            let form = FormController::new(Arc::new(client), TerminalView::stdio(cli.format));
            form.fill(args.into()).await;
            if form.submit().await.is_err() {
                std::process::exit(1);
            }
        }

        Commands::Interactive => {
            let form = FormController::new(Arc::new(client), TerminalView::stdio(cli.format));
            run_interactive(&form).await?;
        }

        Commands::Health => match client.health().await {
            Ok(health) => match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&health)?),
                OutputFormat::Text => {
                    println!("Backend: {}", client.config().base_url);
                    println!("Status: {}", health.status);
                    println!("Model loaded: {}", health.model_loaded);
                }
            },
            Err(e) => {
                eprintln!("Backend at {} unavailable: {}", client.config().base_url, e);
                std::process::exit(1);
            }
        },

        Commands::Importance => {
            let importance = client.feature_importance().await?;
            match cli.format {
                OutputFormat::Json => {
                    let weights: serde_json::Map<String, serde_json::Value> = importance
                        .weights
                        .iter()
                        .map(|w| (w.feature.clone(), serde_json::json!(w.weight)))
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({"feature_importance": weights, "message": importance.message})
                    );
                }
                OutputFormat::Text => {
                    if importance.weights.is_empty() {
                        println!("No feature importance available");
                    }
                    for w in &importance.weights {
                        println!("{:<26} {:>8.4}", w.feature, w.weight);
                    }
                    if let Some(message) = importance.message {
                        println!();
                        println!("{}", message);
                    }
                }
            }
        }

        Commands::Config { output } => write_default_config(output)?,
    }

    Ok(())
}

fn write_default_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("writing config to {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Prompt for every field, submit, then offer to edit, reset or quit
async fn run_interactive(form: &FormController<TerminalView>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    'form: loop {
        let current = form.values().await;
        for field in Field::ALL {
            let existing = current.get(field);
            let prompt = if existing.is_empty() {
                format!("{}: ", field.label())
            } else {
                format!("{} [{}]: ", field.label(), existing)
            };
            stdout.write_all(prompt.as_bytes()).await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break 'form;
            };
            let line = line.trim();
            if !line.is_empty() {
                form.set_field(field, line).await;
            }
        }

        // Failures are already reported through the view
        let _ = form.submit().await;

        loop {
            stdout
                .write_all(b"[Enter] edit and resubmit, [r]eset, [q]uit: ")
                .await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break 'form;
            };
            match line.trim().to_lowercase().as_str() {
                "" | "e" | "edit" => continue 'form,
                "r" | "reset" => {
                    form.reset().await;
                    continue 'form;
                }
                "q" | "quit" | "exit" => break 'form,
                other => {
                    stdout
                        .write_all(format!("Unknown choice: {}\n", other).as_bytes())
                        .await?;
                }
            }
        }
    }

    Ok(())
}
