use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::{
    assessment_service, calculate_risk_score, AlertLists, AssessmentService, CoreConfig,
    FieldValue, Patient, TracingObserver,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Patient triage CLI for the healthcare assessment API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every patient and print the records
    Fetch,
    /// Fetch and classify every patient, printing the alert lists
    Process,
    /// Submit alert lists read from a JSON file
    Submit {
        /// File with `high_risk_patients`, `fever_patients` and `data_quality_issues`
        file: PathBuf,
    },
    /// Fetch, classify and submit, printing the grader response
    Run,
    /// Score a single set of vitals locally, without calling the API
    Score {
        /// Blood pressure as "systolic/diastolic"
        #[arg(long)]
        blood_pressure: Option<String>,
        /// Temperature in Fahrenheit
        #[arg(long)]
        temperature: Option<String>,
        /// Age in years
        #[arg(long)]
        age: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the JSON output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch => {
            let patients = service()?.fetcher().fetch_all_patients().await?;
            print_json(&patients)?;
        }
        Commands::Process => {
            let lists = service()?.process_patients().await?;
            print_json(&lists)?;
        }
        Commands::Submit { file } => {
            let lists = read_alert_lists(&file)?;
            let response = service()?.submit(&lists).await?;
            print_json(&response)?;
        }
        Commands::Run => {
            let response = service()?.process_and_submit().await?;
            print_json(&response)?;
        }
        Commands::Score {
            blood_pressure,
            temperature,
            age,
        } => {
            let patient = Patient::with_vitals(
                "local",
                field_value(blood_pressure),
                field_value(temperature),
                field_value(age),
            );
            print_json(&calculate_risk_score(&patient))?;
        }
    }

    Ok(())
}

fn service() -> anyhow::Result<AssessmentService> {
    let config = CoreConfig::from_lookup(|name| std::env::var(name).ok())?;
    Ok(assessment_service(&config, Arc::new(TracingObserver))?)
}

fn read_alert_lists(path: &Path) -> anyhow::Result<AlertLists> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let lists: AlertLists = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid alert lists in {}", path.display()))?;
    if lists.is_empty() {
        anyhow::bail!("{} contains no patient IDs", path.display());
    }
    Ok(lists)
}

/// Numbers are passed as numbers so the scorer sees the same shapes the API sends.
fn field_value(arg: Option<String>) -> FieldValue {
    match arg {
        None => FieldValue::Missing,
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Number(number),
            _ => FieldValue::Text(raw),
        },
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
