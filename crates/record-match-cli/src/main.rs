mod cli;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use record_match_core::{
    normalize, ExpectedRecord, MatchConfig, ObservedRecord, PagedRecords, PatientSearch,
    RecordComparator,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e}");
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() -> Result<()> {
    let directive: tracing_subscriber::filter::Directive = "record_match=info".parse()?;
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Normalize { kind, value } => {
            let normalized = normalize(kind.into(), &value);
            if cli.json {
                print_json(&serde_json::json!({ "value": value, "normalized": normalized }))?;
            } else {
                println!("{normalized}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare { expected, observed } => {
            let expected = load_expected(&expected)?;
            let observed: ObservedRecord = load_json(&observed)?;

            let result = RecordComparator::new().compare(&expected, &observed);
            if cli.json {
                print_json(&result)?;
            } else if result.is_match() {
                println!("patient {} matches", expected.id);
            } else {
                for line in result.report_lines() {
                    println!("{line}");
                }
            }
            Ok(if result.is_match() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Verify {
            expected,
            listing,
            page_size,
            max_attempts,
            wait_ms,
            strict,
        } => {
            let expected = load_expected(&expected)?;
            let rows: Vec<ObservedRecord> = load_json(&listing)?;

            let mut config = MatchConfig::from_env()?;
            if let Some(n) = max_attempts {
                config.max_attempts = n;
            }
            if let Some(ms) = wait_ms {
                config.attempt_wait_ms = ms;
            }
            let verifier = config.verifier()?;

            let mut pages = PagedRecords::new(rows, page_size, &PatientSearch::default())?;
            tracing::info!(
                patient_id = %expected.id,
                rows = pages.total_rows(),
                pages = pages.page_count(),
                "verifying patient"
            );
            let report = verifier.verify_present(&mut pages, &expected);

            if cli.json {
                print_json(&report)?;
            } else if report.present {
                println!(
                    "patient {} present (attempts: {})",
                    report.patient_id, report.attempts
                );
            } else {
                println!(
                    "patient {} not present (attempts: {})",
                    report.patient_id, report.attempts
                );
                for line in report.report_lines() {
                    println!("  - {line}");
                }
                if let Some(err) = &report.last_error {
                    println!("  last error: {err}");
                }
            }

            Ok(if report.present || !strict {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

fn load_expected(path: &Path) -> Result<ExpectedRecord> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    ExpectedRecord::from_json(&raw)
        .with_context(|| format!("parse expected record {}", path.display()))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
