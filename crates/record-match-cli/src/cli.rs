use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use record_match_core::FieldKind;

#[derive(Parser, Debug)]
#[command(
    name = "record-match",
    version,
    about = "Verify patient listing rows against expected records"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the normalized form of a field value
    Normalize {
        #[arg(long, value_enum)]
        kind: KindArg,
        value: String,
    },
    /// Compare one expected record with one observed row
    Compare {
        #[arg(long, help = "Expected record JSON file")]
        expected: PathBuf,
        #[arg(long, help = "Observed row JSON file")]
        observed: PathBuf,
    },
    /// Page through a listing until the expected patient is found
    Verify {
        #[arg(long, help = "Expected record JSON file")]
        expected: PathBuf,
        #[arg(long, help = "JSON array of observed rows")]
        listing: PathBuf,
        #[arg(long, default_value_t = 25)]
        page_size: usize,
        #[arg(long, help = "Overrides RECORD_MATCH_MAX_ATTEMPTS")]
        max_attempts: Option<u32>,
        #[arg(long, help = "Overrides RECORD_MATCH_ATTEMPT_WAIT_MS")]
        wait_ms: Option<u64>,
        #[arg(long, help = "Exit non-zero when the patient is not present")]
        strict: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Phone,
    Text,
    Date,
    Email,
}

impl From<KindArg> for FieldKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Phone => FieldKind::Phone,
            KindArg::Text => FieldKind::Text,
            KindArg::Date => FieldKind::Date,
            KindArg::Email => FieldKind::Email,
        }
    }
}
