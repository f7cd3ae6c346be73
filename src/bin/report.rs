use clap::{Parser, ValueEnum};
use mindcare::{CsvStore, Error, RiskLevel};

/// Lists stored assessments for counselors.
#[derive(Parser)]
struct Args {
    path: String,
    /// Only rows with this risk level
    #[arg(long, value_enum)]
    risk: Option<Risk>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Risk {
    Low,
    Moderate,
    High,
}

impl From<Risk> for RiskLevel {
    fn from(risk: Risk) -> Self {
        match risk {
            Risk::Low => RiskLevel::Low,
            Risk::Moderate => RiskLevel::Moderate,
            Risk::High => RiskLevel::High,
        }
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let risk = args.risk.map(RiskLevel::from);

    let store = CsvStore::new(&args.path);
    for (index, row) in store.rows()?.into_iter().enumerate() {
        match row {
            Ok(record) => {
                if risk.map_or(false, |risk| risk != record.risk_level) {
                    continue;
                }
                println!(
                    "id = {}, scores = {:?}, composite = {}, risk = {}, at = {}",
                    record.student_id,
                    (record.phq_score, record.gad_score, record.ghq_score),
                    record.composite_score,
                    record.risk_level,
                    record
                        .timestamp
                        .map(|timestamp| timestamp.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            Err(error) => {
                tracing::warn!(row = index + 1, %error, "unreadable row");
            }
        }
    }
    Ok(())
}
