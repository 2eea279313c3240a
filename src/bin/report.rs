//! Daily report batch job: writes `report_<date>.csv` and `report_<date>.pdf`
//! for one UTC calendar day (today by default).

use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;

use sentipulse::report::generate_daily_report;
use sentipulse::store::Store;
use sentipulse::AppConfig;

#[derive(Debug, Parser)]
#[command(about = "Generate the daily sentiment report")]
struct Args {
    /// UTC day to report on (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Directory the report files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    sentipulse::init_tracing();

    let args = Args::parse();
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let cfg = AppConfig::from_env();
    let store = Store::connect(&cfg.store_config()).await?;

    match generate_daily_report(&store, date, &args.out_dir).await? {
        Some(paths) => info!(csv = %paths.csv.display(), pdf = %paths.pdf.display(), "done"),
        None => info!(%date, "nothing to report"),
    }
    Ok(())
}
