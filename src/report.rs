// src/report.rs
//! Daily report batch: filter one UTC calendar day's records, write a CSV of
//! the filtered set and a single-page PDF summary to date-keyed filenames.
//!
//! The fallback CSV is read only while the store is degraded. A connected
//! store is authoritative even when it has no rows for the day.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::info;

use crate::record::{PostRecord, Sentiment};
use crate::store::fallback::{record_row, FALLBACK_COLUMNS};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub pdf: PathBuf,
}

/// Generate `report_<date>.csv` and `report_<date>.pdf` under `out_dir`.
/// Reads the primary store when connected, the CSV fallback otherwise.
/// Returns `None` when the day has no records.
pub async fn generate_daily_report(
    store: &Store,
    date: NaiveDate,
    out_dir: &Path,
) -> Result<Option<ReportPaths>> {
    let records = if store.connected() {
        store.records_for_day(date).await?
    } else {
        info!("primary store not connected, reading CSV fallback");
        let mut rows = store.fallback().load()?;
        rows.retain(|r| r.posted_at.map(|t| t.date_naive() == date).unwrap_or(false));
        rows
    };

    if records.is_empty() {
        info!(%date, "no records for this day, skipping report");
        return Ok(None);
    }

    let paths = ReportPaths {
        csv: out_dir.join(format!("report_{date}.csv")),
        pdf: out_dir.join(format!("report_{date}.pdf")),
    };
    write_csv(&records, &paths.csv)?;
    write_pdf(&records, date, &paths.pdf)?;
    info!(
        total = records.len(),
        csv = %paths.csv.display(),
        pdf = %paths.pdf.display(),
        "daily report written"
    );
    Ok(Some(paths))
}

fn write_csv(records: &[PostRecord], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating report csv {}", path.display()))?;
    let mut w = csv::Writer::from_writer(file);
    w.write_record(FALLBACK_COLUMNS).context("csv header")?;
    for rec in records {
        w.write_record(&record_row(rec)).context("csv row")?;
    }
    w.flush().context("flushing report csv")?;
    Ok(())
}

fn label_count(records: &[PostRecord], label: Sentiment) -> usize {
    records.iter().filter(|r| r.sentiment == label).count()
}

fn write_pdf(records: &[PostRecord], date: NaiveDate, path: &Path) -> Result<()> {
    // US letter, one page.
    let (doc, page, layer) = PdfDocument::new(
        format!("Sentiment Report for {date}"),
        Mm(215.9),
        Mm(279.4),
        "summary",
    );
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow::anyhow!("loading bold font: {e}"))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("loading font: {e}"))?;

    let layer = doc.get_page(page).get_layer(layer);
    layer.use_text(
        format!("Sentiment Report for {date}"),
        16.0,
        Mm(25.0),
        Mm(255.0),
        &bold,
    );
    layer.use_text(
        format!("Total posts: {}", records.len()),
        12.0,
        Mm(25.0),
        Mm(245.0),
        &regular,
    );
    let mut y = 235.0;
    for label in Sentiment::ALL {
        layer.use_text(
            format!("{label}: {}", label_count(records, label)),
            12.0,
            Mm(25.0),
            Mm(y),
            &regular,
        );
        y -= 7.0;
    }

    let file =
        File::create(path).with_context(|| format!("creating report pdf {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow::anyhow!("writing pdf: {e}"))?;
    Ok(())
}
