use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::records::{DailyRecord, EventLog};
use crate::traits::Clock;

/// Flat CSV row for one record.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    result: &'a str,
    intensity: &'a str,
}

impl<'a> From<&'a DailyRecord> for CsvRow<'a> {
    fn from(record: &'a DailyRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            result: record.outcome.as_str(),
            intensity: record.intensity.map(|i| i.as_str()).unwrap_or(""),
        }
    }
}

/// Export the log to a timestamped CSV file in `output_dir`.
///
/// # Returns
/// The path to the created CSV file on success.
pub fn export_csv<C: Clock + ?Sized>(
    log: &EventLog,
    output_dir: &Path,
    clock: &C,
) -> Result<PathBuf> {
    let export_time = clock.now_local();
    let filename = format!(
        "dry_nights_export_{}.csv",
        export_time.format("%Y%m%d_%H%M%S")
    );
    let path = output_dir.join(filename);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut wtr = csv::Writer::from_path(&path).context("Failed to create CSV writer")?;
    for record in log.iter() {
        wtr.serialize(CsvRow::from(record))
            .context("Failed to serialize record")?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;

    tracing::info!("Exported {} records to {}", log.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::*;
    use crate::records::{Intensity, Outcome};
    use crate::traits::MockClock;

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let clock = MockClock::at_local(
            NaiveDate::from_ymd_opt(2024, 1, 4)
                .unwrap()
                .and_hms_opt(7, 5, 9)
                .unwrap(),
        );
        let log = EventLog::new()
            .upsert(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), Outcome::Dry, None)
            .upsert(
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                Outcome::Wet,
                Some(Intensity::Little),
            );

        let path = export_csv(&log, dir.path(), &clock).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "dry_nights_export_20240104_070509.csv"
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "date,result,intensity\n2024-01-02,dry,\n2024-01-03,wet,little\n"
        );
    }

    #[test]
    fn test_export_empty_log_writes_nothing_but_file() {
        let dir = tempdir().unwrap();
        let clock = MockClock::new(chrono::Utc::now());

        let path = export_csv(&EventLog::new(), &dir.path().join("out"), &clock).unwrap();

        assert!(path.exists());
    }
}
