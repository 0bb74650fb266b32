use crate::records::EventLog;

/// Records in the weekly window.
pub const WEEKLY_WINDOW: usize = 7;
/// Records in the monthly window.
pub const MONTHLY_WINDOW: usize = 30;

/// Count dry nights among the last `window` records.
///
/// The window is defined by record count in append order, not by calendar
/// days. A log shorter than the window is counted whole.
pub fn count_dry(log: &EventLog, window: usize) -> usize {
    let records = log.records();
    let start = records.len().saturating_sub(window);
    records[start..].iter().filter(|r| r.is_dry()).count()
}

pub fn weekly_dry(log: &EventLog) -> usize {
    count_dry(log, WEEKLY_WINDOW)
}

pub fn monthly_dry(log: &EventLog) -> usize {
    count_dry(log, MONTHLY_WINDOW)
}

/// Dry counts for both windows together with how many records each covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DryStats {
    pub weekly_dry: usize,
    pub weekly_total: usize,
    pub monthly_dry: usize,
    pub monthly_total: usize,
}

impl DryStats {
    pub fn from_log(log: &EventLog) -> Self {
        Self {
            weekly_dry: weekly_dry(log),
            weekly_total: log.len().min(WEEKLY_WINDOW),
            monthly_dry: monthly_dry(log),
            monthly_total: log.len().min(MONTHLY_WINDOW),
        }
    }

    /// Share of dry nights in the monthly window, if there is any data.
    pub fn monthly_dry_ratio(&self) -> Option<f64> {
        (self.monthly_total > 0).then(|| self.monthly_dry as f64 / self.monthly_total as f64)
    }
}
