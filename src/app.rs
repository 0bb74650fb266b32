//! Session state: the in-memory log, its store, the active language and the
//! reminder scheduler, tied together for the lifetime of one run.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::i18n::Language;
use crate::records::{DailyRecord, EventLog, Intensity, Outcome};
use crate::reminder::{ReminderScheduler, ReminderSettings};
use crate::stats::DryStats;
use crate::store::LogStore;
use crate::traits::{AudioSink, Clock, Notifier};

pub struct NightTracker {
    clock: Arc<dyn Clock>,
    store: LogStore,
    log: EventLog,
    language: Language,
    scheduler: ReminderScheduler,
}

impl NightTracker {
    /// Open a session, loading whatever log the store holds.
    pub fn open(
        config: &AppConfig,
        store: LogStore,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        Self::with_settings(
            ReminderSettings::from(&config.reminders),
            config.reminders.language,
            store,
            clock,
            notifier,
            audio,
        )
    }

    pub fn with_settings(
        settings: ReminderSettings,
        language: Language,
        store: LogStore,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        let log = store.load();
        tracing::info!("Session opened with {} records", log.len());
        let scheduler = ReminderScheduler::new(settings, language, clock.clone(), notifier, audio);
        Self {
            clock,
            store,
            log,
            language,
            scheduler,
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn today_date(&self) -> NaiveDate {
        self.clock.now_local().date_naive()
    }

    /// Today's record, if the night has been marked.
    pub fn today(&self) -> Option<&DailyRecord> {
        self.log.get(self.today_date())
    }

    pub fn stats(&self) -> DryStats {
        DryStats::from_log(&self.log)
    }

    /// Record today's outcome, replacing any earlier mark for today.
    ///
    /// Returns the record as stored in the log.
    pub fn mark_today(&mut self, outcome: Outcome, intensity: Option<Intensity>) -> &DailyRecord {
        let today = self.today_date();
        self.log = self.log.upsert(today, outcome, intensity);
        self.persist();
        tracing::info!("Marked {} as {}", today, outcome);

        // upsert appends, so today's record is the last one.
        let records = self.log.records();
        &records[records.len() - 1]
    }

    /// Amend the intensity of today's wet night.
    ///
    /// Returns the updated record, or `None` when today is unmarked or dry.
    pub fn set_intensity(&mut self, intensity: Intensity) -> Option<DailyRecord> {
        let wet_today = self.today().is_some_and(|r| r.outcome == Outcome::Wet);
        if !wet_today {
            tracing::debug!("No wet night recorded today, ignoring intensity");
            return None;
        }
        Some(*self.mark_today(Outcome::Wet, Some(intensity)))
    }

    /// Switch display language; a running reminder timer is re-armed.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        if language == self.language {
            return Ok(());
        }
        self.language = language;
        self.scheduler.rearm(language)
    }

    pub fn start_reminders(&mut self) -> Result<()> {
        self.scheduler.arm()
    }

    pub fn stop_reminders(&mut self) {
        self.scheduler.disarm();
    }

    pub fn reminders_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn persist(&self) {
        // The in-memory log stays authoritative if the write fails.
        if let Err(e) = self.store.save(&self.log) {
            tracing::error!("Failed to persist log: {}", e);
        }
    }
}
