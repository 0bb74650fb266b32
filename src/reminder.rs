//! Reminder dispatch and the polling timer that drives it.
//!
//! The scheduler is either `Idle` (no timer) or `Armed` (exactly one poll
//! task). Every tick reads the clock, truncates to the minute, and looks the
//! minute up in the [`ReminderSchedule`]. Missed minutes are never caught up.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::RemindersConfig;
use crate::i18n::{self, Language, Text};
use crate::schedule::{ReminderSchedule, ScheduleEntry, SideEffect};
use crate::traits::{AudioSink, Clock, Notifier};

/// Timing and media settings for reminders.
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub poll_interval: Duration,
    pub sound_name: String,
    pub relax_track: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            sound_name: crate::traits::DEFAULT_SOUND.to_string(),
            relax_track: "relax_music.mp3".to_string(),
        }
    }
}

impl From<&RemindersConfig> for ReminderSettings {
    fn from(config: &RemindersConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            sound_name: config.sound_name.clone(),
            relax_track: config.relax_track.clone(),
        }
    }
}

// ==================== Dispatcher ====================

/// Per-session reminder state: matches ticks against the table and calls
/// the sinks.
pub struct ReminderDispatcher {
    schedule: ReminderSchedule,
    language: Language,
    settings: ReminderSettings,
    notifier: Arc<dyn Notifier>,
    audio: Arc<dyn AudioSink>,
    last_fired: Option<NaiveDateTime>,
}

impl ReminderDispatcher {
    pub fn new(
        language: Language,
        settings: ReminderSettings,
        notifier: Arc<dyn Notifier>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        Self {
            schedule: ReminderSchedule::new(),
            language,
            settings,
            notifier,
            audio,
            last_fired: None,
        }
    }

    /// Handle one poll tick at local wall-clock time `now`.
    ///
    /// Returns the entry that fired, if any. A minute that already fired in
    /// this session is ignored.
    pub fn on_tick(&mut self, now: NaiveDateTime) -> Option<ScheduleEntry> {
        let minute = truncate_to_minute(now);
        let entry = *self.schedule.entry_at(&minute)?;

        if self.last_fired == Some(minute) {
            tracing::trace!("Reminder for {} already sent", entry.time);
            return None;
        }
        self.last_fired = Some(minute);

        let message = i18n::text(self.language, Text::Reminder(entry.message));
        tracing::info!("Firing {} reminder", entry.time);
        if let Err(e) = self.notifier.notify(message, &self.settings.sound_name) {
            tracing::warn!("Failed to deliver {} reminder: {}", entry.time, e);
        }

        if entry.effect == Some(SideEffect::PlayRelaxation) {
            if let Err(e) = self.audio.play(&self.settings.relax_track) {
                tracing::warn!("Failed to play relaxation track: {}", e);
            }
        }

        Some(entry)
    }
}

fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

// ==================== Scheduler ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed,
}

/// Owns the single poll task. Dropping the scheduler disarms it.
pub struct ReminderScheduler {
    settings: ReminderSettings,
    language: Language,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    audio: Arc<dyn AudioSink>,
    task: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(
        settings: ReminderSettings,
        language: Language,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        Self {
            settings,
            language,
            clock,
            notifier,
            audio,
            task: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.task.is_some() {
            SchedulerState::Armed
        } else {
            SchedulerState::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state() == SchedulerState::Armed
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Start polling. Arming an armed scheduler does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) -> Result<()> {
        if self.task.is_some() {
            tracing::debug!("Reminder scheduler already armed");
            return Ok(());
        }

        let handle = tokio::runtime::Handle::try_current()
            .context("Reminder scheduler must be armed inside a tokio runtime")?;

        let period = self.settings.poll_interval;
        let clock = self.clock.clone();
        let mut dispatcher = ReminderDispatcher::new(
            self.language,
            self.settings.clone(),
            self.notifier.clone(),
            self.audio.clone(),
        );

        let task = handle.spawn(async move {
            // First check one period from now, like a plain repeating timer.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let now = clock.now_local().naive_local();
                dispatcher.on_tick(now);
            }
        });

        self.task = Some(task);
        tracing::info!(
            "Reminders armed ({}, every {}s)",
            self.language,
            period.as_secs_f64()
        );
        Ok(())
    }

    /// Stop polling.
    ///
    /// `abort` does not wait for a tick that is already running. On the
    /// current-thread runtime from [`reminder_runtime`] no tick can be running
    /// while this executes, so the task never fires again after it returns.
    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Reminders disarmed");
        }
    }

    /// Replace the running timer with one using `language`.
    ///
    /// The old task is torn down before the new one starts. An idle
    /// scheduler only records the language.
    pub fn rearm(&mut self, language: Language) -> Result<()> {
        let was_armed = self.is_armed();
        self.disarm();
        self.language = language;
        if was_armed {
            self.arm()?;
        }
        Ok(())
    }
}

/// Single-threaded runtime for the poll task.
///
/// The tick and the foreground share one thread, so `disarm` and `rearm`
/// never race a tick in flight.
pub fn reminder_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("state", &self.state())
            .field("language", &self.language)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
