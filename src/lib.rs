//! Dry Nights Library
//!
//! This module exposes the core components of the Dry Nights tracker:
//! the day-keyed event log, its statistics, and the nightly reminders.

pub mod app;
pub mod config;
pub mod export;
pub mod i18n;
pub mod records;
pub mod reminder;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod traits;

// Re-export commonly used types
pub use app::NightTracker;
pub use config::AppConfig;
pub use export::export_csv;
pub use i18n::{Language, MessageKey, Text};
pub use records::{DailyRecord, EventLog, Intensity, Outcome, ParseError};
pub use reminder::{
    ReminderDispatcher, ReminderScheduler, ReminderSettings, SchedulerState, reminder_runtime,
};
pub use schedule::{ReminderSchedule, ScheduleEntry, SideEffect};
pub use stats::{DryStats, MONTHLY_WINDOW, WEEKLY_WINDOW, count_dry};
pub use store::{FileStore, KeyValueStore, LogStore, MemoryStore, StoreError};
#[cfg(feature = "desktop")]
pub use traits::SystemNotifier;
pub use traits::{
    AudioSink, Clock, CombinedNotifier, CommandAudioSink, LogNotifier, MockAudioSink, MockClock,
    MockNotifier, Notifier, SystemClock,
};
