use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::i18n::MessageKey;

/// Extra behavior attached to a reminder slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Play the relaxation track alongside the notification.
    PlayRelaxation,
    /// The morning slot that asks the user to mark the night.
    DailyPrompt,
}

/// One reminder slot in the nightly routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// `HH:MM`, 24-hour.
    pub time: &'static str,
    pub message: MessageKey,
    pub effect: Option<SideEffect>,
}

static ROUTINE: [ScheduleEntry; 5] = [
    ScheduleEntry {
        time: "18:00",
        message: MessageKey::StopDrinking,
        effect: None,
    },
    ScheduleEntry {
        time: "20:00",
        message: MessageKey::BrushTeethRelax,
        effect: Some(SideEffect::PlayRelaxation),
    },
    ScheduleEntry {
        time: "22:30",
        message: MessageKey::ToiletAndSleep,
        effect: None,
    },
    ScheduleEntry {
        time: "02:30",
        message: MessageKey::NightToilet,
        effect: None,
    },
    ScheduleEntry {
        time: "07:00",
        message: MessageKey::MorningCheck,
        effect: Some(SideEffect::DailyPrompt),
    },
];

/// The fixed nightly reminder table.
#[derive(Debug, Clone, Copy)]
pub struct ReminderSchedule {
    entries: &'static [ScheduleEntry],
}

impl ReminderSchedule {
    pub fn new() -> Self {
        Self { entries: &ROUTINE }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        self.entries
    }

    /// Exact match on an `HH:MM` string.
    pub fn find(&self, hhmm: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.time == hhmm)
    }

    /// Entry for the minute containing `time`, if any.
    pub fn entry_at(&self, time: &NaiveDateTime) -> Option<&ScheduleEntry> {
        self.find(&minute_key(time))
    }

    /// The next slot strictly after `time`, wrapping past midnight.
    pub fn next_after(&self, time: &NaiveDateTime) -> Option<(&ScheduleEntry, NaiveDateTime)> {
        let date = time.date();
        self.entries
            .iter()
            .filter_map(|e| {
                let slot = NaiveTime::parse_from_str(e.time, "%H:%M").ok()?;
                let mut at = date.and_time(slot);
                if at <= *time {
                    at += chrono::Duration::days(1);
                }
                Some((e, at))
            })
            .min_by_key(|(_, at)| *at)
    }
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to minute granularity as `HH:MM`.
pub fn minute_key(time: &NaiveDateTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
