//! Day-keyed log of dry and wet nights.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Domain Enums ====================

/// What the night looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// No enuresis event
    Dry,
    /// At least one enuresis event
    Wet,
}

impl Outcome {
    /// Stable token used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Dry => "dry",
            Outcome::Wet => "wet",
        }
    }
}

/// How often it happened during a wet night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Little,
    Moderate,
    Alot,
}

impl Intensity {
    pub const ALL: [Intensity; 4] = [
        Intensity::Alot,
        Intensity::Moderate,
        Intensity::Little,
        Intensity::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::None => "none",
            Intensity::Little => "little",
            Intensity::Moderate => "moderate",
            Intensity::Alot => "alot",
        }
    }
}

/// Error returned when a token does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Outcome {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" => Ok(Outcome::Dry),
            "wet" => Ok(Outcome::Wet),
            _ => Err(ParseError {
                kind: "outcome",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Intensity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Intensity::None),
            "little" => Ok(Intensity::Little),
            "moderate" => Ok(Intensity::Moderate),
            "alot" | "a-lot" => Ok(Intensity::Alot),
            _ => Err(ParseError {
                kind: "intensity",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Daily Record ====================

/// The outcome of one calendar night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(rename = "result", alias = "outcome")]
    pub outcome: Outcome,
    #[serde(default)]
    pub intensity: Option<Intensity>,
}

impl DailyRecord {
    /// Build a record. Intensity is dropped for dry nights.
    pub fn new(date: NaiveDate, outcome: Outcome, intensity: Option<Intensity>) -> Self {
        let intensity = match outcome {
            Outcome::Dry => None,
            Outcome::Wet => intensity,
        };
        Self {
            date,
            outcome,
            intensity,
        }
    }

    pub fn is_dry(&self) -> bool {
        self.outcome == Outcome::Dry
    }
}

// ==================== Event Log ====================

/// Records in append order, at most one per date.
///
/// Serializes as a plain array. Deserializing collects through `upsert`, so an
/// array with repeated dates still yields one record per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    records: Vec<DailyRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new log with any record for `date` removed and the new
    /// record appended at the end.
    pub fn upsert(
        &self,
        date: NaiveDate,
        outcome: Outcome,
        intensity: Option<Intensity>,
    ) -> EventLog {
        let mut records: Vec<DailyRecord> = self
            .records
            .iter()
            .filter(|r| r.date != date)
            .copied()
            .collect();
        records.push(DailyRecord::new(date, outcome, intensity));
        EventLog { records }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DailyRecord> for EventLog {
    /// Collects records through `upsert`, so later duplicates win.
    fn from_iter<T: IntoIterator<Item = DailyRecord>>(iter: T) -> Self {
        iter.into_iter().fold(EventLog::new(), |log, r| {
            log.upsert(r.date, r.outcome, r.intensity)
        })
    }
}

impl<'de> Deserialize<'de> for EventLog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<DailyRecord>::deserialize(deserializer)?;
        Ok(records.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_upsert_on_empty_log() {
        let log = EventLog::new().upsert(date(2024, 5, 1), Outcome::Wet, Some(Intensity::Alot));

        assert_eq!(
            log.records(),
            &[DailyRecord {
                date: date(2024, 5, 1),
                outcome: Outcome::Wet,
                intensity: Some(Intensity::Alot),
            }]
        );
    }

    #[test]
    fn test_upsert_is_pure() {
        let original = EventLog::new().upsert(date(2024, 5, 1), Outcome::Dry, None);
        let _updated = original.upsert(date(2024, 5, 2), Outcome::Dry, None);

        assert_eq!(original.len(), 1);
    }

    #[test]
    fn test_upsert_same_day_last_write_wins() {
        let log = EventLog::new()
            .upsert(date(2024, 5, 1), Outcome::Dry, None)
            .upsert(date(2024, 5, 1), Outcome::Wet, Some(Intensity::Little));

        assert_eq!(log.len(), 1);
        let record = log.get(date(2024, 5, 1)).unwrap();
        assert_eq!(record.outcome, Outcome::Wet);
        assert_eq!(record.intensity, Some(Intensity::Little));
    }

    #[test]
    fn test_upsert_moves_replaced_record_to_end() {
        let log = EventLog::new()
            .upsert(date(2024, 5, 1), Outcome::Dry, None)
            .upsert(date(2024, 5, 2), Outcome::Dry, None)
            .upsert(date(2024, 5, 1), Outcome::Wet, None);

        let dates: Vec<NaiveDate> = log.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 2), date(2024, 5, 1)]);
        assert_eq!(log.records().last().unwrap().date, date(2024, 5, 1));
    }

    #[test]
    fn test_dry_record_drops_intensity() {
        let record = DailyRecord::new(date(2024, 1, 1), Outcome::Dry, Some(Intensity::Alot));
        assert_eq!(record.intensity, None);
        assert!(record.is_dry());
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("dry".parse::<Outcome>().unwrap(), Outcome::Dry);
        assert_eq!(" WET ".parse::<Outcome>().unwrap(), Outcome::Wet);
        assert_eq!("a-lot".parse::<Intensity>().unwrap(), Intensity::Alot);
        assert_eq!("moderate".parse::<Intensity>().unwrap(), Intensity::Moderate);

        let err = "?".parse::<Outcome>().unwrap_err();
        assert_eq!(err.to_string(), "unknown outcome '?'");
    }

    #[test]
    fn test_display_matches_wire_token() {
        for intensity in Intensity::ALL {
            assert_eq!(intensity.to_string(), intensity.as_str());
        }
        assert_eq!(Outcome::Wet.to_string(), "wet");
    }

    #[test]
    fn test_deserialize_collapses_repeated_dates() {
        let raw = r#"[
            {"date": "2024-01-01", "result": "dry", "intensity": null},
            {"date": "2024-01-02", "result": "dry", "intensity": null},
            {"date": "2024-01-01", "result": "wet", "intensity": "alot"}
        ]"#;

        let log: EventLog = serde_json::from_str(raw).unwrap();

        assert_eq!(log.len(), 2);
        let first = log.get(date(2024, 1, 1)).unwrap();
        assert_eq!(first.outcome, Outcome::Wet);
        assert_eq!(first.intensity, Some(Intensity::Alot));
        assert_eq!(log.records().last().unwrap().date, date(2024, 1, 1));
    }

    #[test]
    fn test_from_iter_keeps_one_record_per_date() {
        let log: EventLog = vec![
            DailyRecord::new(date(2024, 1, 1), Outcome::Dry, None),
            DailyRecord::new(date(2024, 1, 2), Outcome::Dry, None),
            DailyRecord::new(date(2024, 1, 1), Outcome::Wet, Some(Intensity::Moderate)),
        ]
        .into_iter()
        .collect();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(date(2024, 1, 1)).unwrap().outcome, Outcome::Wet);
    }

    // ==================== Property-Based Tests ====================

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn arb_date() -> impl Strategy<Value = NaiveDate> {
            (0i64..3650).prop_map(|offset| {
                date(2020, 1, 1) + chrono::Duration::days(offset)
            })
        }

        fn arb_intensity() -> impl Strategy<Value = Option<Intensity>> {
            prop_oneof![
                Just(None),
                Just(Some(Intensity::None)),
                Just(Some(Intensity::Little)),
                Just(Some(Intensity::Moderate)),
                Just(Some(Intensity::Alot)),
            ]
        }

        fn arb_outcome() -> impl Strategy<Value = Outcome> {
            prop_oneof![Just(Outcome::Dry), Just(Outcome::Wet)]
        }

        proptest! {
            #[test]
            fn upsert_last_write_wins(
                existing in prop::collection::vec((arb_date(), arb_outcome(), arb_intensity()), 0..40),
                d in arb_date(),
                o1 in arb_outcome(),
                i1 in arb_intensity(),
                o2 in arb_outcome(),
                i2 in arb_intensity(),
            ) {
                let base = existing
                    .into_iter()
                    .fold(EventLog::new(), |log, (d, o, i)| log.upsert(d, o, i));

                let log = base.upsert(d, o1, i1).upsert(d, o2, i2);

                let matching: Vec<&DailyRecord> = log.iter().filter(|r| r.date == d).collect();
                prop_assert_eq!(matching.len(), 1);
                prop_assert_eq!(*matching[0], DailyRecord::new(d, o2, i2));
            }

            #[test]
            fn dates_stay_unique(
                entries in prop::collection::vec((arb_date(), arb_outcome(), arb_intensity()), 0..60),
            ) {
                let log = entries
                    .into_iter()
                    .fold(EventLog::new(), |log, (d, o, i)| log.upsert(d, o, i));

                let mut dates: Vec<NaiveDate> = log.iter().map(|r| r.date).collect();
                let total = dates.len();
                dates.sort();
                dates.dedup();
                prop_assert_eq!(dates.len(), total);
            }
        }
    }
}
