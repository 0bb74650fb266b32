//! Abstractions for time and side effects to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: Abstracting time access for deterministic testing
//! - `Notifier`: Abstracting reminder notifications
//! - `AudioSink`: Abstracting playback of the relaxation track

use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
///
/// This allows injecting mock clocks during testing to create
/// deterministic, reproducible tests for time-dependent logic.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Get the current time in the local timezone.
    fn now_local(&self) -> DateTime<Local>;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Create a mock clock showing the given local wall-clock time.
    pub fn at_local(time: NaiveDateTime) -> Self {
        Self::new(local_to_utc(time))
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }

    /// Set the mock clock to a local wall-clock time.
    pub fn set_local(&self, time: NaiveDateTime) {
        self.set_time(local_to_utc(time));
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.utc_time.lock().unwrap();
        *time = *time + duration;
    }
}

fn local_to_utc(time: NaiveDateTime) -> DateTime<Utc> {
    // Times inside a DST gap have no local representation; read them as UTC.
    Local
        .from_local_datetime(&time)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| time.and_utc())
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }

    fn now_local(&self) -> DateTime<Local> {
        self.now_utc().with_timezone(&Local)
    }
}

// ==================== Notifier Trait ====================

/// Sound name that asks the platform for its default alert.
pub const DEFAULT_SOUND: &str = "default";

/// Trait for abstracting reminder notifications.
///
/// Delivery is fire-and-forget: callers log a returned error and move on.
pub trait Notifier: Send + Sync {
    /// Show `message` and request the alert sound `sound_name`.
    fn notify(&self, message: &str, sound_name: &str) -> Result<()>;
}

/// Notifier that only writes reminders to the log. Used headless.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, sound_name: &str) -> Result<()> {
        tracing::info!(sound = sound_name, "Reminder: {}", message);
        Ok(())
    }
}

/// System notifier implementation using notify-rust.
#[cfg(feature = "desktop")]
#[derive(Debug, Clone, Default)]
pub struct SystemNotifier;

#[cfg(feature = "desktop")]
impl Notifier for SystemNotifier {
    fn notify(&self, message: &str, sound_name: &str) -> Result<()> {
        show_desktop(message, sound_name)
    }
}

#[cfg(feature = "desktop")]
fn show_desktop(message: &str, sound_name: &str) -> Result<()> {
    if sound_name != DEFAULT_SOUND {
        tracing::debug!("Desktop notifications use the platform sound, ignoring '{}'", sound_name);
    }
    notify_rust::Notification::new()
        .summary("Dry Nights")
        .body(message)
        .appname("Dry Nights")
        .show()
        .context("Failed to show desktop notification")?;
    Ok(())
}

/// Combined notifier that sends to the desktop and optionally to ntfy.sh.
#[derive(Debug, Clone)]
pub struct CombinedNotifier {
    ntfy_topic: Option<String>,
}

impl CombinedNotifier {
    /// Create a new combined notifier.
    ///
    /// # Arguments
    /// * `ntfy_topic` - Optional ntfy.sh topic name for phone notifications
    pub fn new(ntfy_topic: Option<String>) -> Self {
        Self { ntfy_topic }
    }
}

impl Notifier for CombinedNotifier {
    fn notify(&self, message: &str, sound_name: &str) -> Result<()> {
        #[cfg(feature = "desktop")]
        let desktop = show_desktop(message, sound_name);
        #[cfg(not(feature = "desktop"))]
        let desktop = LogNotifier.notify(message, sound_name);

        if let Some(ref topic) = self.ntfy_topic {
            let url = format!("https://ntfy.sh/{}", topic);
            let body = message.to_string();

            // Fire and forget on a plain thread; the blocking client must not
            // run inside the tokio runtime.
            std::thread::spawn(move || {
                if let Ok(client) = reqwest::blocking::Client::builder()
                    .timeout(std::time::Duration::from_secs(10))
                    .build()
                {
                    if let Err(e) = client.post(&url).body(body).send() {
                        tracing::warn!("ntfy push failed: {}", e);
                    }
                }
            });
        }

        desktop
    }
}

/// Mock notifier for testing that records all notifications.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notifications: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all `(message, sound_name)` pairs that have been sent.
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    /// Get the count of notifications sent.
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    /// Check if any notification was sent.
    pub fn was_called(&self) -> bool {
        !self.notifications.lock().unwrap().is_empty()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str, sound_name: &str) -> Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((message.to_string(), sound_name.to_string()));
        Ok(())
    }
}

// ==================== Audio Sink Trait ====================

/// Trait for playing an audio track without waiting for it to finish.
pub trait AudioSink: Send + Sync {
    fn play(&self, track: &str) -> Result<()>;
}

/// Plays tracks by spawning an external player, e.g. `mpv` or `afplay`.
///
/// With no command configured the request is only logged.
#[derive(Debug, Clone, Default)]
pub struct CommandAudioSink {
    program: Option<String>,
}

impl CommandAudioSink {
    pub fn new(program: Option<String>) -> Self {
        Self { program }
    }
}

impl AudioSink for CommandAudioSink {
    fn play(&self, track: &str) -> Result<()> {
        let Some(ref program) = self.program else {
            tracing::info!("No audio player configured, skipping '{}'", track);
            return Ok(());
        };

        let mut parts = program.split_whitespace();
        let binary = parts.next().context("Audio player command is empty")?;

        let mut child = Command::new(binary)
            .args(parts)
            .arg(track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start audio player '{}'", binary))?;
        tracing::debug!("Started '{}' for {}", binary, track);

        // Reap the player on a plain thread so playback never blocks a tick.
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!("Audio player exited with {}", status);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to wait for audio player: {}", e),
        });
        Ok(())
    }
}

/// Mock audio sink that records requested tracks.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSink {
    tracks: Arc<Mutex<Vec<String>>>,
}

impl MockAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<String> {
        self.tracks.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }
}

impl AudioSink for MockAudioSink {
    fn play(&self, track: &str) -> Result<()> {
        self.tracks.lock().unwrap().push(track.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[test]
    fn test_system_clock_returns_current_time() {
        let clock = SystemClock;
        let before = Utc::now();
        let clock_time = clock.now_utc();
        let after = Utc::now();

        assert!(clock_time >= before);
        assert!(clock_time <= after);
    }

    #[test]
    fn test_mock_clock_returns_set_time() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
        let clock = MockClock::new(fixed_time);

        assert_eq!(clock.now_utc(), fixed_time);
    }

    #[test]
    fn test_mock_clock_local_wall_time() {
        let wall = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let clock = MockClock::at_local(wall);

        assert_eq!(clock.now_local().naive_local(), wall);

        let later = wall + chrono::Duration::minutes(150);
        clock.set_local(later);
        assert_eq!(clock.now_local().naive_local(), later);
    }

    #[test]
    fn test_mock_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let clock = MockClock::new(start);

        clock.advance(chrono::Duration::hours(2));

        let expected = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(clock.now_utc(), expected);
    }

    #[test]
    fn test_mock_notifier_records_notifications() {
        let notifier = MockNotifier::new();

        assert!(!notifier.was_called());

        notifier.notify("Stop drinking water", DEFAULT_SOUND).unwrap();
        notifier.notify("Brush teeth, relax", "chime").unwrap();

        assert_eq!(notifier.notification_count(), 2);
        assert_eq!(
            notifier.get_notifications()[1],
            ("Brush teeth, relax".to_string(), "chime".to_string())
        );

        notifier.clear();
        assert!(!notifier.was_called());
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("Wake up, go to toilet", DEFAULT_SOUND).is_ok());
    }

    #[test]
    fn test_audio_sink_without_player_is_noop() {
        let sink = CommandAudioSink::new(None);
        assert!(sink.play("relax_music.mp3").is_ok());
    }

    #[test]
    fn test_audio_sink_reports_missing_binary() {
        let sink = CommandAudioSink::new(Some("definitely-not-a-player-binary".to_string()));
        assert!(sink.play("relax_music.mp3").is_err());
    }

    /// Children of this process that have exited but were never reaped.
    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return 0;
        };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| std::fs::read_to_string(e.path().join("stat")).ok())
            .filter(|stat| {
                // Fields after the parenthesised command name: state, ppid, ...
                let Some((_, rest)) = stat.rsplit_once(')') else {
                    return false;
                };
                let mut fields = rest.split_whitespace();
                let state = fields.next();
                let ppid = fields.next();
                state == Some("Z") && ppid == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_audio_sink_reaps_finished_players() {
        let sink = CommandAudioSink::new(Some("true".to_string()));

        for _ in 0..3 {
            sink.play("relax_music.mp3").unwrap();
        }

        let mut zombies = zombie_children();
        for _ in 0..40 {
            if zombies == 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
            zombies = zombie_children();
        }
        assert_eq!(zombies, 0, "finished players should be reaped");
    }

    #[test]
    fn test_mock_audio_sink_records_tracks() {
        let sink = MockAudioSink::new();
        sink.play("relax_music.mp3").unwrap();
        assert_eq!(sink.played(), vec!["relax_music.mp3".to_string()]);
        assert_eq!(sink.play_count(), 1);
    }
}
