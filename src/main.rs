use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dry_nights::{
    AppConfig, Clock, CombinedNotifier, CommandAudioSink, FileStore, Intensity, Language, LogStore,
    NightTracker, Notifier, Outcome, ReminderSchedule, SystemClock, export_csv,
    i18n::{self, Text},
    reminder_runtime,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "dry-nights")]
#[command(about = "Nightly routine reminders and dry-night tracking")]
struct Args {
    /// Display language (uz, ru, en); overrides the configured one
    #[arg(long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reminder loop until interrupted (default)
    Run,
    /// Mark how last night went
    Mark {
        /// dry or wet
        outcome: Outcome,
        /// none, little, moderate or alot (wet nights only)
        #[arg(long)]
        intensity: Option<Intensity>,
    },
    /// Set the intensity of today's wet night
    Intensity { level: Intensity },
    /// Show weekly and monthly dry counts
    Stats,
    /// Show treatment advice
    Advice,
    /// Export the log to CSV
    Export {
        /// Output directory (defaults to the download directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("dry_nights=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(language) = args.language {
        config.reminders.language = language;
    }

    let file_store = FileStore::new(&config.storage.data_dir);
    tracing::debug!("Data directory: {}", file_store.dir().display());
    let store = LogStore::new(Arc::new(file_store));
    let notifier: Arc<dyn Notifier> =
        Arc::new(CombinedNotifier::new(config.notifications.ntfy_topic.clone()));
    let audio = Arc::new(CommandAudioSink::new(config.audio.player_command.clone()));
    let mut tracker = NightTracker::open(&config, store, Arc::new(SystemClock), notifier, audio);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_reminders(tracker),
        Command::Mark { outcome, intensity } => {
            let record = *tracker.mark_today(outcome, intensity);
            println!("{}: {}", record.date, answer_label(tracker.language(), outcome));
            if let Some(level) = record.intensity {
                println!("{}", i18n::text(tracker.language(), Text::IntensityLabel(level)));
            } else if outcome == Outcome::Wet {
                print_intensity_prompt(tracker.language());
            }
            print_stats(&tracker);
            Ok(())
        }
        Command::Intensity { level } => {
            match tracker.set_intensity(level) {
                Some(record) => println!(
                    "{}: {}",
                    record.date,
                    i18n::text(tracker.language(), Text::IntensityLabel(level))
                ),
                None => println!("{}", i18n::text(tracker.language(), Text::DailyQuestion)),
            }
            Ok(())
        }
        Command::Stats => {
            print_stats(&tracker);
            Ok(())
        }
        Command::Advice => {
            let language = tracker.language();
            println!("{}", i18n::text(language, Text::AdviceHeading));
            for line in i18n::advice(language) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Export { dir } => {
            let dir = dir
                .or_else(dirs::download_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let path = export_csv(tracker.log(), &dir, tracker.clock())?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Arm reminders and block until Ctrl-C.
fn run_reminders(mut tracker: NightTracker) -> Result<()> {
    let rt = reminder_runtime()?;

    rt.block_on(async {
        tracing::info!(
            "Starting Dry Nights reminders ({})",
            tracker.language().native_name()
        );
        if tracker.today().is_none() {
            println!("{}", i18n::text(tracker.language(), Text::DailyQuestion));
        }
        print_stats(&tracker);

        tracker.start_reminders()?;
        let now = tracker.clock().now_local().naive_local();
        if let Some((entry, at)) = ReminderSchedule::new().next_after(&now) {
            tracing::info!("Next reminder at {} ({})", entry.time, at.format("%Y-%m-%d"));
        }
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        tracker.stop_reminders();
        tracing::info!("Shutting down");
        Ok::<_, anyhow::Error>(())
    })
}

fn answer_label(language: Language, outcome: Outcome) -> &'static str {
    // The daily question asks whether the night was dry.
    match outcome {
        Outcome::Dry => i18n::text(language, Text::AnswerYes),
        Outcome::Wet => i18n::text(language, Text::AnswerNo),
    }
}

fn print_intensity_prompt(language: Language) {
    println!("{}", i18n::text(language, Text::IntensityQuestion));
    for level in Intensity::ALL {
        println!(
            "  {:<9} {}",
            level.as_str(),
            i18n::text(language, Text::IntensityLabel(level))
        );
    }
}

fn print_stats(tracker: &NightTracker) {
    let stats = tracker.stats();
    let language = tracker.language();
    println!("{}", i18n::weekly_stats(language, stats.weekly_dry));
    match stats.monthly_dry_ratio() {
        Some(ratio) => println!(
            "{} ({:.0}%)",
            i18n::monthly_stats(language, stats.monthly_dry),
            ratio * 100.0
        ),
        None => println!("{}", i18n::monthly_stats(language, stats.monthly_dry)),
    }
}
