//! Wall clock and the date/time display shown next to the intake form.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant (for testing).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T10:00:00.000Z`.
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Date and time as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockDisplay {
    /// `dd/MM/yyyy`
    pub date: String,
    /// `HH:mm`
    pub time: String,
}

impl ClockDisplay {
    pub fn at(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset);
        Self {
            date: local.format("%d/%m/%Y").to_string(),
            time: local.format("%H:%M").to_string(),
        }
    }
}

/// Republish the clock display every `interval` until every receiver is gone.
///
/// The first value is published immediately.
pub fn spawn_clock_ticker(
    clock: Arc<dyn Clock>,
    interval: Duration,
    offset: FixedOffset,
) -> (watch::Receiver<ClockDisplay>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(ClockDisplay::at(clock.now(), offset));

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(ClockDisplay::at(clock.now(), offset)).is_err() {
                tracing::debug!("clock display has no receivers, stopping ticker");
                break;
            }
        }
    });

    (rx, handle)
}
