//! Single-pass aggregation over a whole server log.
//!
//! Coordinates:
//! - The "first valid date" anchor (nothing is processed before the first parseable timestamp)
//! - Line classification
//! - The `since` cutoff filter
//! - Session tracking and final summary values

use chrono::{NaiveDateTime, TimeDelta};
use std::io::BufRead;

use super::log_loader::LogLoader;
use super::log_parser::{LineClassifier, parse_timestamp};
use super::session::SessionTracker;
use super::types::{ServerStat, TimedEvent, UserStat};

/// Owns all run-scoped state. Build one per analyzed log.
#[derive(Debug)]
pub struct Aggregator {
    classifier: LineClassifier,
    tracker: SessionTracker,
    since: Option<NaiveDateTime>,
    first_date: Option<NaiveDateTime>,
    events_applied: u64,
    events_filtered: u64,
}

impl Aggregator {
    /// # Parameters
    ///
    /// * `classifier` - Line classifier (carries the chat pattern)
    /// * `since` - Events before this timestamp are ignored
    pub fn new(classifier: LineClassifier, since: Option<NaiveDateTime>) -> Self {
        Self {
            classifier,
            tracker: SessionTracker::new(),
            since,
            first_date: None,
            events_applied: 0,
            events_filtered: 0,
        }
    }

    /// Feed the aggregator every line of `loader`, in order.
    ///
    /// Only read failures are errors; malformed content is skipped.
    pub fn consume<R: BufRead>(&mut self, loader: &mut LogLoader<R>) -> Result<(), std::io::Error> {
        while let Some(line) = loader.next_line()? {
            self.process_line(&line);
        }
        log::info!(
            "Read {} lines: {} events applied, {} before cutoff, {} users, {} still online at end of log",
            loader.lines_read(),
            self.events_applied,
            self.events_filtered,
            self.tracker.user_count(),
            self.tracker.online_count()
        );
        Ok(())
    }

    /// Process one log line. Must be called in file order.
    pub fn process_line(&mut self, line: &str) {
        if self.first_date.is_none() {
            match parse_timestamp(line) {
                Some(timestamp) => self.first_date = Some(timestamp),
                None => {
                    log::trace!("Skipping line before first valid date: {}", line);
                    return;
                }
            }
        }

        let Some(TimedEvent { timestamp, event }) = self.classifier.classify(line) else {
            return;
        };

        if self.since.is_some_and(|since| timestamp < since) {
            self.events_filtered += 1;
            return;
        }

        self.events_applied += 1;
        self.tracker.apply(timestamp, event);
    }

    /// Finish the run.
    ///
    /// # Returns
    ///
    /// Users sorted by descending total online time (ties keep first-login order) and the server summary.
    pub fn finalize(self) -> (Vec<UserStat>, ServerStat) {
        let (max_concurrent_players, max_concurrent_players_at) = self.tracker.peak();

        let mut users = self.tracker.into_users();
        users.sort_by(|a, b| b.total_online.cmp(&a.total_online));

        let total_played = users.iter().fold(TimeDelta::zero(), |total, user| total + user.total_online);

        let server = ServerStat {
            statistics_since: self.since.or(self.first_date),
            total_played,
            max_concurrent_players,
            max_concurrent_players_at,
        };
        (users, server)
    }
}

/// Run a complete analysis over every line of `loader`.
pub fn analyze<R: BufRead>(
    loader: &mut LogLoader<R>,
    classifier: LineClassifier,
    since: Option<NaiveDateTime>,
) -> Result<(Vec<UserStat>, ServerStat), std::io::Error> {
    let mut aggregator = Aggregator::new(classifier, since);
    aggregator.consume(loader)?;
    Ok(aggregator.finalize())
}
