//! Type definitions specific to the analyzer module.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::collections::HashSet;

/// How a player left the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutKind {
    /// `<name> lost connection: ...`
    Disconnect,
    /// `CONSOLE: Kicked player <name>.`
    Kick,
}

/// Parsed log line variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A player joined with an entity id.
    Login { username: String },
    /// A player left, either by disconnecting or by being kicked.
    Logout { username: String, kind: LogoutKind },
    /// The server is shutting down; everyone online is logged out.
    ServerStop,
    /// A chat line attributed to `username`.
    Chat { username: String },
}

/// An event together with the timestamp of the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub timestamp: NaiveDateTime,
    pub event: LogEvent,
}

/// Per-user accumulators, one per distinct username seen logging in.
#[derive(Debug, Clone)]
pub struct UserStat {
    pub username: String,
    pub login_count: u32,
    /// Calendar days with at least one counted login or logout.
    pub active_days: HashSet<NaiveDate>,
    /// Set only while the user is online.
    pub last_login: Option<NaiveDateTime>,
    pub total_online: TimeDelta,
    pub longest_session: TimeDelta,
    pub message_count: u32,
}

impl UserStat {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            login_count: 0,
            active_days: HashSet::new(),
            last_login: None,
            total_online: TimeDelta::zero(),
            longest_session: TimeDelta::zero(),
            message_count: 0,
        }
    }

    pub fn mark_active(&mut self, timestamp: NaiveDateTime) {
        self.active_days.insert(timestamp.date());
    }

    /// Close the open session at `timestamp`, if there is one.
    ///
    /// Returns the length of the closed session.
    pub fn close_session(&mut self, timestamp: NaiveDateTime) -> Option<TimeDelta> {
        let login = self.last_login.take()?;
        let session = timestamp - login;
        self.total_online += session;
        self.longest_session = self.longest_session.max(session);
        Some(session)
    }

    pub fn active_day_count(&self) -> usize {
        self.active_days.len()
    }

    /// Average online time per login.
    ///
    /// A `UserStat` only exists after a counted login, so `login_count` is at least one; a zero count
    /// still yields `None` rather than dividing by zero.
    pub fn time_per_login(&self) -> Option<TimeDelta> {
        average(self.total_online, self.login_count as usize)
    }

    /// Average online time per active day. Same zero guard as [`UserStat::time_per_login`].
    pub fn time_per_active_day(&self) -> Option<TimeDelta> {
        average(self.total_online, self.active_day_count())
    }

    /// Average online time per chat message, `None` when the user never chatted.
    pub fn time_per_message(&self) -> Option<TimeDelta> {
        average(self.total_online, self.message_count as usize)
    }
}

fn average(total: TimeDelta, count: usize) -> Option<TimeDelta> {
    let count = i32::try_from(count).ok().filter(|c| *c > 0)?;
    Some(total / count)
}

/// Server-wide statistics, one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStat {
    /// The `--since` cutoff if given, otherwise the first parseable timestamp in the log.
    pub statistics_since: Option<NaiveDateTime>,
    pub total_played: TimeDelta,
    pub max_concurrent_players: usize,
    /// When `max_concurrent_players` was first reached.
    pub max_concurrent_players_at: Option<NaiveDateTime>,
}

impl Default for ServerStat {
    fn default() -> Self {
        Self {
            statistics_since: None,
            total_played: TimeDelta::zero(),
            max_concurrent_players: 0,
            max_concurrent_players_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_close_session_accumulates() {
        let mut user = UserStat::new("Alice");
        user.last_login = Some(ts("2013-01-01 10:00:00"));
        assert_eq!(user.close_session(ts("2013-01-01 10:30:00")), Some(TimeDelta::minutes(30)));
        assert_eq!(user.last_login, None);

        user.last_login = Some(ts("2013-01-01 11:00:00"));
        user.close_session(ts("2013-01-01 12:00:00"));
        assert_eq!(user.total_online, TimeDelta::minutes(90));
        assert_eq!(user.longest_session, TimeDelta::hours(1));
    }

    #[test]
    fn test_close_session_when_offline_is_noop() {
        let mut user = UserStat::new("Bob");
        assert_eq!(user.close_session(ts("2013-01-01 10:30:00")), None);
        assert_eq!(user.total_online, TimeDelta::zero());
    }

    #[test]
    fn test_derived_averages() {
        let mut user = UserStat::new("Alice");
        user.login_count = 2;
        user.total_online = TimeDelta::hours(2);
        user.mark_active(ts("2013-01-01 10:00:00"));
        user.mark_active(ts("2013-01-01 23:00:00"));
        user.mark_active(ts("2013-01-02 01:00:00"));

        assert_eq!(user.active_day_count(), 2);
        assert!(user.active_days.contains(&NaiveDate::from_ymd_opt(2013, 1, 2).unwrap()));
        assert_eq!(user.time_per_login(), Some(TimeDelta::hours(1)));
        assert_eq!(user.time_per_active_day(), Some(TimeDelta::hours(1)));
        assert_eq!(user.time_per_message(), None);

        user.message_count = 4;
        assert_eq!(user.time_per_message(), Some(TimeDelta::minutes(30)));
    }
}
