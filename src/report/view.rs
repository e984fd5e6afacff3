//! Display-ready views of the finalized statistics, handed to the template.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::duration::{DurationFormat, format_duration};
use crate::analyzer::{ServerStat, TIMESTAMP_FORMAT, UserStat};

/// Shown where an average has nothing to divide by.
pub const NO_DATA: &str = "-";

/// One row of the per-user table.
#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub rank: usize,
    pub username: String,
    pub logins: u32,
    pub time: String,
    pub time_per_login: String,
    pub active_days: usize,
    pub time_per_active_day: String,
    pub longest_session: String,
    pub messages: u32,
    pub time_per_message: String,
}

/// Server-wide summary block.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    pub statistics_since: String,
    pub time_played: String,
    pub max_players: usize,
    pub max_players_date: String,
}

impl UserRow {
    pub fn new(rank: usize, user: &UserStat) -> Self {
        let average = |value: Option<TimeDelta>, format: DurationFormat| {
            value.map_or_else(|| NO_DATA.to_string(), |d| format_duration(d, format))
        };

        Self {
            rank,
            username: user.username.clone(),
            logins: user.login_count,
            time: format_duration(user.total_online, DurationFormat::Days),
            time_per_login: average(user.time_per_login(), DurationFormat::Clock),
            active_days: user.active_day_count(),
            time_per_active_day: average(user.time_per_active_day(), DurationFormat::Clock),
            longest_session: format_duration(user.longest_session, DurationFormat::Clock),
            messages: user.message_count,
            time_per_message: average(user.time_per_message(), DurationFormat::Days),
        }
    }
}

impl From<&ServerStat> for ServerSummary {
    fn from(server: &ServerStat) -> Self {
        Self {
            statistics_since: format_timestamp(server.statistics_since),
            time_played: format_duration(server.total_played, DurationFormat::Years),
            max_players: server.max_concurrent_players,
            max_players_date: format_timestamp(server.max_concurrent_players_at),
        }
    }
}

/// Build table rows; ranks start at 1 and follow the given order.
pub fn user_rows(users: &[UserStat]) -> Vec<UserRow> {
    users.iter().enumerate().map(|(i, user)| UserRow::new(i + 1, user)).collect()
}

pub fn format_timestamp(timestamp: Option<NaiveDateTime>) -> String {
    timestamp.map_or_else(|| NO_DATA.to_string(), |t| t.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parse_datetime;

    #[test]
    fn test_user_row() {
        let mut user = UserStat::new("Alice");
        user.login_count = 2;
        user.total_online = TimeDelta::hours(1);
        user.longest_session = TimeDelta::minutes(40);
        user.mark_active(parse_datetime("2013-01-01 10:00:00").unwrap());

        let row = UserRow::new(1, &user);
        assert_eq!(row.username, "Alice");
        assert_eq!(row.time, "00d 01h 00m 00s");
        assert_eq!(row.time_per_login, "00h 30m 00s");
        assert_eq!(row.active_days, 1);
        assert_eq!(row.time_per_active_day, "01h 00m 00s");
        assert_eq!(row.longest_session, "00h 40m 00s");
        assert_eq!(row.time_per_message, NO_DATA);

        user.message_count = 3;
        assert_eq!(UserRow::new(1, &user).time_per_message, "00d 00h 20m 00s");
    }

    #[test]
    fn test_user_rows_ranked_in_order() {
        let users = vec![UserStat::new("Bob"), UserStat::new("Alice")];
        let rows = user_rows(&users);
        assert_eq!((rows[0].rank, rows[0].username.as_str()), (1, "Bob"));
        assert_eq!((rows[1].rank, rows[1].username.as_str()), (2, "Alice"));
    }

    #[test]
    fn test_server_summary() {
        let server = ServerStat {
            statistics_since: parse_datetime("2013-01-01 09:00:00"),
            total_played: TimeDelta::days(1),
            max_concurrent_players: 4,
            max_concurrent_players_at: None,
        };
        let summary = ServerSummary::from(&server);
        assert_eq!(summary.statistics_since, "2013-01-01 09:00:00");
        assert_eq!(summary.time_played, "01d 00h 00m 00s");
        assert_eq!(summary.max_players, 4);
        assert_eq!(summary.max_players_date, NO_DATA);
    }
}
