//! Classify individual server log lines into `LogEvent`s.
//!
//! Recognized line formats, checked in this order (first match wins):
//! - Login: `... [INFO] <name>[/<ip>:<port>] logged in with entity id <id> ...`
//! - Disconnect: `<date> <time> [INFO] <name> lost connection: <reason>`
//! - Kick: `... [INFO] CONSOLE: Kicked player <name>. ...`
//! - Server stop: `... [INFO] Stopping server`
//! - Chat: `... [INFO] <<prefix> <name>> <text>`

use super::types::{LogEvent, LogoutKind, TimedEvent};
use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

/// Format of the leading timestamp and of the `--since` cutoff.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LOGIN_MARKER: &str = "logged in with entity id";
const DISCONNECT_MARKER: &str = "lost connection";
const KICK_MARKER: &str = "[INFO] CONSOLE: Kicked player";
const STOP_MARKER: &str = "[INFO] Stopping server";

/// Default chat pattern: `<prefix username>`, exactly one prefix token before the name.
pub const DEFAULT_CHAT_PATTERN: &str = r"\[INFO\] <(?P<prefix>[^>]*) (?P<username>[^ ]*)>";

static LOGIN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[INFO\] ([^\]]+)\[").expect("Invalid regex pattern"));

static KICK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[INFO\] CONSOLE: Kicked player ([^ ]*)").expect("Invalid regex pattern"));

static DEFAULT_CHAT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(DEFAULT_CHAT_PATTERN).expect("Invalid regex pattern"));

/// Outcome of running one matcher's extractor over a line it applies to.
#[derive(Debug, PartialEq, Eq)]
enum Extracted {
    Event(LogEvent),
    /// The marker was present but the username could not be found.
    Malformed(&'static str),
    /// A username was found but is not a real player name.
    Rejected,
}

/// One line category: a cheap applicability test plus the field extractor.
struct Matcher {
    name: &'static str,
    applies: fn(&LineClassifier, &str) -> bool,
    extract: fn(&LineClassifier, &str) -> Extracted,
}

/// Line categories in priority order.
static MATCHERS: [Matcher; 5] = [
    Matcher {
        name: "login",
        applies: |_, line| line.contains(LOGIN_MARKER),
        extract: |_, line| extract_login(line),
    },
    Matcher {
        name: "disconnect",
        applies: |_, line| line.contains(DISCONNECT_MARKER),
        extract: |_, line| extract_disconnect(line),
    },
    Matcher {
        name: "kick",
        applies: |_, line| line.contains(KICK_MARKER),
        extract: |_, line| extract_kick(line),
    },
    Matcher {
        name: "server stop",
        applies: |_, line| line.contains(STOP_MARKER),
        extract: |_, _| Extracted::Event(LogEvent::ServerStop),
    },
    Matcher {
        name: "chat",
        applies: |classifier, line| classifier.chat.is_match(line),
        extract: |classifier, line| classifier.extract_chat(line),
    },
];

/// Turns raw log lines into timestamped events.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    chat: Regex,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_REGEX.clone(),
        }
    }
}

impl LineClassifier {
    /// Build a classifier with a custom chat pattern.
    ///
    /// The pattern must contain a capture group named `username`.
    pub fn with_chat_pattern(pattern: &str) -> anyhow::Result<Self> {
        let chat = Regex::new(pattern).with_context(|| format!("Invalid chat pattern: {}", pattern))?;
        if !chat.capture_names().any(|name| name == Some("username")) {
            bail!("Chat pattern must contain a capture group named `username`: {}", pattern);
        }
        Ok(Self { chat })
    }

    /// Classify a log line.
    ///
    /// # Parameters
    ///
    /// * `line` - A single log line, without the trailing newline
    ///
    /// # Returns
    ///
    /// `Some(event)` for a recognized line with a valid timestamp and username, `None` otherwise.
    /// Lines that carry a known marker but no extractable username are reported with `log::warn!`.
    pub fn classify(&self, line: &str) -> Option<TimedEvent> {
        let matcher = MATCHERS.iter().find(|m| (m.applies)(self, line))?;

        let Some(timestamp) = parse_timestamp(line) else {
            log::debug!("Skipping {} line without a valid timestamp: {}", matcher.name, line);
            return None;
        };

        match (matcher.extract)(self, line) {
            Extracted::Event(event) => Some(TimedEvent { timestamp, event }),
            Extracted::Malformed(what) => {
                log::warn!("Unable to find {} username: {}", what, line);
                None
            }
            Extracted::Rejected => {
                log::trace!("Ignoring {} line with an invalid username: {}", matcher.name, line);
                None
            }
        }
    }

    fn extract_chat(&self, line: &str) -> Extracted {
        let Some(username) = self.chat.captures(line).and_then(|c| c.name("username")) else {
            return Extracted::Rejected;
        };
        match normalize_username(username.as_str()) {
            Some(username) => Extracted::Event(LogEvent::Chat { username }),
            None => Extracted::Rejected,
        }
    }
}

/// Parse the `YYYY-MM-DD HH:MM:SS` timestamp made of the first two whitespace-separated tokens.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let mut tokens = line.split_whitespace();
    let date = NaiveDate::parse_from_str(tokens.next()?, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(tokens.next()?, "%H:%M:%S").ok()?;
    Some(date.and_time(time))
}

/// Parse a complete `YYYY-MM-DD HH:MM:SS` value, as given to `--since`.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

fn extract_login(line: &str) -> Extracted {
    let Some(captures) = LOGIN_REGEX.captures(line) else {
        return Extracted::Malformed("login");
    };
    user_event(&captures[1], |username| LogEvent::Login { username })
}

fn extract_disconnect(line: &str) -> Extracted {
    let Some(token) = line.split_whitespace().nth(3) else {
        return Extracted::Malformed("logout");
    };
    user_event(token, |username| LogEvent::Logout {
        username,
        kind: LogoutKind::Disconnect,
    })
}

fn extract_kick(line: &str) -> Extracted {
    let Some(captures) = KICK_REGEX.captures(line) else {
        return Extracted::Malformed("kick logout");
    };
    // Drop the delimiter glued to the name, usually the '.' in "Kicked player Bob."
    let mut name = captures[1].to_string();
    name.pop();
    user_event(&name, |username| LogEvent::Logout {
        username,
        kind: LogoutKind::Kick,
    })
}

fn user_event(raw: &str, build: impl FnOnce(String) -> LogEvent) -> Extracted {
    match normalize_username(raw) {
        Some(username) => Extracted::Event(build(username)),
        None => Extracted::Rejected,
    }
}

/// Trim, drop non-ASCII characters, and reject empty names and `/ip` artifacts.
fn normalize_username(raw: &str) -> Option<String> {
    let username: String = raw.trim().chars().filter(char::is_ascii).collect();
    if username.is_empty() || username.starts_with('/') {
        return None;
    }
    Some(username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn classify(line: &str) -> Option<TimedEvent> {
        LineClassifier::default().classify(line)
    }

    #[test]
    fn test_parse_login() {
        let line = "2013-01-01 10:00:00 [INFO] Alice[/1.2.3.4:5] logged in with entity id 5 at (1.0, 64.0, 1.0)";
        let result = classify(line);
        assert!(result.is_some());

        let TimedEvent { timestamp, event } = result.unwrap();
        assert_eq!(timestamp.year(), 2013);
        assert_eq!(timestamp.hour(), 10);
        assert_eq!(event, LogEvent::Login { username: "Alice".into() });
    }

    #[test]
    fn test_login_without_name_is_dropped() {
        assert_eq!(classify("2013-01-01 10:00:00 [WARNING] logged in with entity id 5"), None);
    }

    #[test]
    fn test_parse_disconnect() {
        let result = classify("2013-01-01 10:30:00 [INFO] Alice lost connection: disconnect.quitting");
        assert_eq!(
            result.map(|e| e.event),
            Some(LogEvent::Logout {
                username: "Alice".into(),
                kind: LogoutKind::Disconnect,
            })
        );
    }

    #[test]
    fn test_disconnect_from_ip_is_rejected() {
        assert_eq!(classify("2013-01-01 10:30:00 [INFO] /1.2.3.4:5 lost connection"), None);
    }

    #[test]
    fn test_disconnect_takes_fourth_token() {
        // The marker itself fills tokens three and four when nothing precedes it.
        let result = classify("2013-01-01 10:30:00 lost connection");
        assert_eq!(
            result.map(|e| e.event),
            Some(LogEvent::Logout {
                username: "connection".into(),
                kind: LogoutKind::Disconnect,
            })
        );
    }

    #[test]
    fn test_disconnect_too_few_tokens() {
        assert_eq!(extract_disconnect("lost connection"), Extracted::Malformed("logout"));
        assert_eq!(extract_disconnect("10:30:00 lost connection"), Extracted::Malformed("logout"));
    }

    #[test]
    fn test_parse_kick() {
        let result = classify("2013-01-01 11:00:00 [INFO] CONSOLE: Kicked player Bob. With reason: griefing");
        assert_eq!(
            result.map(|e| e.event),
            Some(LogEvent::Logout {
                username: "Bob".into(),
                kind: LogoutKind::Kick,
            })
        );
    }

    #[test]
    fn test_kick_username_rules() {
        assert_eq!(classify("2013-01-01 11:00:00 [INFO] CONSOLE: Kicked player /1.2.3.4:5."), None);
        assert_eq!(
            extract_kick("[INFO] CONSOLE: Kicked player /1.2.3.4:5. With reason: spam"),
            Extracted::Rejected
        );

        let result = classify("2013-01-01 11:00:00 [INFO] CONSOLE: Kicked player Bj\u{f6}rn. With reason: afk");
        assert_eq!(
            result.map(|e| e.event),
            Some(LogEvent::Logout {
                username: "Bjrn".into(),
                kind: LogoutKind::Kick,
            })
        );
    }

    #[test]
    fn test_parse_server_stop() {
        let result = classify("2013-01-01 12:00:00 [INFO] Stopping server");
        assert!(result.is_some());

        let TimedEvent { timestamp, event } = result.unwrap();
        assert_eq!(event, LogEvent::ServerStop);
        assert_eq!(timestamp, parse_datetime("2013-01-01 12:00:00").unwrap());
    }

    #[test]
    fn test_parse_chat() {
        let result = classify("2013-01-01 10:10:00 [INFO] <~ Alice> hello there");
        assert_eq!(result.map(|e| e.event), Some(LogEvent::Chat { username: "Alice".into() }));
    }

    #[test]
    fn test_chat_without_prefix_is_ignored() {
        assert_eq!(classify("2013-01-01 10:10:00 [INFO] <Alice> hello"), None);
    }

    #[test]
    fn test_chat_mentioning_markers_uses_priority() {
        // A player typing a marker into chat is classified by the marker.
        let result = classify("2013-01-01 10:10:00 [INFO] <~ Alice> Bob lost connection again");
        assert_eq!(
            result.map(|e| e.event),
            Some(LogEvent::Logout {
                username: "<~".into(),
                kind: LogoutKind::Disconnect,
            })
        );
    }

    #[test]
    fn test_non_ascii_is_dropped_from_usernames() {
        let result = classify("2013-01-01 10:00:00 [INFO] Al\u{e9}ice[/1.2.3.4:5] logged in with entity id 5");
        assert_eq!(result.map(|e| e.event), Some(LogEvent::Login { username: "Alice".into() }));
    }

    #[test]
    fn test_unparseable_timestamp() {
        assert_eq!(classify("\tat net.minecraft.server.Foo(Foo.java:12) lost connection"), None);
        assert_eq!(classify("2013-13-01 10:00:00 [INFO] Stopping server"), None);
    }

    #[test]
    fn test_parse_unparseable_line() {
        assert_eq!(classify("This is not a valid log line"), None);
        assert_eq!(classify("2013-01-01 10:00:00 [INFO] Done (1.2s)! For help, type \"help\""), None);
    }

    #[test]
    fn test_parse_timestamp() {
        let timestamp = parse_timestamp("2013-01-02 03:04:05 [INFO] anything").unwrap();
        assert_eq!((timestamp.month(), timestamp.day(), timestamp.second()), (1, 2, 5));
        assert_eq!(parse_timestamp("2013-01-02"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_datetime() {
        assert!(parse_datetime("2013-01-01 00:00:00").is_some());
        assert!(parse_datetime(" 2013-01-01 00:00:00 ").is_some());
        assert!(parse_datetime("2013-01-01").is_none());
        assert!(parse_datetime("01/01/2013 00:00:00").is_none());
    }

    #[test]
    fn test_custom_chat_pattern() {
        let classifier = LineClassifier::with_chat_pattern(r"\[INFO\] <(?P<username>[^>]+)>").unwrap();
        let result = classifier.classify("2013-01-01 10:10:00 [INFO] <Alice> hi");
        assert_eq!(result.map(|e| e.event), Some(LogEvent::Chat { username: "Alice".into() }));
    }

    #[test]
    fn test_chat_pattern_requires_username_group() {
        assert!(LineClassifier::with_chat_pattern(r"<([^>]+)>").is_err());
        assert!(LineClassifier::with_chat_pattern(r"<(?P<username>").is_err());
    }
}
