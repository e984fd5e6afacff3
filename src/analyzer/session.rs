//! Session tracking: who is online, and the per-user accumulators their events update.

use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

use super::types::{LogEvent, LogoutKind, UserStat};

/// Run-scoped session state, mutated by events in log order.
#[derive(Debug, Default)]
pub struct SessionTracker {
    /// Users in order of first login.
    users: Vec<UserStat>,
    index: HashMap<String, usize>,
    online: HashSet<String>,
    max_online: usize,
    max_online_at: Option<NaiveDateTime>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event that passed the cutoff filter.
    pub fn apply(&mut self, timestamp: NaiveDateTime, event: LogEvent) {
        match event {
            LogEvent::Login { username } => self.login(username, timestamp),
            LogEvent::Logout { username, kind } => self.logout(&username, kind, timestamp),
            LogEvent::ServerStop => self.stop_server(timestamp),
            LogEvent::Chat { username } => self.chat(&username),
        }
    }

    fn login(&mut self, username: String, timestamp: NaiveDateTime) {
        let slot = match self.index.get(&username).copied() {
            Some(slot) => slot,
            None => {
                self.users.push(UserStat::new(username.clone()));
                self.index.insert(username.clone(), self.users.len() - 1);
                self.users.len() - 1
            }
        };

        let user = &mut self.users[slot];
        user.mark_active(timestamp);
        user.login_count += 1;
        // A second login without a logout restarts the session.
        user.last_login = Some(timestamp);

        self.online.insert(username);
        if self.online.len() > self.max_online {
            self.max_online = self.online.len();
            self.max_online_at = Some(timestamp);
        }
    }

    fn logout(&mut self, username: &str, kind: LogoutKind, timestamp: NaiveDateTime) {
        let Some(user) = self.user_mut(username) else {
            return;
        };
        user.mark_active(timestamp);
        if let Some(session) = user.close_session(timestamp) {
            log::trace!("{} logged out ({:?}) after {}s", username, kind, session.num_seconds());
        }
        self.online.remove(username);
    }

    fn stop_server(&mut self, timestamp: NaiveDateTime) {
        let closed = self.users.iter_mut().filter_map(|user| user.close_session(timestamp)).count();
        log::debug!("Server stop at {} closed {} open session(s)", timestamp, closed);
        self.online.clear();
    }

    fn chat(&mut self, username: &str) {
        if let Some(user) = self.user_mut(username) {
            user.message_count += 1;
        }
    }

    fn user_mut(&mut self, username: &str) -> Option<&mut UserStat> {
        let slot = *self.index.get(username)?;
        self.users.get_mut(slot)
    }

    #[cfg(test)]
    pub fn user(&self, username: &str) -> Option<&UserStat> {
        self.index.get(username).and_then(|&slot| self.users.get(slot))
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    #[cfg(test)]
    pub fn is_online(&self, username: &str) -> bool {
        self.online.contains(username)
    }

    /// Peak online count and when it was first reached.
    pub fn peak(&self) -> (usize, Option<NaiveDateTime>) {
        (self.max_online, self.max_online_at)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Consume the tracker, yielding users in order of first login.
    pub fn into_users(self) -> Vec<UserStat> {
        self.users
    }
}
