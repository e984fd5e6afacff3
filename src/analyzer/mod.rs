//! Analyzer module: server log parsing and statistics aggregation.
//!
//! Provides functionality for:
//! - Classifying raw log lines into login, logout, server stop and chat events
//! - Reconstructing sessions from those events in log order
//! - Aggregating per-user and server-wide statistics in a single pass

pub mod aggregator;
pub mod log_loader;
pub mod log_parser;
pub mod session;
pub mod types;

pub use aggregator::analyze;
pub use log_loader::LogLoader;
pub use log_parser::{LineClassifier, TIMESTAMP_FORMAT, parse_datetime};
pub use types::{ServerStat, UserStat};
