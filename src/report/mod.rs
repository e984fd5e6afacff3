//! Report generation from finalized statistics.
//!
//! - `duration`: duration display strings
//! - `view`: serializable rows and summary built from `UserStat`/`ServerStat`
//! - `render`: Tera rendering with a built-in HTML template

pub mod duration;
pub mod render;
pub mod view;

pub use render::ReportRenderer;
