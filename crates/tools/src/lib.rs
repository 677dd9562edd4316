//! Concrete collaborators for Sahayak.
//!
//! Each type here implements one of the narrow traits in
//! `sahayak_core::collaborator`:
//!
//! - [`YahooChartSource`]: market quotes (commodity feed and proxy equities)
//! - [`NewsApiSource`]: industry headlines
//! - [`HttpProcedureIndex`]: semantic search over operating procedures
//! - [`PostgresExecutor`]: read-only execution of approved statements

pub mod database;
pub mod market;
pub mod news;
pub mod procedures;

pub use database::PostgresExecutor;
pub use market::{YahooChartSource, known_asset};
pub use news::NewsApiSource;
pub use procedures::HttpProcedureIndex;

use std::time::Duration;

const USER_AGENT: &str = concat!("sahayak/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the web collaborators.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
