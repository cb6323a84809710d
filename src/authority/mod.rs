//! Node-side resolution: cache, remote contract, fetcher and checker facade.

mod cache;
mod checker;
mod client;
mod deadline;
mod fetcher;
mod metrics;

pub use cache::AuthorityCache;
pub use checker::{AuthorityChecker, PathsCheckResult};
pub use client::AuthorityClient;
pub use deadline::DeadlineClient;
pub use fetcher::AuthorityFetcher;
pub use metrics::{AuthMetrics, MetricsSnapshot};
