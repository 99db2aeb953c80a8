use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to a third-party rate source.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request error: {source} for {upstream}")]
    Request {
        upstream: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{upstream} API responded with status: {status}")]
    Status {
        upstream: &'static str,
        status: StatusCode,
    },
    #[error("Failed to parse {upstream} response: {reason}")]
    Malformed {
        upstream: &'static str,
        reason: String,
    },
    #[error("{record} not found in the {upstream} response")]
    MissingRecord {
        upstream: &'static str,
        record: String,
    },
}
