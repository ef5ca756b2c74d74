//! Error types shared by the fetchers, the filters and the proxy server.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body arrived but did not match the expected JSON shape.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classifies a reqwest failure the way the handlers report it.
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if let Some(status) = source.status() {
            Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else if source.is_decode() {
            Error::Decode {
                url: url.to_string(),
                source,
            }
        } else {
            Error::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}
