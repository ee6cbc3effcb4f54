//! Error Type for the API.

use snafu::Snafu;
use std::io;
use std::path::PathBuf;

/// Generic Result for the Library
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Every way the login, profile and recommendation flow can fail.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SpotifyError {
    /// A configured or received URL could not be parsed.
    #[snafu(display("The URL {} failed to parse: {}", url, source))]
    InvalidUrl { url: String, source: url::ParseError },

    /// The request to an URL failed before a response arrived.
    #[snafu(display("The request to {} failed: {}", url, source))]
    RequestFailed { url: String, source: surf::Exception },

    /// The response body could not be read.
    #[snafu(display("Failed to read the response body from {}: {}", url, source))]
    ReadBody { url: String, source: io::Error },

    /// The server answered with a non success status.
    #[snafu(display("{} responded with status {}: {}", url, status, body))]
    UnexpectedStatus { url: String, status: u16, body: String },

    /// The JSON response could not be parsed.
    #[snafu(display("The JSON response from {} failed to parse: {}", url, source))]
    ParsingFailed { url: String, source: serde_json::Error },

    /// A required environment variable was not found.
    #[snafu(display("{} failed to load from the environment: {}", name, source))]
    MissingConfig {
        name: String,
        source: std::env::VarError,
    },

    /// An authorization code arrived but no code verifier was stored by the login step.
    #[snafu(display("No code verifier is stored for this session."))]
    MissingVerifier,

    /// The operation needs an access token and the session has none.
    #[snafu(display("No access token is available, log in first."))]
    MissingToken,

    /// The session file could not be read or written.
    #[snafu(display("Session storage at {} failed: {}", path.display(), source))]
    Storage { path: PathBuf, source: io::Error },

    /// The session file holds something other than a JSON object of strings.
    #[snafu(display("Session storage at {} is not valid JSON: {}", path.display(), source))]
    StorageFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}
