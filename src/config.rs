//! Client configuration.

use dotenv::dotenv;
use snafu::ResultExt;
use url::Url;

use std::env;

use crate::auth::{default_scopes, SpotifyScope};
use crate::error::{InvalidUrl, MissingConfig, SpotifyResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

pub const DEFAULT_NOTICE: &str =
    "The app is currently in beta testing mode, so if you haven't been added use the guest login";

/// Everything the page needs to know before it loads.
///
/// # Example
///
/// ```
/// use weather_tunes::ClientConfig;
///
/// let config = ClientConfig::new("9bef3c4aa58f4cf7".into(), "http://localhost:8000/").unwrap();
/// assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The Spotify Application Client ID
    pub client_id: String,
    /// Location the page opens at when no redirect URL is given.
    pub base_url: Url,
    pub scopes: Vec<SpotifyScope>,
    /// Shown once on load, ``None`` disables it.
    pub notice: Option<String>,
}

impl ClientConfig {
    pub fn new(client_id: String, base_url: &str) -> SpotifyResult<Self> {
        Ok(Self {
            client_id,
            base_url: Url::parse(base_url).context(InvalidUrl { url: base_url })?,
            scopes: default_scopes(),
            notice: Some(DEFAULT_NOTICE.to_owned()),
        })
    }

    /// Load the configuration from the environment and a local ``.env`` file.
    ///
    /// ``SPOTIFY_CLIENT_ID`` is required. ``SPOTIFY_REDIRECT_URI`` defaults to
    /// ``http://localhost:8000/``. ``APP_NOTICE`` replaces the load notice, an empty value disables it.
    pub fn from_env() -> SpotifyResult<Self> {
        // Load local .env file.
        dotenv().ok();

        let client_id = env::var("SPOTIFY_CLIENT_ID").context(MissingConfig {
            name: "SPOTIFY_CLIENT_ID",
        })?;
        let base_url =
            env::var("SPOTIFY_REDIRECT_URI").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(client_id, &base_url)?;
        if let Ok(notice) = env::var("APP_NOTICE") {
            config.notice = Some(notice).filter(|n| !n.trim().is_empty());
        }

        Ok(config)
    }
}
