//! # Weather Tunes
//!
//! A Spotify client that logs in through the Authorization Code Flow with PKCE, shows the
//! current user's profile and asks a backend for recommendations matching the local weather.
//!
//! The browser page is modelled by [`Page`]: it writes into a [`PageView`], keeps the session in
//! a [`SessionStore`](session::SessionStore) and talks HTTP through a [`Remote`].
//!
//! # Basic Example
//!
//! ```no_run
//! use weather_tunes::session::MemoryStore;
//! use weather_tunes::{ClientConfig, FormInput, Page, PageView, SurfRemote};
//! use url::Url;
//!
//! struct Console;
//!
//! impl PageView for Console {
//!     fn alert(&mut self, message: &str) { println!("{}", message) }
//!     fn set_coordinates(&mut self, _: &str, _: &str) {}
//!     fn set_profile_html(&mut self, html: &str) { println!("{}", html) }
//!     fn set_recommendations_html(&mut self, html: &str) { println!("{}", html) }
//!     fn set_submit_enabled(&mut self, _: bool) {}
//!     fn redirect(&mut self, url: &Url) { println!("Open {}", url) }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let location = config.base_url.to_string();
//! let mut page = Page::new(config, &location, SurfRemote::new()?, MemoryStore::new(), Console)?;
//!
//! page.guest_login().await?;
//! page.submit(&FormInput::new("52.23°", "21.01°", "rock, pop")).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rand::{self, Rng};

pub mod api;
pub mod auth;
pub mod config;
mod error;
pub mod form;
pub mod page;
pub mod profile;
pub mod render;
pub mod session;

pub use crate::api::{Remote, SurfRemote};
pub use crate::auth::{SpotifyAuth, SpotifyCallback, SpotifyScope, SpotifyToken, TokenRequest};
pub use crate::config::ClientConfig;
pub use crate::error::{SpotifyError, SpotifyResult};
pub use crate::form::{Coordinates, FormInput, RecommendationQuery};
pub use crate::page::{Geolocator, NoLocation, Page, PageView};
pub use crate::profile::{Image, UserProfile};

/// Convert date and time to a unix timestamp.
///
/// # Example
///
/// ```no_run
/// // Uses elapsed seconds and the current timestamp to return a timestamp offset by the seconds.
/// use weather_tunes::datetime_to_timestamp;
///
/// let timestamp = datetime_to_timestamp(3600);
/// ```
pub fn datetime_to_timestamp(elapsed: u32) -> i64 {
    let utc: DateTime<Utc> = Utc::now();
    utc.timestamp() + i64::from(elapsed)
}

/// Generate a random alphanumeric string with a given length.
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(length)
        .collect()
}
