//! Outbound HTTP calls made by the page.

use snafu::{ensure, ResultExt};
use tracing::{debug, info};
use url::Url;

use std::future::Future;
use std::pin::Pin;

use crate::auth::{SpotifyToken, TokenRequest, SPOTIFY_TOKEN_URL};
use crate::datetime_to_timestamp;
use crate::error::{
    InvalidUrl, ParsingFailed, ReadBody, RequestFailed, SpotifyResult, UnexpectedStatus,
};
use crate::profile::{UserProfile, SPOTIFY_PROFILE_URL};

/// Path of the backend endpoint handing out client credentials tokens for guests.
pub const GUEST_TOKEN_PATH: &str = "api/spotify-auth";

pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = SpotifyResult<T>> + 'a>>;

/// The services the page talks to: Spotify accounts, the Spotify Web API and the backend.
pub trait Remote {
    /// Trade an authorization code and its verifier for a token.
    fn exchange_code<'a>(&'a self, request: &'a TokenRequest) -> RemoteFuture<'a, SpotifyToken>;

    /// ``GET /v1/me`` with the bearer token.
    fn fetch_profile<'a>(&'a self, access_token: &'a str) -> RemoteFuture<'a, UserProfile>;

    /// Ask the backend for a client credentials access token.
    fn fetch_guest_token<'a>(&'a self, base_url: &'a Url) -> RemoteFuture<'a, String>;

    /// Fetch the rendered recommendations fragment from a fully built endpoint URL.
    fn fetch_recommendations<'a>(
        &'a self,
        endpoint: &'a Url,
        access_token: &'a str,
    ) -> RemoteFuture<'a, String>;
}

/// [`Remote`] implementation on top of ``surf``.
#[derive(Debug, Clone)]
pub struct SurfRemote {
    token_url: Url,
    profile_url: Url,
}

impl SurfRemote {
    pub fn new() -> SpotifyResult<Self> {
        Self::with_endpoints(SPOTIFY_TOKEN_URL, SPOTIFY_PROFILE_URL)
    }

    /// Point the client at other accounts and profile endpoints, e.g. a local mock server.
    pub fn with_endpoints(token_url: &str, profile_url: &str) -> SpotifyResult<Self> {
        Ok(Self {
            token_url: Url::parse(token_url).context(InvalidUrl { url: token_url })?,
            profile_url: Url::parse(profile_url).context(InvalidUrl { url: profile_url })?,
        })
    }
}

/// Read the body and fail on any non success status.
async fn read_body(url: &str, mut response: surf::Response) -> SpotifyResult<String> {
    let status = response.status();
    let bytes = response.body_bytes().await.context(ReadBody { url })?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    ensure!(
        status.is_success(),
        UnexpectedStatus {
            url,
            status: status.as_u16(),
            body,
        }
    );

    Ok(body)
}

impl SurfRemote {
    async fn exchange(&self, request: &TokenRequest) -> SpotifyResult<SpotifyToken> {
        let url = self.token_url.as_str();
        debug!(url, "Exchanging authorization code");

        let response = surf::post(url)
            .body_string(request.form_body())
            .set_header("Content-Type", "application/x-www-form-urlencoded")
            .await
            .context(RequestFailed { url })?;

        let body = read_body(url, response).await?;
        let mut token: SpotifyToken = serde_json::from_str(&body).context(ParsingFailed { url })?;
        token.expires_at = Some(datetime_to_timestamp(token.expires_in));

        info!(expires_in = token.expires_in, "Obtained access token");
        Ok(token)
    }

    async fn profile(&self, access_token: &str) -> SpotifyResult<UserProfile> {
        let url = self.profile_url.as_str();
        debug!(url, "Fetching profile");

        let response = surf::get(url)
            .set_header("Authorization", format!("Bearer {}", access_token))
            .await
            .context(RequestFailed { url })?;

        let body = read_body(url, response).await?;
        serde_json::from_str(&body).context(ParsingFailed { url })
    }

    async fn guest_token(&self, base_url: &Url) -> SpotifyResult<String> {
        let endpoint = base_url.join(GUEST_TOKEN_PATH).context(InvalidUrl {
            url: base_url.as_str(),
        })?;
        let url = endpoint.as_str();
        debug!(url, "Fetching guest token");

        let response = surf::get(url).await.context(RequestFailed { url })?;

        let body = read_body(url, response).await?;
        let token: SpotifyToken = serde_json::from_str(&body).context(ParsingFailed { url })?;
        Ok(token.access_token)
    }

    async fn recommendations(&self, endpoint: &Url, access_token: &str) -> SpotifyResult<String> {
        let url = endpoint.as_str();
        debug!(url, "Fetching recommendations");

        let response = surf::get(url)
            .set_header("Access-Token", access_token)
            .await
            .context(RequestFailed { url })?;

        read_body(url, response).await
    }
}

impl Remote for SurfRemote {
    fn exchange_code<'a>(&'a self, request: &'a TokenRequest) -> RemoteFuture<'a, SpotifyToken> {
        Box::pin(self.exchange(request))
    }

    fn fetch_profile<'a>(&'a self, access_token: &'a str) -> RemoteFuture<'a, UserProfile> {
        Box::pin(self.profile(access_token))
    }

    fn fetch_guest_token<'a>(&'a self, base_url: &'a Url) -> RemoteFuture<'a, String> {
        Box::pin(self.guest_token(base_url))
    }

    fn fetch_recommendations<'a>(
        &'a self,
        endpoint: &'a Url,
        access_token: &'a str,
    ) -> RemoteFuture<'a, String> {
        Box::pin(self.recommendations(endpoint, access_token))
    }
}
