//! Authorization Code Flow with PKCE.
//!
//! The flow is split in two halves around the browser redirect: [`SpotifyAuth`] builds the
//! authorization URL from a freshly generated code verifier, and [`TokenRequest`] carries the
//! returned code and the same verifier back to the token endpoint.

use base64::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use snafu::ResultExt;
use strum_macros::{Display, EnumString};
use url::Url;

use std::str::FromStr;

use crate::error::{InvalidUrl, SpotifyResult};
use crate::generate_random_string;

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Length of the generated code verifier. RFC 7636 allows 43 to 128 characters.
pub const CODE_VERIFIER_LENGTH: usize = 128;

/// Generate a code verifier for a new authorization request.
///
/// # Example
///
/// ```
/// use weather_tunes::auth::generate_code_verifier;
///
/// let verifier = generate_code_verifier(128);
/// assert_eq!(verifier.len(), 128);
/// ```
pub fn generate_code_verifier(length: usize) -> String {
    generate_random_string(length)
}

/// Derive the ``S256`` code challenge from a code verifier.
///
/// # Example
///
/// ```
/// use weather_tunes::auth::generate_code_challenge;
///
/// // Test vector from RFC 7636, Appendix B.
/// let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
/// assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
/// ```
pub fn generate_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::encode_config(&digest, URL_SAFE_NO_PAD)
}

/// Spotify Scopes requested by the client.
/// This enum implements FromStr and ToString / Display through strum.
///
/// # Example
///
/// ```
/// use weather_tunes::SpotifyScope;
/// use std::str::FromStr;
///
/// let scope = SpotifyScope::from_str("user-read-private").unwrap();
/// assert_eq!(scope, SpotifyScope::UserReadPrivate);
/// assert_eq!(scope.to_string(), "user-read-private");
/// ```
#[derive(EnumString, Serialize, Deserialize, Display, Debug, Clone, PartialEq)]
pub enum SpotifyScope {
    #[strum(serialize = "user-read-private")]
    UserReadPrivate,
    #[strum(serialize = "user-read-email")]
    UserReadEmail,
    #[strum(serialize = "user-top-read")]
    UserTopRead,
    #[strum(serialize = "user-read-recently-played")]
    UserReadRecentlyPlayed,
    #[strum(serialize = "playlist-modify-private")]
    PlaylistModifyPrivate,
    #[strum(serialize = "streaming")]
    Streaming,
}

/// Scopes needed to read the profile shown on the page.
pub fn default_scopes() -> Vec<SpotifyScope> {
    vec![SpotifyScope::UserReadPrivate, SpotifyScope::UserReadEmail]
}

/// An authorization request for the PKCE flow.
///
/// # Example
///
/// ```
/// use weather_tunes::{SpotifyAuth, SpotifyScope};
/// use url::Url;
///
/// let redirect = Url::parse("http://localhost:8000/").unwrap();
/// let auth = SpotifyAuth::new("client".into(), redirect, vec![SpotifyScope::UserReadPrivate], "challenge".into());
///
/// assert!(auth.authorize_url().unwrap().as_str().contains("code_challenge=challenge"));
/// ```
#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    /// The Spotify Application Client ID
    pub client_id: String,
    /// Where Spotify sends the user after they grant or deny permission.
    pub redirect_uri: Url,
    /// Vec of Spotify Scopes.
    pub scope: Vec<SpotifyScope>,
    /// The ``S256`` challenge of the verifier kept for the token exchange.
    pub code_challenge: String,
}

impl SpotifyAuth {
    pub fn new(
        client_id: String,
        redirect_uri: Url,
        scope: Vec<SpotifyScope>,
        code_challenge: String,
    ) -> Self {
        Self {
            client_id,
            redirect_uri,
            scope,
            code_challenge,
        }
    }

    /// Concatenate the scope vector into a string needed for the authorization URL.
    pub fn scope_into_string(&self) -> String {
        self.scope
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(" ")
    }

    /// Convert the request into the URL the user is redirected to.
    pub fn authorize_url(&self) -> SpotifyResult<Url> {
        let mut url = Url::parse(SPOTIFY_AUTH_URL).context(InvalidUrl {
            url: SPOTIFY_AUTH_URL,
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &self.scope_into_string())
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &self.code_challenge);

        Ok(url)
    }
}

/// The form body posted to the token endpoint to trade a code for a token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRequest {
    pub client_id: String,
    pub code: String,
    pub redirect_uri: Url,
    pub code_verifier: String,
}

impl TokenRequest {
    /// Encode the request as ``application/x-www-form-urlencoded``.
    ///
    /// # Example
    ///
    /// ```
    /// use weather_tunes::TokenRequest;
    /// use url::Url;
    ///
    /// let request = TokenRequest {
    ///     client_id: "client".into(),
    ///     code: "abc".into(),
    ///     redirect_uri: Url::parse("http://localhost:8000/").unwrap(),
    ///     code_verifier: "xyz".into(),
    /// };
    ///
    /// assert_eq!(
    ///     request.form_body(),
    ///     "client_id=client&grant_type=authorization_code&code=abc&redirect_uri=http%3A%2F%2Flocalhost%3A8000%2F&code_verifier=xyz"
    /// );
    /// ```
    pub fn form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", &self.code)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("code_verifier", &self.code_verifier)
            .finish()
    }
}

/// The page URL as seen after the Spotify redirect.
///
/// Unlike a strict callback, every query parameter is optional: a plain page load carries none.
///
/// # Example
///
/// ```
/// use weather_tunes::SpotifyCallback;
/// use std::str::FromStr;
///
/// let callback = SpotifyCallback::from_str("http://localhost:8000/?code=NApCCgBkWtQ").unwrap();
///
/// assert_eq!(callback.code(), Some("NApCCgBkWtQ"));
/// assert_eq!(callback.base_url().as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCallback {
    base_url: Url,
    /// An authorization code that can be exchanged for an access token.
    code: Option<String>,
    /// The reason authorization failed.
    error: Option<String>,
    state: Option<String>,
}

impl FromStr for SpotifyCallback {
    type Err = crate::error::SpotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).context(InvalidUrl { url: s })?;
        Ok(Self::from_url(&url))
    }
}

impl SpotifyCallback {
    pub fn from_url(url: &Url) -> Self {
        let find = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.into_owned())
        };

        let mut base_url = url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);

        Self {
            base_url,
            code: find("code"),
            error: find("error"),
            state: find("state"),
        }
    }

    /// ``origin + pathname`` of the page, used both as redirect URI and backend root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

/// The Spotify Token object returned by the token endpoint.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SpotifyToken {
    /// An access token that can be provided in subsequent calls, for example to Spotify Web API services.
    pub access_token: String,
    /// How the access token may be used.
    pub token_type: String,
    /// A Vec of scopes which have been granted for this ``access_token``.
    #[serde(default, deserialize_with = "deserialize_scope_field")]
    pub scope: Vec<SpotifyScope>,
    /// The time period (in seconds) for which the access token is valid.
    pub expires_in: u32,
    /// The timestamp for which the token will expire at.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Never used by this client, tokens are not refreshed.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Custom parsing function for converting a space separated scope string into SpotifyScope Enums.
/// Scopes this client does not know about are skipped.
fn deserialize_scope_field<'de, D>(de: D) -> Result<Vec<SpotifyScope>, D::Error>
where
    D: Deserializer<'de>,
{
    let result: Value = Deserialize::deserialize(de)?;
    match result {
        Value::String(ref s) => Ok(s
            .split_whitespace()
            .filter_map(|x| SpotifyScope::from_str(x).ok())
            .collect()),
        _ => Ok(vec![]),
    }
}
