//! The page controller.
//!
//! A [`Page`] owns everything the browser page does: it reads the redirect URL, exchanges the
//! authorization code, loads the profile and forwards form submissions to the backend. The
//! document itself is abstracted by [`PageView`], so the same flow drives a DOM, a terminal or a
//! test recorder.

use snafu::OptionExt;
use tracing::{debug, info, warn};
use url::Url;

use std::str::FromStr;

use crate::api::Remote;
use crate::auth::{
    generate_code_challenge, generate_code_verifier, SpotifyAuth, SpotifyCallback, TokenRequest,
    CODE_VERIFIER_LENGTH,
};
use crate::config::ClientConfig;
use crate::error::{MissingToken, MissingVerifier, SpotifyResult};
use crate::form::{Coordinates, FormInput};
use crate::profile::UserProfile;
use crate::render::{render_profile, BUSY_PLACEHOLDER};
use crate::session::{SessionStore, ACCESS_TOKEN_KEY, VERIFIER_KEY};

/// The parts of the document the controller writes to.
pub trait PageView {
    fn alert(&mut self, message: &str);

    /// Prefill the latitude and longitude fields.
    fn set_coordinates(&mut self, latitude: &str, longitude: &str);

    fn set_profile_html(&mut self, html: &str);

    fn set_recommendations_html(&mut self, html: &str);

    fn set_submit_enabled(&mut self, enabled: bool);

    /// Send the user to another location, e.g. the authorization page.
    fn redirect(&mut self, url: &Url);
}

/// Source of the user's current position.
pub trait Geolocator {
    fn current_position(&self) -> Option<Coordinates>;
}

/// Geolocation is unavailable or was denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl Geolocator for NoLocation {
    fn current_position(&self) -> Option<Coordinates> {
        None
    }
}

/// A position known upfront, or none at all.
impl Geolocator for Option<Coordinates> {
    fn current_position(&self) -> Option<Coordinates> {
        *self
    }
}

pub struct Page<R, S, V> {
    config: ClientConfig,
    location: SpotifyCallback,
    remote: R,
    store: S,
    view: V,
    access_token: Option<String>,
    profile: Option<UserProfile>,
}

impl<R, S, V> Page<R, S, V>
where
    R: Remote,
    S: SessionStore,
    V: PageView,
{
    /// Open the page at ``location``. A token already in the session store is picked up here.
    pub fn new(
        config: ClientConfig,
        location: &str,
        remote: R,
        store: S,
        view: V,
    ) -> SpotifyResult<Self> {
        let location = SpotifyCallback::from_str(location)?;
        let access_token = store.get(ACCESS_TOKEN_KEY);

        Ok(Self {
            config,
            location,
            remote,
            store,
            view,
            access_token,
            profile: None,
        })
    }

    /// Run the load sequence: geolocation, notice, code exchange and profile.
    pub async fn load<G: Geolocator>(&mut self, geolocator: &G) -> SpotifyResult<()> {
        if let Some(position) = geolocator.current_position() {
            let (latitude, longitude) = position.form_values();
            self.view.set_coordinates(&latitude, &longitude);
        }

        if let Some(notice) = &self.config.notice {
            self.view.alert(notice);
        }

        if let Some(error) = self.location.error() {
            warn!(error, "Spotify authorization was not granted");
        }

        if let Some(code) = self.location.code().map(str::to_owned) {
            let code_verifier = self.store.get(VERIFIER_KEY).context(MissingVerifier)?;
            let request = TokenRequest {
                client_id: self.config.client_id.clone(),
                code,
                redirect_uri: self.location.base_url().clone(),
                code_verifier,
            };

            let token = self.remote.exchange_code(&request).await?;
            self.store.set(ACCESS_TOKEN_KEY, &token.access_token)?;
            self.store.remove(VERIFIER_KEY)?;
            self.access_token = Some(token.access_token);
        }

        if let Some(access_token) = &self.access_token {
            let profile = self.remote.fetch_profile(access_token).await?;
            info!(user = %profile.id, "Loaded profile");

            self.view.set_submit_enabled(true);
            self.view.set_profile_html(&render_profile(Some(&profile)));
            self.profile = Some(profile);
        } else {
            debug!("No access token, staying logged out");
        }

        Ok(())
    }

    /// Start the authorization flow and return the URL the view was redirected to.
    pub fn login(&mut self) -> SpotifyResult<Url> {
        let verifier = generate_code_verifier(CODE_VERIFIER_LENGTH);
        let challenge = generate_code_challenge(&verifier);
        self.store.set(VERIFIER_KEY, &verifier)?;

        let url = SpotifyAuth::new(
            self.config.client_id.clone(),
            self.location.base_url().clone(),
            self.config.scopes.clone(),
            challenge,
        )
        .authorize_url()?;

        info!("Redirecting to Spotify authorization");
        self.view.redirect(&url);
        Ok(url)
    }

    /// Continue as guest with a backend issued token. The token is not written to the session.
    pub async fn guest_login(&mut self) -> SpotifyResult<()> {
        let access_token = self
            .remote
            .fetch_guest_token(self.location.base_url())
            .await?;
        info!("Logged in as guest");

        self.access_token = Some(access_token);
        self.profile = None;
        self.view.set_submit_enabled(true);
        self.view.set_profile_html(&render_profile(None));
        Ok(())
    }

    /// Submit the form and render the returned fragment.
    pub async fn submit(&mut self, input: &FormInput) -> SpotifyResult<()> {
        let access_token = self.access_token.as_deref().context(MissingToken)?;
        self.view.set_recommendations_html(BUSY_PLACEHOLDER);

        let query = input.to_query();
        debug!(genres = query.genres.len(), "Submitting recommendations form");
        let endpoint = query.endpoint(self.location.base_url())?;

        let fragment = self
            .remote
            .fetch_recommendations(&endpoint, access_token)
            .await?;
        self.view.set_recommendations_html(&fragment);
        Ok(())
    }

    /// Drop the stored access token, e.g. after it was rejected as expired.
    pub fn forget_token(&mut self) -> SpotifyResult<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.access_token = None;
        self.profile = None;
        Ok(())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RemoteFuture;
    use crate::auth::SpotifyToken;
    use crate::error::SpotifyError;
    use crate::profile::Image;
    use crate::session::MemoryStore;

    use std::cell::RefCell;

    fn ready<'a, T: 'a>(value: T) -> RemoteFuture<'a, T> {
        let result: SpotifyResult<T> = Ok(value);
        Box::pin(async move { result })
    }

    #[derive(Default)]
    struct FakeRemote {
        calls: RefCell<Vec<String>>,
        exchanged: RefCell<Option<TokenRequest>>,
    }

    impl Remote for FakeRemote {
        fn exchange_code<'a>(
            &'a self,
            request: &'a TokenRequest,
        ) -> RemoteFuture<'a, SpotifyToken> {
            self.calls.borrow_mut().push("exchange".to_string());
            *self.exchanged.borrow_mut() = Some(request.clone());
            ready(SpotifyToken {
                access_token: format!("token-for-{}", request.code),
                token_type: "Bearer".to_string(),
                scope: vec![],
                expires_in: 3600,
                expires_at: None,
                refresh_token: None,
            })
        }

        fn fetch_profile<'a>(&'a self, access_token: &'a str) -> RemoteFuture<'a, UserProfile> {
            self.calls.borrow_mut().push(format!("profile {}", access_token));
            ready(UserProfile {
                id: "wizzler".to_string(),
                display_name: Some("JM Wizzler".to_string()),
                email: None,
                country: None,
                product: None,
                images: vec![Image {
                    url: "https://i.scdn.co/image/ab67".to_string(),
                    width: Some(64),
                    height: Some(64),
                }],
            })
        }

        fn fetch_guest_token<'a>(&'a self, base_url: &'a Url) -> RemoteFuture<'a, String> {
            self.calls.borrow_mut().push(format!("guest {}", base_url));
            ready("guest-token".to_string())
        }

        fn fetch_recommendations<'a>(
            &'a self,
            endpoint: &'a Url,
            access_token: &'a str,
        ) -> RemoteFuture<'a, String> {
            self.calls
                .borrow_mut()
                .push(format!("recommendations {} {}", endpoint, access_token));
            ready("<ul><li>Track</li></ul>".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        alerts: Vec<String>,
        coordinates: Option<(String, String)>,
        profile_html: Option<String>,
        recommendations_html: Vec<String>,
        submit_enabled: bool,
        redirected_to: Option<Url>,
    }

    impl PageView for RecordingView {
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn set_coordinates(&mut self, latitude: &str, longitude: &str) {
            self.coordinates = Some((latitude.to_string(), longitude.to_string()));
        }

        fn set_profile_html(&mut self, html: &str) {
            self.profile_html = Some(html.to_string());
        }

        fn set_recommendations_html(&mut self, html: &str) {
            self.recommendations_html.push(html.to_string());
        }

        fn set_submit_enabled(&mut self, enabled: bool) {
            self.submit_enabled = enabled;
        }

        fn redirect(&mut self, url: &Url) {
            self.redirected_to = Some(url.clone());
        }
    }

    type TestPage = Page<FakeRemote, MemoryStore, RecordingView>;

    fn config() -> ClientConfig {
        ClientConfig::new("9bef3c4a".to_string(), "http://localhost:8000/").unwrap()
    }

    fn page(location: &str, store: MemoryStore) -> TestPage {
        Page::new(
            config(),
            location,
            FakeRemote::default(),
            store,
            RecordingView::default(),
        )
        .unwrap()
    }

    fn calls(page: &TestPage) -> Vec<String> {
        page.remote.calls.borrow().clone()
    }

    #[async_std::test]
    async fn test_plain_load_stays_logged_out() {
        let mut page = page("http://localhost:8000/", MemoryStore::new());
        page.load(&NoLocation).await.unwrap();

        assert!(!page.is_logged_in());
        assert!(calls(&page).is_empty());
        assert!(!page.view().submit_enabled);
        assert_eq!(page.view().profile_html, None);
        assert_eq!(page.view().alerts.len(), 1);
    }

    #[async_std::test]
    async fn test_load_prefills_coordinates() {
        let mut page = page("http://localhost:8000/", MemoryStore::new());
        let position = Some(Coordinates {
            latitude: 52.5,
            longitude: 13.4,
        });
        page.load(&position).await.unwrap();

        assert_eq!(
            page.view().coordinates,
            Some(("52.5°".to_string(), "13.4°".to_string()))
        );
    }

    #[async_std::test]
    async fn test_login_then_callback_exchanges_code() {
        let mut first = page("http://localhost:8000/", MemoryStore::new());
        let url = first.login().unwrap();
        assert_eq!(first.view().redirected_to.as_ref(), Some(&url));

        let store = first.store().clone();
        let verifier = store.get(VERIFIER_KEY).unwrap();
        let challenge = url
            .query_pairs()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(challenge, generate_code_challenge(&verifier));

        let mut page = page("http://localhost:8000/?code=AQD0yXvFEOvw", store);
        page.load(&NoLocation).await.unwrap();

        let request = page.remote.exchanged.borrow().clone().unwrap();
        assert_eq!(request.code, "AQD0yXvFEOvw");
        assert_eq!(request.code_verifier, verifier);
        assert_eq!(request.redirect_uri.as_str(), "http://localhost:8000/");
        assert_eq!(page.store().get(VERIFIER_KEY), None);

        assert_eq!(
            page.store().get(ACCESS_TOKEN_KEY).as_deref(),
            Some("token-for-AQD0yXvFEOvw")
        );
        assert_eq!(
            calls(&page),
            vec!["exchange", "profile token-for-AQD0yXvFEOvw"]
        );
        assert!(page.view().submit_enabled);
        assert!(page
            .view()
            .profile_html
            .as_deref()
            .unwrap()
            .contains("<span>JM Wizzler</span><img"));
        assert_eq!(page.profile().map(UserProfile::name), Some("JM Wizzler"));
    }

    #[async_std::test]
    async fn test_stored_token_skips_exchange() {
        let mut store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "stored").unwrap();

        let mut page = page("http://localhost:8000/", store);
        page.load(&NoLocation).await.unwrap();

        assert_eq!(calls(&page), vec!["profile stored"]);
        assert!(page.view().submit_enabled);
    }

    #[test]
    fn test_forget_token_clears_session() {
        let mut store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "expired").unwrap();
        let mut page = page("http://localhost:8000/", store);
        assert!(page.is_logged_in());

        page.forget_token().unwrap();

        assert!(!page.is_logged_in());
        assert_eq!(page.store().get(ACCESS_TOKEN_KEY), None);
    }

    #[async_std::test]
    async fn test_code_without_verifier_fails() {
        let mut page = page("http://localhost:8000/?code=abc", MemoryStore::new());

        match page.load(&NoLocation).await {
            Err(SpotifyError::MissingVerifier) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(calls(&page).is_empty());
    }

    #[async_std::test]
    async fn test_guest_login_renders_guest_profile() {
        let mut page = page("http://localhost:8000/", MemoryStore::new());
        page.guest_login().await.unwrap();

        assert!(page.is_logged_in());
        assert!(page.view().submit_enabled);
        assert!(page
            .view()
            .profile_html
            .as_deref()
            .unwrap()
            .contains("<span>guest</span>"));
        assert_eq!(page.store().get(ACCESS_TOKEN_KEY), None);
        assert_eq!(calls(&page), vec!["guest http://localhost:8000/"]);
    }

    #[async_std::test]
    async fn test_submit_renders_fragment() {
        let mut store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "stored").unwrap();
        let mut page = page("http://localhost:8000/", store);

        page.submit(&FormInput::new("52.23°", "21.01°", "rock, pop"))
            .await
            .unwrap();

        assert_eq!(
            calls(&page),
            vec!["recommendations http://localhost:8000/api/weather_recommendations?latitude=52.23&longitude=21.01&genres=rock%2Cpop stored"]
        );
        assert_eq!(
            page.view().recommendations_html,
            vec![BUSY_PLACEHOLDER, "<ul><li>Track</li></ul>"]
        );
    }

    #[async_std::test]
    async fn test_submit_requires_token() {
        let mut page = page("http://localhost:8000/", MemoryStore::new());

        match page.submit(&FormInput::default()).await {
            Err(SpotifyError::MissingToken) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(page.view().recommendations_html.is_empty());
    }
}
