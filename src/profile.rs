//! The current user's profile as returned by ``GET /v1/me``.

use serde::{Deserialize, Serialize};

pub const SPOTIFY_PROFILE_URL: &str = "https://api.spotify.com/v1/me";

/// An image descriptor. Spotify sends ``null`` dimensions for images of unknown size.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// The Spotify user profile.
///
/// # Example
///
/// ```
/// use weather_tunes::UserProfile;
///
/// let profile: UserProfile = serde_json::from_str(r#"{"id": "wizzler", "display_name": null, "images": []}"#).unwrap();
/// assert_eq!(profile.name(), "wizzler");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl UserProfile {
    /// The name shown on the page, falling back to the user id.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn first_image(&self) -> Option<&Image> {
        self.images.first()
    }
}
