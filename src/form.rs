//! The location and genre form submitted to the recommendations backend.

use snafu::ResultExt;
use url::Url;

use crate::error::{InvalidUrl, SpotifyResult};

pub const RECOMMENDATIONS_PATH: &str = "api/weather_recommendations";

const DEGREE: char = '°';

/// A geolocation fix used to prefill the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Format both values the way the form fields display them.
    ///
    /// # Example
    ///
    /// ```
    /// use weather_tunes::Coordinates;
    ///
    /// let coords = Coordinates { latitude: 52.2297, longitude: 21.0122 };
    /// assert_eq!(coords.form_values(), ("52.2297°".to_string(), "21.0122°".to_string()));
    /// ```
    pub fn form_values(&self) -> (String, String) {
        (
            format!("{}{}", self.latitude, DEGREE),
            format!("{}{}", self.longitude, DEGREE),
        )
    }
}

/// Raw values of the form fields as the user left them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub latitude: String,
    pub longitude: String,
    /// Comma separated genre list.
    pub genres: String,
}

impl FormInput {
    pub fn new<S: Into<String>>(latitude: S, longitude: S, genres: S) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            genres: genres.into(),
        }
    }

    /// Strip the degree symbols and split the genre list.
    ///
    /// # Example
    ///
    /// ```
    /// use weather_tunes::FormInput;
    ///
    /// let query = FormInput::new("52.23°", "21.01°", "rock, pop").to_query();
    ///
    /// assert_eq!(query.latitude, "52.23");
    /// assert_eq!(query.genres, vec!["rock", "pop"]);
    /// ```
    pub fn to_query(&self) -> RecommendationQuery {
        RecommendationQuery {
            latitude: strip_degree(&self.latitude),
            longitude: strip_degree(&self.longitude),
            genres: self
                .genres
                .split(',')
                .map(|genre| genre.trim().to_string())
                .collect(),
        }
    }
}

fn strip_degree(value: &str) -> String {
    let value = value.trim();
    value.strip_suffix(DEGREE).unwrap_or(value).trim().to_string()
}

/// The query sent to the recommendations backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub latitude: String,
    pub longitude: String,
    pub genres: Vec<String>,
}

impl RecommendationQuery {
    /// Build ``{base}api/weather_recommendations`` with the query attached.
    pub fn endpoint(&self, base_url: &Url) -> SpotifyResult<Url> {
        let mut url = base_url.join(RECOMMENDATIONS_PATH).context(InvalidUrl {
            url: base_url.as_str(),
        })?;

        url.query_pairs_mut()
            .clear()
            .append_pair("latitude", &self.latitude)
            .append_pair("longitude", &self.longitude)
            .append_pair("genres", &self.genres.join(","));

        Ok(url)
    }
}
