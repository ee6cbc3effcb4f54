//! HTML fragments written into the page.

use crate::profile::UserProfile;

/// Shown in the recommendations section while the backend call is in flight.
pub const BUSY_PLACEHOLDER: &str = r#"<article aria-busy="true"></article>"#;

const GUEST_NAME: &str = "guest";

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn display_name_template(name: &str) -> String {
    format!(
        r#"<span style="color: gray"> Logged in as </span> <span>{}</span>"#,
        html_escape(name)
    )
}

/// Render the profile header, or the guest variant when nobody is logged in.
///
/// # Example
///
/// ```
/// use weather_tunes::render::render_profile;
///
/// assert_eq!(
///     render_profile(None),
///     r#"<h2><span style="color: gray"> Logged in as </span> <span>guest</span></h2>"#
/// );
/// ```
pub fn render_profile(profile: Option<&UserProfile>) -> String {
    let profile = match profile {
        None => return format!("<h2>{}</h2>", display_name_template(GUEST_NAME)),
        Some(p) => p,
    };

    let image = match profile.first_image() {
        Some(image) => format!(
            r#"<img src="{}" style="border-radius: 50%; margin-left: 10px" width="50" height="50"/>"#,
            html_escape(&image.url)
        ),
        None => String::new(),
    };

    format!("<h2>{}{}</h2>", display_name_template(profile.name()), image)
}
