use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;
use weather_tunes::session::FileStore;
use weather_tunes::{ClientConfig, FormInput, NoLocation, Page, PageView, SurfRemote};

use std::error::Error;
use std::io::{stdin, stdout, Write};

const SESSION_FILE: &str = ".session.json";

/// Prints every write the page makes to the terminal.
struct ConsoleView;

impl PageView for ConsoleView {
    fn alert(&mut self, message: &str) {
        println!("! {}", message);
    }

    fn set_coordinates(&mut self, latitude: &str, longitude: &str) {
        println!("Location: {} {}", latitude, longitude);
    }

    fn set_profile_html(&mut self, html: &str) {
        println!("Profile:\n{}", html);
    }

    fn set_recommendations_html(&mut self, html: &str) {
        println!("Recommendations:\n{}", html);
    }

    fn set_submit_enabled(&mut self, _enabled: bool) {}

    fn redirect(&mut self, url: &Url) {
        // Open the auth URL in the default browser of the user.
        if let Err(e) = open::that(url.as_str()) {
            warn!(error = %e, "Could not open a browser");
        }
        println!("Continue at: {}", url);
    }
}

fn prompt(label: &str) -> Result<String, Box<dyn Error + Send + Sync + 'static>> {
    print!("{}: ", label);
    stdout().flush()?;

    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

type ConsolePage = Page<SurfRemote, FileStore, ConsoleView>;

fn open_page(config: &ClientConfig, location: &str) -> Result<ConsolePage, Box<dyn Error + Send + Sync + 'static>> {
    let page = Page::new(
        config.clone(),
        location,
        SurfRemote::new()?,
        FileStore::open(SESSION_FILE)?,
        ConsoleView,
    )?;
    Ok(page)
}

#[async_std::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    let location = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.base_url.to_string());

    let mut page = open_page(&config, &location)?;
    if let Err(e) = page.load(&NoLocation).await {
        // Most likely an expired token left over from an earlier run.
        warn!(error = %e, "Load failed, starting a new session");
        page.forget_token()?;
    }

    if !page.is_logged_in() {
        match prompt("[l]ogin with Spotify or continue as [g]uest")?.as_str() {
            "g" | "guest" => page.guest_login().await?,
            _ => {
                page.login()?;

                // The browser lands back on the page with the code attached.
                let callback = prompt("Input callback URL")?;
                page = open_page(&config, &callback)?;
                page.load(&NoLocation).await?;
            }
        }
    }

    let input = FormInput::new(
        prompt("Latitude")?,
        prompt("Longitude")?,
        prompt("Genres (comma separated)")?,
    );
    page.submit(&input).await?;

    Ok(())
}
