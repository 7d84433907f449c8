//! Scraping the public API token out of the fast.com web app.
//!
//! The landing page references a single script bundle, and that bundle
//! embeds the token as `token:"..."`.

use crate::errors::SpeedTestError;
use crate::fast::client::Client;
use crate::fast::requests::{Host, Request};
use log::debug;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static SCRIPT_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)
        .expect("script src pattern is valid")
});

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"token:\s*"([^"]+)""#).expect("token pattern is valid")
});

pub(crate) struct LandingPage {}

impl Request for LandingPage {
    type Response = String;

    const HOST: Host = Host::Web;

    fn endpoint(&self) -> Cow<'_, str> {
        "/".into()
    }
}

pub(crate) struct ScriptBundle {
    pub src: String,
}

impl Request for ScriptBundle {
    type Response = String;

    const HOST: Host = Host::Web;

    fn endpoint(&self) -> Cow<'_, str> {
        self.src.as_str().into()
    }
}

/// Fetch a fresh API token from the fast.com web app.
pub async fn fetch_token(client: &Client) -> Result<String, SpeedTestError> {
    let html = client.send(LandingPage {}).await?;
    let src = script_name(&html)?;
    debug!("Found script bundle {}", src);

    let script = client.send(ScriptBundle { src }).await?;

    extract_token(&script)
}

pub(crate) fn script_name(html: &str) -> Result<String, SpeedTestError> {
    SCRIPT_SRC
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|src| src.as_str().to_string())
        .ok_or_else(|| {
            SpeedTestError::token(
                "no src attribute found within the script tag",
            )
        })
}

pub(crate) fn extract_token(script: &str) -> Result<String, SpeedTestError> {
    TOKEN
        .captures(script)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or_else(|| {
            SpeedTestError::token("token not found in the fast.com script")
        })
}
