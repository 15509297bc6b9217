//! Setup and host configuration.
//!
//! Everything the serving layer supplies at session-setup time is validated
//! once, up front, into explicit structs. The pure encoding functions take
//! these by reference; nothing in the engine reads environment variables or
//! other ambient state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// Element the injected payload attaches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parent {
    /// Attach to `<body>`
    #[default]
    Body,
    /// Attach to `<head>`
    Head,
}

impl Parent {
    /// Lowercase name as it appears in markup and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Parent::Body => "body",
            Parent::Head => "head",
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "body" => Ok(Parent::Body),
            "head" => Ok(Parent::Head),
            other => Err(Error::config(format!(
                "parent must be either 'body' or 'head', got {other:?}"
            ))),
        }
    }
}

/// Browser compatibility target for generated pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    /// Rules compatible with every supported browser
    #[default]
    All,
    /// Chrome / Chromium
    Chrome,
    /// Firefox
    Firefox,
    /// Safari / WebKit
    Safari,
}

impl Browser {
    /// Lowercase name as it appears in config files and contexts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::All => "all",
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Browser::All),
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "safari" => Ok(Browser::Safari),
            other => Err(Error::config(format!(
                "browser must be one of all, chrome, firefox, safari, got {other:?}"
            ))),
        }
    }
}

/// Per-leak setup parameters, immutable once a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakSetup {
    /// CSS selector for the target element
    pub selector: String,
    /// Element the payload attaches to
    pub parent: Parent,
    /// Candidate characters for every leaked position
    pub alphabet: Alphabet,
    /// Timeout in seconds for follow-up resource imports
    pub timeout: u64,
    /// Known prefix of the target text
    pub prefix: String,
    /// Drop out-of-alphabet observations instead of failing
    pub strip: bool,
    /// Maximum number of characters to recover
    pub length: usize,
    /// Browser compatibility target
    pub browser: Browser,
}

impl Default for LeakSetup {
    fn default() -> Self {
        Self {
            selector: "script:first-of-type".into(),
            parent: Parent::Body,
            alphabet: Alphabet::default(),
            timeout: 10,
            prefix: String::new(),
            strip: true,
            length: 100,
            browser: Browser::All,
        }
    }
}

impl LeakSetup {
    /// Validate field constraints that the type system cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.selector.is_empty() {
            return Err(Error::config("selector cannot be empty"));
        }
        if self.length == 0 {
            return Err(Error::config("length must be at least 1"));
        }
        if self.timeout == 0 {
            return Err(Error::config("timeout must be at least 1 second"));
        }
        if self.prefix.len() > self.length {
            return Err(Error::config(format!(
                "prefix of {} characters exceeds target length {}",
                self.prefix.len(),
                self.length
            )));
        }
        Ok(())
    }
}

/// Host endpoints for generated pages and leak beacons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL where the application is accessible
    pub host: String,
    /// Base URL leak beacons hit. Kept separate so beacon fetches do not
    /// exhaust the page host's per-origin connection limit.
    pub host_leak: String,
}

impl Settings {
    /// Validate and normalize the two base URLs.
    pub fn new(host: impl Into<String>, host_leak: impl Into<String>) -> Result<Self> {
        Ok(Self {
            host: normalize_host(&host.into())?,
            host_leak: normalize_host(&host_leak.into())?,
        })
    }

    /// Read `BASE_URL` / `BASE_LEAK_URL` from the environment, with the leak
    /// host defaulting to the page host. Called once at process start; the
    /// engine itself never touches the environment.
    pub fn from_env() -> Result<Self> {
        let host =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:4242".to_string());
        let host_leak = std::env::var("BASE_LEAK_URL").unwrap_or_else(|_| host.clone());
        Self::new(host, host_leak)
    }
}

fn normalize_host(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::config(format!("invalid host URL {trimmed:?}: {e}")))?;
    if !parsed.has_host() {
        return Err(Error::config(format!(
            "host URL {trimmed:?} must contain a network location"
        )));
    }
    Ok(trimmed.to_string())
}

/// On-disk configuration format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Base URL where the application is accessible
    pub host: String,
    /// Base URL for leak beacons; defaults to `host`
    #[serde(default)]
    pub host_leak: Option<String>,
    /// Leak setup parameters
    #[serde(default)]
    pub setup: LeakSetup,
}

impl ConfigFile {
    /// Convert to validated runtime configuration.
    pub fn to_parts(&self) -> Result<(Settings, LeakSetup)> {
        let host_leak = self.host_leak.clone().unwrap_or_else(|| self.host.clone());
        let settings = Settings::new(self.host.clone(), host_leak)?;
        self.setup.validate()?;
        Ok((settings, self.setup.clone()))
    }

    /// Build the file form of a runtime configuration.
    pub fn from_parts(settings: &Settings, setup: &LeakSetup) -> Self {
        Self {
            host: settings.host.clone(),
            host_leak: Some(settings.host_leak.clone()),
            setup: setup.clone(),
        }
    }
}
