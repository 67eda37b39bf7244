use crate::error::{Error, Result};
use ini::{Ini, ParseOption, Properties};
use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_SECTION: &str = "zendesk-cli";

/// Resolved connection details. Where they came from (file or flags) is
/// forgotten once this is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub api_url: Url,
}

fn required<'a>(section: &'a Properties, key: &str, path: &Path) -> Result<&'a str> {
    section.get(key).ok_or_else(|| {
        Error::Config(format!(
            "Missing {} in [{}] section of {}",
            key,
            CONFIG_SECTION,
            path.display()
        ))
    })
}

impl Credentials {
    pub fn default_config_path() -> Result<PathBuf> {
        let path = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not find home directory".into()))?
            .join(".zendesk-cli")
            .join("config.ini");
        Ok(path)
    }

    /// Read credentials from the `[zendesk-cli]` section of an INI file.
    /// Values are taken verbatim: no quote stripping, no backslash escapes.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Could not read {}: {}", path.display(), e))
        })?;
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let file = Ini::load_from_str_opt(&content, options)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
        let section = file.section(Some(CONFIG_SECTION)).ok_or_else(|| {
            Error::Config(format!(
                "Missing [{}] section in {}",
                CONFIG_SECTION,
                path.display()
            ))
        })?;

        Ok(Self {
            user: required(section, "user", path)?.to_string(),
            password: required(section, "password", path)?.to_string(),
            api_url: parse_api_url(required(section, "api_url", path)?)?,
        })
    }

    /// Build credentials from command-line flags, asking for the password.
    /// Both flags are checked before `prompt` runs.
    pub fn from_flags<F>(user: Option<String>, api_url: Option<String>, prompt: F) -> Result<Self>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let user = user
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("Please specify the Zendesk user.".into()))?;
        let api_url = api_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("Please specify the API URL.".into()))?;
        let api_url = parse_api_url(&api_url)?;
        let password = prompt()?;

        Ok(Self {
            user,
            password,
            api_url,
        })
    }

    /// `--config` wins. Without it, the default config file is only used
    /// when neither `--user` nor `--api-url` was given.
    pub fn resolve<F>(
        config: Option<&Path>,
        user: Option<String>,
        api_url: Option<String>,
        prompt: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        if let Some(path) = config {
            return Self::from_file(path);
        }

        if user.is_none()
            && api_url.is_none()
            && let Ok(path) = Self::default_config_path()
            && path.exists()
        {
            debug!(path = %path.display(), "Using default config file");
            return Self::from_file(&path);
        }

        Self::from_flags(user, api_url, prompt)
    }
}

/// Parse the base API URL, making sure it ends in `/` so endpoint paths are
/// appended to it rather than replacing its last segment.
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| Error::Config(format!("Invalid API URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("Invalid API URL {}", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
