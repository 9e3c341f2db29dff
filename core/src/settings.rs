//! Credentials and fixtures used by the scenario runner.
//!
//! Values come from environment variables, with a `.env` file in the working
//! directory (or any parent) filling in whatever the process environment does
//! not set. `Settings::from_lookup` takes any lookup function so tests can
//! supply values without touching the process environment.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ApiError;
use crate::types::{AuthKey, Credentials, Photo};

pub const BASE_URL_VAR: &str = "PETFRIENDS_BASE_URL";
pub const EMAIL_VAR: &str = "PETFRIENDS_EMAIL";
pub const PASSWORD_VAR: &str = "PETFRIENDS_PASSWORD";
pub const INVALID_EMAIL_VAR: &str = "PETFRIENDS_INVALID_EMAIL";
pub const INVALID_PASSWORD_VAR: &str = "PETFRIENDS_INVALID_PASSWORD";
pub const INVALID_AUTH_KEY_VAR: &str = "PETFRIENDS_INVALID_AUTH_KEY";
pub const PHOTO_VAR: &str = "PETFRIENDS_PHOTO";

const DEFAULT_INVALID_EMAIL: &str = "nobody@invalid.example";
const DEFAULT_INVALID_PASSWORD: &str = "not-the-password";
const DEFAULT_INVALID_AUTH_KEY: &str = "0000000000000000000000000000000000000000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("cannot read settings file {path}: {message}")]
    File { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub valid: Credentials,
    pub invalid_email: String,
    pub invalid_password: String,
    pub invalid_auth_key: AuthKey,
    /// Image uploaded by the photo scenarios; `None` uses the bundled fixture.
    pub photo: Option<PathBuf>,
}

impl Settings {
    /// Load a `.env` file if there is one, then read the process environment.
    /// Variables already set in the environment win over the file.
    pub fn from_env() -> Result<Self, SettingsError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(SettingsError::File {
                    path: PathBuf::from(".env"),
                    message: e.to_string(),
                })
            }
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings from a dotenv-style file only, ignoring the process
    /// environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let file_error = |e: dotenvy::Error| SettingsError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(file_error)? {
            let (name, value) = item.map_err(file_error)?;
            values.insert(name, value);
        }
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.is_empty());
        let or = |name: &'static str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let email = get(EMAIL_VAR).ok_or(SettingsError::Missing(EMAIL_VAR))?;
        let password = get(PASSWORD_VAR).ok_or(SettingsError::Missing(PASSWORD_VAR))?;

        Ok(Self {
            base_url: or(BASE_URL_VAR, DEFAULT_BASE_URL),
            valid: Credentials::new(email, password),
            invalid_email: or(INVALID_EMAIL_VAR, DEFAULT_INVALID_EMAIL),
            invalid_password: or(INVALID_PASSWORD_VAR, DEFAULT_INVALID_PASSWORD),
            invalid_auth_key: AuthKey::new(or(INVALID_AUTH_KEY_VAR, DEFAULT_INVALID_AUTH_KEY)),
            photo: get(PHOTO_VAR).map(PathBuf::from),
        })
    }

    /// Settings for a local replica: valid credentials given, the rest default.
    pub fn for_local(base_url: &str, valid: Credentials) -> Self {
        Self {
            base_url: base_url.to_string(),
            valid,
            invalid_email: DEFAULT_INVALID_EMAIL.to_string(),
            invalid_password: DEFAULT_INVALID_PASSWORD.to_string(),
            invalid_auth_key: AuthKey::new(DEFAULT_INVALID_AUTH_KEY),
            photo: None,
        }
    }

    /// The configured photo, or the fixture compiled into the crate.
    pub fn load_photo(&self) -> Result<Photo, ApiError> {
        match &self.photo {
            Some(path) => Photo::from_path(path),
            None => Ok(Photo::bundled()),
        }
    }
}
