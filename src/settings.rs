//! Stored extension settings and the ping check that guards saving them.
//!
//! The options page keeps `api_url`, `api_username`, `api_key` and
//! `cache_content` in storage. New values should only be stored once the
//! server answers a ping with them; [`check_connection`] performs that check.

use crate::client::{ApiClient, Credentials};
use crate::dispatch::CallbackSet;
use crate::route::Route;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::{Arc, Mutex};

/// The persisted options record.
///
/// `cache_content` was historically stored as the strings `"true"` and
/// `"false"`; both that form and a JSON boolean are accepted.
///
/// # Examples
///
/// ```
/// use bookie_client::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{
///     "api_url": "https://bookie.example.com/api/v1",
///     "api_username": "alice",
///     "api_key": "a1b2c3",
///     "cache_content": "true"
/// }"#).unwrap();
///
/// assert!(settings.cache_content);
/// assert_eq!(settings.credentials().username, "alice");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API root URL.
    pub api_url: String,
    /// Account name.
    pub api_username: String,
    /// API key, possibly empty.
    #[serde(default)]
    pub api_key: String,
    /// Whether page content should be sent along with bookmarks.
    #[serde(default, deserialize_with = "bool_or_string")]
    pub cache_content: bool,
}

impl Settings {
    /// The credentials these settings describe.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_url, &self.api_username, &self.api_key)
    }
}

impl From<&Settings> for Credentials {
    fn from(settings: &Settings) -> Self {
        settings.credentials()
    }
}

fn bool_or_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s == "true",
    })
}

/// Result of pinging the server with a set of settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCheck {
    /// The server answered with `success: true`.
    Verified,
    /// The server answered, but not with success, or could not be reached.
    Rejected {
        /// The server's message, or the status text when it sent none.
        message: String,
    },
}

impl ConnectionCheck {
    /// Returns `true` for [`ConnectionCheck::Verified`].
    pub fn is_verified(&self) -> bool {
        matches!(self, ConnectionCheck::Verified)
    }
}

/// Pings the server with `settings` and reports whether they work.
///
/// # Errors
///
/// Returns an error if a ping client cannot be built from the settings
/// (empty URL or username). Server-side rejection is a
/// [`ConnectionCheck::Rejected`], not an error.
pub async fn check_connection(settings: &Settings) -> Result<ConnectionCheck> {
    let client = ApiClient::builder()
        .credentials(settings.credentials())
        .route(Route::ping())
        .build()?;

    let outcome = Arc::new(Mutex::new(None));
    let on_success = Arc::clone(&outcome);
    let on_error = Arc::clone(&outcome);

    let callbacks = CallbackSet::new()
        .on_success(move |data, _raw, _ctx| {
            let check = if data.success() == Some(true) {
                ConnectionCheck::Verified
            } else {
                ConnectionCheck::Rejected {
                    message: data.message().unwrap_or_default().to_string(),
                }
            };
            store(&on_success, check);
        })
        .on_error(move |data, status_text, _raw, _ctx| {
            let message = data
                .message()
                .filter(|m| !m.is_empty())
                .unwrap_or(status_text)
                .to_string();
            store(&on_error, ConnectionCheck::Rejected { message });
        });

    client.call(callbacks).await?;

    let check = lock(&outcome).take();
    Ok(check.unwrap_or_else(|| ConnectionCheck::Rejected {
        message: "no response".to_string(),
    }))
}

fn store(slot: &Mutex<Option<ConnectionCheck>>, check: ConnectionCheck) {
    if !check.is_verified() {
        tracing::warn!(?check, "Ping with new settings was rejected");
    }
    *lock(slot) = Some(check);
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
