//! Backend credential loading.
//!
//! The seeder reads a dotenv-style file at startup, preferring the
//! seeder-specific `.env.seeder` over a generic `.env`, and resolves the
//! backend URL plus one of the two supported API key flavours into a
//! [`BackendConfig`].

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use tracing::debug;

use crate::curso::seeder::error::{Result, SeedError};

/// Environment variable naming the backend project URL.
pub const URL_VAR: &str = "SUPABASE_URL";

/// Dotenv files consulted at startup, in preference order. Only the first
/// one that exists is loaded.
const ENV_FILES: [&str; 2] = [".env.seeder", ".env"];

/// The API key flavours the backend accepts, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Full-privilege key intended for server-side tooling.
    ServiceRole,
    /// Public key restricted by row-level security.
    Anon,
}

impl KeyKind {
    /// Environment variable carrying this key flavour.
    pub const fn env_var(self) -> &'static str {
        match self {
            KeyKind::ServiceRole => "SUPABASE_SERVICE_ROLE_KEY",
            KeyKind::Anon => "SUPABASE_ANON_KEY",
        }
    }
}

/// Connection settings for the hosted backend, resolved once at startup.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL, without the `/rest/v1` suffix.
    pub url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Which key flavour supplied [`BackendConfig::api_key`].
    pub key_kind: KeyKind,
}

impl BackendConfig {
    /// Loads the configuration from the process environment, reading the
    /// preferred dotenv file first.
    pub fn from_env() -> Result<Self> {
        load_env_file();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration through the provided variable lookup.
    ///
    /// Empty values count as unset. The service-role key wins over the
    /// anonymous key when both are present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).filter(|value| !value.is_empty());
        let key = [KeyKind::ServiceRole, KeyKind::Anon]
            .into_iter()
            .find_map(|kind| {
                lookup(kind.env_var())
                    .filter(|value| !value.is_empty())
                    .map(|api_key| (api_key, kind))
            });

        match (url, key) {
            (Some(url), Some((api_key, key_kind))) => Ok(Self {
                url,
                api_key,
                key_kind,
            }),
            _ => Err(SeedError::Config(format!(
                "{URL_VAR} and {} (or {}) must be set; check .env.seeder",
                KeyKind::ServiceRole.env_var(),
                KeyKind::Anon.env_var(),
            ))),
        }
    }

    /// Role claim embedded in the API key, when the key is a readable JWT.
    pub fn key_role(&self) -> Option<String> {
        jwt_role(&self.api_key)
    }
}

/// Loads the first dotenv file that exists, overriding variables already
/// present in the environment.
fn load_env_file() {
    for file in ENV_FILES {
        if Path::new(file).exists() {
            if let Err(error) = dotenvy::from_filename_override(file) {
                debug!(file, %error, "could not load dotenv file");
            }
            break;
        }
    }
}

/// Extracts the `role` claim from a JWT-shaped key without verifying it.
///
/// Returns `None` for keys that are not three dot-separated base64url
/// segments with a JSON payload.
pub fn jwt_role(key: &str) -> Option<String> {
    let payload = key.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Value = serde_json::from_slice(&decoded).ok()?;
    claims
        .get("role")
        .and_then(Value::as_str)
        .map(str::to_string)
}
