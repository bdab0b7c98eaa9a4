use std::{env, path::Path};

use crate::{errors::Error, Result};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_PAYLOAD_PREVIEW_CHARS: usize = 100;

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Runtime switch for photo scanning; still requires the `qr` feature.
    pub qr_scanning_enabled: bool,
    pub max_image_bytes: usize,
    pub payload_preview_chars: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let qr_scanning_enabled = lookup("QR_SCANNING_ENABLED")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        let max_image_bytes = parse_usize(&lookup, "MAX_IMAGE_BYTES")?
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);
        let payload_preview_chars = parse_usize(&lookup, "PAYLOAD_PREVIEW_CHARS")?
            .unwrap_or(DEFAULT_PAYLOAD_PREVIEW_CHARS);

        if max_image_bytes == 0 {
            return Err(Error::Config(
                "MAX_IMAGE_BYTES must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            telegram_bot_token,
            qr_scanning_enabled,
            max_image_bytes,
            payload_preview_chars,
        })
    }
}

/// Load `path` into the process env without overriding variables already set.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>> {
    let Some(raw) = lookup(key).and_then(non_empty) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|e| Error::Config(format!("{key}: invalid number {raw:?}: {e}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
