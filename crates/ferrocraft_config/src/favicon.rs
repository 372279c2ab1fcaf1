//! Status-response favicon: `favicon.png` rendered as a base64 data URI.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

/// Vanilla refuses icons past 8 KiB.
pub const FAVICON_MAX_BYTES: usize = 8 * 1024;

/// Loads the favicon as `data:image/png;base64,<...>`. A missing or
/// unreadable file is silently absent; an oversized one is dropped with a
/// warning.
#[must_use]
pub fn load_favicon(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            debug!("[CONFIG] No favicon at {}: {}", path.display(), err);
            return None;
        }
    };

    if data.len() > FAVICON_MAX_BYTES {
        warn!(
            "[CONFIG] Favicon {} is {} bytes (limit {}), ignoring",
            path.display(),
            data.len(),
            FAVICON_MAX_BYTES
        );
        return None;
    }

    let mut uri = String::from("data:image/png;base64,");
    STANDARD.encode_string(&data, &mut uri);
    Some(uri)
}
