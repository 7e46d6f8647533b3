//! Storage names for uploaded files.

use chrono::Utc;

/// Replace every char outside `[a-zA-Z0-9._-]` with `_`.
///
/// Path separators become `_`, so the result is always a single path component.
pub fn sanitize_file_name(original: &str) -> String {
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `"{now_ms}-{sanitized original}"`. Same-millisecond uploads of the same name collide.
pub fn derive_name(original: &str, now_ms: u64) -> String {
    format!("{}-{}", now_ms, sanitize_file_name(original))
}

pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// URL under which an upload is served back. Absolute when `base` is non-empty.
pub fn public_url(base: &str, filename: &str) -> String {
    let path = format!("/uploads/{}", filename);
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        path
    } else {
        format!("{}{}", base, path)
    }
}
