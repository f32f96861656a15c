//! Core wire types for teamtrack.
//!
//! Every request and response body exchanged with the admin backend lives
//! here so the HTTP client, the interactive console and the one-shot CLI
//! agree on a single shape.

pub mod admin;
pub mod tasks;

/// Truncate a string to at most `max_bytes` bytes without splitting a
/// multi-byte character.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        // "ü" is two bytes; cutting at 2 would land inside it.
        assert_eq!(truncate_str("Yüksek", 2), "Y");
        assert_eq!(truncate_str("Yüksek", 3), "Yü");
        assert_eq!(truncate_str("kısa", 64), "kısa");
    }
}
