//! String helpers for log previews.

/// Shorten `s` to at most `max_len` bytes for diagnostics, appending `...`
/// when anything was cut. Never splits a UTF-8 character.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate("{\"done\":true}", 64), "{\"done\":true}");
    }

    #[test]
    fn long_frames_are_cut_with_ellipsis() {
        assert_eq!(truncate("{\"message\":{\"content\"", 10), "{\"messa...");
    }

    #[test]
    fn multibyte_boundary_respected() {
        // "€" is 3 bytes; target 4 lands inside the second one
        assert_eq!(truncate("€€€€", 7), "€...");
    }
}
