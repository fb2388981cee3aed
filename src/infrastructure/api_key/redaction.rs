//! Key redaction for display

use super::generator::KEY_SEPARATOR;

/// Number of mask characters shown in place of the secret part
pub const MASK_LENGTH: usize = 32;

/// Character used to hide the secret part
pub const MASK_CHAR: char = '*';

/// Masked form of a key: the prefix and environment segments followed by a
/// fixed run of mask characters.
///
/// The run length does not depend on the real key length. Keys with fewer
/// than two segments keep whatever segments they have.
pub fn mask_key(key: &str) -> String {
    let visible: Vec<&str> = key.split(KEY_SEPARATOR).take(2).collect();

    let mut masked = visible.join(&KEY_SEPARATOR.to_string());
    masked.push(KEY_SEPARATOR);
    masked.extend(std::iter::repeat(MASK_CHAR).take(MASK_LENGTH));
    masked
}

/// The string shown for a key in a given visibility state
pub fn display_key(key: &str, revealed: bool) -> String {
    if revealed {
        key.to_string()
    } else {
        mask_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars() -> String {
        "*".repeat(MASK_LENGTH)
    }

    #[test]
    fn test_mask_well_formed_key() {
        assert_eq!(
            mask_key("tvly-prod-abc123XYZabc123XYZabc123XYZab"),
            format!("tvly-prod-{}", stars())
        );
    }

    #[test]
    fn test_mask_length_is_fixed() {
        assert_eq!(mask_key("tvly-dev-a"), mask_key("tvly-dev-bbbbbbbbbbbbbbbb"));
        assert_eq!(mask_key("tvly-dev-a").len(), "tvly-dev-".len() + MASK_LENGTH);
        assert_eq!(
            mask_key(&format!("tvly-dev-{}", "x".repeat(200))).len(),
            "tvly-dev-".len() + MASK_LENGTH
        );
    }

    #[test]
    fn test_mask_never_exposes_more_than_two_segments() {
        let keys = [
            "tvly-dev-secret",
            "tvly-prod-sec-ret-more",
            "a-b-c",
            "x-y-",
            "-lead-secret",
        ];

        for key in keys {
            let masked = mask_key(key);
            let expected_prefix: Vec<&str> = key.split('-').take(2).collect();
            assert_eq!(masked, format!("{}-{}", expected_prefix.join("-"), stars()));
            let third = key.split('-').nth(2).unwrap_or_default();
            if !third.is_empty() {
                assert!(!masked.contains(third), "{} leaked from {}", third, key);
            }
        }
    }

    #[test]
    fn test_mask_malformed_keys() {
        assert_eq!(mask_key("noseparator"), format!("noseparator-{}", stars()));
        assert_eq!(mask_key(""), format!("-{}", stars()));
        assert_eq!(mask_key("tvly-dev"), format!("tvly-dev-{}", stars()));
    }

    #[test]
    fn test_display_key() {
        let key = "tvly-dev-abc";
        assert_eq!(display_key(key, true), key);
        assert_eq!(display_key(key, false), mask_key(key));
    }
}
