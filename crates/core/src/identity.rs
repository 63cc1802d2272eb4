//! Party identifier normalization and validation.
//!
//! A party in a contract is identified either by a platform username
//! (marker-prefixed, e.g. `@ada_l`) or by a free-text legal name
//! (e.g. `"Jane Doe"`). Every identifier entered in the draft flow must pass
//! through [`normalize_identifier`] and [`validate_identifier`] before it may
//! participate in any contract transition.

/// Marker character that distinguishes platform usernames from legal names.
pub const USERNAME_MARKER: char = '@';

/// Minimum length for a free-text legal name.
pub const MIN_NAME_LEN: usize = 2;

/// Normalize a raw party identifier.
///
/// Marker-prefixed input is lower-cased and stripped of every character
/// outside `{@, a-z, 0-9, _}`. Free-text legal names pass through untouched
/// (beyond surrounding whitespace), since stripping would mangle real names.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(USERNAME_MARKER) {
        trimmed
            .to_lowercase()
            .chars()
            .filter(|c| *c == USERNAME_MARKER || c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
            .collect()
    } else {
        trimmed.to_string()
    }
}

/// Validate a normalized party identifier.
///
/// Usernames must match `@[a-z0-9_]+` exactly (a single leading marker,
/// at least one body character). Legal names must be at least
/// [`MIN_NAME_LEN`] characters.
pub fn validate_identifier(identifier: &str) -> Result<(), String> {
    if let Some(body) = identifier.strip_prefix(USERNAME_MARKER) {
        let well_formed = !body.is_empty()
            && body
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if well_formed {
            Ok(())
        } else {
            Err(format!(
                "Invalid username '{identifier}'. Must be '{USERNAME_MARKER}' followed by lowercase letters, digits, or underscores"
            ))
        }
    } else if identifier.chars().count() >= MIN_NAME_LEN {
        Ok(())
    } else {
        Err(format!(
            "Name '{identifier}' is too short. Must be at least {MIN_NAME_LEN} characters"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_usernames() {
        assert_eq!(normalize_identifier("@Ada_L"), "@ada_l");
    }

    #[test]
    fn test_normalize_strips_invalid_username_chars() {
        assert_eq!(normalize_identifier("@ada-l!"), "@adal");
        assert_eq!(normalize_identifier("  @ada l  "), "@adal");
    }

    #[test]
    fn test_normalize_passes_legal_names_through() {
        assert_eq!(normalize_identifier("Jane Doe"), "Jane Doe");
        assert_eq!(normalize_identifier("  Jane Doe "), "Jane Doe");
    }

    #[test]
    fn test_uppercase_username_is_invalid() {
        assert!(validate_identifier("@Ab_1").is_err());
    }

    #[test]
    fn test_lowercase_username_is_valid() {
        assert!(validate_identifier("@ab_1").is_ok());
    }

    #[test]
    fn test_legal_name_is_valid() {
        assert!(validate_identifier("Jane Doe").is_ok());
    }

    #[test]
    fn test_one_char_name_is_too_short() {
        let result = validate_identifier("J");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("too short"));
    }

    #[test]
    fn test_bare_marker_is_invalid() {
        assert!(validate_identifier("@").is_err());
    }

    #[test]
    fn test_interior_marker_is_invalid() {
        assert!(validate_identifier("@ab@cd").is_err());
    }

    #[test]
    fn test_normalize_then_validate_roundtrip() {
        let normalized = normalize_identifier("@Ab_1");
        assert_eq!(normalized, "@ab_1");
        assert!(validate_identifier(&normalized).is_ok());
    }
}
