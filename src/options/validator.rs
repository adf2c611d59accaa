//! Fail-fast validation of action names and URL fragments.

use crate::error::SetupError;
use regex::Regex;

/// Action names must be lowercase identifiers, must not collide with the
/// `get_` accessor prefix, and must not contain the `__` separator
/// reserved for stage naming. Checked at view-set construction.
pub fn validate_action_name(action: &str) -> Result<(), SetupError> {
    let re = Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex");
    if !re.is_match(action) || action.starts_with("get_") || action.contains("__") {
        return Err(SetupError::InvalidAction(action.to_string()));
    }
    Ok(())
}

/// URL fragments are relative to the base path: no leading slash, no
/// whitespace. Empty is allowed (the index route).
pub(crate) fn validate_url_fragment(action: &str, fragment: &str) -> Result<(), SetupError> {
    if fragment.starts_with('/') || fragment.chars().any(char::is_whitespace) {
        return Err(SetupError::InvalidUrl {
            action: action.to_string(),
            fragment: fragment.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        for name in ["index", "publish", "mark_read", "v2"] {
            assert!(validate_action_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_reserved_and_malformed_names() {
        for name in ["get_object", "a__b", "Upper", "-dash", "_lead", "1num", ""] {
            assert!(validate_action_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn rejects_absolute_fragments() {
        assert!(validate_url_fragment("publish", "/abs/").is_err());
        assert!(validate_url_fragment("publish", ":pk/publish/").is_ok());
        assert!(validate_url_fragment("index", "").is_ok());
    }
}
