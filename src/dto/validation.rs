//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::songs::sanitize_name;

/// Validates that a song name still contains something after sanitization.
///
/// Forbidden filesystem characters are tolerated (they become underscores),
/// but a name that sanitizes down to nothing could never be stored.
pub fn validate_song_name(name: &str) -> Result<(), ValidationError> {
    if sanitize_name(name).is_empty() {
        let mut err = ValidationError::new("song_name_unusable");
        err.message = Some("Song name must contain at least one usable character".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_song_name_valid() {
        assert!(validate_song_name("Daft Punk - Around the World").is_ok());
        assert!(validate_song_name("x").is_ok());
        // Forbidden characters sanitize to underscores, which still count.
        assert!(validate_song_name("???").is_ok());
    }

    #[test]
    fn test_validate_song_name_unusable() {
        assert!(validate_song_name("").is_err());
        assert!(validate_song_name("   ").is_err());
        assert!(validate_song_name("\t\n").is_err());
    }
}
