//! The long-term user profile.

use serde::{Deserialize, Serialize};

/// Cross-conversation facts about one user.
///
/// Created empty on first contact, read before every generation, and
/// replaced wholesale after every turn — the latest extraction wins, fields
/// are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's name.
    #[serde(default)]
    pub name: String,
    /// The user's location.
    #[serde(default)]
    pub location: String,
    /// The user's interests.
    #[serde(default)]
    pub interests: Vec<String>,
}

impl UserProfile {
    /// Whether nothing is known about the user yet.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.location.is_empty() && self.interests.is_empty()
    }

    /// Render the profile as the short descriptive block injected into
    /// system prompts. Absent fields render as `Unknown`.
    pub fn format_block(&self) -> String {
        format!(
            "Name: {}\nLocation: {}\nInterests: {}",
            non_empty_or(&self.name, "Unknown"),
            non_empty_or(&self.location, "Unknown"),
            self.interests.join(", "),
        )
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_formats_with_unknown_defaults() {
        let block = UserProfile::default().format_block();
        assert_eq!(block, "Name: Unknown\nLocation: Unknown\nInterests: ");
    }

    #[test]
    fn populated_profile_formats_all_fields() {
        let profile = UserProfile {
            name: "Ada".into(),
            location: "London".into(),
            interests: vec!["chess".into(), "engines".into()],
        };
        assert_eq!(profile.format_block(), "Name: Ada\nLocation: London\nInterests: chess, engines");
    }

    #[test]
    fn is_empty_tracks_all_fields() {
        assert!(UserProfile::default().is_empty());
        let profile = UserProfile { interests: vec!["skiing".into()], ..Default::default() };
        assert!(!profile.is_empty());
    }
}
