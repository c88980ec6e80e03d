//! Image roles used to pick catalog parameters.

use serde::{Deserialize, Serialize};

/// Role an image plays on the page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    /// Brand logos, transparent background, never cropped.
    Logo,
    /// Gallery tiles.
    Gallery,
    /// Full-width hero imagery.
    Hero,
    /// Service cards.
    Service,
    /// Anything else.
    #[default]
    Default,
}

impl ImageRole {
    /// Every role, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Logo,
        Self::Gallery,
        Self::Hero,
        Self::Service,
        Self::Default,
    ];

    /// Lowercase name as used in configuration and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Gallery => "gallery",
            Self::Hero => "hero",
            Self::Service => "service",
            Self::Default => "default",
        }
    }

    /// Infers a role from the image identifier alone.
    ///
    /// Only logos can be recognized without page context.
    #[must_use]
    pub fn from_identifier(image_id: &str) -> Self {
        if image_id.to_lowercase().contains("logo") {
            Self::Logo
        } else {
            Self::Default
        }
    }
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("logo.png", ImageRole::Logo ; "plain_logo")]
    #[test_case("brand/Company-LOGO.svg", ImageRole::Logo ; "case_insensitive")]
    #[test_case("hero.jpg", ImageRole::Default ; "hero_needs_context")]
    #[test_case("", ImageRole::Default ; "empty")]
    fn test_from_identifier(id: &str, expected: ImageRole) {
        assert_eq!(ImageRole::from_identifier(id), expected);
    }
}
