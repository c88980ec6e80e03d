//! Role to parameter-set catalog.

use std::collections::HashMap;

use crate::domain::entities::{ImageRole, ParameterSet};

const AUTO_FORMAT: &str = "format,compress";

/// Catalog of CDN parameters per image role, plus the base set every
/// request starts from.
///
/// Entries are never mutated after construction; callers derive copies
/// with [`ParameterCatalog::effective`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCatalog {
    base: ParameterSet,
    entries: HashMap<ImageRole, ParameterSet>,
}

impl ParameterCatalog {
    /// Creates a catalog from explicit tables. Roles missing from
    /// `entries` resolve to an empty set.
    #[must_use]
    pub fn new(base: ParameterSet, entries: HashMap<ImageRole, ParameterSet>) -> Self {
        Self { base, entries }
    }

    /// Built-in base set: automatic format and compression at quality 75.
    #[must_use]
    pub fn builtin_base() -> ParameterSet {
        ParameterSet::new().with("auto", AUTO_FORMAT).with("q", 75)
    }

    /// Built-in defaults for one role.
    #[must_use]
    pub fn builtin_entry(role: ImageRole) -> ParameterSet {
        match role {
            ImageRole::Logo => ParameterSet::new()
                .with("w", 200)
                .with("fit", "max")
                .with("bg", "transparent")
                .with("auto", AUTO_FORMAT)
                .with("q", 85),
            ImageRole::Gallery => cropped(800, 600),
            ImageRole::Hero => cropped(1920, 1080),
            ImageRole::Service => cropped(800, 650),
            ImageRole::Default => ParameterSet::new()
                .with("w", 800)
                .with("auto", AUTO_FORMAT)
                .with("q", 75),
        }
    }

    /// Catalog with built-in tables.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = ImageRole::ALL
            .iter()
            .map(|&role| (role, Self::builtin_entry(role)))
            .collect();
        Self::new(Self::builtin_base(), entries)
    }

    /// Built-in catalog with per-role overrides laid over each entry.
    #[must_use]
    pub fn builtin_with(
        base: Option<&ParameterSet>,
        overrides: &HashMap<ImageRole, ParameterSet>,
    ) -> Self {
        let mut catalog = Self::builtin();
        if let Some(base) = base {
            catalog.base = base.clone();
        }
        for (role, params) in overrides {
            let merged = catalog
                .entries
                .get(role)
                .map_or_else(|| params.clone(), |entry| entry.overlay(params));
            catalog.entries.insert(*role, merged);
        }
        catalog
    }

    /// The base set applied to every CDN request.
    #[must_use]
    pub fn base(&self) -> &ParameterSet {
        &self.base
    }

    /// Catalog entry for a role.
    #[must_use]
    pub fn params_for(&self, role: ImageRole) -> ParameterSet {
        self.entries.get(&role).cloned().unwrap_or_default()
    }

    /// Base, then the role entry, then caller overrides; later layers win.
    #[must_use]
    pub fn effective(&self, role: ImageRole, overrides: &ParameterSet) -> ParameterSet {
        let mut merged = self.base.clone();
        if let Some(entry) = self.entries.get(&role) {
            merged = merged.overlay(entry);
        }
        merged.overlay(overrides)
    }

    /// Whether an image gets a responsive set. Anything rendered on a
    /// transparent background is served at a single size.
    #[must_use]
    pub fn wants_responsive(&self, role: ImageRole, overrides: &ParameterSet) -> bool {
        self.effective(role, overrides)
            .get("bg")
            .and_then(|bg| bg.as_text())
            != Some("transparent")
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn cropped(width: u32, height: u32) -> ParameterSet {
    ParameterSet::new()
        .with("w", width)
        .with("h", height)
        .with("fit", "crop")
        .with("crop", "entropy")
        .with("q", 80)
        .with("auto", AUTO_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ParamValue;

    #[test]
    fn test_effective_logo_parameters() {
        let catalog = ParameterCatalog::builtin();
        let params = catalog.effective(ImageRole::Logo, &ParameterSet::new());

        assert_eq!(
            params.canonical_key(),
            "auto=format%2Ccompress&bg=transparent&fit=max&q=85&w=200"
        );
    }

    #[test]
    fn test_effective_overrides_win() {
        let catalog = ParameterCatalog::builtin();
        let overrides = ParameterSet::new().with("q", 60).with("ar", "4:3");

        let params = catalog.effective(ImageRole::Gallery, &overrides);

        assert_eq!(params.get("q"), Some(&ParamValue::Int(60)));
        assert_eq!(params.get("ar"), Some(&ParamValue::from("4:3")));
        assert_eq!(params.get("h"), Some(&ParamValue::Int(600)));
        assert_eq!(
            catalog.params_for(ImageRole::Gallery).get("q"),
            Some(&ParamValue::Int(80))
        );
    }

    #[test]
    fn test_builtin_with_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(ImageRole::Hero, ParameterSet::new().with("w", 2560));
        let base = ParameterSet::new().with("auto", "format");

        let catalog = ParameterCatalog::builtin_with(Some(&base), &overrides);

        let hero = catalog.params_for(ImageRole::Hero);
        assert_eq!(hero.get("w"), Some(&ParamValue::Int(2560)));
        assert_eq!(hero.get("h"), Some(&ParamValue::Int(1080)));
        assert_eq!(catalog.base(), &base);
    }

    #[test]
    fn test_logo_is_not_responsive() {
        let catalog = ParameterCatalog::builtin();
        let none = ParameterSet::new();
        assert!(!catalog.wants_responsive(ImageRole::Logo, &none));
        assert!(catalog.wants_responsive(ImageRole::Gallery, &none));
        assert!(catalog.wants_responsive(ImageRole::Default, &none));

        let transparent = ParameterSet::new().with("bg", "transparent");
        assert!(!catalog.wants_responsive(ImageRole::Hero, &transparent));
        assert!(catalog.wants_responsive(ImageRole::Logo, &ParameterSet::new().with("bg", "fff")));
    }
}
