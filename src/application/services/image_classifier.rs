//! Page-context matching rules that pick an image's catalog role.

use crate::domain::entities::ImageRole;

/// What the page tells us about one `<img>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageContext {
    /// `src` attribute as written.
    pub src: String,
    /// `alt` attribute, empty if absent.
    pub alt: String,
    /// Classes on the image itself.
    pub classes: Vec<String>,
    /// Class attribute of the direct parent, verbatim.
    pub parent_class: String,
    /// Classes of every open ancestor, nearest first.
    pub ancestor_classes: Vec<String>,
}

impl ImageContext {
    fn has_ancestor_class(&self, class: &str) -> bool {
        self.ancestor_classes.iter().any(|c| c == class)
    }
}

/// Classifies an image in priority order: logo, gallery, service, hero,
/// default.
#[must_use]
pub fn classify(ctx: &ImageContext) -> ImageRole {
    if ctx.src.to_lowercase().contains("logo") || ctx.alt.to_lowercase().contains("logo") {
        return ImageRole::Logo;
    }

    if ctx.parent_class.contains("gallery") || ctx.has_ancestor_class("gallery-item") {
        return ImageRole::Gallery;
    }

    if ctx.parent_class.contains("service") || ctx.has_ancestor_class("service-item") {
        return ImageRole::Service;
    }

    if ctx.classes.iter().any(|c| c == "hero") || ctx.has_ancestor_class("hero") {
        return ImageRole::Hero;
    }

    ImageRole::Default
}
