//! Multi-width candidate generation for `srcset`.

use std::sync::Arc;

use super::url_builder::UrlBuilder;
use crate::domain::entities::{CandidateDescriptor, ImageRole, ParameterSet, ResponsiveSet};

/// Breakpoint widths used when none are configured.
pub const DEFAULT_WIDTHS: [u32; 5] = [320, 640, 960, 1280, 1920];

/// Produces one URL per configured width.
#[derive(Debug)]
pub struct ResponsiveSetGenerator {
    builder: Arc<UrlBuilder>,
    widths: Vec<u32>,
}

impl ResponsiveSetGenerator {
    /// Creates a generator. Widths are sorted and deduplicated.
    #[must_use]
    pub fn new(builder: Arc<UrlBuilder>, mut widths: Vec<u32>) -> Self {
        widths.sort_unstable();
        widths.dedup();
        Self { builder, widths }
    }

    /// Configured widths, ascending.
    #[must_use]
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Builds the set with the role inferred from the identifier.
    #[must_use]
    pub fn build_set(&self, image_id: &str, base_params: &ParameterSet) -> ResponsiveSet {
        self.build_set_for_role(image_id, ImageRole::from_identifier(image_id), base_params)
    }

    /// Builds the set for an image of a known role. `w` is replaced per
    /// width; every other base parameter is kept.
    #[must_use]
    pub fn build_set_for_role(
        &self,
        image_id: &str,
        role: ImageRole,
        base_params: &ParameterSet,
    ) -> ResponsiveSet {
        let candidates = self
            .widths
            .iter()
            .map(|&width| {
                let params = base_params.overlay(&ParameterSet::new().with("w", width));
                CandidateDescriptor::new(width, self.builder.build_for_role(image_id, role, &params))
            })
            .collect();
        ResponsiveSet::new(candidates)
    }
}
