//! Responsive image candidates.

use serde::Serialize;

/// One `(width, url)` entry of a responsive set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateDescriptor {
    /// Target width in pixels.
    pub width: u32,
    /// URL serving the image at that width.
    pub url: String,
}

impl CandidateDescriptor {
    /// Creates a new candidate.
    #[must_use]
    pub fn new(width: u32, url: impl Into<String>) -> Self {
        Self {
            width,
            url: url.into(),
        }
    }

    /// Renders the `"<url> <width>w"` form used in `srcset`.
    #[must_use]
    pub fn descriptor(&self) -> String {
        format!("{} {}w", self.url, self.width)
    }
}

/// Same-image candidates ordered by ascending width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponsiveSet {
    candidates: Vec<CandidateDescriptor>,
}

impl ResponsiveSet {
    /// Creates a set, sorting candidates by width.
    #[must_use]
    pub fn new(mut candidates: Vec<CandidateDescriptor>) -> Self {
        candidates.sort_by_key(|c| c.width);
        Self { candidates }
    }

    /// Widths in order.
    #[must_use]
    pub fn widths(&self) -> Vec<u32> {
        self.candidates.iter().map(|c| c.width).collect()
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Joins all descriptors into a `srcset` attribute value.
    #[must_use]
    pub fn to_srcset(&self) -> String {
        self.candidates
            .iter()
            .map(CandidateDescriptor::descriptor)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> IntoIterator for &'a ResponsiveSet {
    type Item = &'a CandidateDescriptor;
    type IntoIter = std::slice::Iter<'a, CandidateDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
