//! Rewrites `<img>` tags of a page to go through the CDN.

use tracing::{debug, warn};

use super::markup::{self, AncestorStack, Tag, escape_attr};
use crate::application::ImageOptimizer;
use crate::application::services::{ImageContext, classify};
use crate::domain::entities::{ImageRole, ParamValue, ParameterSet};

/// Swaps a broken CDN image back to its local copy, once. Inside a
/// `<picture>` the CDN sources are dropped too, or the browser would
/// select them again.
pub const FALLBACK_HANDLER: &str = concat!(
    "this.onerror=null;",
    "var p=this.parentNode;",
    "if(p&&p.tagName==='PICTURE'){p.querySelectorAll('source').forEach(function(s){s.remove();});}",
    "this.removeAttribute('srcset');",
    "this.src=this.dataset.fallbackSrc;"
);

const MOBILE_MEDIA: &str = "(max-width: 576px)";
const TABLET_MEDIA: &str = "(max-width: 992px)";

/// Page rewriting switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Add `loading="lazy"` where no `loading` attribute exists.
    pub lazy_loading: bool,
    /// Wrap gallery images in `<picture>` with mobile and tablet crops.
    pub art_direction: bool,
    /// `sizes` attribute written next to generated `srcset`s.
    pub sizes: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            lazy_loading: true,
            art_direction: true,
            sizes: "(max-width: 768px) 100vw, 800px".to_string(),
        }
    }
}

/// Counters collected while rewriting one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// `<img>` tags seen.
    pub total: usize,
    /// Images now served from the CDN.
    pub rewritten: usize,
    /// Images kept on their local path because the CDN is unavailable.
    pub fallback: usize,
    /// Remote, inline, or already-processed images left alone.
    pub skipped: usize,
    /// Gallery images wrapped in `<picture>`.
    pub art_directed: usize,
    /// `data-imgix-params` values that were discarded.
    pub invalid_overrides: usize,
}

/// Rewritten markup plus what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPage {
    /// Rewritten HTML.
    pub html: String,
    /// Per-page counters.
    pub summary: ProcessingSummary,
}

/// Walks a page and applies CDN URLs, responsive sets, lazy loading and
/// error fallbacks to every local image.
#[derive(Debug)]
pub struct PageImageProcessor<'a> {
    optimizer: &'a ImageOptimizer,
    options: PageOptions,
}

impl<'a> PageImageProcessor<'a> {
    /// Creates a processor over a settled or unsettled optimizer. Unsettled
    /// availability is treated as unavailable.
    #[must_use]
    pub const fn new(optimizer: &'a ImageOptimizer, options: PageOptions) -> Self {
        Self { optimizer, options }
    }

    /// Rewrites every eligible image. Markup outside rewritten tags is
    /// copied through unchanged.
    #[must_use]
    pub fn process(&self, html: &str) -> ProcessedPage {
        let mut out = String::with_capacity(html.len() + html.len() / 4);
        let mut summary = ProcessingSummary::default();
        let mut stack = AncestorStack::default();
        let mut copied = 0;

        for (range, tag) in markup::tags(html) {
            if tag.name != "img" || tag.closing {
                stack.track(&tag);
                continue;
            }

            summary.total += 1;
            if let Some(replacement) = self.rewrite_image(tag, &stack, &mut summary) {
                out.push_str(&html[copied..range.start]);
                out.push_str(&replacement);
                copied = range.end;
            }
        }
        out.push_str(&html[copied..]);

        debug!(
            total = summary.total,
            rewritten = summary.rewritten,
            fallback = summary.fallback,
            skipped = summary.skipped,
            "Processed page images"
        );

        ProcessedPage { html: out, summary }
    }

    fn rewrite_image(
        &self,
        mut tag: Tag,
        stack: &AncestorStack,
        summary: &mut ProcessingSummary,
    ) -> Option<String> {
        let src = tag.attr("src").map(str::trim).unwrap_or_default().to_string();
        if !self.is_eligible(&tag, &src) {
            summary.skipped += 1;
            return None;
        }

        let image_id = self.image_id(&src);
        let role = classify(&ImageContext {
            src: src.clone(),
            alt: tag.attr("alt").unwrap_or_default().to_string(),
            classes: tag.classes(),
            parent_class: stack.parent_class(),
            ancestor_classes: stack.ancestor_classes(),
        });
        let overrides = Self::overrides(&tag, &src, summary);

        tag.set_attr("data-original-src", src.as_str());

        let available = self.optimizer.is_available();
        if available {
            let url = self
                .optimizer
                .build_url_for_role(&image_id, role, &overrides);
            tag.set_attr("src", url);
            tag.set_attr("data-fallback-src", src.as_str());
            tag.set_attr("onerror", FALLBACK_HANDLER);

            if self.optimizer.catalog().wants_responsive(role, &overrides) {
                let set = self
                    .optimizer
                    .build_responsive_set_for_role(&image_id, role, &overrides);
                tag.set_attr("srcset", set.to_srcset());
                if !tag.has_attr("sizes") {
                    tag.set_attr("sizes", self.options.sizes.as_str());
                }
            }
            summary.rewritten += 1;
        } else {
            summary.fallback += 1;
        }

        if self.options.lazy_loading && !tag.has_attr("loading") {
            tag.set_attr("loading", "lazy");
        }
        tag.set_attr("data-imgix-processed", "true");

        let rendered = tag.render();
        if available
            && self.options.art_direction
            && role == ImageRole::Gallery
            && !stack.is_inside("picture")
        {
            summary.art_directed += 1;
            return Some(self.picture(&image_id, &overrides, &rendered));
        }
        Some(rendered)
    }

    fn is_eligible(&self, tag: &Tag, src: &str) -> bool {
        if src.is_empty() || tag.has_attr("data-imgix-processed") {
            return false;
        }
        let lower = src.to_ascii_lowercase();
        if ["http:", "https:", "//", "data:", "blob:"]
            .iter()
            .any(|scheme| lower.starts_with(scheme))
        {
            return false;
        }
        !self.optimizer.endpoint().is_cdn_url(src)
    }

    /// CDN identifier for a local `src`: relative markers and the local
    /// fallback prefix are dropped.
    fn image_id(&self, src: &str) -> String {
        let path = src.trim_start_matches("./").trim_start_matches('/');
        let prefix = self.optimizer.endpoint().fallback_prefix.trim_start_matches('/');
        path.strip_prefix(prefix)
            .filter(|_| !prefix.is_empty())
            .unwrap_or(path)
            .to_string()
    }

    fn overrides(tag: &Tag, src: &str, summary: &mut ProcessingSummary) -> ParameterSet {
        let Some(raw) = tag.attr("data-imgix-params") else {
            return ParameterSet::new();
        };
        match ParameterSet::from_json(raw) {
            Ok(params) => params,
            Err(e) => {
                warn!(src, error = %e, "Discarding image parameter overrides");
                summary.invalid_overrides += 1;
                ParameterSet::new()
            }
        }
    }

    fn picture(&self, image_id: &str, overrides: &ParameterSet, img: &str) -> String {
        let gallery = self
            .optimizer
            .catalog()
            .effective(ImageRole::Gallery, overrides);

        let mut mobile = overrides
            .clone()
            .with("ar", "1:1")
            .with("fit", "crop")
            .with("crop", "faces,entropy");
        if let Some(width) = gallery.get("w").and_then(ParamValue::as_int) {
            mobile.insert("h", width);
        }
        let tablet = overrides.clone().with("ar", "4:3").with("fit", "crop");

        let mut out = String::from("<picture>");
        for (media, params) in [(MOBILE_MEDIA, mobile), (TABLET_MEDIA, tablet)] {
            let set = self.optimizer.build_responsive_set_for_role(
                image_id,
                ImageRole::Gallery,
                &params,
            );
            out.push_str(&format!(
                "<source media=\"{}\" srcset=\"{}\">",
                escape_attr(media),
                escape_attr(&set.to_srcset())
            ));
        }
        out.push_str(img);
        out.push_str("</picture>");
        out
    }
}
