//! Image optimization report for a rewritten page.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::markup::{self, escape_attr};

/// Whether the page is being served through the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CdnStatus {
    /// At least one image points at the CDN.
    Active,
    /// No image points at the CDN.
    Inactive,
}

impl fmt::Display for CdnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Image counts for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// CDN host the counts refer to.
    pub cdn_domain: String,
    /// `<img>` tags on the page.
    pub total_images: usize,
    /// Images whose `src` is on the CDN.
    pub optimized_images: usize,
    /// Share of optimized images, one decimal.
    pub optimization_percentage: f64,
    /// Images with a `srcset`.
    pub responsive_images: usize,
    /// Images with `loading="lazy"`.
    pub lazy_loaded_images: usize,
    /// `<picture>` elements.
    pub art_directed_images: usize,
    /// CDN status.
    pub status: CdnStatus,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl PerformanceReport {
    /// Counts images in `html` against `cdn_domain`.
    #[must_use]
    pub fn from_html(html: &str, cdn_domain: &str) -> Self {
        let mut total_images = 0;
        let mut optimized_images = 0;
        let mut responsive_images = 0;
        let mut lazy_loaded_images = 0;
        let mut art_directed_images = 0;

        for (_, tag) in markup::tags(html) {
            if tag.closing {
                continue;
            }
            match tag.name.as_str() {
                "picture" => art_directed_images += 1,
                "img" => {
                    total_images += 1;
                    if !cdn_domain.is_empty()
                        && tag.attr("src").is_some_and(|src| src.contains(cdn_domain))
                    {
                        optimized_images += 1;
                    }
                    if tag.has_attr("srcset") {
                        responsive_images += 1;
                    }
                    if tag
                        .attr("loading")
                        .is_some_and(|l| l.eq_ignore_ascii_case("lazy"))
                    {
                        lazy_loaded_images += 1;
                    }
                }
                _ => {}
            }
        }

        Self {
            cdn_domain: cdn_domain.to_string(),
            total_images,
            optimized_images,
            optimization_percentage: percentage(optimized_images, total_images),
            responsive_images,
            lazy_loaded_images,
            art_directed_images,
            status: if optimized_images > 0 {
                CdnStatus::Active
            } else {
                CdnStatus::Inactive
            },
            generated_at: Utc::now(),
        }
    }

    /// Emits the report through tracing.
    pub fn log(&self) {
        match self.status {
            CdnStatus::Active => info!(
                domain = %self.cdn_domain,
                total = self.total_images,
                optimized = self.optimized_images,
                percentage = self.optimization_percentage,
                responsive = self.responsive_images,
                lazy = self.lazy_loaded_images,
                art_directed = self.art_directed_images,
                "Image optimization report"
            ),
            CdnStatus::Inactive => warn!(
                domain = %self.cdn_domain,
                total = self.total_images,
                "No images served from the CDN; check the cdn.domain setting and that the source is reachable"
            ),
        }
    }

    /// Fixed-position overlay summarizing the report.
    #[must_use]
    pub fn render_widget(&self) -> String {
        let color = match self.status {
            CdnStatus::Active => "#4caf50",
            CdnStatus::Inactive => "#f44336",
        };
        format!(
            concat!(
                "<div id=\"imgix-performance\" style=\"position:fixed;bottom:10px;right:10px;",
                "background:rgba(0,0,0,0.8);color:#fff;padding:10px;border-radius:5px;",
                "font-family:monospace;font-size:12px;z-index:9999;\">",
                "<div><strong>imgix</strong> <span style=\"color:{color}\">{status}</span></div>",
                "<div>Images: {optimized}/{total} ({percentage:.1}%)</div>",
                "<div>Responsive: {responsive}</div>",
                "<div>Lazy: {lazy}</div>",
                "<div>Art directed: {art}</div>",
                "<div>Domain: {domain}</div>",
                "</div>"
            ),
            color = color,
            status = self.status,
            optimized = self.optimized_images,
            total = self.total_images,
            percentage = self.optimization_percentage,
            responsive = self.responsive_images,
            lazy = self.lazy_loaded_images,
            art = self.art_directed_images,
            domain = escape_attr(&self.cdn_domain),
        )
    }

    /// Inserts the overlay before `</body>`, or appends it when the page
    /// has no body end tag.
    #[must_use]
    pub fn inject_widget(&self, html: &str) -> String {
        let widget = self.render_widget();
        match html.to_ascii_lowercase().rfind("</body>") {
            Some(pos) => {
                let mut out = String::with_capacity(html.len() + widget.len());
                out.push_str(&html[..pos]);
                out.push_str(&widget);
                out.push_str(&html[pos..]);
                out
            }
            None => format!("{html}{widget}"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = concat!(
        "<html><body>",
        r#"<img src="https://cdn.test/a.jpg?w=800" srcset="x 400w" loading="lazy">"#,
        r#"<picture><source srcset="y"><img src="https://cdn.test/b.jpg" srcset="z 400w"></picture>"#,
        r#"<img src="images/c.jpg" loading="lazy">"#,
        "</body></html>",
    );

    #[test]
    fn test_counts_page_images() {
        let report = PerformanceReport::from_html(PAGE, "cdn.test");

        assert_eq!(report.total_images, 3);
        assert_eq!(report.optimized_images, 2);
        assert!((report.optimization_percentage - 66.7).abs() < f64::EPSILON);
        assert_eq!(report.responsive_images, 2);
        assert_eq!(report.lazy_loaded_images, 2);
        assert_eq!(report.art_directed_images, 1);
        assert_eq!(report.status, CdnStatus::Active);
    }

    #[test]
    fn test_empty_page_is_inactive() {
        let report = PerformanceReport::from_html("<p>text</p>", "cdn.test");

        assert_eq!(report.total_images, 0);
        assert!(report.optimization_percentage.abs() < f64::EPSILON);
        assert_eq!(report.status, CdnStatus::Inactive);
    }

    #[test]
    fn test_inject_widget_before_body_end() {
        let report = PerformanceReport::from_html(PAGE, "cdn.test");
        let html = report.inject_widget(PAGE);

        assert!(html.ends_with("</div></body></html>"));
        assert!(html.contains("Images: 2/3 (66.7%)"));
        assert!(html.contains("ACTIVE"));

        let bare = report.inject_widget("<p>x</p>");
        assert!(bare.starts_with("<p>x</p><div id=\"imgix-performance\""));
    }

    #[test]
    fn test_report_serializes() {
        let report = PerformanceReport::from_html(PAGE, "cdn.test");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["total_images"], 3);
        assert!(json["generated_at"].is_string());
    }
}
