//! Presentation layer: HTML rewriting and reporting.

/// HTML tag scanning.
pub mod markup;
/// `<img>` rewriting.
pub mod page_processor;
/// Page optimization report.
pub mod performance_report;

pub use page_processor::{PageImageProcessor, PageOptions, ProcessedPage, ProcessingSummary};
pub use performance_report::{CdnStatus, PerformanceReport};
