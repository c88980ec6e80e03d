//! Minimal HTML tag scanning.
//!
//! Only tags are parsed; text and everything between tags is left to the
//! caller to copy through untouched. The bodies of `script` and `style`
//! elements are never scanned.

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#,
        )
        .expect("Invalid regex")
    })
}

fn attr_regex() -> &'static Regex {
    static ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("Invalid regex")
    })
}

/// A single attribute with its entity-decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased name.
    pub name: String,
    /// Value, `None` for bare attributes such as `hidden`.
    pub value: Option<String>,
}

/// A parsed start or end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased element name.
    pub name: String,
    /// `</name>` form.
    pub closing: bool,
    /// Written as `<name ... />`.
    pub self_closing: bool,
    attributes: Vec<Attribute>,
}

impl Tag {
    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let name = caps.get(2)?.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let attributes = caps
            .get(3)
            .map(|m| parse_attributes(m.as_str()))
            .unwrap_or_default();

        Some(Self {
            name,
            closing,
            self_closing,
            attributes,
        })
    }

    /// Returns true for elements that cannot contain children.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Attribute value, empty string for bare attributes.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// Returns whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Whitespace-separated classes.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Replaces an attribute in place or appends it.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            });
        }
    }

    /// Serializes the tag with every value double-quoted and escaped.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("<");
        if self.closing {
            out.push('/');
        }
        out.push_str(&self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

/// Iterates tags in document order with their byte ranges. Comments and
/// the content of raw-text elements are skipped.
#[must_use]
pub fn tags(html: &str) -> Tags<'_> {
    Tags { html, pos: 0 }
}

/// Iterator returned by [`tags`].
#[derive(Debug)]
pub struct Tags<'h> {
    html: &'h str,
    pos: usize,
}

impl Iterator for Tags<'_> {
    type Item = (Range<usize>, Tag);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = tag_regex().captures_at(self.html, self.pos)?;
            let range = caps.get(0)?.range();
            self.pos = range.end;

            let Some(tag) = Tag::from_captures(&caps) else {
                continue;
            };
            if !tag.closing && !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str())
            {
                self.pos = raw_text_end(self.html, &tag.name, self.pos);
            }
            return Some((range, tag));
        }
    }
}

/// Offset of the `</name` that closes a raw-text element opened before
/// `from`, or the end of input.
fn raw_text_end(html: &str, name: &str, from: usize) -> usize {
    html[from..]
        .match_indices("</")
        .map(|(offset, _)| from + offset)
        .find(|&start| {
            html.get(start + 2..start + 2 + name.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        })
        .unwrap_or(html.len())
}

fn parse_attributes(raw: &str) -> Vec<Attribute> {
    attr_regex()
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()));
            Some(Attribute { name, value })
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Escapes a value for a double-quoted attribute.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Open elements enclosing the current scan position.
#[derive(Debug, Default)]
pub struct AncestorStack {
    frames: Vec<(String, Vec<String>)>,
}

impl AncestorStack {
    /// Tracks a start or end tag. Void elements are ignored.
    pub fn track(&mut self, tag: &Tag) {
        if tag.closing {
            if let Some(pos) = self.frames.iter().rposition(|(name, _)| *name == tag.name) {
                self.frames.truncate(pos);
            }
        } else if !tag.is_void() {
            self.frames.push((tag.name.clone(), tag.classes()));
        }
    }

    /// Class attribute of the innermost open element.
    #[must_use]
    pub fn parent_class(&self) -> String {
        self.frames
            .last()
            .map(|(_, classes)| classes.join(" "))
            .unwrap_or_default()
    }

    /// Classes of every open element, innermost first.
    #[must_use]
    pub fn ancestor_classes(&self) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .flat_map(|(_, classes)| classes.iter().cloned())
            .collect()
    }

    /// Returns whether an element with this name is open.
    #[must_use]
    pub fn is_inside(&self, name: &str) -> bool {
        self.frames.iter().any(|(n, _)| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_img_attributes() {
        let html = r#"<IMG src="images/a.jpg" alt='Logo &amp; mark' loading=lazy hidden />"#;
        let (range, tag) = tags(html).next().unwrap();

        assert_eq!(range, 0..html.len());
        assert_eq!(tag.name, "img");
        assert!(tag.self_closing);
        assert_eq!(tag.attr("src"), Some("images/a.jpg"));
        assert_eq!(tag.attr("alt"), Some("Logo & mark"));
        assert_eq!(tag.attr("loading"), Some("lazy"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert!(tag.attr("srcset").is_none());
    }

    #[test]
    fn test_comments_are_skipped() {
        let html = r#"<!-- <img src="x.png"> --><p class="a">"#;
        let names: Vec<_> = tags(html).map(|(_, t)| t.name).collect();
        assert_eq!(names, vec!["p"]);
    }

    #[test]
    fn test_script_and_style_bodies_are_not_scanned() {
        let html = concat!(
            r#"<script>var t = '<img src="a.jpg">';</script>"#,
            r#"<STYLE>p::before { content: "<b>"; }</Style>"#,
            r#"<img src="b.jpg">"#,
        );

        let parsed: Vec<_> = tags(html)
            .map(|(_, t)| (t.name, t.closing))
            .collect();

        assert_eq!(
            parsed,
            vec![
                ("script".to_string(), false),
                ("script".to_string(), true),
                ("style".to_string(), false),
                ("style".to_string(), true),
                ("img".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_unclosed_script_swallows_rest() {
        let names: Vec<_> = tags(r#"<p><script>if (a < b) { x = "<img>"; }"#)
            .map(|(_, t)| t.name)
            .collect();
        assert_eq!(names, vec!["p", "script"]);
    }

    #[test]
    fn test_gt_inside_quoted_value() {
        let html = r#"<img alt="a > b" src="c.png"><br>"#;
        let parsed: Vec<_> = tags(html).collect();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].1.attr("src"), Some("c.png"));
    }

    #[test]
    fn test_set_attr_and_render() {
        let html = r#"<img src="a.png">"#;
        let (_, mut tag) = tags(html).next().unwrap();

        tag.set_attr("src", "https://cdn/a.png?w=1&h=1");
        tag.set_attr("loading", "lazy");

        assert_eq!(
            tag.render(),
            r#"<img src="https://cdn/a.png?w=1&amp;h=1" loading="lazy">"#
        );
    }

    #[test]
    fn test_ancestor_stack() {
        let html = r#"<div class="gallery"><a class="gallery-item lightbox"><span><img src="a"></span></a></div>"#;
        let mut stack = AncestorStack::default();
        let mut seen = None;

        for (_, tag) in tags(html) {
            if tag.name == "img" {
                seen = Some((stack.parent_class(), stack.ancestor_classes()));
            }
            stack.track(&tag);
        }

        let (parent, ancestors) = seen.unwrap();
        assert_eq!(parent, "");
        assert_eq!(ancestors, vec!["gallery-item", "lightbox", "gallery"]);
        assert!(!stack.is_inside("div"));
    }
}
