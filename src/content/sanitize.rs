use crate::util::{collapse_blank_lines, strip_control_chars};
use scraper::{ElementRef, Html, Node};
use serde::Deserialize;
use std::sync::Arc;

/// Converts untrusted HTML into safe output.
///
/// Implementations must be pure: identical input yields identical output,
/// and nothing executable (scripts, event handlers, `javascript:` URLs)
/// survives.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, raw_html: &str) -> String;
}

/// Selects one of the bundled sanitizers from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SanitizerKind {
    /// Strip all markup and return plain text.
    #[default]
    Text,
    /// Keep an allow-listed subset of formatting markup.
    Html,
}

impl SanitizerKind {
    pub fn build(self) -> Arc<dyn Sanitizer> {
        match self {
            SanitizerKind::Text => Arc::new(PlainTextSanitizer),
            SanitizerKind::Html => Arc::new(AllowListSanitizer),
        }
    }
}

/// Elements dropped together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object", "embed",
    "applet", "svg", "math", "head", "title", "meta", "link", "base", "textarea", "select",
    "button", "input",
];

fn is_dropped(name: &str) -> bool {
    DROPPED_ELEMENTS.contains(&name)
}

// ============================================================================
// Plain text
// ============================================================================

/// Strips every tag and returns readable plain text.
///
/// Block elements become line breaks and paragraphs become blank-line
/// separated, so the output keeps the rough shape of the article.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSanitizer;

impl Sanitizer for PlainTextSanitizer {
    fn sanitize(&self, raw_html: &str) -> String {
        if raw_html.trim().is_empty() {
            return String::new();
        }

        let fragment = Html::parse_fragment(raw_html);
        let mut out = String::with_capacity(raw_html.len() / 2);
        write_text(fragment.root_element(), &mut out);

        let text = collapse_blank_lines(&out);
        strip_control_chars(&text).into_owned()
    }
}

fn write_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(text, out),
            Node::Element(el) => {
                let name = el.name();
                if is_dropped(name) {
                    continue;
                }
                if name == "br" {
                    push_break(1, out);
                    continue;
                }
                let breaks = block_breaks(name);
                if name == "td" || name == "th" {
                    push_text(" ", out);
                }
                push_break(breaks, out);
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_text(child_el, out);
                }
                push_break(breaks, out);
            }
            _ => {}
        }
    }
}

/// Appends text with HTML whitespace semantics: runs collapse to one space
/// and no space is emitted at the start of a line.
fn push_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with([' ', '\n']) {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

/// Ensures the output ends with at least `newlines` line breaks.
fn push_break(newlines: usize, out: &mut String) {
    if newlines == 0 {
        return;
    }
    while out.ends_with(' ') {
        out.pop();
    }
    if out.is_empty() {
        return;
    }
    let existing = out.len() - out.trim_end_matches('\n').len();
    for _ in existing..newlines {
        out.push('\n');
    }
}

fn block_breaks(name: &str) -> usize {
    match name {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre" | "ul" | "ol"
        | "dl" | "table" | "figure" | "hr" => 2,
        "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "li" | "dt"
        | "dd" | "tr" | "figcaption" | "address" => 1,
        _ => 0,
    }
}

// ============================================================================
// Allow-listed HTML
// ============================================================================

/// Reduces markup to a small set of formatting elements.
///
/// Disallowed containers are unwrapped (their text is kept), dangerous
/// elements are removed with their content, and only a handful of
/// attributes survive. URL attributes must be relative or use `http`,
/// `https` or `mailto`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListSanitizer;

const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "cite", "code", "dd", "dl", "dt", "em", "figcaption",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q",
    "s", "small", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

fn allowed_attributes(element: &str) -> &'static [&'static str] {
    match element {
        "a" => &["href", "title"],
        "img" => &["src", "alt", "title"],
        "td" | "th" => &["colspan", "rowspan"],
        "blockquote" | "q" => &["cite"],
        "abbr" => &["title"],
        _ => &[],
    }
}

fn is_url_attribute(attr: &str) -> bool {
    matches!(attr, "href" | "src" | "cite")
}

impl Sanitizer for AllowListSanitizer {
    fn sanitize(&self, raw_html: &str) -> String {
        if raw_html.trim().is_empty() {
            return String::new();
        }

        let fragment = Html::parse_fragment(raw_html);
        let mut out = String::with_capacity(raw_html.len());
        write_allowed(fragment.root_element(), &mut out);

        strip_control_chars(out.trim()).into_owned()
    }
}

fn write_allowed(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => escape_into(text, false, out),
            Node::Element(el) => {
                let name = el.name();
                if is_dropped(name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if !ALLOWED_ELEMENTS.contains(&name) {
                    write_allowed(child_el, out);
                    continue;
                }

                out.push('<');
                out.push_str(name);
                for attr in allowed_attributes(name) {
                    let Some(value) = el.attr(attr) else {
                        continue;
                    };
                    let value = if is_url_attribute(attr) {
                        match safe_url(value) {
                            Some(url) => url,
                            None => continue,
                        }
                    } else {
                        value.to_string()
                    };
                    out.push(' ');
                    out.push_str(attr);
                    out.push_str("=\"");
                    escape_into(&value, true, out);
                    out.push('"');
                    if name == "a" && *attr == "href" {
                        out.push_str(" rel=\"noopener noreferrer\"");
                    }
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&name) {
                    continue;
                }
                write_allowed(child_el, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

/// Returns the cleaned URL when it is relative or uses an allowed scheme.
///
/// Whitespace and control characters are removed first; browsers ignore
/// them inside schemes, so `java\tscript:` must not slip through.
fn safe_url(value: &str) -> Option<String> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.find([':', '/', '?', '#']) {
        Some(idx) if cleaned[idx..].starts_with(':') => {
            let scheme = cleaned[..idx].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto").then_some(cleaned)
        }
        _ => Some(cleaned),
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
