//! Message body normalization
//!
//! Rendered post HTML is reduced to plain text with a narrow markup subset:
//!
//! | HTML | Output |
//! |------|--------|
//! | quote block | `----------` divider before and after, flattened |
//! | `<a href>` | `[text](href)` or `[text](href "title")` |
//! | smiley `<img>` | its `alt` text |
//! | other `<img>` | `![alt](src)` |
//! | `<h1>`-`<h6>` | `**text**` and a line break |
//! | `<br>`, block elements | line breaks |

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Divider replacing the start and the end of every quote block
pub const QUOTE_DIVIDER: &str = "\n----------\n";

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "table", "pre", "fieldset", "dl", "dt", "dd",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "noscript"];

/// Converts post HTML into durable plain-text markup
#[derive(Debug, Clone)]
pub struct MessageNormalizer {
    smiley_pattern: String,
}

impl MessageNormalizer {
    /// Creates a normalizer
    ///
    /// # Arguments
    ///
    /// * `smiley_pattern` - Substring of image sources that are platform smileys
    pub fn new(smiley_pattern: &str) -> Self {
        Self {
            smiley_pattern: smiley_pattern.to_string(),
        }
    }

    /// Normalizes an HTML fragment
    ///
    /// # Examples
    ///
    /// ```
    /// use forum_archive::crawler::MessageNormalizer;
    ///
    /// let normalizer = MessageNormalizer::new("images/smilies/");
    /// let text = normalizer.normalize(
    ///     r#"Nice <img src="wcf/images/smilies/smile.png" alt=":)"> see <a href="http://x.test/">this</a>"#,
    /// );
    /// assert_eq!(text, "Nice :) see [this](http://x.test/)");
    /// ```
    pub fn normalize(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::new();
        self.render_children(fragment.root_element(), &mut out);
        tidy(&out)
    }

    fn render_children(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(out, text),
                Node::Element(_) => {
                    if let Some(child_elem) = ElementRef::wrap(child) {
                        self.render_element(child_elem, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn render_inner(&self, element: ElementRef<'_>) -> String {
        let mut inner = String::new();
        self.render_children(element, &mut inner);
        collapse_inline(&inner)
    }

    fn render_element(&self, element: ElementRef<'_>, out: &mut String) {
        let value = element.value();
        let name = value.name();

        if SKIPPED_ELEMENTS.contains(&name) {
            return;
        }

        if name == "blockquote" || value.classes().any(|c| c == "quoteBox") {
            out.push_str(QUOTE_DIVIDER);
            self.render_children(element, out);
            out.push_str(QUOTE_DIVIDER);
            return;
        }

        match name {
            "br" => out.push('\n'),
            "a" => {
                let inner = self.render_inner(element);
                match value.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
                    Some(href) => {
                        let text = if inner.is_empty() { href } else { inner.as_str() };
                        let title = value
                            .attr("title")
                            .or_else(|| value.attr("alt"))
                            .map(str::trim)
                            .filter(|t| !t.is_empty());
                        match title {
                            Some(title) => {
                                out.push_str(&format!("[{}]({} \"{}\")", text, href, title))
                            }
                            None => out.push_str(&format!("[{}]({})", text, href)),
                        }
                    }
                    None => out.push_str(&inner),
                }
            }
            "img" => {
                let alt = value.attr("alt").unwrap_or("").trim();
                match value.attr("src").map(str::trim).filter(|s| !s.is_empty()) {
                    Some(src) if !src.contains(self.smiley_pattern.as_str()) => {
                        out.push_str(&format!("![{}]({})", alt, src));
                    }
                    _ => out.push_str(alt),
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let inner = self.render_inner(element);
                if !inner.is_empty() {
                    out.push_str(&format!("**{}**", inner));
                }
                out.push('\n');
            }
            _ if BLOCK_ELEMENTS.contains(&name) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                self.render_children(element, out);
                out.push('\n');
            }
            _ => self.render_children(element, out),
        }
    }
}

/// Renders a reference to a locally stored attachment
///
/// Appended to a message body as its own line.
pub fn attachment_reference(local_path: &str) -> String {
    format!("\n[attachment]({})", local_path)
}

/// Appends text with whitespace runs collapsed to single spaces
fn push_text(out: &mut String, text: &str) {
    let leading = text.starts_with(char::is_whitespace);

    for (i, word) in text.split_whitespace().enumerate() {
        if (i > 0 || leading) && needs_space(out) {
            out.push(' ');
        }
        out.push_str(word);
    }

    if text.ends_with(char::is_whitespace) && needs_space(out) {
        out.push(' ');
    }
}

fn needs_space(out: &str) -> bool {
    !out.is_empty() && !out.ends_with(|c: char| c == ' ' || c == '\n')
}

/// Flattens link and heading text onto a single line
fn collapse_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims every line and collapses runs of blank lines to one
fn tidy(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    result.trim().to_string()
}
