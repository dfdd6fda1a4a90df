//! Rendered text of an element, close to what a reader gets by selecting the
//! element in a browser and copying it.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::ElementRef;

static BLOCK_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
        "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
        "hr", "li", "main", "nav", "ol", "pre", "section", "summary", "table", "ul",
    ]
    .into_iter()
    .collect()
});

static SKIPPED_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["head", "script", "style", "noscript", "template", "svg", "button"]
        .into_iter()
        .collect()
});

/// Collects the visible text of `element`, keeping line breaks from `<br>`,
/// block boundaries and preformatted text.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut builder = TextBuilder::default();
    walk(element, false, &mut builder);
    builder.finish()
}

fn walk(element: ElementRef<'_>, preformatted: bool, out: &mut TextBuilder) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_text(text, preformatted);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let node = child.value();
        let name = node.name();
        if SKIPPED_ELEMENTS.contains(name) || node.attr("hidden").is_some() {
            continue;
        }
        match name {
            "br" => out.line_break(),
            "tr" => {
                out.require_breaks(1);
                let outer_row = std::mem::replace(&mut out.row_has_cell, false);
                walk(child, preformatted, out);
                out.row_has_cell = outer_row;
                out.require_breaks(1);
            }
            "td" | "th" => {
                out.cell_separator();
                walk(child, preformatted, out);
            }
            "p" => {
                out.require_breaks(2);
                walk(child, preformatted, out);
                out.require_breaks(2);
            }
            _ if BLOCK_ELEMENTS.contains(name) => {
                let pre = preformatted || name == "pre";
                out.require_breaks(1);
                walk(child, pre, out);
                out.require_breaks(1);
            }
            "textarea" => walk(child, true, out),
            _ => walk(child, preformatted, out),
        }
    }
}

#[derive(Default)]
struct TextBuilder {
    out: String,
    pending_breaks: usize,
    pending_space: bool,
    row_has_cell: bool,
}

impl TextBuilder {
    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Adjacent block boundaries collapse to the largest requirement.
    fn require_breaks(&mut self, count: usize) {
        if !self.out.is_empty() {
            self.pending_breaks = self.pending_breaks.max(count);
        }
    }

    fn line_break(&mut self) {
        self.flush_breaks();
        self.out.push('\n');
        self.pending_space = false;
    }

    /// Every cell after the first in a row is preceded by a tab, even when
    /// earlier cells are empty.
    fn cell_separator(&mut self) {
        if self.row_has_cell {
            self.flush_breaks();
            self.out.push('\t');
            self.pending_space = false;
        }
        self.row_has_cell = true;
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks > 0 {
            let missing = self.pending_breaks - trailing_newlines(&self.out).min(self.pending_breaks);
            self.out.extend(std::iter::repeat('\n').take(missing));
            self.pending_breaks = 0;
            self.pending_space = false;
        }
    }

    fn push_text(&mut self, text: &str, preformatted: bool) {
        for ch in text.chars() {
            if preformatted {
                self.flush_breaks();
                self.out.push(ch);
                continue;
            }
            if is_collapsible(ch) {
                self.pending_space = true;
                continue;
            }
            self.flush_breaks();
            if self.pending_space && !self.at_line_start() && !self.out.ends_with('\t') {
                self.out.push(' ');
            }
            self.pending_space = false;
            self.out.push(ch);
        }
    }

    // Collapsed text never ends a line with a space, so only the edge
    // newlines need trimming; preformatted text stays as written.
    fn finish(self) -> String {
        self.out.trim_matches('\n').to_string()
    }
}

/// ASCII whitespace only; U+00A0 and friends survive as written.
fn is_collapsible(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn trailing_newlines(s: &str) -> usize {
    s.chars().rev().take_while(|&c| c == '\n').count()
}
