//! Structural patterns: which document nodes carry chat turns and who wrote them.
//!
//! The defaults track Perplexity's markup and will need updating whenever the
//! page structure changes.

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::extractor::Author;

/// Selectors and class markers, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// The first user query, rendered as a heading.
    pub user_heading: String,
    /// Follow-up user queries.
    pub user_query: String,
    /// Assistant answer blocks.
    pub assistant: String,
    pub heading_tag: String,
    pub query_marker: String,
    pub prose_marker: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            user_heading: r#"h1[class*="group/query"]"#.into(),
            user_query: r#"div[class*="group/query"]"#.into(),
            assistant: r#"div[class*="prose"]"#.into(),
            heading_tag: "h1".into(),
            query_marker: "group/query".into(),
            prose_marker: "prose".into(),
        }
    }
}

impl PatternConfig {
    fn selectors(&self) -> [&str; 3] {
        [&self.user_heading, &self.user_query, &self.assistant]
    }
}

/// Patterns compiled into a single selector list plus the markers used to
/// classify each match.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    selector: Selector,
    heading_tag: String,
    query_marker: String,
    prose_marker: String,
}

impl CompiledPatterns {
    pub fn compile(config: &PatternConfig) -> Result<Self, PatternError> {
        // Parse each part on its own first so a bad entry is reported by name.
        for part in config.selectors() {
            parse_selector(part)?;
        }
        let joined = config.selectors().join(", ");
        Ok(Self {
            selector: parse_selector(&joined)?,
            heading_tag: config.heading_tag.clone(),
            query_marker: config.query_marker.clone(),
            prose_marker: config.prose_marker.clone(),
        })
    }

    /// All matching elements, in document order.
    pub fn select<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        document.select(&self.selector)
    }

    /// Infers the author of a matched element. Elements that fit neither role
    /// yield `None` and are dropped by the extractor.
    pub fn classify(&self, element: &Element) -> Option<Author> {
        let class = element.attr("class").unwrap_or("");
        if element.name().eq_ignore_ascii_case(&self.heading_tag)
            || contains_marker(class, &self.query_marker)
        {
            Some(Author::User)
        } else if contains_marker(class, &self.prose_marker) {
            Some(Author::Assistant)
        } else {
            None
        }
    }
}

// Substring match on the raw attribute, so `group/query` also hits
// `group/query-item` the way the page's own markup expects.
fn contains_marker(class: &str, marker: &str) -> bool {
    !marker.is_empty() && class.contains(marker)
}

fn parse_selector(selector: &str) -> Result<Selector, PatternError> {
    Selector::parse(selector).map_err(|err| PatternError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}
