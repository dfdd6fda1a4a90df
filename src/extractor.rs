//! Conversation reconstruction: matched nodes in, formatted transcript out.

use scraper::Html;
use tracing::{debug, info};

use crate::error::PatternError;
use crate::inner_text::inner_text;
use crate::patterns::{CompiledPatterns, PatternConfig};
use crate::protocol::{ExtractRequest, ExtractResponse, GET_CHAT_CONTENT};

/// Returned in place of a transcript when no node matched any pattern.
pub const NO_CONVERSATION: &str = "No conversation found. The page structure may have changed.";

pub const DEFAULT_ASSISTANT_LABEL: &str = "Perplexity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn label<'a>(&self, assistant_label: &'a str) -> &'a str {
        match self {
            Author::User => "User",
            Author::Assistant => assistant_label,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Plain,
    Markdown,
}

impl From<bool> for Format {
    fn from(markdown: bool) -> Self {
        if markdown {
            Format::Markdown
        } else {
            Format::Plain
        }
    }
}

/// One matched document node. `author` is `None` when the node fit no role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    pub author: Option<Author>,
    pub text: String,
}

impl MessageNode {
    pub fn new(author: Option<Author>, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: Author,
    pub content: String,
}

/// Messages in document order. Adjacent messages never share an author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    /// Folds matched nodes into messages, merging consecutive nodes from the
    /// same author with a blank line between them. Unclassified nodes are
    /// dropped without ending the current run.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = MessageNode>,
    {
        let messages = nodes.into_iter().fold(Vec::<Message>::new(), |mut acc, node| {
            let Some(author) = node.author else {
                return acc;
            };
            match acc.last_mut() {
                Some(current) if current.author == author => {
                    current.content.push_str("\n\n");
                    current.content.push_str(&node.text);
                }
                _ => acc.push(Message {
                    author,
                    content: node.text,
                }),
            }
            acc
        });
        Self(messages)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.0.iter()
    }

    pub fn render(&self, format: Format, assistant_label: &str) -> String {
        let mut out = String::new();
        for message in &self.0 {
            let author = message.author.label(assistant_label);
            match format {
                Format::Plain => out.push_str(&format!("{author}:\n{}\n\n", message.content)),
                Format::Markdown => {
                    let indented = message.content.replace('\n', "\n  ");
                    out.push_str(&format!("* **{author}:**\n  {indented}\n\n"));
                }
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Runs the structural patterns against a parsed page.
#[derive(Debug, Clone)]
pub struct Extractor {
    patterns: CompiledPatterns,
    assistant_label: String,
}

impl Extractor {
    pub fn new(
        patterns: &PatternConfig,
        assistant_label: impl Into<String>,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            patterns: CompiledPatterns::compile(patterns)?,
            assistant_label: assistant_label.into(),
        })
    }

    pub fn collect_nodes(&self, document: &Html) -> Vec<MessageNode> {
        self.patterns
            .select(document)
            .map(|element| {
                let author = self.patterns.classify(element.value());
                if author.is_none() {
                    debug!(tag = element.value().name(), "skipping unclassified node");
                }
                MessageNode {
                    author,
                    text: inner_text(element),
                }
            })
            .collect()
    }

    /// `None` when nothing on the page matched.
    pub fn transcript(&self, document: &Html) -> Option<Transcript> {
        let nodes = self.collect_nodes(document);
        if nodes.is_empty() {
            return None;
        }
        Some(Transcript::from_nodes(nodes))
    }

    pub fn extract_conversation(&self, document: &Html, format: Format) -> String {
        self.reply(document, format).data.unwrap_or_default()
    }

    /// Page-side listener. Only `getChatContent` is answered.
    pub fn handle_message(
        &self,
        document: &Html,
        request: &ExtractRequest,
    ) -> Option<ExtractResponse> {
        if request.action != GET_CHAT_CONTENT {
            debug!(action = %request.action, "ignoring unknown request");
            return None;
        }
        Some(self.reply(document, request.format()))
    }

    fn reply(&self, document: &Html, format: Format) -> ExtractResponse {
        match self.transcript(document) {
            Some(transcript) => ExtractResponse {
                data: Some(transcript.render(format, &self.assistant_label)),
                message_count: Some(transcript.len()),
            },
            None => {
                info!("no chat messages found with the current selectors");
                ExtractResponse {
                    data: Some(NO_CONVERSATION.to_string()),
                    message_count: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> MessageNode {
        MessageNode::new(Some(Author::User), text)
    }

    fn assistant(text: &str) -> MessageNode {
        MessageNode::new(Some(Author::Assistant), text)
    }

    fn authors(transcript: &Transcript) -> Vec<Author> {
        transcript.iter().map(|m| m.author).collect()
    }

    fn extractor() -> Extractor {
        Extractor::new(&PatternConfig::default(), DEFAULT_ASSISTANT_LABEL).unwrap()
    }

    #[test]
    fn user_then_assistant_gives_two_messages() {
        let transcript = Transcript::from_nodes([user("Q"), assistant("A")]);
        assert_eq!(authors(&transcript), [Author::User, Author::Assistant]);
    }

    #[test]
    fn consecutive_same_author_nodes_merge() {
        let transcript =
            Transcript::from_nodes([assistant("A"), assistant("B"), assistant("C")]);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.iter().next().unwrap().content, "A\n\nB\n\nC");
    }

    #[test]
    fn author_switches_are_not_merged() {
        let transcript =
            Transcript::from_nodes([user("Q1"), assistant("R1"), user("Q2"), assistant("R2")]);
        let contents: Vec<&str> = transcript.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["Q1", "R1", "Q2", "R2"]);
        assert_eq!(
            authors(&transcript),
            [Author::User, Author::Assistant, Author::User, Author::Assistant]
        );
    }

    // Unclassified nodes vanish, and the run around them still merges.
    #[test]
    fn unclassified_nodes_are_dropped_silently() {
        let transcript = Transcript::from_nodes([
            assistant("A"),
            MessageNode::new(None, "stray"),
            assistant("B"),
        ]);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.iter().next().unwrap().content, "A\n\nB");

        let only_stray = Transcript::from_nodes([MessageNode::new(None, "stray")]);
        assert!(only_stray.is_empty());
        assert_eq!(only_stray.render(Format::Plain, "Perplexity"), "");
    }

    #[test]
    fn plain_rendering() {
        let transcript = Transcript::from_nodes([user("Hi"), assistant("Line 1\nLine 2\n\n")]);
        assert_eq!(
            transcript.render(Format::Plain, "Perplexity"),
            "User:\nHi\n\nPerplexity:\nLine 1\nLine 2"
        );
    }

    #[test]
    fn markdown_rendering_indents_every_line() {
        let transcript = Transcript::from_nodes([user("Why?"), assistant("One\nTwo"), assistant("Three")]);
        assert_eq!(
            transcript.render(Format::Markdown, "Bot"),
            "* **User:**\n  Why?\n\n* **Bot:**\n  One\n  Two\n  \n  Three"
        );
    }

    #[test]
    fn sentinel_when_nothing_matches() {
        let document = Html::parse_document("<html><body><p>Just a page</p></body></html>");
        assert_eq!(
            extractor().extract_conversation(&document, Format::Plain),
            NO_CONVERSATION
        );
        assert_eq!(
            extractor().extract_conversation(&document, Format::Markdown),
            NO_CONVERSATION
        );
    }

    #[test]
    fn end_to_end_plain() {
        let document = Html::parse_document(
            r#"<main>
                 <h1 class="group/query text-xl">What is X?</h1>
                 <div class="prose dark:prose-invert"><p>X is Y.</p></div>
               </main>"#,
        );
        assert_eq!(
            extractor().extract_conversation(&document, Format::Plain),
            "User:\nWhat is X?\n\nPerplexity:\nX is Y."
        );
    }

    #[test]
    fn handle_message_ignores_other_actions() {
        let document = Html::parse_document("<h1 class=\"group/query\">Q</h1>");
        let request = ExtractRequest {
            action: "somethingElse".into(),
            format_as_markdown: false,
        };
        assert_eq!(extractor().handle_message(&document, &request), None);

        let reply = extractor()
            .handle_message(&document, &ExtractRequest::get_chat_content(true))
            .unwrap();
        assert_eq!(reply.data.as_deref(), Some("* **User:**\n  Q"));
        assert_eq!(reply.message_count, Some(1));
    }

    #[test]
    fn sentinel_reply_carries_no_message_count() {
        let document = Html::parse_document("<p>nothing</p>");
        let reply = extractor()
            .handle_message(&document, &ExtractRequest::get_chat_content(false))
            .unwrap();
        assert_eq!(reply.data.as_deref(), Some(NO_CONVERSATION));
        assert_eq!(reply.message_count, None);
    }
}
