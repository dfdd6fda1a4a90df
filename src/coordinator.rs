//! Trigger extraction, wait for the single reply, hand it to the clipboard.

use std::fmt;
use std::sync::mpsc::{self, TryRecvError};

use num_format::{Locale, ToFormattedString};
use tracing::{error, info, warn};

use crate::bridge::{self, Outcome};
use crate::clipboard::ClipboardSink;
use crate::config::AppConfig;
use crate::error::BridgeError;
use crate::protocol::ExtractRequest;
use crate::target::PageTarget;

/// Text shown in the status field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Copied,
    CopyFailed,
    ConnectError,
    NoContent,
}

impl Status {
    pub fn text(&self) -> &'static str {
        match self {
            Status::Idle => "",
            Status::Copied => "Copied!",
            Status::CopyFailed => "Failed to copy.",
            Status::ConnectError => "Error: Could not connect.",
            Status::NoContent => "No chat content found.",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Turns the worker's reply into a status, writing to the clipboard only when
/// there is something to write.
pub fn settle(outcome: &Outcome, clipboard: &mut dyn ClipboardSink) -> Status {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            error!("could not reach page: {}", err);
            return Status::ConnectError;
        }
    };
    match response.data.as_deref() {
        Some(data) if !data.is_empty() => match clipboard.write_text(data) {
            Ok(()) => Status::Copied,
            Err(err) => {
                warn!("{}", err);
                Status::CopyFailed
            }
        },
        _ => Status::NoContent,
    }
}

/// What one successful copy put on the clipboard. `messages` is unknown when
/// the page answered with the no-conversation sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub messages: Option<usize>,
    pub chars: usize,
}

impl CopySummary {
    pub fn describe(&self) -> String {
        let chars = counted(self.chars, "character");
        match self.messages {
            Some(messages) => format!("{}, {chars} copied", counted(messages, "message")),
            None => format!("{chars} copied"),
        }
    }
}

fn counted(n: usize, noun: &str) -> String {
    let suffix = if n == 1 { "" } else { "s" };
    format!("{} {noun}{suffix}", n.to_formatted_string(&Locale::en))
}

/// Drives copy requests for the UI. Each trigger is independent; whichever
/// reply settles last owns the status.
pub struct Coordinator<C: ClipboardSink> {
    clipboard: C,
    pending: Vec<mpsc::Receiver<Outcome>>,
    status: Status,
    last_copied: Option<CopySummary>,
}

impl<C: ClipboardSink> Coordinator<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            clipboard,
            pending: Vec::new(),
            status: Status::Idle,
            last_copied: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_copied(&self) -> Option<CopySummary> {
        self.last_copied
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn trigger(&mut self, target_input: &str, format_as_markdown: bool, config: &AppConfig) {
        self.status = Status::Idle;
        let request = ExtractRequest::get_chat_content(format_as_markdown);
        let dispatched = PageTarget::parse(target_input)
            .map_err(BridgeError::from)
            .and_then(|target| {
                info!(%target, markdown = format_as_markdown, "requesting chat content");
                bridge::dispatch(target, &request, config)
            });
        match dispatched {
            Ok(rx) => self.pending.push(rx),
            Err(err) => {
                self.apply(Err(err));
            }
        }
    }

    /// Settles every reply that has arrived, returning the latest successful
    /// copy among them. Other requests may still be outstanding.
    pub fn poll(&mut self) -> Option<CopySummary> {
        let mut arrived = Vec::new();
        self.pending.retain(|rx| match rx.try_recv() {
            Ok(outcome) => {
                arrived.push(outcome);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                arrived.push(Err(BridgeError::NoResponse));
                false
            }
        });
        let mut copied = None;
        for outcome in arrived {
            if let Some(summary) = self.apply(outcome) {
                copied = Some(summary);
            }
        }
        copied
    }

    /// Blocks until every outstanding reply has settled.
    pub fn wait(&mut self) -> Status {
        for rx in std::mem::take(&mut self.pending) {
            self.apply(bridge::wait(&rx));
        }
        self.status
    }

    fn apply(&mut self, outcome: Outcome) -> Option<CopySummary> {
        self.status = settle(&outcome, &mut self.clipboard);
        if self.status != Status::Copied {
            return None;
        }
        let response = outcome.ok()?;
        let summary = CopySummary {
            messages: response.message_count,
            chars: response.data.map_or(0, |data| data.chars().count()),
        };
        self.last_copied = Some(summary);
        Some(summary)
    }
}
