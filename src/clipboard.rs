use clipboard::{ClipboardContext, ClipboardProvider};

use crate::error::ClipboardError;

/// Somewhere to put the copied transcript.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The host's shared clipboard. The context is kept alive after the first
/// write because some platforms only serve the contents while it exists.
#[derive(Default)]
pub struct SystemClipboard {
    context: Option<ClipboardContext>,
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let context = match self.context.take() {
            Some(context) => context,
            None => ClipboardContext::new()
                .map_err(|err| ClipboardError::Unavailable(err.to_string()))?,
        };
        self.context
            .insert(context)
            .set_contents(text.to_owned())
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }
}
