//! Hand-off between the coordinator and the page worker.
//!
//! Every request spawns a fresh worker that loads the target, builds the
//! extractor and answers exactly once over an mpsc channel. A worker that
//! exits without sending shows up as a disconnected channel.

use std::sync::mpsc;
use std::thread;

use scraper::Html;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::BridgeError;
use crate::extractor::Extractor;
use crate::protocol::{ExtractRequest, ExtractResponse};
use crate::target::PageTarget;

pub type Outcome = Result<ExtractResponse, BridgeError>;

pub fn dispatch(
    target: PageTarget,
    request: &ExtractRequest,
    config: &AppConfig,
) -> Result<mpsc::Receiver<Outcome>, BridgeError> {
    let payload = serde_json::to_string(request)?;
    let config = config.clone();
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("page-worker".into())
        .spawn(move || match serve(&target, &payload, &config) {
            Ok(Some(response)) => {
                let _ = tx.send(Ok(response));
            }
            // No listener answered; dropping `tx` signals that.
            Ok(None) => debug!(%target, "page worker finished without a reply"),
            Err(err) => {
                let _ = tx.send(Err(err));
            }
        })
        .map_err(BridgeError::Spawn)?;
    Ok(rx)
}

/// Page-side half of the round trip.
pub fn serve(
    target: &PageTarget,
    payload: &str,
    config: &AppConfig,
) -> Result<Option<ExtractResponse>, BridgeError> {
    let extractor = Extractor::new(&config.patterns, config.assistant_label.clone())?;
    let html = target.load(config.fetch_timeout())?;
    let document = Html::parse_document(&html);
    let request: ExtractRequest = serde_json::from_str(payload)?;
    Ok(extractor.handle_message(&document, &request))
}

/// Blocks until the worker answers or hangs up.
pub fn wait(rx: &mpsc::Receiver<Outcome>) -> Outcome {
    rx.recv().unwrap_or(Err(BridgeError::NoResponse))
}
