//! Copies a chat transcript from a web page to the clipboard.

pub mod app;
pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod inner_text;
pub mod patterns;
pub mod protocol;
pub mod target;
