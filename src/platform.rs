/// OS-boundary capabilities: clipboard and native share sheet

use chrono::{DateTime, Utc};

use crate::error::PlatformError;
use crate::flows::share::share_link;

/// What is handed to the share sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), PlatformError>;
}

pub trait ShareSheet {
    /// Present the native share UI. `ShareUnsupported` triggers the clipboard fallback.
    fn share(&self, payload: &SharePayload) -> Result<(), PlatformError>;
}

/// Share sheet for platforms without one
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedShareSheet;

impl ShareSheet for UnsupportedShareSheet {
    fn share(&self, _payload: &SharePayload) -> Result<(), PlatformError> {
        Err(PlatformError::ShareUnsupported)
    }
}

/// Clipboard that holds text until the UI flushes it to the system clipboard
#[derive(Debug, Default, Clone)]
pub struct BufferedClipboard {
    pending: Option<String>,
}

impl BufferedClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the text written since the last call
    pub fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Clipboard for BufferedClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), PlatformError> {
        self.pending = Some(text.to_string());
        Ok(())
    }
}

/// How a share request was fulfilled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The share sheet was unavailable; this text went to the clipboard
    Copied(String),
}

/// Invoke the share sheet, falling back to copying the text
pub fn share_or_copy(
    sheet: &dyn ShareSheet,
    clipboard: &mut dyn Clipboard,
    payload: &SharePayload,
) -> Result<ShareOutcome, PlatformError> {
    match sheet.share(payload) {
        Ok(()) => Ok(ShareOutcome::Shared),
        Err(PlatformError::ShareUnsupported) => {
            let text = if payload.text.is_empty() {
                payload.title.clone()
            } else {
                payload.text.clone()
            };
            clipboard.write_text(&text)?;
            tracing::info!(title = %payload.title, "share sheet unsupported, copied to clipboard");
            Ok(ShareOutcome::Copied(text))
        }
    }
}

/// Generate a share link and copy it to the clipboard
pub fn copy_share_link(clipboard: &mut dyn Clipboard, now: DateTime<Utc>) -> Result<String, PlatformError> {
    let link = share_link(now);
    clipboard.write_text(&link)?;
    tracing::info!(%link, "share link copied");
    Ok(link)
}
