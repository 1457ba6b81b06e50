/// Simulated "send files to employees" flow and share links

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::task::{spawn_flow, FlowHandle, FlowKind, FlowSlot};
use crate::error::FlowError;
use crate::state::data::Recipient;

/// Base URL of generated share links
pub const SHARE_LINK_BASE: &str = "https://smartscan.app/share/";

/// Quick selection presets offered on the share screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSelection {
    #[default]
    None,
    /// The three most recent files
    Recent,
    /// Everything scanned today
    Today,
}

impl FileSelection {
    pub const ALL: [FileSelection; 3] = [FileSelection::Recent, FileSelection::Today, FileSelection::None];

    /// Number of files the preset stands for
    pub const fn count(self) -> usize {
        match self {
            FileSelection::None => 0,
            FileSelection::Recent => 3,
            FileSelection::Today => 7,
        }
    }

    pub fn label(self) -> String {
        match self {
            FileSelection::None => "None".to_string(),
            FileSelection::Recent => format!("Recent ({})", self.count()),
            FileSelection::Today => format!("Today ({})", self.count()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub files: usize,
    pub recipients: Vec<Recipient>,
    pub message: String,
}

/// What a settled share reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReceipt {
    pub files: usize,
    pub recipients: usize,
    pub message: Option<String>,
}

/// Owner of the share-send slot
#[derive(Debug)]
pub struct ShareFlow {
    delay: Duration,
    slot: FlowSlot,
}

impl ShareFlow {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: FlowSlot::new(FlowKind::Share),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    /// Start sending. Requires at least one selected file.
    pub fn start(&mut self, request: ShareRequest) -> Result<FlowHandle<ShareReceipt>, FlowError> {
        if request.files == 0 {
            return Err(FlowError::Invalid("no files selected"));
        }
        self.slot.ensure_free()?;

        let delay = self.delay;
        let handle = spawn_flow(FlowKind::Share, move |progress| async move {
            tokio::time::sleep(delay).await;
            progress.set(100);

            let message = request.message.trim();
            let receipt = ShareReceipt {
                files: request.files,
                recipients: request.recipients.len(),
                message: (!message.is_empty()).then(|| message.to_string()),
            };
            tracing::info!(files = receipt.files, recipients = receipt.recipients, "files shared");
            Ok::<_, FlowError>(receipt)
        });

        self.slot.occupy(&handle);
        Ok(handle)
    }

    pub fn cancel(&mut self) -> bool {
        self.slot.cancel()
    }
}

/// Shareable link stamped with the current time in milliseconds
pub fn share_link(now: DateTime<Utc>) -> String {
    format!("{}{}", SHARE_LINK_BASE, now.timestamp_millis())
}
