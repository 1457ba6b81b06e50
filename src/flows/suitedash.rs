/// Simulated SuiteDash integration: connect and upload with progress
///
/// Nothing here talks to a network. Connecting waits a fixed delay and
/// records the credentials; uploading advances a progress counter on a fixed
/// tick until it reaches 100.

use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::task::{spawn_flow, FlowHandle, FlowKind, FlowSlot};
use crate::config::FlowTimings;
use crate::error::FlowError;
use crate::state::data::{iso_timestamp, Credentials, CREDENTIALS_KEY};
use crate::state::store::Store;

/// A SuiteDash project files can be uploaded to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub id: &'static str,
    pub name: &'static str,
    pub file_count: u32,
}

/// Projects offered once connected
pub const PROJECTS: [Project; 4] = [
    Project { id: "1", name: "Client Invoices", file_count: 12 },
    Project { id: "2", name: "Legal Documents", file_count: 8 },
    Project { id: "3", name: "Employee Records", file_count: 24 },
    Project { id: "4", name: "Contracts", file_count: 6 },
];

pub fn find_project(id: &str) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub api_key: String,
    pub company_url: String,
}

/// An established (simulated) connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub company_url: String,
    pub connected_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub project: Project,
    pub files: usize,
}

/// Progress after `ticks` ticks of `step` percentage points
pub fn upload_progress(ticks: u32, step: u8) -> u8 {
    ticks.saturating_mul(u32::from(step)).min(100) as u8
}

/// Number of ticks until progress first reaches 100
pub fn ticks_to_complete(step: u8) -> u32 {
    let step = u32::from(step.max(1));
    100u32.div_ceil(step)
}

/// Connection state plus the connect and upload slots
#[derive(Debug)]
pub struct SuiteDash {
    store: Store,
    timings: FlowTimings,
    connection: Arc<Mutex<Option<Connection>>>,
    connect_slot: FlowSlot,
    upload_slot: FlowSlot,
}

impl SuiteDash {
    /// Starts disconnected: saved credentials are not restored
    pub fn new(store: Store, timings: FlowTimings) -> Self {
        Self {
            store,
            timings,
            connection: Arc::new(Mutex::new(None)),
            connect_slot: FlowSlot::new(FlowKind::Connect),
            upload_slot: FlowSlot::new(FlowKind::Upload),
        }
    }

    pub fn connection(&self) -> Option<Connection> {
        self.connection.lock().ok().and_then(|c| c.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.connection().is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.connect_slot.is_pending()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_slot.is_pending()
    }

    /// Connect with an API key and company URL (both required).
    ///
    /// On settle the credentials are written to the store and the
    /// connection becomes active.
    pub fn connect(&mut self, request: ConnectRequest) -> Result<FlowHandle<Connection>, FlowError> {
        let api_key = request.api_key.trim().to_string();
        let company_url = request.company_url.trim().to_string();
        if api_key.is_empty() || company_url.is_empty() {
            return Err(FlowError::Invalid("API key and company URL are required"));
        }
        self.connect_slot.ensure_free()?;

        let delay = self.timings.connect_delay();
        let store = self.store.clone();
        let shared = self.connection.clone();

        let handle = spawn_flow(FlowKind::Connect, move |progress| async move {
            tokio::time::sleep(delay).await;

            let connected_at = iso_timestamp(Utc::now());
            store.write_value(
                CREDENTIALS_KEY,
                &Credentials {
                    api_key,
                    company_url: company_url.clone(),
                    connected_at: connected_at.clone(),
                },
            )?;

            let connection = Connection {
                company_url,
                connected_at,
            };
            if let Ok(mut slot) = shared.lock() {
                *slot = Some(connection.clone());
            }

            progress.set(100);
            tracing::info!(company_url = %connection.company_url, "connected to SuiteDash");
            Ok::<_, FlowError>(connection)
        });

        self.connect_slot.occupy(&handle);
        Ok(handle)
    }

    /// Drop the connection and abort any pending connect or upload
    pub fn disconnect(&mut self) {
        self.connect_slot.cancel();
        self.upload_slot.cancel();
        if let Ok(mut connection) = self.connection.lock() {
            if connection.take().is_some() {
                tracing::info!("disconnected from SuiteDash");
            }
        }
    }

    /// Upload `files` recent files to the project with `project_id`
    pub fn upload(&mut self, project_id: &str, files: usize) -> Result<FlowHandle<UploadReceipt>, FlowError> {
        if !self.is_connected() {
            return Err(FlowError::NotConnected);
        }
        let project = *find_project(project_id).ok_or(FlowError::Invalid("select a project"))?;
        self.upload_slot.ensure_free()?;

        let tick = self.timings.upload_tick();
        let step = self.timings.upload_step.max(1);

        let handle = spawn_flow(FlowKind::Upload, move |progress| async move {
            let mut ticks = 0u32;
            loop {
                tokio::time::sleep(tick).await;
                ticks += 1;
                let percent = upload_progress(ticks, step);
                progress.set(percent);
                tracing::trace!(percent, "upload progress");
                if percent >= 100 {
                    break;
                }
            }

            tracing::info!(project = project.name, files, "upload complete");
            Ok::<_, FlowError>(UploadReceipt { project, files })
        });

        self.upload_slot.occupy(&handle);
        Ok(handle)
    }

    pub fn cancel_upload(&mut self) -> bool {
        self.upload_slot.cancel()
    }

    pub fn cancel_connect(&mut self) -> bool {
        self.connect_slot.cancel()
    }
}
