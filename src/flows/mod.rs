/// Simulated integration flows
///
/// - Cancellable task handles, progress and slots (task.rs)
/// - Sending files to recipients and share links (share.rs)
/// - SuiteDash connect and upload (suitedash.rs)

pub mod task;
pub mod share;
pub mod suitedash;

pub use share::{share_link, FileSelection, ShareFlow, ShareReceipt, ShareRequest};
pub use suitedash::{ConnectRequest, Connection, Project, SuiteDash, UploadReceipt, PROJECTS};
pub use task::{FlowCanceller, FlowHandle, FlowKind, FlowSlot};
