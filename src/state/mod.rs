/// State management module
///
/// This module handles all persisted application state, including:
/// - The SQLite-backed key-value library (library.rs)
/// - The JSON store adapter over any backend (store.rs)
/// - Shared record structures and store keys (data.rs)
/// - Recent files, folders and recipients (collections.rs)
/// - Name filtering (search.rs)
/// - Tab selection and the introduction flag (router.rs)

pub mod library;
pub mod store;
pub mod data;
pub mod collections;
pub mod search;
pub mod router;

pub use collections::{Folders, NewFile, Recipients, RecentFiles, RECENT_FILES_CAP};
pub use data::{Credentials, FileKind, FileRecord, FolderRecord, Recipient};
pub use library::Library;
pub use router::{Router, Tab};
pub use store::{KeyValueBackend, MemoryBackend, Store};
