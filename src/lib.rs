//! Smart Scan: scan documents, organize them into folders and share them.
//!
//! The library holds every rule of the app; the `smart-scan` binary only
//! draws it with iced.

pub mod capture;
pub mod config;
pub mod error;
pub mod flows;
pub mod logging;
pub mod platform;
pub mod state;
