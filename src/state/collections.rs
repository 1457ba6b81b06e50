/// Persisted entity collections: recent files, folders and share recipients
///
/// Each collection owns one store key. Mutation is always
/// "read list, transform list, write list back"; nothing is updated in place.

use chrono::{DateTime, Utc};

use super::data::{
    iso_timestamp, next_record_id, FileRecord, FolderRecord, Recipient, EMPLOYEES_KEY,
    FOLDERS_KEY, RECENT_FILES_KEY,
};
use super::search::filter_by_name;
use super::store::Store;
use crate::error::StoreError;

/// Maximum number of entries kept in the recent-files list
pub const RECENT_FILES_CAP: usize = 10;

/// Fields supplied when creating a file record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub file_type: String,
    pub size: String,
    pub thumbnail: Option<String>,
}

/// The ten most recent files, newest first
#[derive(Debug, Clone)]
pub struct RecentFiles {
    store: Store,
}

impl RecentFiles {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All recent files, optionally filtered by name
    pub fn list(&self, filter: Option<&str>) -> Vec<FileRecord> {
        let files: Vec<FileRecord> = self.store.read(RECENT_FILES_KEY);
        filter_by_name(&files, filter)
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.list(None).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a file record and prepend it, evicting the oldest beyond the cap.
    ///
    /// A blank name is a no-op and returns `Ok(None)`.
    pub fn create(&self, new_file: NewFile) -> Result<Option<FileRecord>, StoreError> {
        if new_file.name.trim().is_empty() {
            return Ok(None);
        }
        self.insert(new_file).map(Some)
    }

    /// Prepend a file record without validating its name
    pub fn insert(&self, new_file: NewFile) -> Result<FileRecord, StoreError> {
        self.insert_at(new_file, Utc::now())
    }

    /// Prepend a file record whose id and date come from `now`
    pub fn insert_at(&self, new_file: NewFile, now: DateTime<Utc>) -> Result<FileRecord, StoreError> {
        let record = FileRecord {
            id: next_record_id(now),
            name: new_file.name.trim().to_string(),
            file_type: new_file.file_type,
            size: new_file.size,
            date: iso_timestamp(now),
            folder_id: None,
            thumbnail: new_file.thumbnail,
        };

        self.store
            .prepend(RECENT_FILES_KEY, record.clone(), Some(RECENT_FILES_CAP))?;

        tracing::info!(id = %record.id, name = %record.name, "file saved to recent files");
        Ok(record)
    }
}

/// User folders, newest first
#[derive(Debug, Clone)]
pub struct Folders {
    store: Store,
}

impl Folders {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn list(&self, filter: Option<&str>) -> Vec<FolderRecord> {
        let folders: Vec<FolderRecord> = self.store.read(FOLDERS_KEY);
        filter_by_name(&folders, filter)
    }

    /// Create a folder named `name` (trimmed). Blank names are ignored.
    pub fn create(&self, name: &str) -> Result<Option<FolderRecord>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let folder = FolderRecord {
            id: next_record_id(now),
            name: name.to_string(),
            file_count: 0,
            created_at: iso_timestamp(now),
        };

        self.store.prepend(FOLDERS_KEY, folder.clone(), None)?;

        tracing::info!(id = %folder.id, name = %folder.name, "folder created");
        Ok(Some(folder))
    }
}

/// Share recipients in insertion order
#[derive(Debug, Clone)]
pub struct Recipients {
    store: Store,
}

impl Recipients {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn list(&self, filter: Option<&str>) -> Vec<Recipient> {
        let recipients: Vec<Recipient> = self.store.read(EMPLOYEES_KEY);
        filter_by_name(&recipients, filter)
    }

    /// Add a recipient (trimmed). Duplicates are allowed; blank input is ignored.
    pub fn create(&self, recipient: &str) -> Result<Option<Recipient>, StoreError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Ok(None);
        }

        self.store.append(EMPLOYEES_KEY, recipient.to_string())?;

        tracing::info!(recipient, "recipient added");
        Ok(Some(recipient.to_string()))
    }

    /// Remove the recipient at `index`. Out-of-range indexes are ignored.
    pub fn remove(&self, index: usize) -> Result<Option<Recipient>, StoreError> {
        let mut recipients: Vec<Recipient> = self.store.try_read(EMPLOYEES_KEY)?;
        if index >= recipients.len() {
            return Ok(None);
        }

        let removed = recipients.remove(index);
        self.store.write(EMPLOYEES_KEY, &recipients)?;

        tracing::info!(recipient = %removed, index, "recipient removed");
        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::{KeyValueBackend, MemoryBackend};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Backend whose next read fails once
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryBackend,
        fail_next_get: AtomicBool,
    }

    impl FlakyBackend {
        fn fail_next_read(&self) {
            self.fail_next_get.store(true, Ordering::SeqCst);
        }
    }

    impl KeyValueBackend for FlakyBackend {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Poisoned);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }
    }

    fn scan(name: &str) -> NewFile {
        NewFile {
            name: name.to_string(),
            file_type: "jpg".into(),
            size: "1.8 MB".into(),
            thumbnail: None,
        }
    }

    #[test]
    fn test_recent_files_capped_at_ten() {
        let files = RecentFiles::new(Store::in_memory());

        for i in 0..11 {
            files.create(scan(&format!("scan-{}", i))).unwrap();
        }

        let listed = files.list(None);
        assert_eq!(listed.len(), RECENT_FILES_CAP);
        // Newest first, oldest ("scan-0") evicted
        assert_eq!(listed[0].name, "scan-10");
        assert_eq!(listed[9].name, "scan-1");
        assert!(listed.iter().all(|f| f.name != "scan-0"));
    }

    #[test]
    fn test_recent_file_ids_are_unique() {
        let files = RecentFiles::new(Store::in_memory());
        let a = files.create(scan("a")).unwrap().unwrap();
        let b = files.create(scan("b")).unwrap().unwrap();
        assert_ne!(a.id, b.id);
        assert!(b.folder_id.is_none());
    }

    #[test]
    fn test_blank_folder_name_is_noop() {
        let folders = Folders::new(Store::in_memory());
        folders.create("Invoices").unwrap();

        assert!(folders.create("").unwrap().is_none());
        assert!(folders.create("   ").unwrap().is_none());
        assert_eq!(folders.list(None).len(), 1);
    }

    #[test]
    fn test_folder_created_trimmed_and_prepended() {
        let folders = Folders::new(Store::in_memory());
        folders.create("First").unwrap();
        let second = folders.create("  Second  ").unwrap().unwrap();

        assert_eq!(second.name, "Second");
        assert_eq!(second.file_count, 0);
        let names: Vec<String> = folders.list(None).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn test_folders_not_deduplicated() {
        let folders = Folders::new(Store::in_memory());
        folders.create("Same").unwrap();
        folders.create("Same").unwrap();
        assert_eq!(folders.list(None).len(), 2);
    }

    #[test]
    fn test_folder_filter() {
        let folders = Folders::new(Store::in_memory());
        // Created oldest first so the list reads Invoices, invoice-2024, Contracts
        folders.create("Contracts").unwrap();
        folders.create("invoice-2024").unwrap();
        folders.create("Invoices").unwrap();

        let names: Vec<String> = folders
            .list(Some("invoice"))
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Invoices", "invoice-2024"]);
    }

    #[test]
    fn test_blank_file_name_is_noop() {
        let files = RecentFiles::new(Store::in_memory());
        assert!(files.create(scan("  ")).unwrap().is_none());
        assert!(files.is_empty());
    }

    #[test]
    fn test_recipient_removal() {
        let recipients = Recipients::new(Store::in_memory());
        for r in ["a@x.com", "b@x.com", "c@x.com"] {
            recipients.create(r).unwrap();
        }

        let removed = recipients.remove(1).unwrap();

        assert_eq!(removed.as_deref(), Some("b@x.com"));
        assert_eq!(recipients.list(None), vec!["a@x.com", "c@x.com"]);
    }

    #[test]
    fn test_recipient_remove_out_of_range_is_noop() {
        let recipients = Recipients::new(Store::in_memory());
        recipients.create("a@x.com").unwrap();

        assert!(recipients.remove(5).unwrap().is_none());
        assert_eq!(recipients.list(None).len(), 1);
    }

    #[test]
    fn test_recipients_allow_duplicates_and_ignore_blank() {
        let recipients = Recipients::new(Store::in_memory());
        recipients.create("employee@company.com").unwrap();
        recipients.create("employee@company.com").unwrap();
        recipients.create("  ").unwrap();
        assert_eq!(recipients.list(None).len(), 2);
    }

    #[test]
    fn test_collections_share_one_store() {
        let store = Store::in_memory();
        Folders::new(store.clone()).create("Taxes").unwrap();

        // A second view over the same store sees the write
        assert_eq!(Folders::new(store).list(None).len(), 1);
    }

    #[test]
    fn test_failed_read_does_not_erase_folders() {
        let backend = Arc::new(FlakyBackend::default());
        let folders = Folders::new(Store::new(backend.clone()));
        for name in ["A", "B", "C"] {
            folders.create(name).unwrap();
        }

        backend.fail_next_read();
        assert!(matches!(folders.create("D"), Err(StoreError::Poisoned)));

        let names: Vec<String> = folders.list(None).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        folders.create("D").unwrap();
        assert_eq!(folders.list(None).len(), 4);
    }

    #[test]
    fn test_failed_read_does_not_erase_recent_files() {
        let backend = Arc::new(FlakyBackend::default());
        let files = RecentFiles::new(Store::new(backend.clone()));
        files.insert(scan("first")).unwrap();
        files.insert(scan("second")).unwrap();

        backend.fail_next_read();
        assert!(files.insert(scan("third")).is_err());

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_failed_read_does_not_erase_recipients() {
        let backend = Arc::new(FlakyBackend::default());
        let recipients = Recipients::new(Store::new(backend.clone()));
        recipients.create("a@x.com").unwrap();
        recipients.create("b@x.com").unwrap();

        backend.fail_next_read();
        assert!(recipients.create("c@x.com").is_err());
        backend.fail_next_read();
        assert!(recipients.remove(0).is_err());

        assert_eq!(recipients.list(None), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_listing_degrades_to_empty_on_read_failure() {
        let backend = Arc::new(FlakyBackend::default());
        let folders = Folders::new(Store::new(backend.clone()));
        folders.create("Taxes").unwrap();

        backend.fail_next_read();
        assert!(folders.list(None).is_empty());
        assert_eq!(folders.list(None).len(), 1);
    }

    #[test]
    fn test_insert_at_uses_given_time() {
        let files = RecentFiles::new(Store::in_memory());
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 22, 13).unwrap();

        let record = files.insert_at(scan("Scan_2024-05-01T10-22-13.jpg"), now).unwrap();

        assert_eq!(record.date, "2024-05-01T10:22:13.000Z");
        assert_eq!(files.list(None)[0].created_at(), Some(now));
    }
}
