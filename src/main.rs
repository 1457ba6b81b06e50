use iced::widget::image::Handle;
use iced::{Element, Subscription, Task, Theme};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use smart_scan::capture::still::decode_data_uri;
use smart_scan::capture::{camera_for, CaptureFlow, CaptureState, PreviewMode};
use smart_scan::config::AppConfig;
use smart_scan::flows::suitedash::find_project;
use smart_scan::flows::{
    ConnectRequest, Connection, FileSelection, ShareFlow, ShareReceipt, ShareRequest, SuiteDash,
    UploadReceipt,
};
use smart_scan::logging;
use smart_scan::platform::{
    copy_share_link, share_or_copy, BufferedClipboard, ShareOutcome, SharePayload,
    UnsupportedShareSheet,
};
use smart_scan::state::{
    FileRecord, FolderRecord, Folders, Library, Recipient, Recipients, RecentFiles, Router, Store,
    Tab,
};

// Views live in their own module
mod ui;

/// Quick share targets on the share screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuickTarget {
    WhatsApp,
    Email,
    Social,
}

impl QuickTarget {
    const ALL: [QuickTarget; 3] = [QuickTarget::WhatsApp, QuickTarget::Email, QuickTarget::Social];

    fn label(self) -> &'static str {
        match self {
            QuickTarget::WhatsApp => "WhatsApp",
            QuickTarget::Email => "Email",
            QuickTarget::Social => "Social",
        }
    }
}

/// Main application state
struct SmartScan {
    router: Router,
    show_introduction: bool,
    /// Status line standing in for toasts
    status: String,

    // Scan
    files: RecentFiles,
    capture: CaptureFlow,
    preview: Option<Handle>,
    captured: Option<Handle>,

    // Folders
    folders: Folders,
    folder_list: Vec<FolderRecord>,
    folder_query: String,
    new_folder_open: bool,
    new_folder_name: String,

    // Files
    file_list: Vec<FileRecord>,
    file_query: String,
    thumbnails: HashMap<String, Handle>,

    // Share
    recipients: Recipients,
    recipient_list: Vec<Recipient>,
    new_recipient: String,
    selection: FileSelection,
    share_message: String,
    share: ShareFlow,
    clipboard: BufferedClipboard,
    share_sheet: UnsupportedShareSheet,

    // SuiteDash
    suitedash: SuiteDash,
    api_key: String,
    company_url: String,
    selected_project: Option<&'static str>,
    upload_progress: u8,
    upload_watch: Option<watch::Receiver<u8>>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    IntroductionCompleted,
    TabSelected(Tab),

    StartCamera,
    PreviewTick,
    CaptureDocument,
    Retake,
    SaveScan,
    CancelScan,

    FolderQueryChanged(String),
    ToggleNewFolder,
    NewFolderNameChanged(String),
    CreateFolder,

    FileQueryChanged(String),

    SelectionChanged(FileSelection),
    ShareMessageChanged(String),
    RecipientInputChanged(String),
    FillSampleRecipient,
    AddRecipient,
    RemoveRecipient(usize),
    SendFiles,
    ShareSettled(Result<ShareReceipt, String>),
    QuickShare(QuickTarget),
    CopyShareLink,

    ApiKeyChanged(String),
    CompanyUrlChanged(String),
    Connect,
    ConnectSettled(Result<Connection, String>),
    CancelConnect,
    Disconnect,
    ProjectSelected(&'static str),
    Upload,
    UploadTick,
    UploadSettled(Result<UploadReceipt, String>),
    CancelUpload,
}

/// Placeholder recipient offered by "Add Employee"
const SAMPLE_RECIPIENT: &str = "employee@company.com";

impl SmartScan {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let store = open_store(&config);
        let mut router = Router::load(store.clone());
        router.select_id(&config.start_tab);
        let show_introduction = router.should_show_introduction();

        let camera = camera_for(config.camera);
        let files = RecentFiles::new(store.clone());
        let folders = Folders::new(store.clone());
        let recipients = Recipients::new(store.clone());

        tracing::info!(
            camera = camera.name(),
            files = files.len(),
            "Smart Scan initialized"
        );

        let mut app = SmartScan {
            router,
            show_introduction,
            status: String::new(),

            capture: CaptureFlow::new(camera, config.capture.clone()),
            files,
            preview: None,
            captured: None,

            folders,
            folder_list: Vec::new(),
            folder_query: String::new(),
            new_folder_open: false,
            new_folder_name: String::new(),

            file_list: Vec::new(),
            file_query: String::new(),
            thumbnails: HashMap::new(),

            recipients,
            recipient_list: Vec::new(),
            new_recipient: String::new(),
            selection: FileSelection::None,
            share_message: String::new(),
            share: ShareFlow::new(config.timings.share_delay()),
            clipboard: BufferedClipboard::new(),
            share_sheet: UnsupportedShareSheet,

            suitedash: SuiteDash::new(store, config.timings.clone()),
            api_key: String::new(),
            company_url: String::new(),
            selected_project: None,
            upload_progress: 0,
            upload_watch: None,
        };
        app.load_active_view();

        (app, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::IntroductionCompleted => {
                // Hide the splash even if the flag could not be written
                if let Err(e) = self.router.complete_introduction() {
                    tracing::warn!(error = %e, "failed to persist introduction flag");
                }
                self.show_introduction = false;
                Task::none()
            }
            Message::TabSelected(tab) => {
                if tab != Tab::Scan {
                    // Leaving the scanner always releases the camera
                    self.capture.stop();
                    self.preview = None;
                    self.captured = None;
                }
                self.router.select(tab);
                self.load_active_view();
                Task::none()
            }

            Message::StartCamera => {
                match self.capture.start() {
                    Ok(PreviewMode::Live) => self.status = "Camera ready. Center the document in the frame.".into(),
                    Ok(PreviewMode::Degraded) => {
                        self.status = "Camera unavailable. Captures will use a placeholder.".into()
                    }
                    Err(e) => tracing::warn!(error = %e, "start camera ignored"),
                }
                Task::none()
            }
            Message::PreviewTick => {
                if let Some(frame) = self.capture.preview_frame() {
                    // iced wants RGBA pixels
                    let (width, height) = frame.dimensions();
                    let rgba = ::image::DynamicImage::ImageRgb8(frame).into_rgba8();
                    self.preview = Some(Handle::from_rgba(width, height, rgba.into_raw()));
                }
                Task::none()
            }
            Message::CaptureDocument => {
                match self.capture.capture() {
                    Ok(image) => {
                        // Placeholder captures have no bytes to show
                        self.captured = image.jpeg_bytes().map(|bytes| Handle::from_bytes(bytes.to_vec()));
                        self.status = "Document captured! Review and save your scan.".into();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "capture failed");
                        self.status = format!("Capture failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::Retake => {
                if let Err(e) = self.capture.retake() {
                    tracing::warn!(error = %e, "retake ignored");
                }
                self.captured = None;
                Task::none()
            }
            Message::SaveScan => {
                match self.capture.save(&self.files) {
                    Ok(record) => {
                        // Saving released the camera, drop the stale frames
                        self.status = format!("Document saved as {}", record.name);
                        self.preview = None;
                        self.captured = None;
                    }
                    Err(e) => {
                        // Still captured, the user can press save again
                        tracing::warn!(error = %e, "failed to save scan");
                        self.status = format!("Could not save scan: {}", e);
                    }
                }
                Task::none()
            }
            Message::CancelScan => {
                self.capture.cancel();
                self.preview = None;
                self.captured = None;
                Task::none()
            }

            Message::FolderQueryChanged(query) => {
                self.folder_query = query;
                self.refresh_folders();
                Task::none()
            }
            Message::ToggleNewFolder => {
                self.new_folder_open = !self.new_folder_open;
                self.new_folder_name.clear();
                Task::none()
            }
            Message::NewFolderNameChanged(name) => {
                self.new_folder_name = name;
                Task::none()
            }
            Message::CreateFolder => {
                match self.folders.create(&self.new_folder_name) {
                    Ok(Some(folder)) => {
                        self.status = format!("Folder created: \"{}\"", folder.name);
                        self.new_folder_name.clear();
                        self.new_folder_open = false;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to create folder");
                        self.status = format!("Could not create folder: {}", e);
                    }
                }
                self.refresh_folders();
                Task::none()
            }

            Message::FileQueryChanged(query) => {
                self.file_query = query;
                self.refresh_files();
                Task::none()
            }

            Message::SelectionChanged(selection) => {
                self.selection = selection;
                Task::none()
            }
            Message::ShareMessageChanged(text) => {
                self.share_message = text;
                Task::none()
            }
            Message::RecipientInputChanged(text) => {
                self.new_recipient = text;
                Task::none()
            }
            Message::FillSampleRecipient => {
                self.new_recipient = SAMPLE_RECIPIENT.to_string();
                Task::none()
            }
            Message::AddRecipient => {
                match self.recipients.create(&self.new_recipient) {
                    Ok(Some(recipient)) => {
                        self.status = format!("Added {} to share list", recipient);
                        self.new_recipient.clear();
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "failed to add recipient"),
                }
                self.refresh_recipients();
                Task::none()
            }
            Message::RemoveRecipient(index) => {
                if let Err(e) = self.recipients.remove(index) {
                    tracing::warn!(error = %e, index, "failed to remove recipient");
                }
                self.refresh_recipients();
                Task::none()
            }
            Message::SendFiles => {
                // The flow validates the selection and rejects a second send
                let request = ShareRequest {
                    files: self.selection.count(),
                    recipients: self.recipient_list.clone(),
                    message: self.share_message.clone(),
                };
                match self.share.start(request) {
                    Ok(handle) => Task::perform(handle.wait(), |outcome| {
                        Message::ShareSettled(outcome.map_err(|e| e.to_string()))
                    }),
                    Err(e) => {
                        tracing::debug!(error = %e, "send ignored");
                        Task::none()
                    }
                }
            }
            Message::ShareSettled(outcome) => {
                match outcome {
                    Ok(receipt) => {
                        // Reset the form for the next send
                        self.status = format!(
                            "Files sent! Shared {} files with {} employees",
                            receipt.files, receipt.recipients
                        );
                        self.selection = FileSelection::None;
                        self.share_message.clear();
                    }
                    Err(e) => self.status = e,
                }
                Task::none()
            }
            Message::QuickShare(target) => {
                let payload = SharePayload {
                    title: format!("Smart Scan via {}", target.label()),
                    text: format!(
                        "Sharing {} scanned documents from Smart Scan",
                        self.selection.count()
                    ),
                };
                // Without a share sheet the text lands in the clipboard buffer
                match share_or_copy(&self.share_sheet, &mut self.clipboard, &payload) {
                    Ok(ShareOutcome::Shared) => {
                        self.status = format!("{} share opened", target.label())
                    }
                    Ok(ShareOutcome::Copied(_)) => {
                        self.status = format!("{} sharing unavailable, text copied", target.label())
                    }
                    Err(e) => tracing::warn!(error = %e, "share failed"),
                }
                self.flush_clipboard()
            }
            Message::CopyShareLink => {
                match copy_share_link(&mut self.clipboard, chrono::Utc::now()) {
                    Ok(_) => self.status = "Share link copied to clipboard".into(),
                    Err(e) => tracing::warn!(error = %e, "copy share link failed"),
                }
                self.flush_clipboard()
            }

            Message::ApiKeyChanged(key) => {
                self.api_key = key;
                Task::none()
            }
            Message::CompanyUrlChanged(url) => {
                self.company_url = url;
                Task::none()
            }
            Message::Connect => {
                let request = ConnectRequest {
                    api_key: self.api_key.clone(),
                    company_url: self.company_url.clone(),
                };
                match self.suitedash.connect(request) {
                    Ok(handle) => {
                        self.status = "Connecting to SuiteDash...".into();
                        Task::perform(handle.wait(), |outcome| {
                            Message::ConnectSettled(outcome.map_err(|e| e.to_string()))
                        })
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "connect ignored");
                        Task::none()
                    }
                }
            }
            Message::ConnectSettled(outcome) => {
                self.status = match outcome {
                    Ok(connection) => format!("Connected to {}", connection.company_url),
                    Err(e) => e,
                };
                Task::none()
            }
            Message::CancelConnect => {
                // The pending wait settles with a cancellation error
                self.suitedash.cancel_connect();
                Task::none()
            }
            Message::Disconnect => {
                // Disconnecting also aborts a running upload
                self.suitedash.disconnect();
                self.upload_watch = None;
                self.upload_progress = 0;
                self.selected_project = None;
                Task::none()
            }
            Message::ProjectSelected(id) => {
                self.selected_project = Some(id);
                Task::none()
            }
            Message::Upload => {
                let project = self.selected_project.unwrap_or_default();
                match self.suitedash.upload(project, self.files.len()) {
                    Ok(handle) => {
                        // Progress is polled from the watch on UploadTick
                        self.upload_progress = 0;
                        self.upload_watch = Some(handle.progress());
                        Task::perform(handle.wait(), |outcome| {
                            Message::UploadSettled(outcome.map_err(|e| e.to_string()))
                        })
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "upload ignored");
                        Task::none()
                    }
                }
            }
            Message::UploadTick => {
                if let Some(progress) = &self.upload_watch {
                    self.upload_progress = *progress.borrow();
                }
                Task::none()
            }
            Message::UploadSettled(outcome) => {
                // Stop polling the finished flow's progress
                self.upload_watch = None;
                match outcome {
                    Ok(receipt) => {
                        self.upload_progress = 100;
                        self.status = format!(
                            "Uploaded {} files to {}",
                            receipt.files, receipt.project.name
                        );
                    }
                    Err(e) => {
                        self.upload_progress = 0;
                        self.status = e;
                    }
                }
                Task::none()
            }
            Message::CancelUpload => {
                // Cancelled progress is discarded, not kept at its last value
                self.suitedash.cancel_upload();
                self.upload_watch = None;
                self.upload_progress = 0;
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if self.show_introduction {
            return ui::splash::view();
        }
        ui::shell(self)
    }

    /// Timers for the live preview and the upload progress bar
    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = Vec::new();

        if matches!(self.capture.state(), CaptureState::Previewing(PreviewMode::Live)) {
            subscriptions.push(iced::time::every(Duration::from_millis(100)).map(|_| Message::PreviewTick));
        }
        if self.upload_watch.is_some() {
            subscriptions.push(iced::time::every(Duration::from_millis(50)).map(|_| Message::UploadTick));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Each view loads its collection when it is shown
    fn load_active_view(&mut self) {
        match self.router.active() {
            Tab::Folders => self.refresh_folders(),
            Tab::Files => self.refresh_files(),
            Tab::Share => self.refresh_recipients(),
            Tab::Scan | Tab::SuiteDash => {}
        }
    }

    fn refresh_folders(&mut self) {
        self.folder_list = self.folders.list(Some(&self.folder_query));
    }

    fn refresh_files(&mut self) {
        // Decode thumbnails once per refresh, not on every draw
        self.file_list = self.files.list(Some(&self.file_query));
        self.thumbnails = self
            .file_list
            .iter()
            .filter_map(|file| {
                let bytes = decode_data_uri(file.thumbnail.as_deref()?)?;
                Some((file.id.clone(), Handle::from_bytes(bytes)))
            })
            .collect();
    }

    fn refresh_recipients(&mut self) {
        self.recipient_list = self.recipients.list(None);
    }

    /// Push buffered clipboard text to the system clipboard
    fn flush_clipboard(&mut self) -> Task<Message> {
        match self.clipboard.take() {
            Some(text) => iced::clipboard::write(text),
            None => Task::none(),
        }
    }

    fn selected_project_name(&self) -> Option<&'static str> {
        self.selected_project
            .and_then(find_project)
            .map(|project| project.name)
    }
}

/// Open the SQLite library, degrading to an in-memory store if it fails
fn open_store(config: &AppConfig) -> Store {
    let library = match &config.data_dir {
        Some(dir) => Library::open_in(dir),
        None => Library::open_default(),
    };

    match library {
        Ok(library) => {
            // Existing keys tell a first run apart from a restored library
            let keys = library.key_count().unwrap_or_default();
            tracing::info!(path = %library.path().display(), keys, "library ready");
            Store::new(Arc::new(library))
        }
        Err(e) => {
            tracing::error!(error = %e, "could not open library, changes will not persist");
            Store::in_memory()
        }
    }
}

fn main() -> iced::Result {
    let config = AppConfig::load();
    let log_filter = config
        .as_ref()
        .map(|c| c.log_filter.clone())
        .unwrap_or_else(|_| logging::DEFAULT_LOG_FILTER.to_string());
    logging::init_logging(&log_filter);

    let config = config.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    iced::application("Smart Scan", SmartScan::update, SmartScan::view)
        .subscription(SmartScan::subscription)
        .theme(SmartScan::theme)
        .window_size((420.0, 820.0))
        .centered()
        .run_with(move || SmartScan::new(config))
}
