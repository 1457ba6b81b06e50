/// Capture state machine
///
/// ```text
/// Idle --start--> Previewing(Live | Degraded) --capture--> Captured
///   ^                 |                                     |   |
///   +----cancel-------+                     retake <--------+   |
///   +----------------------------- save ------------------------+
/// ```
///
/// The device stream is held in an `ActiveStream` guard: every path back to
/// `Idle` drops it, and dropping stops the device.

use chrono::{DateTime, Utc};
use image::RgbImage;
use std::sync::Arc;

use super::device::{CameraDevice, StreamConstraints, VideoStream};
use super::still::CapturedImage;
use crate::config::CaptureSettings;
use crate::error::CaptureError;
use crate::state::collections::{NewFile, RecentFiles};
use crate::state::data::FileRecord;

/// Display size recorded for camera scans
pub const SCAN_DISPLAY_SIZE: &str = "1.8 MB";
/// Extension and type tag of camera scans
pub const SCAN_EXTENSION: &str = "jpg";

/// Whether the preview is backed by a real device stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Frames come from the camera
    Live,
    /// Camera was denied or missing; captures use the placeholder
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Previewing(PreviewMode),
    Captured {
        mode: PreviewMode,
        image: CapturedImage,
    },
}

impl CaptureState {
    fn describe(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::Previewing(_) => "previewing",
            CaptureState::Captured { .. } => "reviewing a capture",
        }
    }
}

/// Owns the device stream; stops it on drop
struct ActiveStream(Box<dyn VideoStream>);

impl Drop for ActiveStream {
    fn drop(&mut self) {
        if self.0.is_active() {
            self.0.stop();
        }
        tracing::debug!("camera stream released");
    }
}

pub struct CaptureFlow {
    camera: Arc<dyn CameraDevice>,
    settings: CaptureSettings,
    stream: Option<ActiveStream>,
    state: CaptureState,
}

impl CaptureFlow {
    pub fn new(camera: Arc<dyn CameraDevice>, settings: CaptureSettings) -> Self {
        Self {
            camera,
            settings,
            stream: None,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// True while a device stream is held
    pub fn has_live_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Request the camera and enter the preview.
    ///
    /// A denied or missing camera is not an error: the flow enters the
    /// degraded preview and captures fall back to the placeholder image.
    pub fn start(&mut self) -> Result<PreviewMode, CaptureError> {
        self.expect_state("start", matches!(self.state, CaptureState::Idle))?;

        let constraints = StreamConstraints::from(&self.settings);
        let mode = match self.camera.open(&constraints) {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                tracing::info!(camera = self.camera.name(), width, height, "camera stream started");
                self.stream = Some(ActiveStream(stream));
                PreviewMode::Live
            }
            Err(e) => {
                tracing::warn!(camera = self.camera.name(), error = %e, "camera unavailable, using degraded preview");
                PreviewMode::Degraded
            }
        };

        self.state = CaptureState::Previewing(mode);
        Ok(mode)
    }

    /// Latest frame for the live preview surface
    pub fn preview_frame(&mut self) -> Option<RgbImage> {
        if !matches!(self.state, CaptureState::Previewing(PreviewMode::Live)) {
            return None;
        }
        let stream = self.stream.as_mut()?;
        match stream.0.grab_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::warn!(error = %e, "failed to grab preview frame");
                None
            }
        }
    }

    /// Snapshot the current frame into a still buffer
    pub fn capture(&mut self) -> Result<&CapturedImage, CaptureError> {
        let mode = match self.state {
            CaptureState::Previewing(mode) => mode,
            _ => return Err(self.invalid("capture")),
        };

        let image = match self.stream.as_mut().map(|s| s.0.grab_frame()) {
            Some(Ok(frame)) => CapturedImage::encode(&frame, self.settings.jpeg_quality)?,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "frame grab failed, substituting placeholder");
                CapturedImage::Placeholder
            }
            None => CapturedImage::Placeholder,
        };

        tracing::info!(placeholder = image.is_placeholder(), "document captured");
        self.state = CaptureState::Captured { mode, image };

        match &self.state {
            CaptureState::Captured { image, .. } => Ok(image),
            _ => Err(self.invalid("capture")),
        }
    }

    /// Discard the capture and go back to the preview
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        let mode = match self.state {
            CaptureState::Captured { mode, .. } => mode,
            _ => return Err(self.invalid("retake")),
        };
        self.state = CaptureState::Previewing(mode);
        Ok(())
    }

    /// Persist the capture as a new recent file, then release the camera
    pub fn save(&mut self, files: &RecentFiles) -> Result<FileRecord, CaptureError> {
        self.save_at(files, Utc::now())
    }

    fn save_at(&mut self, files: &RecentFiles, now: DateTime<Utc>) -> Result<FileRecord, CaptureError> {
        let thumbnail = match &self.state {
            CaptureState::Captured { image, .. } => image.thumbnail(),
            _ => return Err(self.invalid("save")),
        };

        let new_file = NewFile {
            name: scan_file_name(now, SCAN_EXTENSION),
            file_type: SCAN_EXTENSION.to_string(),
            size: SCAN_DISPLAY_SIZE.to_string(),
            thumbnail: Some(thumbnail),
        };
        // A failed write keeps the capture and the stream for a retry
        let record = files.insert_at(new_file, now)?;

        self.reset();
        tracing::info!(name = %record.name, "scan saved");
        Ok(record)
    }

    /// Release the camera and return to idle, discarding any capture
    pub fn cancel(&mut self) {
        if !matches!(self.state, CaptureState::Idle) {
            tracing::info!(state = self.state.describe(), "capture cancelled");
        }
        self.reset();
    }

    /// Alias of `cancel`
    pub fn stop(&mut self) {
        self.cancel();
    }

    fn reset(&mut self) {
        self.stream = None;
        self.state = CaptureState::Idle;
    }

    fn expect_state(&self, op: &'static str, ok: bool) -> Result<(), CaptureError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid(op))
        }
    }

    fn invalid(&self, op: &'static str) -> CaptureError {
        CaptureError::InvalidTransition {
            op,
            state: self.state.describe(),
        }
    }
}

impl std::fmt::Debug for CaptureFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureFlow")
            .field("camera", &self.camera.name())
            .field("state", &self.state.describe())
            .field("live_stream", &self.stream.is_some())
            .finish()
    }
}

/// `Scan_<ISO timestamp to the second, colons replaced by dashes>.<ext>`
pub fn scan_file_name(now: DateTime<Utc>, extension: &str) -> String {
    format!("Scan_{}.{}", now.format("%Y-%m-%dT%H-%M-%S"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::state::store::{KeyValueBackend, MemoryBackend, Store};
    use chrono::TimeZone;
    use image::Rgb;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Camera double that records whether its stream is still held
    struct FakeCamera {
        deny: bool,
        active: Arc<AtomicBool>,
        opened: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        fn granting() -> Self {
            Self {
                deny: false,
                active: Arc::new(AtomicBool::new(false)),
                opened: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn denying() -> Self {
            Self {
                deny: true,
                ..Self::granting()
            }
        }
    }

    struct FakeStream {
        active: Arc<AtomicBool>,
    }

    impl VideoStream for FakeStream {
        fn resolution(&self) -> (u32, u32) {
            (16, 9)
        }

        fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
            Ok(RgbImage::from_pixel(16, 9, Rgb([255, 255, 255])))
        }

        fn stop(&mut self) {
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    impl CameraDevice for FakeCamera {
        fn name(&self) -> &str {
            "fake"
        }

        fn open(&self, _c: &StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError> {
            if self.deny {
                return Err(CaptureError::PermissionDenied("user refused".into()));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.active.store(true, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                active: self.active.clone(),
            }))
        }
    }

    fn flow_with(camera: FakeCamera) -> (CaptureFlow, Arc<AtomicBool>) {
        let active = camera.active.clone();
        (CaptureFlow::new(Arc::new(camera), CaptureSettings::default()), active)
    }

    #[test]
    fn test_start_capture_save_adds_one_file_and_releases_stream() {
        let files = RecentFiles::new(Store::in_memory());
        let (mut flow, active) = flow_with(FakeCamera::granting());

        assert_eq!(flow.start().unwrap(), PreviewMode::Live);
        assert!(active.load(Ordering::SeqCst));

        let image = flow.capture().unwrap();
        assert!(!image.is_placeholder());

        let record = flow.save(&files).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files.list(None)[0], record);
        assert!(record.thumbnail.as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
        assert_eq!(record.file_type, "jpg");
        assert!(!active.load(Ordering::SeqCst));
        assert!(!flow.has_live_stream());
        assert_eq!(flow.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_cancel_releases_stream_without_saving() {
        let files = RecentFiles::new(Store::in_memory());
        let (mut flow, active) = flow_with(FakeCamera::granting());

        flow.start().unwrap();
        flow.cancel();

        assert!(!active.load(Ordering::SeqCst));
        assert!(files.is_empty());
        assert_eq!(flow.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_cancel_after_capture_discards_buffer() {
        let (mut flow, active) = flow_with(FakeCamera::granting());

        flow.start().unwrap();
        flow.capture().unwrap();
        flow.stop();

        assert!(!active.load(Ordering::SeqCst));
        assert_eq!(flow.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_denied_camera_enters_degraded_preview() {
        let files = RecentFiles::new(Store::in_memory());
        let (mut flow, _) = flow_with(FakeCamera::denying());

        assert_eq!(flow.start().unwrap(), PreviewMode::Degraded);
        assert!(!flow.has_live_stream());
        assert!(flow.preview_frame().is_none());

        assert!(flow.capture().unwrap().is_placeholder());
        let record = flow.save(&files).unwrap();
        assert_eq!(record.thumbnail.as_deref(), Some("/placeholder.svg"));
    }

    #[test]
    fn test_retake_returns_to_same_preview_mode() {
        let (mut flow, active) = flow_with(FakeCamera::granting());

        flow.start().unwrap();
        flow.capture().unwrap();
        flow.retake().unwrap();

        assert_eq!(flow.state(), &CaptureState::Previewing(PreviewMode::Live));
        assert!(active.load(Ordering::SeqCst));
        assert!(flow.preview_frame().is_some());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let files = RecentFiles::new(Store::in_memory());
        let (mut flow, _) = flow_with(FakeCamera::granting());

        assert!(matches!(flow.capture(), Err(CaptureError::InvalidTransition { op: "capture", .. })));
        assert!(matches!(flow.retake(), Err(CaptureError::InvalidTransition { .. })));
        assert!(matches!(flow.save(&files), Err(CaptureError::InvalidTransition { .. })));

        flow.start().unwrap();
        assert!(matches!(flow.start(), Err(CaptureError::InvalidTransition { op: "start", .. })));
    }

    #[test]
    fn test_dropping_flow_releases_stream() {
        let camera = FakeCamera::granting();
        let active = camera.active.clone();
        {
            let mut flow = CaptureFlow::new(Arc::new(camera), CaptureSettings::default());
            flow.start().unwrap();
            assert!(active.load(Ordering::SeqCst));
        }
        assert!(!active.load(Ordering::SeqCst));
    }

    #[test]
    fn test_restart_reopens_camera() {
        let camera = FakeCamera::granting();
        let opened = camera.opened.clone();
        let mut flow = CaptureFlow::new(Arc::new(camera), CaptureSettings::default());

        flow.start().unwrap();
        flow.cancel();
        flow.start().unwrap();

        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scan_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 22, 13).unwrap();
        assert_eq!(scan_file_name(now, "jpg"), "Scan_2024-05-01T10-22-13.jpg");
    }

    #[test]
    fn test_saved_name_uses_capture_time() {
        let files = RecentFiles::new(Store::in_memory());
        let (mut flow, _) = flow_with(FakeCamera::granting());
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        flow.start().unwrap();
        flow.capture().unwrap();
        let record = flow.save_at(&files, now).unwrap();

        assert_eq!(record.name, "Scan_2024-01-02T03-04-05.jpg");
        assert_eq!(record.size, SCAN_DISPLAY_SIZE);
        assert_eq!(record.date, "2024-01-02T03:04:05.000Z");
        assert_eq!(record.created_at(), Some(now));
    }

    /// Backend whose writes fail while `failing` is set
    #[derive(Default)]
    struct WriteFailingBackend {
        inner: MemoryBackend,
        failing: AtomicBool,
    }

    impl KeyValueBackend for WriteFailingBackend {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Poisoned);
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_failed_save_keeps_capture_for_retry() {
        let backend = Arc::new(WriteFailingBackend::default());
        let files = RecentFiles::new(Store::new(backend.clone()));
        files.insert(NewFile {
            name: "Earlier.pdf".into(),
            file_type: "pdf".into(),
            size: "2.4 MB".into(),
            thumbnail: None,
        })
        .unwrap();

        let (mut flow, active) = flow_with(FakeCamera::granting());
        flow.start().unwrap();
        flow.capture().unwrap();

        backend.failing.store(true, Ordering::SeqCst);
        let err = flow.save(&files).unwrap_err();

        assert!(matches!(err, CaptureError::Store(_)));
        assert!(matches!(flow.state(), CaptureState::Captured { mode: PreviewMode::Live, .. }));
        assert!(flow.has_live_stream());
        assert!(active.load(Ordering::SeqCst));
        assert_eq!(files.len(), 1);
        assert_eq!(files.list(None)[0].name, "Earlier.pdf");

        backend.failing.store(false, Ordering::SeqCst);
        let record = flow.save(&files).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files.list(None)[0], record);
        assert_eq!(flow.state(), &CaptureState::Idle);
        assert!(!active.load(Ordering::SeqCst));
    }
}
