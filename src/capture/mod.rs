/// Document capture module
///
/// This module handles:
/// - The camera capability boundary and shipped devices (device.rs)
/// - Encoding captured frames to JPEG stills (still.rs)
/// - The capture state machine and saving scans (flow.rs)

pub mod device;
pub mod still;
pub mod flow;

pub use device::{camera_for, CameraDevice, StreamConstraints, TestPatternCamera, UnavailableCamera, VideoStream};
pub use flow::{CaptureFlow, CaptureState, PreviewMode};
pub use still::CapturedImage;
