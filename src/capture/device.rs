/// Camera capability boundary
///
/// The capture flow only talks to these traits. A platform camera backend
/// implements `CameraDevice`; the app ships an always-denying device and a
/// synthetic test-pattern camera.

use image::{Rgb, RgbImage};
use std::sync::Arc;

use crate::config::{CameraSource, CaptureSettings, Facing};
use crate::error::CaptureError;

/// What the flow asks the device for. Width and height are ideals, not minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

impl From<&CaptureSettings> for StreamConstraints {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            facing: settings.facing,
        }
    }
}

/// A live video stream held by the capture flow
pub trait VideoStream: Send {
    /// Negotiated frame size
    fn resolution(&self) -> (u32, u32);

    /// Snapshot the current frame
    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Release the underlying device
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Something that can open a video stream
pub trait CameraDevice: Send + Sync {
    fn name(&self) -> &str;

    /// Request a stream. Denial or absence of hardware is an error.
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// Build the camera selected in the config
pub fn camera_for(source: CameraSource) -> Arc<dyn CameraDevice> {
    match source {
        CameraSource::Unavailable => Arc::new(UnavailableCamera),
        CameraSource::TestPattern => Arc::new(TestPatternCamera::default()),
    }
}

/// A device that never grants a stream
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCamera;

impl CameraDevice for UnavailableCamera {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn open(&self, _constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError> {
        Err(CaptureError::NoDevice)
    }
}

/// Synthetic camera rendering a page on a desk with a moving scan line
#[derive(Debug, Clone, Copy)]
pub struct TestPatternCamera {
    /// Largest frame the "sensor" can produce
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self {
            max_width: 640,
            max_height: 480,
        }
    }
}

impl CameraDevice for TestPatternCamera {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError> {
        let width = constraints.width.min(self.max_width).max(1);
        let height = constraints.height.min(self.max_height).max(1);

        tracing::debug!(width, height, facing = ?constraints.facing, "test-pattern stream opened");

        Ok(Box::new(TestPatternStream {
            width,
            height,
            frame: 0,
            active: true,
        }))
    }
}

struct TestPatternStream {
    width: u32,
    height: u32,
    frame: u32,
    active: bool,
}

impl VideoStream for TestPatternStream {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        if !self.active {
            return Err(CaptureError::StreamEnded);
        }
        self.frame = self.frame.wrapping_add(1);
        Ok(render_test_pattern(self.width, self.height, self.frame))
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Draw a white page with text-like rules on a dark desk
fn render_test_pattern(width: u32, height: u32, frame: u32) -> RgbImage {
    let desk = Rgb([48, 52, 61]);
    let paper = Rgb([245, 245, 240]);
    let ink = Rgb([90, 90, 100]);
    let scan = Rgb([59, 130, 246]);

    let margin_x = width / 6;
    let margin_y = height / 10;
    let scan_y = margin_y + frame % (height - 2 * margin_y).max(1);

    RgbImage::from_fn(width, height, |x, y| {
        let on_page =
            x >= margin_x && x < width - margin_x && y >= margin_y && y < height - margin_y;
        if !on_page {
            return desk;
        }
        if y == scan_y {
            return scan;
        }
        let inner_x = x - margin_x;
        let inner_y = y - margin_y;
        let is_rule = inner_y > 12 && inner_y % 14 < 2 && inner_x > 10 && x < width - margin_x - 10;
        if is_rule {
            ink
        } else {
            paper
        }
    })
}
