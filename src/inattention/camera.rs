//! Frame sources for the inattention detector.

use image::GrayImage;

/// Driver-facing camera.
///
/// Owned by the detector's worker thread. A source that cannot deliver a
/// frame returns a blank one instead of failing.
pub trait CameraSource: Send {
    /// Capture the next grayscale frame.
    fn next_grayscale(&mut self) -> GrayImage;

    /// Release the underlying device. Called once when the worker stops.
    fn close(&mut self) {}
}

/// Camera that always produces an all-black frame.
///
/// Stands in for a missing or simulated device; every frame reads as
/// "no signal".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlankCamera {
    width: u32,
    height: u32,
}

impl BlankCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for BlankCamera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl CameraSource for BlankCamera {
    fn next_grayscale(&mut self) -> GrayImage {
        GrayImage::new(self.width, self.height)
    }
}
