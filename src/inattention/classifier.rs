//! Eye-state classifier contract.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One classified eye region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeDetection {
    /// Class label in the classifier's own label scheme
    pub label: u32,
    pub confidence: f32,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Frame of {width}x{height} cannot be classified")]
    InvalidFrame { width: u32, height: u32 },

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Eye-state inference over a single grayscale frame.
///
/// Implementations are constructed with their own detection threshold,
/// usually through [`InattentionDetector::spawn_with`](crate::inattention::InattentionDetector::spawn_with).
/// A prediction may take arbitrarily long; it only ever runs on the worker
/// thread.
pub trait EyeStateClassifier: Send {
    fn predict(&mut self, frame: &GrayImage) -> Result<Vec<EyeDetection>, ClassifierError>;
}

impl<F> EyeStateClassifier for F
where
    F: FnMut(&GrayImage) -> Result<Vec<EyeDetection>, ClassifierError> + Send,
{
    fn predict(&mut self, frame: &GrayImage) -> Result<Vec<EyeDetection>, ClassifierError> {
        self(frame)
    }
}
