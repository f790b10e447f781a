//! Narrow contract to the external segmentation model.
//!
//! The model is a collaborator, not part of this crate: image in, labeled
//! mask polygons out. Nothing about its weights, thresholds, or runtime is
//! assumed here.

use thiserror::Error;

use crate::capture::frame::ColorImage;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("inference failed: {0}")]
    Inference(String),
}

/// One detected object: label plus mask outline in pixel coordinates.
#[derive(Debug, Clone)]
pub struct Detection {
    pub label: String,
    pub polygon: Vec<(f32, f32)>,
}

/// Synchronous, blocking inference. No retry: a failed call simply yields
/// no detections for that frame.
pub trait SegmentationModel: Send {
    fn infer(&mut self, color: &ColorImage) -> Result<Vec<Detection>, ModelError>;
}

/// Stand-in for runs without an inference backend wired in.
pub struct NullModel;

impl SegmentationModel for NullModel {
    fn infer(&mut self, _color: &ColorImage) -> Result<Vec<Detection>, ModelError> {
        Ok(Vec::new())
    }
}
