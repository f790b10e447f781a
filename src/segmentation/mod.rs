//! Segmentation bridge: color frame in, overlay image + object centroids out.

mod mask;
pub mod model;

use tracing::{debug, warn};

use crate::capture::frame::{ColorImage, DepthMap};
use crate::SegmentationConfig;

pub use model::{Detection, ModelError, NullModel, SegmentationModel};

/// Fill color blended over detected masks (pure red, as rendered on screen).
const MASK_FILL: [u8; 3] = [255, 0, 0];

/// Result of one segmentation pass.
pub struct Segmented {
    /// Color image with the filled masks blended in, RGB8 top-down; all
    /// zeros when the model produced no results at all.
    pub overlay: Vec<u8>,
    pub centroids: Vec<MaskCentroid>,
}

/// Centroid of one accepted mask with its metric distance.
///
/// `distance_m` is 0.0 when the depth sample under the centroid is
/// unreadable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskCentroid {
    pub x: u32,
    pub y: u32,
    pub distance_m: f32,
}

pub struct SegmentationBridge {
    model: Box<dyn SegmentationModel>,
    include_labels: Vec<String>,
    overlay_alpha: f32,
}

impl SegmentationBridge {
    pub fn new(model: Box<dyn SegmentationModel>, config: &SegmentationConfig) -> Self {
        Self {
            model,
            include_labels: config.include_labels.clone(),
            overlay_alpha: config.overlay_alpha,
        }
    }

    /// Run one blocking inference pass and derive overlay + centroids.
    ///
    /// Never fails: inference errors and empty results both come back as
    /// "no detections" for this frame.
    pub fn segment(
        &mut self,
        color: &ColorImage,
        depth: &DepthMap,
        depth_scale: f32,
    ) -> Segmented {
        let (width, height) = (color.width, color.height);
        let pixel_count = (width * height) as usize;

        let detections = match self.model.infer(color) {
            Ok(detections) => detections,
            Err(err) => {
                warn!(%err, "segmentation inference failed, no detections this frame");
                Vec::new()
            }
        };

        if detections.is_empty() {
            return Segmented {
                overlay: vec![0u8; pixel_count * 3],
                centroids: Vec::new(),
            };
        }

        let kept: Vec<&Detection> = detections
            .iter()
            .filter(|d| self.include_labels.iter().any(|l| l == &d.label))
            .collect();
        debug!(total = detections.len(), kept = kept.len(), "detections");

        let mut stencil = vec![0u8; pixel_count];
        for detection in &kept {
            for (dst, src) in stencil
                .iter_mut()
                .zip(mask::fill_polygon(&detection.polygon, width, height))
            {
                *dst |= src;
            }
        }

        let overlay = blend_overlay(&color.data, &stencil, self.overlay_alpha);

        let centroids = kept
            .iter()
            .filter_map(|detection| mask::centroid(&detection.polygon))
            .map(|(x, y)| MaskCentroid {
                x,
                y,
                distance_m: depth.distance_m(x, y, depth_scale),
            })
            .collect();

        Segmented { overlay, centroids }
    }
}

/// `color + alpha * fill` on masked pixels, saturating per channel.
fn blend_overlay(color: &[u8], stencil: &[u8], alpha: f32) -> Vec<u8> {
    let mut overlay = color.to_vec();
    for (i, &hit) in stencil.iter().enumerate() {
        if hit == 0 {
            continue;
        }
        for c in 0..3 {
            let add = (MASK_FILL[c] as f32 * alpha) as u8;
            overlay[i * 3 + c] = overlay[i * 3 + c].saturating_add(add);
        }
    }
    overlay
}
