use image::RgbaImage;

use crate::capture::frame::PointCloud;

/// On-screen anchor for one detected object.
///
/// `distance_mm == 0` means the depth under the centroid was unreadable;
/// consumers must treat that as "unknown" rather than labeling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    pub x: u32,
    pub y: u32,
    pub distance_mm: u32,
}

/// One fully-assembled unit for the consumer.
///
/// Built once per pipeline iteration and immutable afterwards; it lives in
/// the handoff slot until replaced or taken, never longer. All images are
/// render-ready RGBA in bottom-up row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub color_image: RgbaImage,
    pub depth_paletted_image: RgbaImage,
    pub segmented_image: RgbaImage,
    pub centroids: Vec<Centroid>,
    pub pointcloud: PointCloud,
}
