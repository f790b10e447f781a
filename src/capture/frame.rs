use bytes::Bytes;
use nalgebra::Point3;
use std::time::Instant;

/// Aligned depth samples, one `u16` per pixel in raw sensor units.
///
/// A sample of 0 means the sensor could not read that pixel.
#[derive(Debug, Clone)]
pub struct DepthMap {
    pub data: Vec<u16>,
    pub width: u32,
    pub height: u32,
}

impl DepthMap {
    /// Raw sample at a pixel, `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Metric distance at a pixel; 0.0 when the sample is missing or outside
    /// the grid.
    pub fn distance_m(&self, x: u32, y: u32, depth_scale: f32) -> f32 {
        match self.get(x, y) {
            Some(raw) => raw as f32 * depth_scale,
            None => 0.0,
        }
    }
}

/// Color plane in 8-bit RGB, row-major top-down.
///
/// Immutable frame data - can be shared across threads without copying.
#[derive(Debug, Clone)]
pub struct ColorImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// One synchronized depth+color pair from the sensor.
///
/// Invariant: the depth and color grids are pixel-aligned 1:1, so index
/// (x, y) in both refers to the same physical point. Pairs violating this
/// are dropped by the camera adapter before they reach anyone else.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub depth: DepthMap,
    pub color: ColorImage,

    /// Capture timestamp for latency tracking
    pub timestamp: Instant,
    pub sequence: u64,
}

impl RawFrame {
    pub fn is_aligned(&self) -> bool {
        self.depth.width == self.color.width && self.depth.height == self.color.height
    }
}

/// Per-pixel vertex array with a parallel RGBA color array.
///
/// `vertices[y * width + x]` is the deprojection of `depth (x, y)`; pixels
/// with no depth reading sit at the origin, which consumers tolerate.
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub vertices: Vec<Point3<f32>>,
    pub colors: Vec<[u8; 4]>,
    pub width: u32,
    pub height: u32,
}

/// Everything the camera adapter produces for one capture instant.
#[derive(Debug, Clone)]
pub struct Frameset {
    pub raw: RawFrame,
    pub cloud: PointCloud,

    /// False-color depth visualization, RGB8 top-down, same grid as `raw`
    pub depth_paletted: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_map_lookup_is_bounds_checked() {
        let map = DepthMap {
            data: vec![0, 100, 200, 300],
            width: 2,
            height: 2,
        };

        assert_eq!(map.get(1, 1), Some(300));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(0, 2), None);
    }

    #[test]
    fn distance_treats_missing_samples_as_zero() {
        let map = DepthMap {
            data: vec![0, 2000],
            width: 2,
            height: 1,
        };

        assert_eq!(map.distance_m(0, 0, 0.001), 0.0);
        assert!((map.distance_m(1, 0, 0.001) - 2.0).abs() < 1e-6);
        assert_eq!(map.distance_m(5, 5, 0.001), 0.0);
    }
}
