//! Pixel-to-3D deprojection and static frustum precomputation.
//!
//! Everything here is pure math over calibration constants; no sensor state.

use nalgebra::Point3;

/// Lens distortion of the depth stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distortion {
    /// Ideal pinhole, no correction applied
    None,
    /// Brown-Conrady with coefficients `[k1, k2, p1, p2, k3]`
    BrownConrady([f32; 5]),
}

/// Calibration of one stream, fixed at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
    pub fx: f32,
    pub fy: f32,
    pub ppx: f32,
    pub ppy: f32,
    pub distortion: Distortion,
}

impl Intrinsics {
    /// Map a 2D pixel plus a metric depth to a 3D point in camera space.
    ///
    /// The caller decides what to do with zero/invalid depth; a depth of 0.0
    /// collapses the ray onto the origin.
    pub fn deproject(&self, pixel: (f32, f32), depth: f32) -> Point3<f32> {
        let mut x = (pixel.0 - self.ppx) / self.fx;
        let mut y = (pixel.1 - self.ppy) / self.fy;

        if let Distortion::BrownConrady(c) = self.distortion {
            // Fixed-point iteration inverting the forward distortion model.
            let (xd, yd) = (x, y);
            for _ in 0..10 {
                let r2 = x * x + y * y;
                let radial = 1.0 + r2 * (c[0] + r2 * (c[1] + r2 * c[4]));
                let dx = 2.0 * c[2] * x * y + c[3] * (r2 + 2.0 * x * x);
                let dy = 2.0 * c[3] * x * y + c[2] * (r2 + 2.0 * y * y);
                x = (xd - dx) / radial;
                y = (yd - dy) / radial;
            }
        }

        Point3::new(depth * x, depth * y, depth)
    }
}

/// Field-of-view wireframe: for each sample depth, a ray from the origin to
/// every corner of the image plane plus the four edges connecting them.
///
/// Computed once at startup; intrinsics never change mid-session.
#[derive(Debug, Clone)]
pub struct FrustumGeometry {
    pub segments: Vec<[Point3<f32>; 2]>,
}

impl FrustumGeometry {
    pub fn new(intrinsics: &Intrinsics, sample_depths_m: &[f32]) -> Self {
        let w = intrinsics.width as f32;
        let h = intrinsics.height as f32;
        let origin = Point3::origin();

        let mut segments = Vec::with_capacity(sample_depths_m.len() * 8);
        for &depth in sample_depths_m {
            let corners = [
                intrinsics.deproject((0.0, 0.0), depth),
                intrinsics.deproject((w, 0.0), depth),
                intrinsics.deproject((w, h), depth),
                intrinsics.deproject((0.0, h), depth),
            ];
            for corner in corners {
                segments.push([origin, corner]);
            }
            for i in 0..4 {
                segments.push([corners[i], corners[(i + 1) % 4]]);
            }
        }

        Self { segments }
    }
}
