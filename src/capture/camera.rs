//! Camera adapter: owns the sensor session and turns raw pairs into
//! framesets (aligned frame + point cloud + paletted depth).

use nalgebra::Point3;
use tracing::{debug, info};

use crate::geometry::Intrinsics;
use crate::CameraConfig;

use super::convert;
use super::frame::{Frameset, PointCloud, RawFrame};
use super::sensor::{DepthSensor, SensorError};

pub struct DepthCamera {
    sensor: Box<dyn DepthSensor>,
    intrinsics: Intrinsics,
    depth_scale: f32,
    palette_near_m: f32,
    palette_far_m: f32,
    closed: bool,
}

impl DepthCamera {
    /// Wrap an opened sensor session.
    ///
    /// Calibration and depth scale are read once here and stay fixed until
    /// the session is closed.
    pub fn new(sensor: Box<dyn DepthSensor>, config: &CameraConfig) -> Self {
        let intrinsics = sensor.intrinsics().clone();
        let depth_scale = sensor.depth_scale();

        info!(
            width = intrinsics.width,
            height = intrinsics.height,
            depth_scale,
            "camera session ready"
        );

        Self {
            sensor,
            intrinsics,
            depth_scale,
            palette_near_m: config.palette_near_m,
            palette_far_m: config.palette_far_m,
            closed: false,
        }
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Raw-sensor-unit to meters conversion factor for this session.
    pub fn depth_scale(&self) -> f32 {
        self.depth_scale
    }

    /// Deproject using this session's calibration.
    pub fn deproject_pixel_to_point(&self, pixel: (f32, f32), depth_m: f32) -> Point3<f32> {
        self.intrinsics.deproject(pixel, depth_m)
    }

    /// Block until the next usable frame pair and build its point cloud.
    ///
    /// Pairs whose depth and color grids disagree failed alignment in the
    /// SDK; they are skipped silently and the call waits for the next pair
    /// instead of surfacing a transient error.
    pub fn get_frames(&mut self) -> Result<Frameset, SensorError> {
        loop {
            let raw = match self.sensor.wait_for_frames() {
                Ok(raw) => raw,
                Err(SensorError::Misaligned) => {
                    debug!("skipping incomplete frame pair");
                    continue;
                }
                Err(err) => return Err(err),
            };

            if !raw.is_aligned() {
                debug!(
                    sequence = raw.sequence,
                    "skipping misaligned frame pair"
                );
                continue;
            }

            let depth_paletted = convert::depth_to_rgb(
                &raw.depth,
                self.depth_scale,
                self.palette_near_m,
                self.palette_far_m,
            );
            let cloud = self.build_pointcloud(&raw, &depth_paletted);

            return Ok(Frameset {
                raw,
                cloud,
                depth_paletted,
            });
        }
    }

    /// Release the sensor session. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed {
            self.sensor.close();
            self.closed = true;
            info!("camera session closed");
        }
    }

    fn build_pointcloud(&self, raw: &RawFrame, palette_rgb: &[u8]) -> PointCloud {
        let (width, height) = (raw.depth.width, raw.depth.height);
        let mut vertices = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let sample = raw.depth.data[(y * width + x) as usize];
                vertices.push(if sample == 0 {
                    Point3::origin()
                } else {
                    self.intrinsics.deproject(
                        (x as f32, y as f32),
                        sample as f32 * self.depth_scale,
                    )
                });
            }
        }

        PointCloud {
            vertices,
            colors: convert::point_colors(palette_rgb),
            width,
            height,
        }
    }
}

impl Drop for DepthCamera {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use bytes::Bytes;

    use crate::capture::frame::{ColorImage, DepthMap};
    use crate::geometry::Distortion;

    use super::*;

    /// Scripted sensor: yields each queued frame once, then closes.
    struct ScriptedSensor {
        frames: Vec<RawFrame>,
        intrinsics: Intrinsics,
        closed: bool,
    }

    impl ScriptedSensor {
        fn new(frames: Vec<RawFrame>) -> Self {
            Self {
                frames,
                intrinsics: Intrinsics {
                    width: 4,
                    height: 4,
                    fx: 4.0,
                    fy: 4.0,
                    ppx: 2.0,
                    ppy: 2.0,
                    distortion: Distortion::None,
                },
                closed: false,
            }
        }
    }

    impl DepthSensor for ScriptedSensor {
        fn wait_for_frames(&mut self) -> Result<RawFrame, SensorError> {
            if self.closed {
                return Err(SensorError::Closed);
            }
            if self.frames.is_empty() {
                return Err(SensorError::Closed);
            }
            Ok(self.frames.remove(0))
        }

        fn intrinsics(&self) -> &Intrinsics {
            &self.intrinsics
        }

        fn depth_scale(&self) -> f32 {
            0.001
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn frame(depth_w: u32, color_w: u32, sequence: u64) -> RawFrame {
        RawFrame {
            depth: DepthMap {
                data: vec![1000; (depth_w * 4) as usize],
                width: depth_w,
                height: 4,
            },
            color: ColorImage {
                data: Bytes::from(vec![128u8; (color_w * 4 * 3) as usize]),
                width: color_w,
                height: 4,
            },
            timestamp: Instant::now(),
            sequence,
        }
    }

    #[test]
    fn misaligned_pairs_are_skipped_until_a_good_one_arrives() {
        let sensor = ScriptedSensor::new(vec![frame(3, 4, 1), frame(4, 4, 2)]);
        let mut camera = DepthCamera::new(Box::new(sensor), &CameraConfig::default());

        let frameset = camera.get_frames().expect("aligned pair should survive");
        assert_eq!(frameset.raw.sequence, 2);
        assert!(frameset.raw.is_aligned());
    }

    #[test]
    fn pointcloud_matches_frame_grid_and_deprojects_depth() {
        let sensor = ScriptedSensor::new(vec![frame(4, 4, 1)]);
        let mut camera = DepthCamera::new(Box::new(sensor), &CameraConfig::default());

        let frameset = camera.get_frames().unwrap();
        assert_eq!(frameset.cloud.vertices.len(), 16);
        assert_eq!(frameset.cloud.colors.len(), 16);
        assert_eq!(frameset.cloud.width, frameset.raw.depth.width);

        // All samples are 1000 raw units = 1.0 m, so every vertex sits at z = 1.
        for v in &frameset.cloud.vertices {
            assert!((v.z - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn unreadable_depth_becomes_origin_vertex() {
        let mut f = frame(4, 4, 1);
        f.depth.data[5] = 0;
        let sensor = ScriptedSensor::new(vec![f]);
        let mut camera = DepthCamera::new(Box::new(sensor), &CameraConfig::default());

        let frameset = camera.get_frames().unwrap();
        assert_eq!(frameset.cloud.vertices[5], Point3::origin());
    }

    #[test]
    fn close_is_idempotent() {
        let sensor = ScriptedSensor::new(vec![]);
        let mut camera = DepthCamera::new(Box::new(sensor), &CameraConfig::default());

        camera.close();
        camera.close();
    }
}
