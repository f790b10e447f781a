//! Hardware-free sensor for builds without the `realsense` feature.
//!
//! Produces a fixed scene: a flat backdrop with a raised block in the middle
//! and a color gradient, paced at the configured frame rate. Useful for
//! exercising the full pipeline on machines with no depth camera attached.

use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::info;

use crate::geometry::{Distortion, Intrinsics};
use crate::CameraConfig;

use super::frame::{ColorImage, DepthMap, RawFrame};
use super::sensor::{DepthSensor, SensorError};

/// Horizontal field of view used to derive plausible focal lengths.
const FOV_X_DEG: f32 = 87.0;

/// Backdrop and block distances in raw units (1 unit = 1 mm at the
/// default depth scale).
const BACKDROP_RAW: u16 = 3000;
const BLOCK_RAW: u16 = 1200;

pub struct SyntheticSensor {
    intrinsics: Intrinsics,
    depth_scale: f32,
    frame_interval: Duration,
    depth: Vec<u16>,
    color: Bytes,
    sequence: u64,
    closed: bool,
}

impl SyntheticSensor {
    pub fn new(config: &CameraConfig) -> Self {
        let (w, h) = (config.width, config.height);
        let fx = w as f32 / (2.0 * (FOV_X_DEG.to_radians() / 2.0).tan());

        let intrinsics = Intrinsics {
            width: w,
            height: h,
            fx,
            fy: fx,
            ppx: w as f32 / 2.0,
            ppy: h as f32 / 2.0,
            distortion: Distortion::None,
        };

        // Raised block covering the central third of the image, with a thin
        // band of unreadable pixels along its left edge.
        let mut depth = vec![BACKDROP_RAW; (w * h) as usize];
        for y in h / 3..2 * h / 3 {
            for x in w / 3..2 * w / 3 {
                let i = (y * w + x) as usize;
                depth[i] = if x < w / 3 + 2 { 0 } else { BLOCK_RAW };
            }
        }

        let mut color = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                color.push((x * 255 / w.max(1)) as u8);
                color.push((y * 255 / h.max(1)) as u8);
                color.push(96);
            }
        }

        info!(width = w, height = h, fps = config.fps, "synthetic sensor ready");

        Self {
            intrinsics,
            depth_scale: 0.001,
            frame_interval: Duration::from_secs(1) / config.fps.max(1),
            depth,
            color: Bytes::from(color),
            sequence: 0,
            closed: false,
        }
    }
}

impl DepthSensor for SyntheticSensor {
    fn wait_for_frames(&mut self) -> Result<RawFrame, SensorError> {
        if self.closed {
            return Err(SensorError::Closed);
        }

        // Pace like a real camera would.
        thread::sleep(self.frame_interval);
        self.sequence += 1;

        Ok(RawFrame {
            depth: DepthMap {
                data: self.depth.clone(),
                width: self.intrinsics.width,
                height: self.intrinsics.height,
            },
            color: ColorImage {
                data: self.color.clone(),
                width: self.intrinsics.width,
                height: self.intrinsics.height,
            },
            timestamp: Instant::now(),
            sequence: self.sequence,
        })
    }

    fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    fn depth_scale(&self) -> f32 {
        self.depth_scale
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_aligned_and_sequenced() {
        let mut sensor = SyntheticSensor::new(&CameraConfig {
            width: 64,
            height: 48,
            fps: 1000,
            ..CameraConfig::default()
        });

        let a = sensor.wait_for_frames().unwrap();
        let b = sensor.wait_for_frames().unwrap();

        assert!(a.is_aligned());
        assert_eq!(a.sequence + 1, b.sequence);
    }

    #[test]
    fn closed_sensor_stops_producing() {
        let mut sensor = SyntheticSensor::new(&CameraConfig {
            width: 16,
            height: 16,
            fps: 1000,
            ..CameraConfig::default()
        });

        sensor.close();
        assert!(matches!(
            sensor.wait_for_frames(),
            Err(SensorError::Closed)
        ));
    }
}
