//! RealSense sensor session via librealsense2 bindings.
//!
//! Hardware glue only: stream configuration, frame copies into our own
//! buffers, and calibration readout. Everything downstream of the
//! [`DepthSensor`] trait is sensor-agnostic.

use std::collections::HashSet;
use std::time::Instant;

use bytes::Bytes;
use realsense_rust::{
    config::Config as RsConfig,
    context::Context,
    frame::{ColorFrame, DepthFrame, PixelKind},
    kind::{Rs2CameraInfo, Rs2DistortionModel, Rs2Format, Rs2Option, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};
use tracing::info;

use crate::geometry::{Distortion, Intrinsics};
use crate::CameraConfig;

use super::frame::{ColorImage, DepthMap, RawFrame};
use super::sensor::{DepthSensor, SensorError};

/// Fallback when the driver does not report depth units (D400 default).
const DEFAULT_DEPTH_SCALE: f32 = 0.001;

pub struct RealSenseSensor {
    pipeline: Option<ActivePipeline>,
    intrinsics: Intrinsics,
    depth_scale: f32,
    sequence: u64,
}

impl RealSenseSensor {
    /// Enumerate devices and start synchronized depth+color streaming.
    ///
    /// Fails with [`SensorError::DeviceNotFound`] when no camera is attached;
    /// there is no degraded mode.
    pub fn open(config: &CameraConfig) -> Result<Self, SensorError> {
        let context = Context::new().map_err(stream_err)?;

        let devices = context.query_devices(HashSet::new());
        let device = devices.first().ok_or(SensorError::DeviceNotFound)?;

        info!("Opened camera:");
        info!("  Device name: {}", device_info(device, Rs2CameraInfo::Name));
        info!(
            "  Serial number: {}",
            device_info(device, Rs2CameraInfo::SerialNumber)
        );
        info!(
            "  Firmware version: {}",
            device_info(device, Rs2CameraInfo::FirmwareVersion)
        );

        let depth_scale = device
            .sensors()
            .iter()
            .find_map(|s| s.get_option(Rs2Option::DepthUnits))
            .unwrap_or(DEFAULT_DEPTH_SCALE);

        let mut rs_config = RsConfig::new();
        rs_config
            .enable_stream(
                Rs2StreamKind::Depth,
                None,
                config.width as usize,
                config.height as usize,
                Rs2Format::Z16,
                config.fps as usize,
            )
            .map_err(stream_err)?
            .enable_stream(
                Rs2StreamKind::Color,
                None,
                config.width as usize,
                config.height as usize,
                Rs2Format::Rgb8,
                config.fps as usize,
            )
            .map_err(stream_err)?;

        let inactive = InactivePipeline::try_from(&context).map_err(stream_err)?;
        let pipeline = inactive.start(Some(rs_config)).map_err(stream_err)?;

        let intrinsics = pipeline
            .profile()
            .streams()
            .iter()
            .find(|s| s.kind() == Rs2StreamKind::Depth)
            .ok_or_else(|| SensorError::Stream("no depth stream in profile".into()))
            .and_then(|stream| {
                stream
                    .intrinsics()
                    .map_err(stream_err)
                    .map(|i| map_intrinsics(&i))
            })?;

        Ok(Self {
            pipeline: Some(pipeline),
            intrinsics,
            depth_scale,
            sequence: 0,
        })
    }
}

impl DepthSensor for RealSenseSensor {
    fn wait_for_frames(&mut self) -> Result<RawFrame, SensorError> {
        let pipeline = self.pipeline.as_mut().ok_or(SensorError::Closed)?;

        let frames = pipeline.wait(None).map_err(stream_err)?;

        let depth_frames = frames.frames_of_type::<DepthFrame>();
        let color_frames = frames.frames_of_type::<ColorFrame>();
        let (Some(depth), Some(color)) = (depth_frames.first(), color_frames.first()) else {
            return Err(SensorError::Misaligned);
        };

        self.sequence += 1;

        Ok(RawFrame {
            depth: copy_depth(depth),
            color: copy_color(color),
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
        if let Some(pipeline) = self.pipeline.take() {
            let _ = pipeline.stop();
            info!("RealSense pipeline stopped");
        }
    }
}

fn stream_err<E: std::fmt::Display>(err: E) -> SensorError {
    SensorError::Stream(err.to_string())
}

fn device_info(device: &realsense_rust::device::Device, info: Rs2CameraInfo) -> String {
    device
        .info(info)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".into())
}

fn map_intrinsics(intr: &realsense_rust::base::Rs2Intrinsics) -> Intrinsics {
    let distortion = match intr.distortion().model {
        Rs2DistortionModel::None => Distortion::None,
        _ => Distortion::BrownConrady(intr.distortion().coeffs),
    };

    Intrinsics {
        width: intr.width() as u32,
        height: intr.height() as u32,
        fx: intr.fx(),
        fy: intr.fy(),
        ppx: intr.ppx(),
        ppy: intr.ppy(),
        distortion,
    }
}

fn copy_depth(frame: &DepthFrame) -> DepthMap {
    let (width, height) = (frame.width(), frame.height());
    let mut data = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            // Safety bound: x/y iterate the frame's own dimensions.
            match unsafe { frame.get_unchecked(x, y) } {
                PixelKind::Z16 { depth } => data.push(*depth),
                _ => data.push(0),
            }
        }
    }

    DepthMap {
        data,
        width: width as u32,
        height: height as u32,
    }
}

fn copy_color(frame: &ColorFrame) -> ColorImage {
    let (width, height) = (frame.width(), frame.height());
    let mut data = Vec::with_capacity(width * height * 3);

    for y in 0..height {
        for x in 0..width {
            match unsafe { frame.get_unchecked(x, y) } {
                PixelKind::Rgb8 { r, g, b } => data.extend_from_slice(&[*r, *g, *b]),
                PixelKind::Bgr8 { r, g, b } => data.extend_from_slice(&[*r, *g, *b]),
                _ => data.extend_from_slice(&[0, 0, 0]),
            }
        }
    }

    ColorImage {
        data: Bytes::from(data),
        width: width as u32,
        height: height as u32,
    }
}
