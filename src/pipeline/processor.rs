//! Background pipeline driver.
//!
//! One dedicated thread pulls frames, runs segmentation, assembles datasets
//! and publishes them to the handoff, independent of the consumer's draw
//! cadence. Segmentation is the rate-limiting step, so freshness beats
//! completeness: an unconsumed dataset is simply replaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use metrics::counter;
use tracing::{error, info};

use crate::capture::camera::DepthCamera;
use crate::capture::convert;
use crate::capture::sensor::SensorError;
use crate::segmentation::SegmentationBridge;

use super::dataset::{Centroid, Dataset};
use super::handoff::Handoff;

/// Lifecycle of the background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Stopping,
    Stopped,
}

pub struct Processor {
    camera: Option<DepthCamera>,
    bridge: Option<SegmentationBridge>,
    handoff: Arc<Handoff<Dataset>>,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    state: State,
}

impl Processor {
    /// The camera and the segmentation bridge are owned resources: once the
    /// loop starts, only the worker thread touches them.
    pub fn new(
        camera: DepthCamera,
        bridge: SegmentationBridge,
        handoff: Arc<Handoff<Dataset>>,
    ) -> Self {
        Self {
            camera: Some(camera),
            bridge: Some(bridge),
            handoff,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn handoff(&self) -> Arc<Handoff<Dataset>> {
        self.handoff.clone()
    }

    /// Spawn the background loop. Only valid from `Idle`.
    pub fn start(&mut self) {
        if self.state != State::Idle {
            return;
        }
        let (Some(mut camera), Some(mut bridge)) = (self.camera.take(), self.bridge.take())
        else {
            return;
        };

        let handoff = self.handoff.clone();
        let stop_flag = self.stop_flag.clone();

        info!("starting processor thread");
        self.worker = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match process_frame(&mut camera, &mut bridge, &handoff) {
                    Ok(()) => counter!("argus_datasets_published_total").increment(1),
                    Err(err) => {
                        // Device lost mid-stream; the loop cannot recover.
                        error!(%err, "camera stream failed, pipeline loop exiting");
                        break;
                    }
                }
            }
            // The loop owns the session, so nothing can be mid-read here.
            camera.close();
            info!("processor thread exiting");
        }));
        self.state = State::Running;
    }

    /// Signal the loop and block until it has fully terminated.
    ///
    /// The in-flight frame (sensor read and inference included) is allowed
    /// to finish; when this returns, no further camera or model calls will
    /// happen and the camera session is closed.
    pub fn stop(&mut self) {
        if self.state != State::Running {
            return;
        }
        self.state = State::Stopping;
        info!("stopping processor thread");

        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        self.state = State::Stopped;
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pipeline iteration: capture, segment, assemble, publish.
fn process_frame(
    camera: &mut DepthCamera,
    bridge: &mut SegmentationBridge,
    handoff: &Handoff<Dataset>,
) -> Result<(), SensorError> {
    let frameset = camera.get_frames()?;
    counter!("argus_frames_total").increment(1);

    let depth_scale = camera.depth_scale();
    let segmented = bridge.segment(&frameset.raw.color, &frameset.raw.depth, depth_scale);

    let centroids = segmented
        .centroids
        .iter()
        .map(|c| Centroid {
            x: c.x,
            y: c.y,
            distance_mm: (c.distance_m / depth_scale) as u32,
        })
        .collect();

    let (width, height) = (frameset.raw.color.width, frameset.raw.color.height);
    handoff.publish(Dataset {
        color_image: convert::render_ready(&frameset.raw.color.data, width, height),
        depth_paletted_image: convert::render_ready(&frameset.depth_paletted, width, height),
        segmented_image: convert::render_ready(&segmented.overlay, width, height),
        centroids,
        pointcloud: frameset.cloud,
    });

    Ok(())
}
