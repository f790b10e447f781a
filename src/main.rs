//! Argus capture-to-publish pipeline for the depth-sensing installation.

use std::sync::Arc;
use std::time::Duration;

use argus::capture::DepthCamera;
use argus::geometry::FrustumGeometry;
use argus::pipeline::{Handoff, Processor};
use argus::segmentation::{NullModel, SegmentationBridge};
use color_eyre::Result;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("argus=debug")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("Argus launching...");

    // Load configuration
    let config = argus::Config::load()?;
    argus::CONFIG.store(Arc::new(config.clone()));

    // Open the sensor session; a missing device is fatal, there is no
    // degraded mode.
    #[cfg(feature = "realsense")]
    let sensor = argus::capture::realsense::RealSenseSensor::open(&config.camera)?;
    #[cfg(not(feature = "realsense"))]
    let sensor = {
        tracing::warn!("built without the realsense feature, using the synthetic sensor");
        argus::capture::synthetic::SyntheticSensor::new(&config.camera)
    };

    let camera = DepthCamera::new(Box::new(sensor), &config.camera);

    // Static field-of-view wireframe for the renderer; intrinsics are fixed
    // for the session, so this is computed exactly once.
    let frustum = FrustumGeometry::new(camera.intrinsics(), &config.frustum.sample_depths_m);
    info!(
        segments = frustum.segments.len(),
        "precomputed frustum wireframe"
    );

    let bridge = SegmentationBridge::new(Box::new(NullModel), &config.segmentation);

    let handoff = Arc::new(Handoff::new());
    let mut processor = Processor::new(camera, bridge, handoff.clone());
    processor.start();

    // Headless consumer: poll at display cadence, keep showing the last
    // dataset when no new one is ready. The real renderer does the same
    // through `try_take`.
    let mut current = None;
    let mut ticker = tokio::time::interval(Duration::from_millis(16));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                if let Some(dataset) = handoff.try_take() {
                    debug!(centroids = dataset.centroids.len(), "dataset received");
                    current = Some(dataset);
                } else if current.is_none() {
                    debug!("initializing RGB/depth stream");
                }
            }
        }
    }

    processor.stop();
    let (published, taken, dropped) = handoff.stats();
    info!(published, taken, dropped, "Argus shutting down");
    Ok(())
}
