pub mod camera;
pub mod convert;
pub mod frame;
pub mod sensor;
pub mod synthetic;

#[cfg(feature = "realsense")]
pub mod realsense;

pub use camera::DepthCamera;
pub use frame::{ColorImage, DepthMap, Frameset, PointCloud, RawFrame};
pub use sensor::{DepthSensor, SensorError};
