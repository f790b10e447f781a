pub mod dataset;
pub mod handoff;
pub mod processor;

pub use dataset::{Centroid, Dataset};
pub use handoff::Handoff;
pub use processor::{Processor, State};
