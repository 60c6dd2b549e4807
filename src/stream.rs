pub mod classifier;
pub mod context;
pub mod processor;
pub mod rules;

pub use classifier::{LineClassifier, LineType};
pub use context::TransformContext;
pub use processor::StreamProcessor;
