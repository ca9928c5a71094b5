// Try-on compositing pipeline

pub mod annotate;
pub mod compose;
pub mod normalize;
pub mod types;
