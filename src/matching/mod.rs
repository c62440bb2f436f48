pub mod blocking;
pub mod normalize;
pub mod scoring;
