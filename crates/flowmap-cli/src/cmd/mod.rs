pub mod config;
pub mod input;
pub mod normalize;
pub mod stats;
