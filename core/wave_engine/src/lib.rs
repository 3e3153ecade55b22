pub mod buffer;
pub mod clip;
pub mod constants;
pub mod device_manager;
pub mod error;
pub mod file;
pub mod graph;
pub mod mixer;
pub mod nodes;
pub mod player;
pub mod plugin;
pub mod resampler;
