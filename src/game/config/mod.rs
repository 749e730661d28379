mod config_file;
mod scene_config;

pub use config_file::*;
pub use scene_config::*;
