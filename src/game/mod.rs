pub mod camera;
pub mod config;
pub mod orbit_controls;
pub mod scenes;
