pub mod camera_models;
pub mod capture_result;
pub mod config;
pub mod error;
pub mod mode;
pub mod orientation;
pub mod state;
