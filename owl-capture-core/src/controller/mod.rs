pub mod capture_controller;
pub mod screen;
