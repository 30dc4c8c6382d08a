//! # owl-capture-virtual
//!
//! Software backend for owl-capture-core.
//!
//! Provides:
//! - `VirtualCamera`: back and front cameras rendering test patterns, a
//!   movie writer thread and asynchronous stills
//! - `StaticPermissions`: scripted camera and microphone authorization
//! - `frames`: pattern rendering and the virtual movie container
//!
//! ## Usage
//! ```ignore
//! use owl_capture_core::{CaptureController, OwlConfiguration};
//! use owl_capture_virtual::{StaticPermissions, VirtualCamera};
//!
//! let config = OwlConfiguration::video(10)?;
//! let mut controller = CaptureController::new(
//!     config,
//!     VirtualCamera::new(),
//!     Arc::new(StaticPermissions::granted()),
//!     delegate,
//! )?;
//! controller.present();
//! ```

pub mod frames;
pub mod permissions;
pub mod virtual_camera;

pub use permissions::StaticPermissions;
pub use virtual_camera::{VirtualCamera, VirtualProbe, VirtualStats};
