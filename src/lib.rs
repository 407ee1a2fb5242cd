//! KMS resource topology printer
//!
//! Walks the connectors, encoders, CRTCs, planes and framebuffers of a DRM
//! card and prints which objects are wired together and which display modes
//! are available.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────────┐
//! │ DRM device   │ ──> │ Card         │ ──> │ walker                   │
//! │ (device.rs)  │     │ (model.rs)   │     │  ├─ format (objects)     │
//! └──────────────┘     └──────────────┘     │  └─ videomode (timings)  │
//!                                           └──────────────────────────┘
//! ```
//!
//! The [`Card`] is an immutable snapshot taken once when the device is
//! opened. Everything downstream of it is pure formatting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kmsprint::{device, walker};
//!
//! let card = device::open(None)?;
//! walker::print_modes(&card, &mut std::io::stdout().lock())?;
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod model;
pub mod videomode;
pub mod walker;

pub use config::Config;
pub use error::Error;
pub use model::{Card, DrmObject};
pub use videomode::Videomode;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
