//! Safe bindings for both sides of the RCP plugin boundary.
//!
//! [`host`] loads plugin modules and drives them through versioned sessions.
//! [`module`] turns a Rust type into a plugin that any zilmar-spec emulator
//! can load, via the `export_*_plugin!` macros.

mod macros;

/// Opaque window handles.
pub mod handle;

/// Emulator side: discovery, entry-point binding and sessions.
pub mod host;

/// Plugin side: traits, per-call views and `extern "C"` adapters.
pub mod module;

pub use rcp_plugin_core::{
    buttons, byte_order, capability, controller, entry_points, hardware, memory, registers,
    version,
};
pub use rcp_plugin_sys as sys;
