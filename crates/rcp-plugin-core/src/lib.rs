//! Platform-agnostic types of the RCP plugin boundary.
//!
//! This crate holds everything both sides of the boundary agree on: API
//! versions and the record shape they select, capability records, the
//! session-wide memory order, host-owned memory and register storage with
//! the borrowed views a plugin sees, and the packed controller state codec.
//! Loading libraries and driving sessions lives in `rcp-plugin`.

/// Byte-order (memory representation) of shared emulated memory.
pub mod byte_order;

/// Packed input-state union: bit orders, views and the session codec.
pub mod buttons;

/// `PLUGIN_INFO` decoding and validation.
pub mod capability;

/// Controller slots, accessories and raw command framing.
pub mod controller;

/// Exported symbols and their availability per record shape.
pub mod entry_points;

/// TV system types.
pub mod hardware;

/// Host-owned memory regions and plugin-side region views.
pub mod memory;

/// Memory-mapped register storage and register pointer tables.
pub mod registers;

/// API versions, plugin categories and version negotiation.
pub mod version;

pub use rcp_plugin_sys as sys;
