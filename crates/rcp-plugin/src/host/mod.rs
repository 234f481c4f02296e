//! Emulator side of the boundary: discovering modules, binding entry points
//! and driving sessions.

mod error;
mod module;
mod session;
mod symbols;

/// Bound entry-point tables and the category markers.
pub mod entries;

/// The default `CheckInterrupts` callback.
pub mod interrupts;

pub use entries::{Audio, Controller, Gfx, Subsystem};
pub use error::{LoadError, SessionError};
pub use module::{AnyModule, Discovery, Module, discover};
pub use session::{HostResources, Session, SessionConfig, SessionState};
#[cfg(feature = "dylib")]
pub use symbols::LibrarySymbols;
pub use symbols::{Resolver, StaticSymbols, SymbolSource};
