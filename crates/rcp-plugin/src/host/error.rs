use rcp_plugin_core::byte_order::MemoryOrder;
use rcp_plugin_core::capability::CapabilityError;
use rcp_plugin_core::controller::ControllerError;
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::version::PluginCategory;
use thiserror::Error;

/// Discovery-time rejection of a module. Nothing past `GetDllInfo` has been
/// called when one of these is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[cfg(feature = "dylib")]
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: std::path::PathBuf,
        source: libloading::Error,
    },

    #[error("required entry point {} is not exported", .0.name())]
    MissingSymbol(EntryPoint),

    #[error("invalid capability record: {0}")]
    Capability(#[from] CapabilityError),

    #[error("expected a {expected} plugin, found a {found} plugin")]
    WrongCategory {
        expected: PluginCategory,
        found: PluginCategory,
    },
}

/// Host-side misuse of a session, or a failure reported by the module.
///
/// None of these reach the module: the offending call is not made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid session usage: {0}")]
    InvalidState(&'static str),

    #[error("initialization must run on the thread that created the session")]
    WrongContext,

    #[error("module does not export {}", .0.name())]
    MissingEntryPoint(EntryPoint),

    #[error("module does not support {0:?} memory")]
    UnsupportedMemoryOrder(MemoryOrder),

    #[error("module advertises no usable memory order")]
    NoMemoryOrder,

    #[error("module reported initialization failure")]
    InitFailed,

    #[error("path is not representable as a C string")]
    InvalidPath,

    #[error(transparent)]
    Controller(#[from] ControllerError),
}
