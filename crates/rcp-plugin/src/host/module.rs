use std::fmt;

use log::{debug, info};
use rcp_plugin_core::capability::CapabilityDescriptor;
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::version::{InfoShape, PluginCategory};
use rcp_plugin_sys as sys;

use super::entries::{Audio, CommonEntries, Controller, Gfx, Subsystem};
use super::symbols::{Resolver, SymbolSource};
use super::{LoadError, SessionError};
use crate::handle::WindowHandle;

/// What `GetDllInfo` told the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discovery {
    pub info: CapabilityDescriptor,
    pub shape: InfoShape,
}

/// Queries and validates the capability record of any plugin.
///
/// Only `GetDllInfo` is called. A module advertising a version the host does
/// not know is rejected here, before any layout-dependent call.
pub fn discover(source: &dyn SymbolSource) -> Result<Discovery, LoadError> {
    let get_dll_info: sys::GetDllInfo = unsafe {
        Resolver::new(source, InfoShape::AudioV1_1).required(EntryPoint::GetDllInfo)?
    };

    let mut raw = sys::PLUGIN_INFO::zeroed();
    unsafe { get_dll_info(&mut raw) };

    let info = CapabilityDescriptor::from_raw(&raw)?;
    // `from_raw` already negotiated successfully.
    let shape = info.shape().map_err(|e| LoadError::Capability(e.into()))?;
    debug!("{}: {info}, record shape {shape}", source.describe());
    Ok(Discovery { info, shape })
}

/// A validated plugin of category `K` with all required entry points bound.
pub struct Module<K: Subsystem> {
    info: CapabilityDescriptor,
    shape: InfoShape,
    pub(crate) common: CommonEntries,
    pub(crate) entries: K::Entries,
    source: Box<dyn SymbolSource>,
}

impl<K: Subsystem> fmt::Debug for Module<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("source", &self.source.describe())
            .field("info", &self.info)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl<K: Subsystem> Module<K> {
    /// Discovers, negotiates and binds a plugin from `source`.
    pub fn load(source: impl SymbolSource + 'static) -> Result<Self, LoadError> {
        Self::load_boxed(Box::new(source))
    }

    pub(crate) fn load_boxed(source: Box<dyn SymbolSource>) -> Result<Self, LoadError> {
        let Discovery { info, shape } = discover(source.as_ref())?;
        if info.category != K::CATEGORY {
            return Err(LoadError::WrongCategory {
                expected: K::CATEGORY,
                found: info.category,
            });
        }

        let resolver = Resolver::new(source.as_ref(), shape);
        let common = CommonEntries::resolve(&resolver)?;
        let entries = K::resolve(&resolver)?;
        info!("loaded {} plugin {:?} ({shape})", K::CATEGORY, info.name);

        Ok(Self {
            info,
            shape,
            common,
            entries,
            source,
        })
    }

    /// Opens a shared library and loads it as a `K` plugin.
    ///
    /// # Safety
    /// See [`super::LibrarySymbols::open`].
    #[cfg(feature = "dylib")]
    pub unsafe fn open(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let library = unsafe { super::LibrarySymbols::open(path)? };
        Self::load(library)
    }

    pub fn info(&self) -> &CapabilityDescriptor {
        &self.info
    }

    pub fn shape(&self) -> InfoShape {
        self.shape
    }

    pub fn entries(&self) -> &K::Entries {
        &self.entries
    }

    pub fn source(&self) -> &dyn SymbolSource {
        self.source.as_ref()
    }

    /// Shows the module's about box (`DllAbout`).
    pub fn about(&self, parent: WindowHandle) -> Result<(), SessionError> {
        let f = self
            .common
            .dll_about
            .ok_or(SessionError::MissingEntryPoint(EntryPoint::DllAbout))?;
        unsafe { f(parent.as_raw()) };
        Ok(())
    }

    /// Opens the module's configuration UI (`DllConfig`).
    pub fn config(&self, parent: WindowHandle) -> Result<(), SessionError> {
        let f = self
            .common
            .dll_config
            .ok_or(SessionError::MissingEntryPoint(EntryPoint::DllConfig))?;
        unsafe { f(parent.as_raw()) };
        Ok(())
    }

    /// Runs the module's self test (`DllTest`).
    pub fn test(&self, parent: WindowHandle) -> Result<(), SessionError> {
        let f = self
            .common
            .dll_test
            .ok_or(SessionError::MissingEntryPoint(EntryPoint::DllTest))?;
        unsafe { f(parent.as_raw()) };
        Ok(())
    }
}

/// A loaded plugin of whichever category it advertised.
#[derive(Debug)]
pub enum AnyModule {
    Audio(Module<Audio>),
    Gfx(Module<Gfx>),
    Controller(Module<Controller>),
}

impl AnyModule {
    pub fn load(source: impl SymbolSource + 'static) -> Result<Self, LoadError> {
        let source: Box<dyn SymbolSource> = Box::new(source);
        let Discovery { info, .. } = discover(source.as_ref())?;
        Ok(match info.category {
            PluginCategory::Audio => Self::Audio(Module::load_boxed(source)?),
            PluginCategory::Gfx => Self::Gfx(Module::load_boxed(source)?),
            PluginCategory::Controller => Self::Controller(Module::load_boxed(source)?),
        })
    }

    /// # Safety
    /// See [`super::LibrarySymbols::open`].
    #[cfg(feature = "dylib")]
    pub unsafe fn open(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let library = unsafe { super::LibrarySymbols::open(path)? };
        Self::load(library)
    }

    pub fn info(&self) -> &CapabilityDescriptor {
        match self {
            Self::Audio(m) => m.info(),
            Self::Gfx(m) => m.info(),
            Self::Controller(m) => m.info(),
        }
    }

    pub fn shape(&self) -> InfoShape {
        match self {
            Self::Audio(m) => m.shape(),
            Self::Gfx(m) => m.shape(),
            Self::Controller(m) => m.shape(),
        }
    }
}
