use core::ffi::c_void;
use std::collections::HashMap;
use std::ffi::CStr;
use std::fmt;
use std::ptr::NonNull;

use log::debug;
use rcp_plugin_core::entry_points::{Availability, EntryPoint};
use rcp_plugin_core::version::InfoShape;

use super::LoadError;

/// Where exported entry points come from.
///
/// A shared library is the usual source; plugins linked into the host binary
/// can be registered through [`StaticSymbols`].
pub trait SymbolSource: Send {
    /// Address of the exported function `name`, if any.
    fn lookup(&self, name: &CStr) -> Option<NonNull<c_void>>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String {
        "<in-process>".to_owned()
    }
}

impl<S: SymbolSource + ?Sized> SymbolSource for Box<S> {
    fn lookup(&self, name: &CStr) -> Option<NonNull<c_void>> {
        (**self).lookup(name)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// In-process symbol table keyed by exported name.
#[derive(Clone, Default)]
pub struct StaticSymbols {
    label: String,
    // Addresses are stored as integers so the table stays `Send`.
    table: HashMap<&'static CStr, usize>,
}

impl fmt::Debug for StaticSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.table.keys().collect();
        names.sort();
        f.debug_struct("StaticSymbols")
            .field("label", &self.label)
            .field("symbols", &names)
            .finish()
    }
}

impl StaticSymbols {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            table: HashMap::new(),
        }
    }

    /// Registers `addr` (an `extern "C"` function cast to `*const ()`) under
    /// the exported name of `entry`.
    pub fn insert(&mut self, entry: EntryPoint, addr: *const ()) {
        if addr.is_null() {
            self.table.remove(entry.symbol());
        } else {
            self.table.insert(entry.symbol(), addr as usize);
        }
    }

    #[must_use]
    pub fn with(mut self, entry: EntryPoint, addr: *const ()) -> Self {
        self.insert(entry, addr);
        self
    }

    #[must_use]
    pub fn without(mut self, entry: EntryPoint) -> Self {
        self.table.remove(entry.symbol());
        self
    }

    pub fn contains(&self, entry: EntryPoint) -> bool {
        self.table.contains_key(entry.symbol())
    }
}

impl SymbolSource for StaticSymbols {
    fn lookup(&self, name: &CStr) -> Option<NonNull<c_void>> {
        let addr = *self.table.get(name)?;
        NonNull::new(addr as *mut c_void)
    }

    fn describe(&self) -> String {
        if self.label.is_empty() {
            "<in-process>".to_owned()
        } else {
            self.label.clone()
        }
    }
}

/// Shared library opened from disk.
#[cfg(feature = "dylib")]
pub struct LibrarySymbols {
    path: std::path::PathBuf,
    library: libloading::Library,
}

#[cfg(feature = "dylib")]
impl fmt::Debug for LibrarySymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibrarySymbols")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "dylib")]
impl LibrarySymbols {
    /// Opens the library, running its initializers.
    ///
    /// # Safety
    /// Loading a library executes arbitrary code from it; the caller vouches
    /// for the file.
    pub unsafe fn open(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let library = unsafe { libloading::Library::new(&path) }.map_err(|source| {
            LoadError::Open {
                path: path.clone(),
                source,
            }
        })?;
        debug!("opened plugin library {}", path.display());
        Ok(Self { path, library })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "dylib")]
impl SymbolSource for LibrarySymbols {
    fn lookup(&self, name: &CStr) -> Option<NonNull<c_void>> {
        let symbol = unsafe { self.library.get::<*mut c_void>(name.to_bytes_with_nul()) }.ok()?;
        NonNull::new(*symbol)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Typed entry-point lookup for one negotiated shape.
#[doc(hidden)]
pub struct Resolver<'a> {
    source: &'a dyn SymbolSource,
    shape: InfoShape,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(source: &'a dyn SymbolSource, shape: InfoShape) -> Self {
        Self { source, shape }
    }

    pub(crate) fn shape(&self) -> InfoShape {
        self.shape
    }

    /// # Safety
    /// `F` must be the function-pointer type the headers declare for `entry`.
    pub(crate) unsafe fn required<F: Copy>(&self, entry: EntryPoint) -> Result<F, LoadError> {
        unsafe { self.lookup(entry) }.ok_or(LoadError::MissingSymbol(entry))
    }

    /// # Safety
    /// Same contract as [`Resolver::required`].
    pub(crate) unsafe fn optional<F: Copy>(&self, entry: EntryPoint) -> Option<F> {
        if entry.availability(self.shape) == Availability::Absent {
            return None;
        }
        let found = unsafe { self.lookup(entry) };
        if found.is_none() {
            debug!(
                "{} does not export optional {}",
                self.source.describe(),
                entry.name()
            );
        }
        found
    }

    unsafe fn lookup<F: Copy>(&self, entry: EntryPoint) -> Option<F> {
        let addr = self.source.lookup(entry.symbol())?;
        debug_assert_eq!(size_of::<F>(), size_of::<*mut c_void>());
        Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&addr.as_ptr()) })
    }
}
