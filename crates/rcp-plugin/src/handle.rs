use core::ffi::c_void;

use rcp_plugin_sys as sys;

/// An opaque window or instance handle passed through the boundary.
///
/// Neither side dereferences it; it is forwarded to whatever UI the module
/// opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(sys::p_void);

impl Default for WindowHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl WindowHandle {
    pub const NULL: Self = Self(std::ptr::null_mut());

    #[inline]
    pub const fn from_raw(raw: *mut c_void) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> *mut c_void {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Handles placed into an init record.
///
/// Audio records carry `main` and `instance`, graphics records `main` and
/// `status_bar`, controller records `main` and (1.1) `instance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowHandles {
    pub main: WindowHandle,
    pub instance: WindowHandle,
    pub status_bar: WindowHandle,
}
