//! Plugin side of the boundary.
//!
//! A plugin type implements [`Plugin`] plus one category trait
//! ([`AudioPlugin`], [`GfxPlugin`] or [`ControllerPlugin`]). The generic
//! `extern "C"` functions in this module adapt it to the C entry points; the
//! `export_*_plugin!` macros give them their C names in a `cdylib`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::error;
use rcp_plugin_core::capability::{CapabilityDescriptor, MemorySupport};
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::version::{ApiVersion, PluginCategory};
use rcp_plugin_sys as sys;

use crate::handle::WindowHandle;
use crate::host::StaticSymbols;

mod audio;
mod controller;
mod gfx;
mod rcp;
mod slot;

pub use audio::{
    AudioPlugin, ai_dacrate_changed, ai_len_changed, ai_read_length, ai_update, audio_entries,
    initiate_audio, process_alist,
};
pub use controller::{
    ControllerPlugin, ControllerRecord, controller_command, controller_entries,
    controller_entries_v0100, get_keys, initiate_controllers, initiate_controllers_v0100,
    key_down, key_up, read_controller, rom_open_controller,
};
pub use gfx::{
    GfxPlugin, capture_screen, change_window, draw_screen, gfx_entries, initiate_gfx, move_screen,
    process_dlist, process_rdp_list, rom_open_gfx, show_cfb, update_screen, vi_status_changed,
    vi_width_changed,
};
pub use rcp::{AudioRcp, ControllerInit, GfxRcp, InterruptLine, RcpMemory};
pub use slot::PluginSlot;

mod sealed {
    pub trait Sealed {}
}

/// The record a category's initialize entry point receives.
pub trait PluginRecord: sealed::Sealed + Copy + 'static {
    const CATEGORY: PluginCategory;
    /// Newest version this crate exports for the category.
    const LATEST: ApiVersion;
}

impl sealed::Sealed for sys::AUDIO_INFO {}
impl sealed::Sealed for sys::GFX_INFO {}
impl sealed::Sealed for ControllerRecord {}

impl PluginRecord for sys::AUDIO_INFO {
    const CATEGORY: PluginCategory = PluginCategory::Audio;
    const LATEST: ApiVersion = ApiVersion::V1_1;
}

impl PluginRecord for sys::GFX_INFO {
    const CATEGORY: PluginCategory = PluginCategory::Gfx;
    const LATEST: ApiVersion = ApiVersion::V1_3;
}

impl PluginRecord for ControllerRecord {
    const CATEGORY: PluginCategory = PluginCategory::Controller;
    const LATEST: ApiVersion = ApiVersion::V1_1;
}

/// Behavior shared by every plugin category.
///
/// The instance is created with `Default` on first use and dropped at
/// `CloseDLL`.
pub trait Plugin: Default + Send + Sized + 'static {
    /// Selects the category.
    type Record: PluginRecord;

    /// Display name reported by `GetDllInfo`.
    const NAME: &'static str;

    /// API version reported by `GetDllInfo`.
    const VERSION: ApiVersion = <Self::Record as PluginRecord>::LATEST;

    /// Memory orders the plugin accepts. Ignored for controllers.
    const MEMORY: MemorySupport = MemorySupport::BOTH;

    /// The static slot that holds this plugin's state.
    fn slot() -> &'static PluginSlot<Self>;

    /// About box, shown from the control thread.
    ///
    /// Dialogs get no access to the instance: a waiting `AiUpdate` may hold it
    /// while the host pumps the message queue that delivers these calls.
    /// Share settings with the instance through statics.
    fn about(_parent: WindowHandle) {}

    fn config(_parent: WindowHandle) {}

    fn test(_parent: WindowHandle) {}

    /// Called once per open ROM.
    fn rom_closed(&mut self) {}

    /// Called from `CloseDLL` before the instance is dropped.
    fn close(&mut self) {}
}

/// The capability record `GetDllInfo` reports for `P`.
pub fn capability<P: Plugin>() -> CapabilityDescriptor {
    CapabilityDescriptor::new(P::Record::CATEGORY, P::VERSION, P::NAME).with_memory(P::MEMORY)
}

/// Runs `f`, turning a panic into a log line and `T::default()`.
///
/// Unwinding out of an `extern "C"` function aborts the host process.
pub(crate) fn guard<T: Default>(entry: EntryPoint, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!("plugin panicked in {}: {}", entry.name(), panic_message(&*payload));
            T::default()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

/// `GetDllInfo`.
///
/// # Safety
/// `info` must be null or point to a writable `PLUGIN_INFO`.
pub unsafe extern "C" fn get_dll_info<P: Plugin>(info: *mut sys::PLUGIN_INFO) {
    if info.is_null() {
        error!("{}: GetDllInfo called with a null record", P::NAME);
        return;
    }
    let raw = capability::<P>().to_raw();
    unsafe { info.write(raw) };
}

/// `CloseDLL`.
pub unsafe extern "C" fn close_dll<P: Plugin>() {
    guard(EntryPoint::CloseDll, || P::slot().close());
}

/// `RomClosed`.
pub unsafe extern "C" fn rom_closed<P: Plugin>() {
    guard(EntryPoint::RomClosed, || P::slot().rom_closed());
}

/// `DllAbout`.
pub unsafe extern "C" fn dll_about<P: Plugin>(parent: sys::p_void) {
    let parent = WindowHandle::from_raw(parent);
    guard(EntryPoint::DllAbout, || P::about(parent));
}

/// `DllConfig`.
pub unsafe extern "C" fn dll_config<P: Plugin>(parent: sys::p_void) {
    let parent = WindowHandle::from_raw(parent);
    guard(EntryPoint::DllConfig, || P::config(parent));
}

/// `DllTest`.
pub unsafe extern "C" fn dll_test<P: Plugin>(parent: sys::p_void) {
    let parent = WindowHandle::from_raw(parent);
    guard(EntryPoint::DllTest, || P::test(parent));
}

/// Symbol table with the entry points every category exports.
fn common_entries<P: Plugin>(label: &str) -> StaticSymbols {
    StaticSymbols::new(label)
        .with(EntryPoint::GetDllInfo, get_dll_info::<P> as *const ())
        .with(EntryPoint::CloseDll, close_dll::<P> as *const ())
        .with(EntryPoint::RomClosed, rom_closed::<P> as *const ())
        .with(EntryPoint::DllAbout, dll_about::<P> as *const ())
        .with(EntryPoint::DllConfig, dll_config::<P> as *const ())
        .with(EntryPoint::DllTest, dll_test::<P> as *const ())
}
