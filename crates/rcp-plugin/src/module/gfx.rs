use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::path::Path;

use log::warn;
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_sys as sys;

use super::rcp::GfxRcp;
use super::{Plugin, common_entries};
use crate::host::StaticSymbols;

/// A graphics plugin (API 1.2 or 1.3).
///
/// `ProcessRDPList`, `ShowCFB` and `CaptureScreen` are only called by hosts
/// that negotiated 1.3.
pub trait GfxPlugin: Plugin<Record = sys::GFX_INFO> {
    /// Returning `false` reports failure to the host.
    fn initiate(&mut self, _rcp: &GfxRcp<'_>) -> bool {
        true
    }

    fn rom_open(&mut self, _rcp: &GfxRcp<'_>) {}

    /// The host switched between windowed and fullscreen.
    fn change_window(&mut self, _rcp: &GfxRcp<'_>) {}

    /// Redraw the last frame, e.g. after the window was uncovered.
    fn draw_screen(&mut self, _rcp: &GfxRcp<'_>) {}

    /// The host window moved to `(x, y)`.
    fn move_screen(&mut self, _rcp: &GfxRcp<'_>, _x: i32, _y: i32) {}

    /// Runs the display list in DMEM.
    fn process_dlist(&mut self, rcp: &GfxRcp<'_>);

    /// Runs RDP commands between `DPC_CURRENT_REG` and `DPC_END_REG`.
    fn process_rdp_list(&mut self, _rcp: &GfxRcp<'_>) {}

    /// Shows the framebuffer at `VI_ORIGIN_REG` instead of the last
    /// rendered frame.
    fn show_cfb(&mut self, _rcp: &GfxRcp<'_>) {}

    /// Called on every vertical interrupt.
    fn update_screen(&mut self, rcp: &GfxRcp<'_>);

    fn vi_status_changed(&mut self, _rcp: &GfxRcp<'_>) {}

    fn vi_width_changed(&mut self, _rcp: &GfxRcp<'_>) {}

    /// Save a screenshot into `dir`.
    fn capture_screen(&mut self, _rcp: &GfxRcp<'_>, _dir: &Path) {}
}

fn run<P: GfxPlugin, T: Default>(entry: EntryPoint, f: impl FnOnce(&mut P, &GfxRcp<'_>) -> T) -> T {
    P::slot().call(entry, |plugin, info| match unsafe { GfxRcp::from_info(info) } {
        Some(rcp) => f(plugin, &rcp),
        None => T::default(),
    })
}

/// `InitiateGFX`.
///
/// # Safety
/// The record's pointers must stay valid until `CloseDLL`.
pub unsafe extern "C" fn initiate_gfx<P: GfxPlugin>(info: sys::GFX_INFO) -> c_int {
    let ok = P::slot().initiate(EntryPoint::InitiateGfx, info, |plugin, info| {
        match unsafe { GfxRcp::from_info(info) } {
            Some(rcp) => plugin.initiate(&rcp),
            None => {
                warn!("{}: GFX_INFO has a null pointer", P::NAME);
                false
            }
        }
    });
    c_int::from(ok)
}

/// `RomOpen` for graphics plugins.
pub unsafe extern "C" fn rom_open_gfx<P: GfxPlugin>() {
    P::slot().call_in_rom(EntryPoint::RomOpen, |plugin, info| {
        if let Some(rcp) = unsafe { GfxRcp::from_info(info) } {
            plugin.rom_open(&rcp);
        }
    });
}

/// `ChangeWindow`.
pub unsafe extern "C" fn change_window<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ChangeWindow, |p, rcp| p.change_window(rcp));
}

/// `DrawScreen`.
pub unsafe extern "C" fn draw_screen<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::DrawScreen, |p, rcp| p.draw_screen(rcp));
}

/// `MoveScreen`.
pub unsafe extern "C" fn move_screen<P: GfxPlugin>(x: c_int, y: c_int) {
    run::<P, _>(EntryPoint::MoveScreen, |p, rcp| p.move_screen(rcp, x, y));
}

/// `ProcessDList`.
pub unsafe extern "C" fn process_dlist<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ProcessDList, |p, rcp| p.process_dlist(rcp));
}

/// `ProcessRDPList`.
pub unsafe extern "C" fn process_rdp_list<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ProcessRdpList, |p, rcp| p.process_rdp_list(rcp));
}

/// `ShowCFB`.
pub unsafe extern "C" fn show_cfb<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ShowCfb, |p, rcp| p.show_cfb(rcp));
}

/// `UpdateScreen`.
pub unsafe extern "C" fn update_screen<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::UpdateScreen, |p, rcp| p.update_screen(rcp));
}

/// `ViStatusChanged`.
pub unsafe extern "C" fn vi_status_changed<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ViStatusChanged, |p, rcp| p.vi_status_changed(rcp));
}

/// `ViWidthChanged`.
pub unsafe extern "C" fn vi_width_changed<P: GfxPlugin>() {
    run::<P, _>(EntryPoint::ViWidthChanged, |p, rcp| p.vi_width_changed(rcp));
}

/// `CaptureScreen`.
///
/// # Safety
/// `dir` must be null or a NUL-terminated string.
pub unsafe extern "C" fn capture_screen<P: GfxPlugin>(dir: *mut c_char) {
    if dir.is_null() {
        warn!("{}: CaptureScreen without a directory", P::NAME);
        return;
    }
    let Ok(dir) = unsafe { CStr::from_ptr(dir) }.to_str() else {
        warn!("{}: CaptureScreen directory is not UTF-8", P::NAME);
        return;
    };
    let dir = Path::new(dir);
    run::<P, _>(EntryPoint::CaptureScreen, |p, rcp| p.capture_screen(rcp, dir));
}

/// Every graphics entry point of `P`, for loading the plugin in-process.
pub fn gfx_entries<P: GfxPlugin>() -> StaticSymbols {
    common_entries::<P>(P::NAME)
        .with(EntryPoint::InitiateGfx, initiate_gfx::<P> as *const ())
        .with(EntryPoint::RomOpen, rom_open_gfx::<P> as *const ())
        .with(EntryPoint::ChangeWindow, change_window::<P> as *const ())
        .with(EntryPoint::DrawScreen, draw_screen::<P> as *const ())
        .with(EntryPoint::MoveScreen, move_screen::<P> as *const ())
        .with(EntryPoint::ProcessDList, process_dlist::<P> as *const ())
        .with(EntryPoint::ProcessRdpList, process_rdp_list::<P> as *const ())
        .with(EntryPoint::ShowCfb, show_cfb::<P> as *const ())
        .with(EntryPoint::UpdateScreen, update_screen::<P> as *const ())
        .with(EntryPoint::ViStatusChanged, vi_status_changed::<P> as *const ())
        .with(EntryPoint::ViWidthChanged, vi_width_changed::<P> as *const ())
        .with(EntryPoint::CaptureScreen, capture_screen::<P> as *const ())
}
