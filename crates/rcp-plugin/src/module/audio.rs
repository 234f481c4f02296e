use std::os::raw::c_int;

use log::warn;
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::hardware::SystemType;
use rcp_plugin_sys as sys;

use super::rcp::AudioRcp;
use super::{Plugin, common_entries};
use crate::host::StaticSymbols;

/// An audio plugin (API 1.1).
///
/// Every call receives the AI registers and memory as an [`AudioRcp`]. The
/// host has no `RomOpen` for audio; the first emulation call after
/// initialize counts as opening the ROM.
pub trait AudioPlugin: Plugin<Record = sys::AUDIO_INFO> {
    /// Returning `false` reports failure to the host.
    fn initiate(&mut self, _rcp: &AudioRcp<'_>) -> bool {
        true
    }

    /// `AI_DACRATE_REG` was written.
    fn dacrate_changed(&mut self, rcp: &AudioRcp<'_>, system: SystemType);

    /// `AI_LEN_REG` was written; a new buffer is ready at `AI_DRAM_ADDR_REG`.
    fn len_changed(&mut self, rcp: &AudioRcp<'_>);

    /// Bytes left in the current buffer.
    fn read_length(&mut self, rcp: &AudioRcp<'_>) -> u32;

    /// Periodic update. With `wait`, the plugin may block until it needs data.
    fn update(&mut self, _rcp: &AudioRcp<'_>, _wait: bool) {}

    /// Runs the audio list in DMEM.
    fn process_alist(&mut self, rcp: &AudioRcp<'_>);
}

fn run<P: AudioPlugin, T: Default>(entry: EntryPoint, f: impl FnOnce(&mut P, &AudioRcp<'_>) -> T) -> T {
    P::slot().call_in_rom(entry, |plugin, info| match unsafe { AudioRcp::from_info(info) } {
        Some(rcp) => f(plugin, &rcp),
        None => T::default(),
    })
}

/// `InitiateAudio`.
///
/// # Safety
/// The record's pointers must stay valid until `CloseDLL`.
pub unsafe extern "C" fn initiate_audio<P: AudioPlugin>(info: sys::AUDIO_INFO) -> c_int {
    let ok = P::slot().initiate(EntryPoint::InitiateAudio, info, |plugin, info| {
        match unsafe { AudioRcp::from_info(info) } {
            Some(rcp) => plugin.initiate(&rcp),
            None => {
                warn!("{}: AUDIO_INFO has a null pointer", P::NAME);
                false
            }
        }
    });
    c_int::from(ok)
}

/// `AiDacrateChanged`.
pub unsafe extern "C" fn ai_dacrate_changed<P: AudioPlugin>(system: c_int) {
    let system = SystemType::from_raw(system).unwrap_or_else(|| {
        warn!("{}: unknown system type {system}, assuming NTSC", P::NAME);
        SystemType::Ntsc
    });
    run::<P, _>(EntryPoint::AiDacrateChanged, |p, rcp| p.dacrate_changed(rcp, system));
}

/// `AiLenChanged`.
pub unsafe extern "C" fn ai_len_changed<P: AudioPlugin>() {
    run::<P, _>(EntryPoint::AiLenChanged, |p, rcp| p.len_changed(rcp));
}

/// `AiReadLength`.
pub unsafe extern "C" fn ai_read_length<P: AudioPlugin>() -> u32 {
    run::<P, _>(EntryPoint::AiReadLength, |p, rcp| p.read_length(rcp))
}

/// `AiUpdate`.
pub unsafe extern "C" fn ai_update<P: AudioPlugin>(wait: c_int) {
    run::<P, _>(EntryPoint::AiUpdate, |p, rcp| p.update(rcp, wait != 0));
}

/// `ProcessAList`.
pub unsafe extern "C" fn process_alist<P: AudioPlugin>() {
    run::<P, _>(EntryPoint::ProcessAList, |p, rcp| p.process_alist(rcp));
}

/// Every audio entry point of `P`, for loading the plugin in-process.
pub fn audio_entries<P: AudioPlugin>() -> StaticSymbols {
    common_entries::<P>(P::NAME)
        .with(EntryPoint::InitiateAudio, initiate_audio::<P> as *const ())
        .with(EntryPoint::AiDacrateChanged, ai_dacrate_changed::<P> as *const ())
        .with(EntryPoint::AiLenChanged, ai_len_changed::<P> as *const ())
        .with(EntryPoint::AiReadLength, ai_read_length::<P> as *const ())
        .with(EntryPoint::AiUpdate, ai_update::<P> as *const ())
        .with(EntryPoint::ProcessAList, process_alist::<P> as *const ())
}
