use std::fmt;
use std::os::raw::{c_int, c_uint};

use log::warn;
use rcp_plugin_core::buttons::{BitOrder, ButtonCodec, ButtonState, PackedButtons};
use rcp_plugin_core::byte_order::MemoryOrder;
use rcp_plugin_core::controller::{
    ControllerSlot, KeyEvent, MAX_CONTROLLERS, RawChannel, RawCommand,
};
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::memory::{ROM_HEADER_SIZE, RegionView};
use rcp_plugin_core::version::InfoShape;
use rcp_plugin_sys as sys;

use super::rcp::ControllerInit;
use super::{Plugin, common_entries};
use crate::handle::{WindowHandle, WindowHandles};
use crate::host::StaticSymbols;

/// What the host passed to `InitiateControllers`.
#[derive(Clone, Copy)]
pub enum ControllerRecord {
    /// 1.0: a window handle and the `CONTROL[4]` array.
    V1_0 {
        window: sys::p_void,
        controls: *mut sys::CONTROL,
    },
    V1_1(sys::CONTROL_INFO),
}

impl fmt::Debug for ControllerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_0 { .. } => f.write_str("ControllerRecord::V1_0"),
            Self::V1_1(info) => f
                .debug_tuple("ControllerRecord::V1_1")
                .field(&MemoryOrder::from_flag(info.MemoryBswaped))
                .finish(),
        }
    }
}

impl ControllerRecord {
    pub fn shape(&self) -> InfoShape {
        match self {
            Self::V1_0 { .. } => InfoShape::ControllerV1_0,
            Self::V1_1(_) => InfoShape::ControllerV1_1,
        }
    }

    /// `None` for 1.0, whose hosts never send the memory order.
    pub fn memory_order(&self) -> Option<MemoryOrder> {
        match self {
            Self::V1_0 { .. } => None,
            Self::V1_1(info) => Some(MemoryOrder::from_flag(info.MemoryBswaped)),
        }
    }

    /// Codec used to fill `BUTTONS`, matching the host's.
    pub fn codec(&self) -> ButtonCodec {
        match self.memory_order() {
            Some(order) => ButtonCodec::for_session(order),
            None => ButtonCodec::new(BitOrder::native()),
        }
    }

    fn controls(&self) -> *mut sys::CONTROL {
        match self {
            Self::V1_0 { controls, .. } => *controls,
            Self::V1_1(info) => info.Controls,
        }
    }

    fn windows(&self) -> WindowHandles {
        match self {
            Self::V1_0 { window, .. } => WindowHandles {
                main: WindowHandle::from_raw(*window),
                ..WindowHandles::default()
            },
            Self::V1_1(info) => WindowHandles {
                main: WindowHandle::from_raw(info.hMainWindow),
                instance: WindowHandle::from_raw(info.hinst),
                status_bar: WindowHandle::NULL,
            },
        }
    }
}

/// A controller plugin (API 1.0 or 1.1).
///
/// Slots marked `raw_data` receive PIF commands through
/// [`controller_command`](ControllerPlugin::controller_command) and
/// [`read_controller`](ControllerPlugin::read_controller) instead of being
/// polled with [`get_keys`](ControllerPlugin::get_keys).
pub trait ControllerPlugin: Plugin<Record = ControllerRecord> {
    /// Fill in the configuration of each slot.
    fn initiate(&mut self, init: &mut ControllerInit<'_>);

    fn rom_open(&mut self) {}

    fn get_keys(&mut self, slot: ControllerSlot) -> ButtonState;

    /// A command for a raw slot. `command` is `None` at end of stream.
    fn controller_command(&mut self, _channel: RawChannel, _command: Option<RawCommand<'_>>) {}

    /// Same framing as `controller_command`, just before the host reads the
    /// response.
    fn read_controller(&mut self, _channel: RawChannel, _command: Option<RawCommand<'_>>) {}

    fn key_down(&mut self, _event: KeyEvent) {}

    fn key_up(&mut self, _event: KeyEvent) {}
}

fn initiate<P: ControllerPlugin>(record: ControllerRecord) {
    P::slot().initiate(EntryPoint::InitiateControllers, record, |plugin, record| {
        let controls = record.controls();
        if controls.is_null() {
            warn!("{}: InitiateControllers without a CONTROL array", P::NAME);
            return false;
        }
        let header = match record {
            ControllerRecord::V1_0 { .. } => None,
            ControllerRecord::V1_1(info) => unsafe {
                RegionView::from_raw(info.HEADER, ROM_HEADER_SIZE, MemoryOrder::from_flag(info.MemoryBswaped))
            },
        };
        let mut init = ControllerInit {
            windows: record.windows(),
            order: record.memory_order(),
            header,
            controls: unsafe { &mut *controls.cast::<[sys::CONTROL; MAX_CONTROLLERS]>() },
        };
        plugin.initiate(&mut init);
        true
    });
}

/// `InitiateControllers` (1.1).
///
/// # Safety
/// `info.Controls` must point to four `CONTROL` records, and the header must
/// stay valid until `CloseDLL`.
pub unsafe extern "C" fn initiate_controllers<P: ControllerPlugin>(info: sys::CONTROL_INFO) {
    initiate::<P>(ControllerRecord::V1_1(info));
}

/// `InitiateControllers` (1.0).
///
/// # Safety
/// `controls` must point to four `CONTROL` records.
pub unsafe extern "C" fn initiate_controllers_v0100<P: ControllerPlugin>(
    window: sys::p_void,
    controls: *mut sys::CONTROL,
) {
    initiate::<P>(ControllerRecord::V1_0 { window, controls });
}

/// `RomOpen` for controller plugins.
pub unsafe extern "C" fn rom_open_controller<P: ControllerPlugin>() {
    P::slot().call_in_rom(EntryPoint::RomOpen, |plugin, _| plugin.rom_open());
}

/// `GetKeys`.
///
/// # Safety
/// `keys` must be null or point to a writable `BUTTONS`.
pub unsafe extern "C" fn get_keys<P: ControllerPlugin>(control: c_int, keys: *mut sys::BUTTONS) {
    if keys.is_null() {
        return;
    }
    let Ok(slot) = ControllerSlot::try_from(control) else {
        warn!("{}: GetKeys for invalid controller {control}", P::NAME);
        unsafe { keys.write(sys::BUTTONS::zeroed()) };
        return;
    };
    let packed: PackedButtons = P::slot().call(EntryPoint::GetKeys, |plugin, record| {
        let state = plugin.get_keys(slot);
        record.codec().encode(&state)
    });
    unsafe { keys.write(packed.to_union()) };
}

fn raw_call<P: ControllerPlugin>(
    entry: EntryPoint,
    control: c_int,
    command: sys::pu8,
    f: impl FnOnce(&mut P, RawChannel, Option<RawCommand<'_>>),
) {
    let channel = match RawChannel::from_raw(control) {
        Ok(channel) => channel,
        Err(e) => {
            warn!("{}: {}: {e}", P::NAME, entry.name());
            return;
        }
    };
    // The host may pass its PIF pointer with -1; nothing there is a frame.
    let command = match channel {
        RawChannel::EndOfStream => None,
        RawChannel::Slot(_) => unsafe { RawCommand::from_ptr(command) },
    };
    P::slot().call(entry, |plugin, _| f(plugin, channel, command));
}

/// `ControllerCommand`.
///
/// # Safety
/// `command` must be null or point to a complete command frame.
pub unsafe extern "C" fn controller_command<P: ControllerPlugin>(control: c_int, command: sys::pu8) {
    raw_call::<P>(EntryPoint::ControllerCommand, control, command, |p, channel, command| {
        p.controller_command(channel, command)
    });
}

/// `ReadController`.
///
/// # Safety
/// `command` must be null or point to a complete command frame.
pub unsafe extern "C" fn read_controller<P: ControllerPlugin>(control: c_int, command: sys::pu8) {
    raw_call::<P>(EntryPoint::ReadController, control, command, |p, channel, command| {
        p.read_controller(channel, command)
    });
}

/// `WM_KeyDown`.
pub unsafe extern "C" fn key_down<P: ControllerPlugin>(code: c_uint, param: i32) {
    let event = KeyEvent::new(code, param);
    P::slot().call(EntryPoint::KeyDown, |plugin, _| plugin.key_down(event));
}

/// `WM_KeyUp`.
pub unsafe extern "C" fn key_up<P: ControllerPlugin>(code: c_uint, param: i32) {
    let event = KeyEvent::new(code, param);
    P::slot().call(EntryPoint::KeyUp, |plugin, _| plugin.key_up(event));
}

fn with_controller_entries<P: ControllerPlugin>(initiate: *const ()) -> StaticSymbols {
    common_entries::<P>(P::NAME)
        .with(EntryPoint::InitiateControllers, initiate)
        .with(EntryPoint::RomOpen, rom_open_controller::<P> as *const ())
        .with(EntryPoint::GetKeys, get_keys::<P> as *const ())
        .with(EntryPoint::ControllerCommand, controller_command::<P> as *const ())
        .with(EntryPoint::ReadController, read_controller::<P> as *const ())
        .with(EntryPoint::KeyDown, key_down::<P> as *const ())
        .with(EntryPoint::KeyUp, key_up::<P> as *const ())
}

/// Every controller entry point of `P` with the 1.1 `InitiateControllers`.
pub fn controller_entries<P: ControllerPlugin>() -> StaticSymbols {
    with_controller_entries::<P>(initiate_controllers::<P> as *const ())
}

/// Every controller entry point of `P` with the 1.0 `InitiateControllers`.
/// `P::VERSION` must be 1.0.
pub fn controller_entries_v0100<P: ControllerPlugin>() -> StaticSymbols {
    with_controller_entries::<P>(initiate_controllers_v0100::<P> as *const ())
}
