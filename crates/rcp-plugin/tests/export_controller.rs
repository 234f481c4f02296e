//! The exported C symbols behave like the generic adapters.

use rcp_plugin::buttons::{Button, ButtonSet, ButtonState};
use rcp_plugin::byte_order::MemoryOrder;
use rcp_plugin::controller::{Accessory, ControllerConfig, ControllerSlot};
use rcp_plugin::entry_points::EntryPoint;
use rcp_plugin::host::{Controller, Module, Session, SessionConfig, StaticSymbols};
use rcp_plugin::module::{
    ControllerInit, ControllerPlugin, ControllerRecord, Plugin, PluginSlot,
};

#[derive(Default)]
struct Joypad;

impl Plugin for Joypad {
    type Record = ControllerRecord;
    const NAME: &'static str = "Exported joypad";

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<Joypad> = PluginSlot::new();
        &SLOT
    }
}

impl ControllerPlugin for Joypad {
    fn initiate(&mut self, init: &mut ControllerInit<'_>) {
        init.set(
            ControllerSlot::ALL[0],
            ControllerConfig {
                present: true,
                raw_data: false,
                accessory: Accessory::RumblePak,
            },
        );
    }

    fn get_keys(&mut self, _slot: ControllerSlot) -> ButtonState {
        ButtonState {
            buttons: ButtonSet::EMPTY.with(Button::Z).with(Button::L),
            stick_x: 12,
            stick_y: -12,
        }
    }
}

rcp_plugin::export_controller_plugin!(Joypad);

fn exported() -> StaticSymbols {
    use crate::__rcp_controller_exports as c;

    StaticSymbols::new("exported joypad")
        .with(EntryPoint::GetDllInfo, c::GetDllInfo as *const ())
        .with(EntryPoint::CloseDll, c::CloseDLL as *const ())
        .with(EntryPoint::RomClosed, c::RomClosed as *const ())
        .with(EntryPoint::DllAbout, c::DllAbout as *const ())
        .with(EntryPoint::DllConfig, c::DllConfig as *const ())
        .with(EntryPoint::DllTest, c::DllTest as *const ())
        .with(EntryPoint::InitiateControllers, c::InitiateControllers as *const ())
        .with(EntryPoint::RomOpen, c::RomOpen as *const ())
        .with(EntryPoint::GetKeys, c::GetKeys as *const ())
        .with(EntryPoint::ControllerCommand, c::ControllerCommand as *const ())
        .with(EntryPoint::ReadController, c::ReadController as *const ())
        .with(EntryPoint::KeyDown, c::WM_KeyDown as *const ())
        .with(EntryPoint::KeyUp, c::WM_KeyUp as *const ())
}

#[test]
fn exported_symbols_drive_a_full_session() {
    let module = Module::<Controller>::load(exported()).unwrap();
    assert_eq!(module.info().name, "Exported joypad");
    assert!(module.entries().key_down.is_some());

    for order in [MemoryOrder::Normal, MemoryOrder::Swapped] {
        let module = Module::<Controller>::load(exported()).unwrap();
        let mut session =
            Session::new(module, SessionConfig::default().with_memory_order(order)).unwrap();
        session.initiate().unwrap();
        assert_eq!(
            session.controllers()[0].accessory,
            Accessory::RumblePak,
            "{order:?}"
        );

        session.rom_open().unwrap();
        let state = session.get_keys(ControllerSlot::ALL[0]).unwrap();
        assert!(state.pressed(Button::Z));
        assert!(state.pressed(Button::L));
        assert!(!state.pressed(Button::A));
        assert_eq!((state.stick_x, state.stick_y), (12, -12));
        session.close();
        assert!(!Joypad::slot().is_initialized());
    }
}
