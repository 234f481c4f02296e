//! Plugins written directly against the C entry points, without the module
//! side of this crate.

mod common;

use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicI32, AtomicU16, AtomicUsize, Ordering};

use rcp_plugin::byte_order::MemoryOrder;
use rcp_plugin::capability::CapabilityError;
use rcp_plugin::entry_points::EntryPoint;
use rcp_plugin::host::{
    AnyModule, Audio, Controller, Gfx, LoadError, Module, Session, SessionConfig, StaticSymbols,
    discover,
};
use rcp_plugin::sys;
use rcp_plugin::version::{ApiVersion, PluginCategory, VersionError};

static INFO_VERSION: AtomicU16 = AtomicU16::new(0);
static INFO_TYPE: AtomicU16 = AtomicU16::new(0);

static AUDIO_FLAG: AtomicI32 = AtomicI32::new(-1);
static GFX_FLAG: AtomicI32 = AtomicI32::new(-1);
static PAD_FLAG: AtomicI32 = AtomicI32::new(-1);
static AUDIO_HEADER: AtomicUsize = AtomicUsize::new(0);
static PAD_HEADER: AtomicUsize = AtomicUsize::new(0);

fn write_name(info: &mut sys::PLUGIN_INFO, name: &str) {
    for (dst, &src) in info.Name.iter_mut().zip(name.as_bytes()) {
        *dst = src as c_char;
    }
}

unsafe extern "C" fn get_dll_info(info: *mut sys::PLUGIN_INFO) {
    let info = unsafe { &mut *info };
    info.Version = INFO_VERSION.load(Ordering::SeqCst);
    info.Type = INFO_TYPE.load(Ordering::SeqCst);
    write_name(info, "Hand-written plugin");
    info.NormalMemory = 1;
    info.MemorySwapped = 1;
}

unsafe extern "C" fn nothing() {}

unsafe extern "C" fn initiate_audio(info: sys::AUDIO_INFO) -> c_int {
    AUDIO_FLAG.store(info.MemoryBswaped, Ordering::SeqCst);
    AUDIO_HEADER.store(info.HEADER as usize, Ordering::SeqCst);
    1
}

unsafe extern "C" fn dacrate_changed(_system: c_int) {}

unsafe extern "C" fn read_length() -> u32 {
    0
}

unsafe extern "C" fn initiate_gfx(info: sys::GFX_INFO) -> c_int {
    GFX_FLAG.store(info.MemoryBswaped, Ordering::SeqCst);
    1
}

unsafe extern "C" fn move_screen(_x: c_int, _y: c_int) {}

unsafe extern "C" fn initiate_controllers(info: sys::CONTROL_INFO) {
    PAD_FLAG.store(info.MemoryBswaped, Ordering::SeqCst);
    PAD_HEADER.store(info.HEADER as usize, Ordering::SeqCst);
}

fn advertise(category: u16, version: u16) {
    INFO_TYPE.store(category, Ordering::SeqCst);
    INFO_VERSION.store(version, Ordering::SeqCst);
}

fn common_symbols(label: &str) -> StaticSymbols {
    StaticSymbols::new(label)
        .with(EntryPoint::GetDllInfo, get_dll_info as *const ())
        .with(EntryPoint::CloseDll, nothing as *const ())
        .with(EntryPoint::RomClosed, nothing as *const ())
}

fn audio_symbols() -> StaticSymbols {
    common_symbols("hand-written audio")
        .with(EntryPoint::InitiateAudio, initiate_audio as *const ())
        .with(EntryPoint::AiDacrateChanged, dacrate_changed as *const ())
        .with(EntryPoint::AiLenChanged, nothing as *const ())
        .with(EntryPoint::AiReadLength, read_length as *const ())
        .with(EntryPoint::ProcessAList, nothing as *const ())
}

fn gfx_symbols() -> StaticSymbols {
    let mut symbols = common_symbols("hand-written gfx")
        .with(EntryPoint::InitiateGfx, initiate_gfx as *const ())
        .with(EntryPoint::MoveScreen, move_screen as *const ());
    for entry in [
        EntryPoint::RomOpen,
        EntryPoint::ChangeWindow,
        EntryPoint::DrawScreen,
        EntryPoint::ProcessDList,
        EntryPoint::UpdateScreen,
        EntryPoint::ViStatusChanged,
        EntryPoint::ViWidthChanged,
    ] {
        symbols.insert(entry, nothing as *const ());
    }
    symbols
}

fn controller_symbols() -> StaticSymbols {
    common_symbols("hand-written controller")
        .with(EntryPoint::InitiateControllers, initiate_controllers as *const ())
        .with(EntryPoint::RomOpen, nothing as *const ())
}

#[test]
fn newer_version_is_rejected_at_discovery() {
    let _guard = common::serial();
    advertise(sys::PLUGIN_TYPE_GFX, 0x0104);
    match discover(&gfx_symbols()) {
        Err(LoadError::Capability(CapabilityError::Version(VersionError::Newer {
            category,
            version,
            supported,
        }))) => {
            assert_eq!(category, PluginCategory::Gfx);
            assert_eq!(version, ApiVersion::from_raw(0x0104));
            assert_eq!(supported, ApiVersion::V1_3);
        }
        other => panic!("expected a version rejection, got {other:?}"),
    }
}

#[test]
fn versions_without_a_known_layout_are_rejected() {
    let _guard = common::serial();
    for (category, version) in [
        (sys::PLUGIN_TYPE_AUDIO, 0x0100),
        (sys::PLUGIN_TYPE_GFX, 0x0101),
    ] {
        advertise(category, version);
        let err = AnyModule::load(audio_symbols()).unwrap_err();
        assert!(
            matches!(
                err,
                LoadError::Capability(CapabilityError::Version(VersionError::Unknown { .. }))
            ),
            "{err}"
        );
    }
}

#[test]
fn unknown_category_is_rejected() {
    let _guard = common::serial();
    advertise(1, 0x0101);
    assert!(matches!(
        AnyModule::load(audio_symbols()),
        Err(LoadError::Capability(CapabilityError::UnknownCategory(1)))
    ));
}

#[test]
fn missing_required_entry_point_is_rejected() {
    let _guard = common::serial();
    advertise(sys::PLUGIN_TYPE_AUDIO, 0x0101);
    let symbols = audio_symbols().without(EntryPoint::AiReadLength);
    assert!(matches!(
        Module::<Audio>::load(symbols),
        Err(LoadError::MissingSymbol(EntryPoint::AiReadLength))
    ));

    let symbols = StaticSymbols::new("empty");
    assert!(matches!(
        discover(&symbols),
        Err(LoadError::MissingSymbol(EntryPoint::GetDllInfo))
    ));
}

#[test]
fn category_mismatch_is_rejected() {
    let _guard = common::serial();
    advertise(sys::PLUGIN_TYPE_AUDIO, 0x0101);
    assert!(matches!(
        Module::<Gfx>::load(audio_symbols()),
        Err(LoadError::WrongCategory {
            expected: PluginCategory::Gfx,
            found: PluginCategory::Audio,
        })
    ));
}

#[test]
fn every_record_of_a_session_carries_the_same_order() {
    let _guard = common::serial();
    for order in common::ORDERS {
        let config = SessionConfig::default().with_memory_order(order);

        advertise(sys::PLUGIN_TYPE_AUDIO, 0x0101);
        let mut audio = Session::new(Module::<Audio>::load(audio_symbols()).unwrap(), config).unwrap();
        audio.initiate().unwrap();

        advertise(sys::PLUGIN_TYPE_GFX, 0x0103);
        let mut gfx = Session::new(Module::<Gfx>::load(gfx_symbols()).unwrap(), config).unwrap();
        gfx.initiate().unwrap();

        advertise(sys::PLUGIN_TYPE_CONTROLLER, 0x0101);
        let mut pad =
            Session::new(Module::<Controller>::load(controller_symbols()).unwrap(), config)
                .unwrap();
        pad.initiate().unwrap();

        let flag = order.flag();
        assert_eq!(AUDIO_FLAG.load(Ordering::SeqCst), flag, "{order:?}");
        assert_eq!(GFX_FLAG.load(Ordering::SeqCst), flag, "{order:?}");
        assert_eq!(PAD_FLAG.load(Ordering::SeqCst), flag, "{order:?}");
        assert_eq!(MemoryOrder::from_flag(flag), order);
        assert_ne!(AUDIO_HEADER.load(Ordering::SeqCst), 0);
        assert_ne!(PAD_HEADER.load(Ordering::SeqCst), 0);
    }
}
