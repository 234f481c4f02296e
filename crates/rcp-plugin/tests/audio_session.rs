mod common;

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rcp_plugin::byte_order::MemoryOrder;
use rcp_plugin::capability::MemorySupport;
use rcp_plugin::entry_points::EntryPoint;
use rcp_plugin::hardware::SystemType;
use rcp_plugin::host::{
    Audio, Module, Session, SessionConfig, SessionError, SessionState, interrupts,
};
use rcp_plugin::memory::MemoryRegion;
use rcp_plugin::handle::WindowHandle;
use rcp_plugin::module::{AudioPlugin, AudioRcp, Plugin, PluginSlot, audio_entries, dll_about};
use rcp_plugin::registers::AiReg;
use rcp_plugin::sys;

static FAIL_INIT: AtomicBool = AtomicBool::new(false);
static CLOSES: AtomicU32 = AtomicU32::new(0);

#[derive(Default)]
struct Recorder {
    order: Option<MemoryOrder>,
    len_calls: u32,
    last_len: Option<u32>,
    dacrate: Option<(u32, SystemType)>,
    rdram_word: Option<u32>,
    updates: Vec<bool>,
}

impl Plugin for Recorder {
    type Record = sys::AUDIO_INFO;
    const NAME: &'static str = "Recorder audio";

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<Recorder> = PluginSlot::new();
        &SLOT
    }

    fn close(&mut self) {
        CLOSES.fetch_add(1, Ordering::SeqCst);
    }
}

impl AudioPlugin for Recorder {
    fn initiate(&mut self, rcp: &AudioRcp<'_>) -> bool {
        self.order = Some(rcp.memory.order());
        !FAIL_INIT.load(Ordering::SeqCst)
    }

    fn dacrate_changed(&mut self, rcp: &AudioRcp<'_>, system: SystemType) {
        self.dacrate = Some((rcp.ai.get(AiReg::Dacrate), system));
    }

    fn len_changed(&mut self, rcp: &AudioRcp<'_>) {
        self.len_calls += 1;
        self.last_len = Some(rcp.ai.get(AiReg::Len));
        rcp.raise_interrupt(sys::MI_INTR_AI);
    }

    fn read_length(&mut self, rcp: &AudioRcp<'_>) -> u32 {
        rcp.ai.get(AiReg::Len) / 2
    }

    fn update(&mut self, _rcp: &AudioRcp<'_>, wait: bool) {
        self.updates.push(wait);
    }

    fn process_alist(&mut self, rcp: &AudioRcp<'_>) {
        self.rdram_word = rcp.memory.rdram().read_u32(0x100);
    }
}

#[derive(Default)]
struct SwappedOnly;

impl Plugin for SwappedOnly {
    type Record = sys::AUDIO_INFO;
    const NAME: &'static str = "Swapped-only audio";
    const MEMORY: MemorySupport = MemorySupport::SWAPPED_ONLY;

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<SwappedOnly> = PluginSlot::new();
        &SLOT
    }
}

impl AudioPlugin for SwappedOnly {
    fn dacrate_changed(&mut self, _rcp: &AudioRcp<'_>, _system: SystemType) {}
    fn len_changed(&mut self, _rcp: &AudioRcp<'_>) {}
    fn read_length(&mut self, _rcp: &AudioRcp<'_>) -> u32 {
        0
    }
    fn process_alist(&mut self, _rcp: &AudioRcp<'_>) {}
}

static ABOUT_SHOWN: AtomicBool = AtomicBool::new(false);

/// Blocks a waiting update until its about box has been shown.
#[derive(Default)]
struct Patient {
    released: Option<bool>,
}

impl Plugin for Patient {
    type Record = sys::AUDIO_INFO;
    const NAME: &'static str = "Patient audio";

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<Patient> = PluginSlot::new();
        &SLOT
    }

    fn about(_parent: WindowHandle) {
        ABOUT_SHOWN.store(true, Ordering::SeqCst);
    }
}

impl AudioPlugin for Patient {
    fn dacrate_changed(&mut self, _rcp: &AudioRcp<'_>, _system: SystemType) {}
    fn len_changed(&mut self, _rcp: &AudioRcp<'_>) {}
    fn read_length(&mut self, _rcp: &AudioRcp<'_>) -> u32 {
        0
    }

    fn update(&mut self, _rcp: &AudioRcp<'_>, wait: bool) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while wait && !ABOUT_SHOWN.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        self.released = Some(ABOUT_SHOWN.load(Ordering::SeqCst));
    }

    fn process_alist(&mut self, _rcp: &AudioRcp<'_>) {}
}

fn session(order: Option<MemoryOrder>) -> Session<Audio> {
    let module = Module::<Audio>::load(audio_entries::<Recorder>()).unwrap();
    let config = match order {
        Some(order) => SessionConfig::default().with_memory_order(order),
        None => SessionConfig::default(),
    };
    Session::new(module, config).unwrap()
}

#[test]
fn ai_len_write_is_visible_to_the_notified_plugin() {
    let _guard = common::serial();
    let mut session = session(None);
    session.initiate().unwrap();
    interrupts::take_requests();

    session.set_ai_len(0x2000).unwrap();

    Recorder::slot().with_plugin(|p| {
        assert_eq!(p.last_len, Some(0x2000));
        assert_eq!(p.len_calls, 1);
    });
    assert_ne!(session.interrupt_bits() & sys::MI_INTR_AI, 0);
    assert_eq!(interrupts::take_requests(), 1);
    assert_eq!(session.ai_read_length().unwrap(), 0x1000);

    session.acknowledge_interrupts(sys::MI_INTR_AI);
    assert_eq!(session.interrupt_bits(), 0);
    session.close();
}

#[test]
fn dacrate_and_system_type_reach_the_plugin() {
    let _guard = common::serial();
    let mut session = session(None);
    session.initiate().unwrap();
    session.set_dacrate(1103, SystemType::Pal).unwrap();
    Recorder::slot().with_plugin(|p| assert_eq!(p.dacrate, Some((1103, SystemType::Pal))));
    assert_eq!(session.state(), SessionState::RomOpen);
}

#[test]
fn plugin_sees_host_memory_in_the_session_order() {
    let _guard = common::serial();
    for order in common::ORDERS {
        let mut session = session(Some(order));
        session.initiate().unwrap();
        Recorder::slot().with_plugin(|p| assert_eq!(p.order, Some(order)));

        assert!(session.memory().write_u32(MemoryRegion::Rdram, 0x100, 0xDEAD_BEEF));
        session.process_alist().unwrap();
        Recorder::slot().with_plugin(|p| assert_eq!(p.rdram_word, Some(0xDEAD_BEEF), "{order:?}"));
    }
}

#[test]
fn default_order_is_the_plugins_preference() {
    let _guard = common::serial();
    let session = session(None);
    assert_eq!(session.memory_order(), MemoryOrder::Swapped);
}

#[test]
fn unadvertised_memory_order_is_refused() {
    let _guard = common::serial();
    let module = Module::<Audio>::load(audio_entries::<SwappedOnly>()).unwrap();
    let err = Session::new(
        module,
        SessionConfig::default().with_memory_order(MemoryOrder::Normal),
    )
    .unwrap_err();
    assert_eq!(err, SessionError::UnsupportedMemoryOrder(MemoryOrder::Normal));
}

#[test]
fn emulation_calls_before_initiate_never_reach_the_plugin() {
    let _guard = common::serial();
    let mut session = session(None);
    assert!(matches!(
        session.ai_len_changed(),
        Err(SessionError::InvalidState(_))
    ));
    assert!(matches!(
        session.process_alist(),
        Err(SessionError::InvalidState(_))
    ));
    assert!(!Recorder::slot().is_initialized());
    Recorder::slot().with_plugin(|p| assert_eq!(p.len_calls, 0));
}

#[test]
fn initiate_runs_once() {
    let _guard = common::serial();
    let mut session = session(None);
    session.initiate().unwrap();
    assert!(matches!(
        session.initiate(),
        Err(SessionError::InvalidState(_))
    ));
}

#[test]
fn initiate_is_refused_off_the_control_thread() {
    let _guard = common::serial();
    let session = session(None);
    let session = std::thread::spawn(move || {
        let mut session = session;
        assert_eq!(session.initiate(), Err(SessionError::WrongContext));
        session
    })
    .join()
    .unwrap();
    assert_eq!(session.state(), SessionState::Created);
}

#[test]
fn failed_initiate_leaves_only_teardown() {
    let _guard = common::serial();
    let before = CLOSES.load(Ordering::SeqCst);
    FAIL_INIT.store(true, Ordering::SeqCst);
    let mut session = session(None);
    let result = session.initiate();
    FAIL_INIT.store(false, Ordering::SeqCst);

    assert_eq!(result, Err(SessionError::InitFailed));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(!Recorder::slot().is_initialized());
    assert!(matches!(
        session.ai_len_changed(),
        Err(SessionError::InvalidState(_))
    ));

    drop(session);
    assert_eq!(CLOSES.load(Ordering::SeqCst), before + 1);
}

#[test]
fn close_calls_close_dll_exactly_once() {
    let _guard = common::serial();
    let before = CLOSES.load(Ordering::SeqCst);
    let mut session = session(None);
    session.initiate().unwrap();
    session.ai_len_changed().unwrap();
    session.close();
    assert_eq!(CLOSES.load(Ordering::SeqCst), before + 1);
    assert!(!Recorder::slot().is_initialized());
    assert!(!Recorder::slot().is_rom_open());
}

#[test]
fn optional_ai_update_is_reported_when_missing() {
    let _guard = common::serial();
    let symbols = audio_entries::<Recorder>().without(EntryPoint::AiUpdate);
    let module = Module::<Audio>::load(symbols).unwrap();
    assert!(module.entries().update.is_none());

    let mut session = Session::new(module, SessionConfig::default()).unwrap();
    session.initiate().unwrap();
    assert_eq!(
        session.ai_update(true),
        Err(SessionError::MissingEntryPoint(EntryPoint::AiUpdate))
    );
    session.close();

    let mut session = self::session(None);
    session.initiate().unwrap();
    session.ai_update(true).unwrap();
    session.ai_update(false).unwrap();
    Recorder::slot().with_plugin(|p| assert_eq!(p.updates, vec![true, false]));
}

#[test]
fn dialogs_run_while_a_waiting_update_is_outstanding() {
    let _guard = common::serial();
    ABOUT_SHOWN.store(false, Ordering::SeqCst);
    let module = Module::<Audio>::load(audio_entries::<Patient>()).unwrap();
    let mut session = Session::new(module, SessionConfig::default()).unwrap();
    session.initiate().unwrap();

    let emulation = thread::spawn(move || {
        session.ai_update(true).unwrap();
        session
    });
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    unsafe { dll_about::<Patient>(ptr::null_mut()) };
    assert!(started.elapsed() < Duration::from_secs(1));

    let session = emulation.join().unwrap();
    Patient::slot().with_plugin(|p| assert_eq!(p.released, Some(true)));
    session.close();
}
