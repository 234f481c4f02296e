mod common;

use std::path::{Path, PathBuf};

use rcp_plugin::entry_points::EntryPoint;
use rcp_plugin::host::{Gfx, Module, Session, SessionConfig, SessionError, SessionState};
use rcp_plugin::memory::MemoryRegion;
use rcp_plugin::module::{GfxPlugin, GfxRcp, Plugin, PluginSlot, gfx_entries, rom_closed};
use rcp_plugin::registers::ViReg;
use rcp_plugin::sys;
use rcp_plugin::version::{ApiVersion, InfoShape};

#[derive(Default)]
struct Renderer {
    rom_opens: u32,
    rom_closes: u32,
    frames: u32,
    width: Option<u32>,
    title: Option<[u8; 4]>,
    shots: Vec<PathBuf>,
    panicked_once: bool,
}

impl Plugin for Renderer {
    type Record = sys::GFX_INFO;
    const NAME: &'static str = "Test renderer";

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<Renderer> = PluginSlot::new();
        &SLOT
    }

    fn rom_closed(&mut self) {
        self.rom_closes += 1;
    }
}

impl GfxPlugin for Renderer {
    fn rom_open(&mut self, rcp: &GfxRcp<'_>) {
        self.rom_opens += 1;
        let mut title = [0; 4];
        rcp.memory.header().read_bytes(0x20, &mut title);
        self.title = Some(title);
    }

    fn draw_screen(&mut self, _rcp: &GfxRcp<'_>) {
        if !self.panicked_once {
            self.panicked_once = true;
            panic!("lost the device");
        }
    }

    fn process_dlist(&mut self, rcp: &GfxRcp<'_>) {
        rcp.dpc.set(rcp_plugin::registers::DpcReg::Status, 0);
        rcp.raise_interrupt(sys::MI_INTR_DP);
    }

    fn update_screen(&mut self, _rcp: &GfxRcp<'_>) {
        self.frames += 1;
    }

    fn vi_width_changed(&mut self, rcp: &GfxRcp<'_>) {
        self.width = Some(rcp.vi.get(ViReg::Width));
    }

    fn capture_screen(&mut self, _rcp: &GfxRcp<'_>, dir: &Path) {
        self.shots.push(dir.to_path_buf());
    }
}

/// The same renderer advertising graphics 1.2.
#[derive(Default)]
struct LegacyRenderer {
    width: Option<u32>,
}

impl Plugin for LegacyRenderer {
    type Record = sys::GFX_INFO;
    const NAME: &'static str = "Legacy renderer";
    const VERSION: ApiVersion = ApiVersion::V1_2;

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<LegacyRenderer> = PluginSlot::new();
        &SLOT
    }
}

impl GfxPlugin for LegacyRenderer {
    fn process_dlist(&mut self, _rcp: &GfxRcp<'_>) {}
    fn update_screen(&mut self, _rcp: &GfxRcp<'_>) {}
    fn vi_width_changed(&mut self, rcp: &GfxRcp<'_>) {
        self.width = Some(rcp.vi.get(ViReg::Width));
    }
}

fn ready() -> Session<Gfx> {
    let module = Module::<Gfx>::load(gfx_entries::<Renderer>()).unwrap();
    let mut session = Session::new(module, SessionConfig::default()).unwrap();
    session.initiate().unwrap();
    session
}

#[test]
fn second_rom_closed_is_a_no_op() {
    let _guard = common::serial();
    let mut session = ready();
    session.rom_open().unwrap();
    session.rom_closed();
    session.rom_closed();
    assert_eq!(session.state(), SessionState::Ready);
    Renderer::slot().with_plugin(|p| {
        assert_eq!(p.rom_opens, 1);
        assert_eq!(p.rom_closes, 1);
    });

    // Straight through the exported symbol as well.
    unsafe {
        rom_closed::<Renderer>();
        rom_closed::<Renderer>();
    }
    Renderer::slot().with_plugin(|p| assert_eq!(p.rom_closes, 1));
}

#[test]
fn rom_header_is_visible_at_rom_open() {
    let _guard = common::serial();
    let mut rom = vec![0u8; 0x40];
    rom[..4].copy_from_slice(&[0x80, 0x37, 0x12, 0x40]);
    rom[0x20..0x24].copy_from_slice(b"ZELD");

    for order in common::ORDERS {
        let module = Module::<Gfx>::load(gfx_entries::<Renderer>()).unwrap();
        let mut session =
            Session::new(module, SessionConfig::default().with_memory_order(order)).unwrap();
        session.load_rom_header(&rom).unwrap();
        assert_eq!(
            session.memory().read_u32(MemoryRegion::RomHeader, 0),
            Some(0x8037_1240)
        );
        session.initiate().unwrap();
        session.rom_open().unwrap();
        Renderer::slot().with_plugin(|p| assert_eq!(p.title.as_ref(), Some(b"ZELD"), "{order:?}"));
    }
}

#[test]
fn vi_width_write_is_visible_to_the_notified_plugin() {
    let _guard = common::serial();
    let mut session = ready();
    session.set_vi_width(640).unwrap();
    Renderer::slot().with_plugin(|p| assert_eq!(p.width, Some(640)));
    assert_eq!(session.vi().read(ViReg::Width), 640);
}

#[test]
fn versions_1_2_and_1_3_share_one_record() {
    let _guard = common::serial();
    assert_eq!(
        InfoShape::GfxV1_2.record_size(),
        InfoShape::GfxV1_3.record_size()
    );
    assert_eq!(InfoShape::GfxV1_2.record_size(), size_of::<sys::GFX_INFO>());

    let legacy = Module::<Gfx>::load(gfx_entries::<LegacyRenderer>()).unwrap();
    assert_eq!(legacy.shape(), InfoShape::GfxV1_2);
    let mut session = Session::new(legacy, SessionConfig::default()).unwrap();
    session.initiate().unwrap();
    session.set_vi_width(320).unwrap();
    LegacyRenderer::slot().with_plugin(|p| assert_eq!(p.width, Some(320)));

    let session13 = ready();
    assert_eq!(session13.shape(), InfoShape::GfxV1_3);
}

#[test]
fn entry_points_newer_than_the_version_are_not_bound() {
    let _guard = common::serial();
    // Exported, but not part of 1.2.
    let symbols = gfx_entries::<LegacyRenderer>();
    assert!(symbols.contains(EntryPoint::ShowCfb));

    let module = Module::<Gfx>::load(symbols).unwrap();
    assert!(module.entries().show_cfb.is_none());
    assert!(module.entries().capture_screen.is_none());

    let mut session = Session::new(module, SessionConfig::default()).unwrap();
    session.initiate().unwrap();
    assert_eq!(
        session.show_cfb(),
        Err(SessionError::MissingEntryPoint(EntryPoint::ShowCfb))
    );
}

#[test]
fn capture_screen_passes_the_directory() {
    let _guard = common::serial();
    let mut session = ready();
    session.capture_screen(Path::new("/tmp/shots")).unwrap();
    Renderer::slot().with_plugin(|p| assert_eq!(p.shots, vec![PathBuf::from("/tmp/shots")]));
}

#[test]
fn plugin_panic_is_contained() {
    let _guard = common::serial();
    let mut session = ready();
    session.draw_screen().unwrap();
    session.update_screen().unwrap();
    session.draw_screen().unwrap();
    Renderer::slot().with_plugin(|p| {
        assert!(p.panicked_once);
        assert_eq!(p.frames, 1);
    });
}

#[test]
fn display_list_completion_raises_dp() {
    let _guard = common::serial();
    let mut session = ready();
    session.dpc().write(rcp_plugin::registers::DpcReg::Status, 0xFFFF);
    session.process_dlist().unwrap();
    assert_eq!(session.dpc().read(rcp_plugin::registers::DpcReg::Status), 0);
    assert_ne!(session.interrupt_bits() & sys::MI_INTR_DP, 0);
}

#[test]
fn drop_closes_the_open_rom_first() {
    let _guard = common::serial();
    let mut session = ready();
    session.rom_open().unwrap();
    assert_eq!(
        session.rom_open(),
        Err(SessionError::InvalidState("a ROM is already open"))
    );
    Renderer::slot().with_plugin(|p| assert_eq!(p.rom_closes, 0));
    drop(session);
    assert!(!Renderer::slot().is_initialized());
    assert!(!Renderer::slot().is_rom_open());
}
