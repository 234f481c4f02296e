use std::sync::atomic::{AtomicU32, Ordering};

use rcp_plugin::entry_points::EntryPoint;
use rcp_plugin::host::{Gfx, Module, Session, SessionConfig, StaticSymbols};
use rcp_plugin::module::{GfxPlugin, GfxRcp, Plugin, PluginSlot};
use rcp_plugin::registers::ViReg;
use rcp_plugin::sys;
use rcp_plugin::version::InfoShape;

static FRAMES: AtomicU32 = AtomicU32::new(0);

#[derive(Default)]
struct Blitter;

impl Plugin for Blitter {
    type Record = sys::GFX_INFO;
    const NAME: &'static str = "Exported blitter";

    fn slot() -> &'static PluginSlot<Self> {
        static SLOT: PluginSlot<Blitter> = PluginSlot::new();
        &SLOT
    }
}

impl GfxPlugin for Blitter {
    fn process_dlist(&mut self, rcp: &GfxRcp<'_>) {
        rcp.raise_interrupt(sys::MI_INTR_DP);
    }

    fn update_screen(&mut self, rcp: &GfxRcp<'_>) {
        if rcp.vi.get(ViReg::Origin) != 0 {
            FRAMES.fetch_add(1, Ordering::SeqCst);
        }
    }
}

rcp_plugin::export_gfx_plugin!(Blitter);

fn exported() -> StaticSymbols {
    use crate::__rcp_gfx_exports as g;

    StaticSymbols::new("exported blitter")
        .with(EntryPoint::GetDllInfo, g::GetDllInfo as *const ())
        .with(EntryPoint::CloseDll, g::CloseDLL as *const ())
        .with(EntryPoint::RomClosed, g::RomClosed as *const ())
        .with(EntryPoint::InitiateGfx, g::InitiateGFX as *const ())
        .with(EntryPoint::RomOpen, g::RomOpen as *const ())
        .with(EntryPoint::ChangeWindow, g::ChangeWindow as *const ())
        .with(EntryPoint::DrawScreen, g::DrawScreen as *const ())
        .with(EntryPoint::MoveScreen, g::MoveScreen as *const ())
        .with(EntryPoint::ProcessDList, g::ProcessDList as *const ())
        .with(EntryPoint::ProcessRdpList, g::ProcessRDPList as *const ())
        .with(EntryPoint::ShowCfb, g::ShowCFB as *const ())
        .with(EntryPoint::UpdateScreen, g::UpdateScreen as *const ())
        .with(EntryPoint::ViStatusChanged, g::ViStatusChanged as *const ())
        .with(EntryPoint::ViWidthChanged, g::ViWidthChanged as *const ())
        .with(EntryPoint::CaptureScreen, g::CaptureScreen as *const ())
}

#[test]
fn exported_symbols_drive_a_full_session() {
    let module = Module::<Gfx>::load(exported()).unwrap();
    assert_eq!(module.shape(), InfoShape::GfxV1_3);
    assert!(module.entries().capture_screen.is_some());

    let mut session = Session::new(module, SessionConfig::default()).unwrap();
    session.initiate().unwrap();
    session.rom_open().unwrap();

    session.update_screen().unwrap();
    session.vi().write(ViReg::Origin, 0x0010_0000);
    session.update_screen().unwrap();
    assert_eq!(FRAMES.load(Ordering::SeqCst), 1);

    session.process_dlist().unwrap();
    assert_ne!(session.interrupt_bits() & sys::MI_INTR_DP, 0);

    session.show_cfb().unwrap();
    session.close();
    assert!(!Blitter::slot().is_initialized());
}
