use std::thread::{self, JoinHandle};

use crossbeam_channel as cb;
use log::{debug, info};
use rcp_plugin::buttons::ButtonState;
use rcp_plugin::byte_order::MemoryOrder;
use rcp_plugin::controller::ControllerSlot;
use rcp_plugin::hardware::SystemType;
use rcp_plugin::host::{
    AnyModule, Audio, Controller, Gfx, Session, SessionConfig, SessionError, interrupts,
};
use rcp_plugin::registers::{AiReg, ViReg};

/// `AI_DACRATE_REG` for 44.1 kHz on NTSC.
const DACRATE_44K: u32 = 1103;
/// One 1/60 s buffer of 16-bit stereo at 44.1 kHz.
const AUDIO_BUFFER_BYTES: u32 = 2940;
const VI_WIDTH: u32 = 320;
/// 16-bit colour, anti-aliasing and resampling enabled.
const VI_STATUS_16BPP: u32 = 0x3202;

#[derive(Debug, Clone)]
pub struct SmokeOptions {
    pub ticks: u32,
    pub memory_order: Option<MemoryOrder>,
    pub system: SystemType,
    pub rom_header: Option<Vec<u8>>,
}

/// Progress reported by the smoke worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SmokeEvent {
    Initialized { order: MemoryOrder },
    Tick { tick: u32, detail: String },
    Finished { ticks: u32, interrupts: u32 },
    Failed(String),
}

/// Runs the smoke sequence for `module` on a worker thread.
///
/// The worker creates and initializes the session itself, so it is the
/// session's control context.
pub fn spawn(module: AnyModule, opts: SmokeOptions) -> (JoinHandle<()>, cb::Receiver<SmokeEvent>) {
    let (tx, rx) = cb::unbounded();
    let handle = thread::spawn(move || {
        interrupts::take_requests();
        let result = match module {
            AnyModule::Audio(m) => {
                Session::new(m, config(&opts)).and_then(|s| run_audio(s, &opts, &tx))
            }
            AnyModule::Gfx(m) => Session::new(m, config(&opts)).and_then(|s| run_gfx(s, &opts, &tx)),
            AnyModule::Controller(m) => {
                Session::new(m, config(&opts)).and_then(|s| run_controller(s, &opts, &tx))
            }
        };
        let event = match result {
            Ok(ticks) => SmokeEvent::Finished {
                ticks,
                interrupts: interrupts::take_requests(),
            },
            Err(e) => SmokeEvent::Failed(e.to_string()),
        };
        let _ = tx.send(event);
    });
    (handle, rx)
}

fn config(opts: &SmokeOptions) -> SessionConfig {
    let config = SessionConfig::default();
    match opts.memory_order {
        Some(order) => config.with_memory_order(order),
        None => config,
    }
}

fn load_header<K: rcp_plugin::host::Subsystem>(session: &Session<K>, opts: &SmokeOptions) {
    if let Some(rom) = &opts.rom_header {
        if let Err(e) = session.load_rom_header(rom) {
            debug!("ROM header not loaded: {e}");
        }
    }
}

fn initialized(order: MemoryOrder, tx: &cb::Sender<SmokeEvent>) {
    info!("session initialized with {order:?} memory");
    let _ = tx.send(SmokeEvent::Initialized { order });
}

fn run_audio(
    mut session: Session<Audio>,
    opts: &SmokeOptions,
    tx: &cb::Sender<SmokeEvent>,
) -> Result<u32, SessionError> {
    load_header(&session, opts);
    session.initiate()?;
    initialized(session.memory_order(), tx);

    session.rom_open()?;
    session.set_dacrate(DACRATE_44K, opts.system)?;
    for tick in 0..opts.ticks {
        session.ai().write(AiReg::DramAddr, 0x0010_0000);
        session.set_ai_len(AUDIO_BUFFER_BYTES)?;
        let remaining = session.ai_read_length()?;
        match session.ai_update(false) {
            Ok(()) | Err(SessionError::MissingEntryPoint(_)) => {}
            Err(e) => return Err(e),
        }
        let _ = tx.send(SmokeEvent::Tick {
            tick,
            detail: format!("AiReadLength = {remaining}"),
        });
    }
    session.rom_closed();
    session.close();
    Ok(opts.ticks)
}

fn run_gfx(
    mut session: Session<Gfx>,
    opts: &SmokeOptions,
    tx: &cb::Sender<SmokeEvent>,
) -> Result<u32, SessionError> {
    load_header(&session, opts);
    session.initiate()?;
    initialized(session.memory_order(), tx);

    session.rom_open()?;
    session.set_vi_status(VI_STATUS_16BPP)?;
    session.set_vi_width(VI_WIDTH)?;
    for tick in 0..opts.ticks {
        session.vi().write(ViReg::VCurrentLine, tick % 525);
        session.update_screen()?;
        let _ = tx.send(SmokeEvent::Tick {
            tick,
            detail: "UpdateScreen".to_owned(),
        });
    }
    session.rom_closed();
    session.close();
    Ok(opts.ticks)
}

fn run_controller(
    mut session: Session<Controller>,
    opts: &SmokeOptions,
    tx: &cb::Sender<SmokeEvent>,
) -> Result<u32, SessionError> {
    load_header(&session, opts);
    session.initiate()?;
    initialized(session.memory_order(), tx);

    let polled: Vec<ControllerSlot> = ControllerSlot::ALL
        .into_iter()
        .filter(|slot| {
            let config = session.controllers()[slot.index()];
            config.present && !config.wants_raw()
        })
        .collect();
    info!("polling controllers {polled:?}");

    session.rom_open()?;
    for tick in 0..opts.ticks {
        let mut states: Vec<(ControllerSlot, ButtonState)> = Vec::with_capacity(polled.len());
        for &slot in &polled {
            match session.get_keys(slot) {
                Ok(state) => states.push((slot, state)),
                Err(SessionError::MissingEntryPoint(_)) => break,
                Err(e) => return Err(e),
            }
        }
        let detail = states
            .iter()
            .map(|(slot, state)| {
                format!(
                    "{slot}: {:?} ({}, {})",
                    state.buttons, state.stick_x, state.stick_y
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        let _ = tx.send(SmokeEvent::Tick { tick, detail });
    }
    session.rom_closed();
    session.close();
    Ok(opts.ticks)
}
