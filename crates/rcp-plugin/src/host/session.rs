use std::cell::Cell;
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_int;
use std::path::Path;
use std::thread::{self, ThreadId};

use log::{debug, info, warn};
use rcp_plugin_core::buttons::{BitOrder, ButtonCodec, ButtonState, PackedButtons};
use rcp_plugin_core::byte_order::MemoryOrder;
use rcp_plugin_core::capability::CapabilityDescriptor;
use rcp_plugin_core::controller::{
    Accessory, ControllerConfig, ControllerSlot, KeyEvent, MAX_CONTROLLERS, RawChannel,
    RawCommandBuf,
};
use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::hardware::SystemType;
use rcp_plugin_core::memory::{MemoryError, MemoryRegion, MemoryWindow};
use rcp_plugin_core::registers::{AiReg, DpcReg, MiReg, RegisterBank, ViReg};
use rcp_plugin_core::version::InfoShape;
use rcp_plugin_sys as sys;

use super::SessionError;
use super::entries::{Audio, Controller, Gfx, InitiateControllers, Subsystem};
use super::interrupts;
use super::module::Module;
use crate::handle::WindowHandles;

/// Host choices for a new session.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// `None` picks the module's preferred order.
    pub memory_order: Option<MemoryOrder>,
    pub windows: WindowHandles,
    /// Callback placed into the init record.
    pub check_interrupts: sys::p_func,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            memory_order: None,
            windows: WindowHandles::default(),
            check_interrupts: interrupts::LATCH,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_memory_order(mut self, order: MemoryOrder) -> Self {
        self.memory_order = Some(order);
        self
    }

    #[must_use]
    pub fn with_windows(mut self, windows: WindowHandles) -> Self {
        self.windows = windows;
        self
    }

    #[must_use]
    pub fn with_check_interrupts(mut self, callback: sys::p_func) -> Self {
        self.check_interrupts = callback;
        self
    }
}

/// Lifecycle of a session as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Storage allocated, initialize not called yet.
    Created,
    /// Initialize returned success.
    Ready,
    /// A ROM is open; `RomClosed` will be forwarded.
    RomOpen,
    /// Initialize failed; only teardown is allowed.
    Failed,
}

/// All storage the module receives pointers into.
///
/// Boxed by the session so every address stays put until `CloseDLL` has
/// returned.
pub struct HostResources {
    memory: MemoryWindow,
    mi: RegisterBank<MiReg>,
    ai: RegisterBank<AiReg>,
    dpc: RegisterBank<DpcReg>,
    vi: RegisterBank<ViReg>,
    controls: [Cell<sys::CONTROL>; MAX_CONTROLLERS],
    windows: WindowHandles,
    check_interrupts: sys::p_func,
}

impl fmt::Debug for HostResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostResources")
            .field("memory", &self.memory)
            .field("mi", &self.mi)
            .field("ai", &self.ai)
            .field("dpc", &self.dpc)
            .field("vi", &self.vi)
            .finish_non_exhaustive()
    }
}

impl HostResources {
    pub fn new(order: MemoryOrder, windows: WindowHandles, check_interrupts: sys::p_func) -> Self {
        Self {
            memory: MemoryWindow::new(order),
            mi: RegisterBank::new(),
            ai: RegisterBank::new(),
            dpc: RegisterBank::new(),
            vi: RegisterBank::new(),
            // Unplugged with no accessory until the module says otherwise.
            controls: std::array::from_fn(|_| Cell::new(ControllerConfig::default().to_raw())),
            windows,
            check_interrupts,
        }
    }

    pub fn memory(&self) -> &MemoryWindow {
        &self.memory
    }

    pub fn mi(&self) -> &RegisterBank<MiReg> {
        &self.mi
    }

    pub fn ai(&self) -> &RegisterBank<AiReg> {
        &self.ai
    }

    pub fn dpc(&self) -> &RegisterBank<DpcReg> {
        &self.dpc
    }

    pub fn vi(&self) -> &RegisterBank<ViReg> {
        &self.vi
    }

    fn controls_ptr(&self) -> *mut sys::CONTROL {
        // `Cell<T>` has the same layout as `T`.
        self.controls.as_ptr() as *mut sys::CONTROL
    }

    fn flag(&self) -> c_int {
        self.memory.order().flag()
    }

    /// The `AUDIO_INFO` record for this storage.
    pub fn audio_info(&self) -> sys::AUDIO_INFO {
        let m = &self.memory;
        sys::AUDIO_INFO {
            hWnd: self.windows.main.as_raw(),
            hinst: self.windows.instance.as_raw(),
            MemoryBswaped: self.flag(),
            HEADER: m.base_ptr(MemoryRegion::RomHeader),
            RDRAM: m.base_ptr(MemoryRegion::Rdram),
            DMEM: m.base_ptr(MemoryRegion::Dmem),
            IMEM: m.base_ptr(MemoryRegion::Imem),
            MI_INTR_REG: self.mi.ptr(MiReg::Intr),
            AI_DRAM_ADDR_REG: self.ai.ptr(AiReg::DramAddr),
            AI_LEN_REG: self.ai.ptr(AiReg::Len),
            AI_CONTROL_REG: self.ai.ptr(AiReg::Control),
            AI_STATUS_REG: self.ai.ptr(AiReg::Status),
            AI_DACRATE_REG: self.ai.ptr(AiReg::Dacrate),
            AI_BITRATE_REG: self.ai.ptr(AiReg::Bitrate),
            CheckInterrupts: self.check_interrupts,
        }
    }

    /// The `GFX_INFO` record for this storage (graphics 1.2 and 1.3).
    pub fn gfx_info(&self) -> sys::GFX_INFO {
        let m = &self.memory;
        sys::GFX_INFO {
            hWnd: self.windows.main.as_raw(),
            hStatusBar: self.windows.status_bar.as_raw(),
            MemoryBswaped: self.flag(),
            HEADER: m.base_ptr(MemoryRegion::RomHeader),
            RDRAM: m.base_ptr(MemoryRegion::Rdram),
            DMEM: m.base_ptr(MemoryRegion::Dmem),
            IMEM: m.base_ptr(MemoryRegion::Imem),
            MI_INTR_REG: self.mi.ptr(MiReg::Intr),
            DPC_START_REG: self.dpc.ptr(DpcReg::Start),
            DPC_END_REG: self.dpc.ptr(DpcReg::End),
            DPC_CURRENT_REG: self.dpc.ptr(DpcReg::Current),
            DPC_STATUS_REG: self.dpc.ptr(DpcReg::Status),
            DPC_CLOCK_REG: self.dpc.ptr(DpcReg::Clock),
            DPC_BUFBUSY_REG: self.dpc.ptr(DpcReg::BufBusy),
            DPC_PIPEBUSY_REG: self.dpc.ptr(DpcReg::PipeBusy),
            DPC_TMEM_REG: self.dpc.ptr(DpcReg::Tmem),
            VI_STATUS_REG: self.vi.ptr(ViReg::Status),
            VI_ORIGIN_REG: self.vi.ptr(ViReg::Origin),
            VI_WIDTH_REG: self.vi.ptr(ViReg::Width),
            VI_INTR_REG: self.vi.ptr(ViReg::Intr),
            VI_V_CURRENT_LINE_REG: self.vi.ptr(ViReg::VCurrentLine),
            VI_TIMING_REG: self.vi.ptr(ViReg::Timing),
            VI_V_SYNC_REG: self.vi.ptr(ViReg::VSync),
            VI_H_SYNC_REG: self.vi.ptr(ViReg::HSync),
            VI_LEAP_REG: self.vi.ptr(ViReg::Leap),
            VI_H_START_REG: self.vi.ptr(ViReg::HStart),
            VI_V_START_REG: self.vi.ptr(ViReg::VStart),
            VI_V_BURST_REG: self.vi.ptr(ViReg::VBurst),
            VI_X_SCALE_REG: self.vi.ptr(ViReg::XScale),
            VI_Y_SCALE_REG: self.vi.ptr(ViReg::YScale),
            CheckInterrupts: self.check_interrupts,
        }
    }

    /// The `CONTROL_INFO` record for this storage (controller 1.1).
    pub fn control_info(&self) -> sys::CONTROL_INFO {
        sys::CONTROL_INFO {
            hMainWindow: self.windows.main.as_raw(),
            hinst: self.windows.instance.as_raw(),
            MemoryBswaped: self.flag(),
            HEADER: self.memory.base_ptr(MemoryRegion::RomHeader),
            Controls: self.controls_ptr(),
        }
    }

    fn read_controls(&self) -> [sys::CONTROL; MAX_CONTROLLERS] {
        std::array::from_fn(|i| self.controls[i].get())
    }
}

/// One initialized use of a module, from `Initiate*` to `CloseDLL`.
///
/// Every call takes `&mut self`, so calls never overlap. The session may be
/// moved to an emulation thread after initialization.
pub struct Session<K: Subsystem> {
    module: Module<K>,
    resources: Box<HostResources>,
    state: SessionState,
    control_thread: ThreadId,
    codec: ButtonCodec,
    controllers: [ControllerConfig; MAX_CONTROLLERS],
    closed: bool,
}

// Safety: the raw pointers inside `HostResources` point into the session's own
// boxed storage, and the module only dereferences them during calls made
// through `&mut Session`. Moving the whole session to another thread moves
// exclusive access along with it.
unsafe impl<K: Subsystem> Send for Session<K> {}

impl<K: Subsystem> fmt::Debug for Session<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("module", &self.module)
            .field("state", &self.state)
            .field("order", &self.resources.memory.order())
            .finish_non_exhaustive()
    }
}

impl<K: Subsystem> Session<K> {
    /// Allocates storage for `module`. The calling thread becomes the control
    /// context, the only one allowed to initialize.
    pub fn new(module: Module<K>, config: SessionConfig) -> Result<Self, SessionError> {
        let order = match config.memory_order {
            Some(order) if module.info().supports(order) => order,
            Some(order) => return Err(SessionError::UnsupportedMemoryOrder(order)),
            None => module
                .info()
                .memory
                .preferred()
                .ok_or(SessionError::NoMemoryOrder)?,
        };

        // Controller 1.0 never learns the memory order, so it can only use
        // the native bitfield layout.
        let codec = if module.shape().has_memory_window() {
            ButtonCodec::for_session(order)
        } else {
            ButtonCodec::new(BitOrder::native())
        };

        debug!(
            "new {} session for {:?}: {order:?} memory, {:?} buttons",
            K::CATEGORY,
            module.info().name,
            codec.order()
        );

        Ok(Self {
            module,
            resources: Box::new(HostResources::new(
                order,
                config.windows,
                config.check_interrupts,
            )),
            state: SessionState::Created,
            control_thread: thread::current().id(),
            codec,
            controllers: Default::default(),
            closed: false,
        })
    }

    pub fn module(&self) -> &Module<K> {
        &self.module
    }

    pub fn info(&self) -> &CapabilityDescriptor {
        self.module.info()
    }

    pub fn shape(&self) -> InfoShape {
        self.module.shape()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn memory_order(&self) -> MemoryOrder {
        self.resources.memory.order()
    }

    pub fn codec(&self) -> ButtonCodec {
        self.codec
    }

    pub fn resources(&self) -> &HostResources {
        &self.resources
    }

    pub fn memory(&self) -> &MemoryWindow {
        &self.resources.memory
    }

    /// Mirrors the first 64 bytes of a `.z64` image into the header window.
    pub fn load_rom_header(&self, rom: &[u8]) -> Result<(), MemoryError> {
        self.resources.memory.load_rom_header(rom)
    }

    /// Current `MI_INTR_REG` bits.
    pub fn interrupt_bits(&self) -> u32 {
        self.resources.mi.read(MiReg::Intr)
    }

    pub fn acknowledge_interrupts(&self, bits: u32) {
        self.resources.mi.clear_bits(MiReg::Intr, bits);
    }

    fn begin_initiate(&self) -> Result<(), SessionError> {
        if thread::current().id() != self.control_thread {
            return Err(SessionError::WrongContext);
        }
        match self.state {
            SessionState::Created => Ok(()),
            SessionState::Failed => Err(SessionError::InvalidState("initialization already failed")),
            SessionState::Ready | SessionState::RomOpen => {
                Err(SessionError::InvalidState("already initialized"))
            }
        }
    }

    fn finish_initiate(&mut self, ok: bool) -> Result<(), SessionError> {
        if ok {
            self.state = SessionState::Ready;
            info!("{} plugin {:?} initialized", K::CATEGORY, self.info().name);
            Ok(())
        } else {
            self.state = SessionState::Failed;
            warn!("{} plugin {:?} failed to initialize", K::CATEGORY, self.info().name);
            Err(SessionError::InitFailed)
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready | SessionState::RomOpen => Ok(()),
            SessionState::Created => Err(SessionError::InvalidState("session is not initialized")),
            SessionState::Failed => Err(SessionError::InvalidState("initialization failed")),
        }
    }

    fn open_rom_state(&mut self) {
        if self.state == SessionState::Ready {
            self.state = SessionState::RomOpen;
        }
    }

    /// Forwards `RomClosed` if a ROM is open; otherwise does nothing.
    pub fn rom_closed(&mut self) {
        if self.state != SessionState::RomOpen {
            debug!("RomClosed without an open ROM ignored");
            return;
        }
        unsafe { (self.module.common.rom_closed)() };
        self.state = SessionState::Ready;
    }

    /// Closes any open ROM, then calls `CloseDLL`.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.rom_closed();
        unsafe { (self.module.common.close_dll)() };
        self.closed = true;
        debug!("{} plugin {:?} closed", K::CATEGORY, self.info().name);
    }
}

impl<K: Subsystem> Drop for Session<K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn optional<F>(f: Option<F>, entry: EntryPoint) -> Result<F, SessionError> {
    f.ok_or(SessionError::MissingEntryPoint(entry))
}

impl Session<Audio> {
    /// Calls `InitiateAudio` with the session's `AUDIO_INFO`.
    pub fn initiate(&mut self) -> Result<(), SessionError> {
        self.begin_initiate()?;
        let record = self.resources.audio_info();
        let ok = unsafe { (self.module.entries.initiate)(record) } != 0;
        self.finish_initiate(ok)
    }

    /// Audio has no `RomOpen`; this only arms `RomClosed`.
    pub fn rom_open(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.open_rom_state();
        Ok(())
    }

    fn emulate(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.open_rom_state();
        Ok(())
    }

    pub fn ai(&self) -> &RegisterBank<AiReg> {
        &self.resources.ai
    }

    pub fn ai_dacrate_changed(&mut self, system: SystemType) -> Result<(), SessionError> {
        self.emulate()?;
        unsafe { (self.module.entries.dacrate_changed)(system.raw()) };
        Ok(())
    }

    pub fn ai_len_changed(&mut self) -> Result<(), SessionError> {
        self.emulate()?;
        unsafe { (self.module.entries.len_changed)() };
        Ok(())
    }

    /// Writes `AI_DACRATE_REG` and notifies the module.
    pub fn set_dacrate(&mut self, value: u32, system: SystemType) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.resources.ai.write(AiReg::Dacrate, value);
        self.ai_dacrate_changed(system)
    }

    /// Writes `AI_LEN_REG` and notifies the module.
    pub fn set_ai_len(&mut self, value: u32) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.resources.ai.write(AiReg::Len, value);
        self.ai_len_changed()
    }

    pub fn ai_read_length(&mut self) -> Result<u32, SessionError> {
        self.emulate()?;
        Ok(unsafe { (self.module.entries.read_length)() })
    }

    /// `AiUpdate(wait)`. With `wait` the module may block until it needs
    /// more samples.
    pub fn ai_update(&mut self, wait: bool) -> Result<(), SessionError> {
        let f = optional(self.module.entries.update, EntryPoint::AiUpdate)?;
        self.emulate()?;
        unsafe { f(c_int::from(wait)) };
        Ok(())
    }

    pub fn process_alist(&mut self) -> Result<(), SessionError> {
        self.emulate()?;
        unsafe { (self.module.entries.process_alist)() };
        Ok(())
    }
}

impl Session<Gfx> {
    /// Calls `InitiateGFX` with the session's `GFX_INFO`.
    pub fn initiate(&mut self) -> Result<(), SessionError> {
        self.begin_initiate()?;
        let record = self.resources.gfx_info();
        let ok = unsafe { (self.module.entries.initiate)(record) } != 0;
        self.finish_initiate(ok)
    }

    pub fn dpc(&self) -> &RegisterBank<DpcReg> {
        &self.resources.dpc
    }

    pub fn vi(&self) -> &RegisterBank<ViReg> {
        &self.resources.vi
    }

    pub fn rom_open(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        if self.state == SessionState::RomOpen {
            return Err(SessionError::InvalidState("a ROM is already open"));
        }
        unsafe { (self.module.entries.rom_open)() };
        self.open_rom_state();
        Ok(())
    }

    pub fn change_window(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.change_window)() };
        Ok(())
    }

    pub fn draw_screen(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.draw_screen)() };
        Ok(())
    }

    pub fn move_screen(&mut self, x: i32, y: i32) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.move_screen)(x, y) };
        Ok(())
    }

    pub fn process_dlist(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.process_dlist)() };
        Ok(())
    }

    pub fn process_rdp_list(&mut self) -> Result<(), SessionError> {
        let f = optional(self.module.entries.process_rdp_list, EntryPoint::ProcessRdpList)?;
        self.ensure_running()?;
        unsafe { f() };
        Ok(())
    }

    pub fn show_cfb(&mut self) -> Result<(), SessionError> {
        let f = optional(self.module.entries.show_cfb, EntryPoint::ShowCfb)?;
        self.ensure_running()?;
        unsafe { f() };
        Ok(())
    }

    pub fn update_screen(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.update_screen)() };
        Ok(())
    }

    pub fn vi_status_changed(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.vi_status_changed)() };
        Ok(())
    }

    pub fn vi_width_changed(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        unsafe { (self.module.entries.vi_width_changed)() };
        Ok(())
    }

    /// Writes `VI_STATUS_REG` and notifies the module.
    pub fn set_vi_status(&mut self, value: u32) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.resources.vi.write(ViReg::Status, value);
        self.vi_status_changed()
    }

    /// Writes `VI_WIDTH_REG` and notifies the module.
    pub fn set_vi_width(&mut self, value: u32) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.resources.vi.write(ViReg::Width, value);
        self.vi_width_changed()
    }

    /// Asks the module to save a screenshot into `dir`.
    pub fn capture_screen(&mut self, dir: &Path) -> Result<(), SessionError> {
        let f = optional(self.module.entries.capture_screen, EntryPoint::CaptureScreen)?;
        self.ensure_running()?;
        let dir = dir.to_str().ok_or(SessionError::InvalidPath)?;
        let dir = CString::new(dir).map_err(|_| SessionError::InvalidPath)?;
        // The header declares a mutable pointer; modules only read it.
        unsafe { f(dir.as_ptr() as *mut _) };
        Ok(())
    }
}

impl Session<Controller> {
    /// Calls `InitiateControllers` and reads back the per-slot configuration.
    ///
    /// Controllers cannot report failure; the session is ready afterwards.
    pub fn initiate(&mut self) -> Result<(), SessionError> {
        self.begin_initiate()?;
        match self.module.entries.initiate {
            InitiateControllers::V1_0(f) => unsafe {
                f(
                    self.resources.windows.main.as_raw(),
                    self.resources.controls_ptr(),
                )
            },
            InitiateControllers::V1_1(f) => unsafe { f(self.resources.control_info()) },
        }

        let shape = self.shape();
        for (i, raw) in self.resources.read_controls().iter().enumerate() {
            let config = match ControllerConfig::from_raw(raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!("controller {}: {e}; treating as unplugged", i + 1);
                    ControllerConfig::default()
                }
            };
            if let Err(e) = config.check(shape) {
                warn!("controller {}: {e}; raw data disabled", i + 1);
                let accessory = match config.accessory {
                    Accessory::Raw => Accessory::None,
                    other => other,
                };
                self.controllers[i] = ControllerConfig {
                    raw_data: false,
                    accessory,
                    ..config
                };
                continue;
            }
            self.controllers[i] = config;
        }
        self.finish_initiate(true)
    }

    /// Slot configuration reported by the module during initialize.
    pub fn controllers(&self) -> &[ControllerConfig; MAX_CONTROLLERS] {
        &self.controllers
    }

    pub fn rom_open(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        if self.state == SessionState::RomOpen {
            return Err(SessionError::InvalidState("a ROM is already open"));
        }
        unsafe { (self.module.entries.rom_open)() };
        self.open_rom_state();
        Ok(())
    }

    /// Polls one slot and decodes the result with the session codec.
    pub fn get_keys(&mut self, slot: ControllerSlot) -> Result<ButtonState, SessionError> {
        self.get_keys_raw(slot).map(|packed| self.codec.decode(packed))
    }

    /// Polls one slot and returns the packed word as written.
    pub fn get_keys_raw(&mut self, slot: ControllerSlot) -> Result<PackedButtons, SessionError> {
        let f = optional(self.module.entries.get_keys, EntryPoint::GetKeys)?;
        self.ensure_running()?;
        let mut keys = sys::BUTTONS::zeroed();
        unsafe { f(slot.raw(), &mut keys) };
        Ok(PackedButtons::from_union(&keys))
    }

    /// Hands a framed PIF command to the module. `EndOfStream` passes a null
    /// command.
    pub fn controller_command(
        &mut self,
        channel: RawChannel,
        command: Option<&mut RawCommandBuf>,
    ) -> Result<(), SessionError> {
        let f = optional(
            self.module.entries.controller_command,
            EntryPoint::ControllerCommand,
        )?;
        self.ensure_running()?;
        self.check_raw_channel(channel)?;
        let ptr = raw_command_ptr(channel, command)?;
        unsafe { f(channel.raw(), ptr) };
        Ok(())
    }

    pub fn read_controller(
        &mut self,
        channel: RawChannel,
        command: Option<&mut RawCommandBuf>,
    ) -> Result<(), SessionError> {
        let f = optional(self.module.entries.read_controller, EntryPoint::ReadController)?;
        self.ensure_running()?;
        self.check_raw_channel(channel)?;
        let ptr = raw_command_ptr(channel, command)?;
        unsafe { f(channel.raw(), ptr) };
        Ok(())
    }

    fn check_raw_channel(&self, channel: RawChannel) -> Result<(), SessionError> {
        match channel {
            RawChannel::Slot(slot) if !self.controllers[slot.index()].wants_raw() => Err(
                SessionError::InvalidState("the slot did not ask for raw data"),
            ),
            _ => Ok(()),
        }
    }

    pub fn key_down(&mut self, event: KeyEvent) -> Result<(), SessionError> {
        let f = optional(self.module.entries.key_down, EntryPoint::KeyDown)?;
        self.ensure_running()?;
        unsafe { f(event.code, event.param) };
        Ok(())
    }

    pub fn key_up(&mut self, event: KeyEvent) -> Result<(), SessionError> {
        let f = optional(self.module.entries.key_up, EntryPoint::KeyUp)?;
        self.ensure_running()?;
        unsafe { f(event.code, event.param) };
        Ok(())
    }
}

fn raw_command_ptr(
    channel: RawChannel,
    command: Option<&mut RawCommandBuf>,
) -> Result<*mut u8, SessionError> {
    match (channel, command) {
        (_, Some(buf)) => Ok(buf.as_mut_ptr()),
        (RawChannel::EndOfStream, None) => Ok(std::ptr::null_mut()),
        (RawChannel::Slot(_), None) => Err(SessionError::InvalidState(
            "a slot command needs a command buffer",
        )),
    }
}
