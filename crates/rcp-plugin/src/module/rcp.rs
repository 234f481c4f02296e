//! What a plugin sees of the emulator during one call.
//!
//! Every view borrows the stored init record for the duration of a single
//! entry-point call, so none of the host's addresses can escape into plugin
//! state.

use std::fmt;

use rcp_plugin_core::byte_order::MemoryOrder;
use rcp_plugin_core::controller::{ControllerConfig, ControllerSlot, MAX_CONTROLLERS};
use rcp_plugin_core::memory::{
    DMEM_SIZE, IMEM_SIZE, MemoryRegion, RDRAM_SIZE, ROM_HEADER_SIZE, RegionView,
};
use rcp_plugin_core::registers::{
    AiRegisters, DpcRegisters, RegisterMap, RegisterRef, ViRegisters,
};
use rcp_plugin_sys as sys;

use crate::handle::{WindowHandle, WindowHandles};

/// The four shared memory regions, all in the session's order.
#[derive(Clone, Copy, Debug)]
pub struct RcpMemory<'s> {
    order: MemoryOrder,
    rdram: RegionView<'s>,
    dmem: RegionView<'s>,
    imem: RegionView<'s>,
    header: RegionView<'s>,
}

impl<'s> RcpMemory<'s> {
    /// # Safety
    /// Each pointer must address a host region of the standard size that
    /// stays valid for `'s`.
    unsafe fn from_raw(
        flag: std::os::raw::c_int,
        header: *mut u8,
        rdram: *mut u8,
        dmem: *mut u8,
        imem: *mut u8,
    ) -> Option<Self> {
        let order = MemoryOrder::from_flag(flag);
        unsafe {
            Some(Self {
                order,
                rdram: RegionView::from_raw(rdram, RDRAM_SIZE, order)?,
                dmem: RegionView::from_raw(dmem, DMEM_SIZE, order)?,
                imem: RegionView::from_raw(imem, IMEM_SIZE, order)?,
                header: RegionView::from_raw(header, ROM_HEADER_SIZE, order)?,
            })
        }
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    pub fn region(&self, region: MemoryRegion) -> RegionView<'s> {
        match region {
            MemoryRegion::Rdram => self.rdram,
            MemoryRegion::Dmem => self.dmem,
            MemoryRegion::Imem => self.imem,
            MemoryRegion::RomHeader => self.header,
        }
    }

    pub fn rdram(&self) -> RegionView<'s> {
        self.rdram
    }

    pub fn dmem(&self) -> RegionView<'s> {
        self.dmem
    }

    pub fn imem(&self) -> RegionView<'s> {
        self.imem
    }

    pub fn header(&self) -> RegionView<'s> {
        self.header
    }
}

/// `MI_INTR_REG` plus the host's `CheckInterrupts` callback.
#[derive(Clone, Copy)]
pub struct InterruptLine<'s> {
    mi_intr: RegisterRef<'s>,
    check: sys::p_func,
}

impl fmt::Debug for InterruptLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptLine")
            .field("mi_intr", &self.mi_intr)
            .field("callback", &self.check.is_some())
            .finish()
    }
}

impl<'s> InterruptLine<'s> {
    unsafe fn from_raw(mi_intr: *mut u32, check: sys::p_func) -> Option<Self> {
        Some(Self {
            mi_intr: unsafe { RegisterRef::from_raw(mi_intr)? },
            check,
        })
    }

    /// Sets `bits` in `MI_INTR_REG`, then tells the host to re-evaluate
    /// pending interrupts.
    pub fn raise(&self, bits: u32) {
        self.mi_intr.set_bits(bits);
        if let Some(check) = self.check {
            unsafe { check() };
        }
    }

    /// Current `MI_INTR_REG` bits.
    pub fn pending(&self) -> u32 {
        self.mi_intr.get()
    }
}

/// View passed to every audio call.
#[derive(Clone, Copy, Debug)]
pub struct AudioRcp<'s> {
    pub windows: WindowHandles,
    pub memory: RcpMemory<'s>,
    pub ai: AiRegisters<'s>,
    pub interrupts: InterruptLine<'s>,
}

impl<'s> AudioRcp<'s> {
    /// # Safety
    /// `info` must be the record the host passed to `InitiateAudio`, and the
    /// host must not have called `CloseDLL` yet.
    pub(crate) unsafe fn from_info(info: &'s sys::AUDIO_INFO) -> Option<Self> {
        unsafe {
            Some(Self {
                windows: WindowHandles {
                    main: WindowHandle::from_raw(info.hWnd),
                    instance: WindowHandle::from_raw(info.hinst),
                    status_bar: WindowHandle::NULL,
                },
                memory: RcpMemory::from_raw(
                    info.MemoryBswaped,
                    info.HEADER,
                    info.RDRAM,
                    info.DMEM,
                    info.IMEM,
                )?,
                ai: RegisterMap::from_raw([
                    info.AI_DRAM_ADDR_REG,
                    info.AI_LEN_REG,
                    info.AI_CONTROL_REG,
                    info.AI_STATUS_REG,
                    info.AI_DACRATE_REG,
                    info.AI_BITRATE_REG,
                ])?,
                interrupts: InterruptLine::from_raw(info.MI_INTR_REG, info.CheckInterrupts)?,
            })
        }
    }

    pub fn raise_interrupt(&self, bits: u32) {
        self.interrupts.raise(bits);
    }
}

/// View passed to every graphics call.
#[derive(Clone, Copy, Debug)]
pub struct GfxRcp<'s> {
    pub windows: WindowHandles,
    pub memory: RcpMemory<'s>,
    pub dpc: DpcRegisters<'s>,
    pub vi: ViRegisters<'s>,
    pub interrupts: InterruptLine<'s>,
}

impl<'s> GfxRcp<'s> {
    /// # Safety
    /// `info` must be the record the host passed to `InitiateGFX`, and the
    /// host must not have called `CloseDLL` yet.
    pub(crate) unsafe fn from_info(info: &'s sys::GFX_INFO) -> Option<Self> {
        unsafe {
            Some(Self {
                windows: WindowHandles {
                    main: WindowHandle::from_raw(info.hWnd),
                    instance: WindowHandle::NULL,
                    status_bar: WindowHandle::from_raw(info.hStatusBar),
                },
                memory: RcpMemory::from_raw(
                    info.MemoryBswaped,
                    info.HEADER,
                    info.RDRAM,
                    info.DMEM,
                    info.IMEM,
                )?,
                dpc: RegisterMap::from_raw([
                    info.DPC_START_REG,
                    info.DPC_END_REG,
                    info.DPC_CURRENT_REG,
                    info.DPC_STATUS_REG,
                    info.DPC_CLOCK_REG,
                    info.DPC_BUFBUSY_REG,
                    info.DPC_PIPEBUSY_REG,
                    info.DPC_TMEM_REG,
                ])?,
                vi: RegisterMap::from_raw([
                    info.VI_STATUS_REG,
                    info.VI_ORIGIN_REG,
                    info.VI_WIDTH_REG,
                    info.VI_INTR_REG,
                    info.VI_V_CURRENT_LINE_REG,
                    info.VI_TIMING_REG,
                    info.VI_V_SYNC_REG,
                    info.VI_H_SYNC_REG,
                    info.VI_LEAP_REG,
                    info.VI_H_START_REG,
                    info.VI_V_START_REG,
                    info.VI_V_BURST_REG,
                    info.VI_X_SCALE_REG,
                    info.VI_Y_SCALE_REG,
                ])?,
                interrupts: InterruptLine::from_raw(info.MI_INTR_REG, info.CheckInterrupts)?,
            })
        }
    }

    pub fn raise_interrupt(&self, bits: u32) {
        self.interrupts.raise(bits);
    }
}

/// Controller initialization context.
///
/// The plugin fills in one [`ControllerConfig`] per slot; slots it leaves
/// alone stay unplugged.
pub struct ControllerInit<'a> {
    pub(crate) windows: WindowHandles,
    pub(crate) order: Option<MemoryOrder>,
    pub(crate) header: Option<RegionView<'a>>,
    pub(crate) controls: &'a mut [sys::CONTROL; MAX_CONTROLLERS],
}

impl fmt::Debug for ControllerInit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerInit")
            .field("order", &self.order)
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}

impl<'a> ControllerInit<'a> {
    pub fn windows(&self) -> WindowHandles {
        self.windows
    }

    /// Session memory order. `None` for 1.0 hosts, which never send it.
    pub fn memory_order(&self) -> Option<MemoryOrder> {
        self.order
    }

    /// ROM header, when the host sent one (1.1).
    pub fn header(&self) -> Option<RegionView<'a>> {
        self.header
    }

    pub fn set(&mut self, slot: ControllerSlot, config: ControllerConfig) {
        self.controls[slot.index()] = config.to_raw();
    }

    pub fn get(&self, slot: ControllerSlot) -> &sys::CONTROL {
        &self.controls[slot.index()]
    }
}
