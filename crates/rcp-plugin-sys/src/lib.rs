#![allow(
    non_camel_case_types,
    non_snake_case,
    clippy::upper_case_acronyms,
    clippy::missing_safety_doc
)]

//! Low-level (unsafe) layouts of the RCP plugin ABI.
//!
//! This crate mirrors the public C headers of the common plugin
//! interface: audio #1.1, graphics #1.3 and controller #1.1. Field names
//! are kept exactly as the headers spell them, including the historical
//! `MemoryBswaped`/`hinst` spellings and the `PLUGIN_TANSFER_PAK` constant,
//! because they are part of the ABI surface that existing plugins were built
//! against.
//!
//! Most consumers should use `rcp-plugin` instead of touching these records
//! directly.

use core::ffi::c_void;
use std::os::raw::{c_char, c_int, c_uint};

/// Opaque pointer (`p_void` in the headers).
pub type p_void = *mut c_void;
/// Pointer into host-owned byte memory (`pu8`).
pub type pu8 = *mut u8;
/// Pointer into host-owned register storage (`pu32`).
pub type pu32 = *mut u32;
/// Parameterless host callback (`p_func`), used for `CheckInterrupts`.
pub type p_func = Option<unsafe extern "C" fn()>;

// Plugin categories (`PLUGIN_INFO::Type`).

pub const PLUGIN_TYPE_GFX: u16 = 2;
pub const PLUGIN_TYPE_AUDIO: u16 = 3;
pub const PLUGIN_TYPE_CONTROLLER: u16 = 4;

// Newest API version per category described by the headers.

pub const AUDIO_API_VERSION: u16 = 0x0101;
pub const GFX_API_VERSION: u16 = 0x0103;
pub const CONTROLLER_API_VERSION: u16 = 0x0101;

// TV system types passed to `AiDacrateChanged`.

pub const SYSTEM_NTSC: c_int = 0;
pub const SYSTEM_PAL: c_int = 1;
pub const SYSTEM_MPAL: c_int = 2;

// Controller accessories (`CONTROL::Plugin`).

pub const PLUGIN_NONE: c_int = 1;
pub const PLUGIN_MEMPAK: c_int = 2;
pub const PLUGIN_RUMBLE_PAK: c_int = 3;
/// Original, misspelled name from the first controller header.
pub const PLUGIN_TANSFER_PAK: c_int = 4;
pub const PLUGIN_TRANSFER_PAK: c_int = PLUGIN_TANSFER_PAK;
/// Raw data accessory, API 0x0101 and later.
pub const PLUGIN_RAW: c_int = 5;

// MI_INTR_REG bits.

pub const MI_INTR_SP: u32 = 0x01;
pub const MI_INTR_SI: u32 = 0x02;
pub const MI_INTR_AI: u32 = 0x04;
pub const MI_INTR_VI: u32 = 0x08;
pub const MI_INTR_PI: u32 = 0x10;
pub const MI_INTR_DP: u32 = 0x20;

/// Capacity of `PLUGIN_INFO::Name`, including the terminating NUL.
pub const PLUGIN_NAME_LEN: usize = 100;
/// Number of controller slots in `CONTROL_INFO::Controls`.
pub const MAX_CONTROLLERS: usize = 4;
/// Size of the ROM header window (`HEADER`).
pub const ROM_HEADER_SIZE: usize = 64;

#[repr(C)]
#[derive(Copy, Clone)]
/// Capability record filled in by `GetDllInfo`.
///
/// Controller headers name the last two words `Reserved1`/`Reserved2`; the
/// layout is identical.
pub struct PLUGIN_INFO {
    pub Version: u16,
    pub Type: u16,
    pub Name: [c_char; PLUGIN_NAME_LEN],
    pub NormalMemory: c_int,
    pub MemorySwapped: c_int,
}

impl PLUGIN_INFO {
    pub const fn zeroed() -> Self {
        Self {
            Version: 0,
            Type: 0,
            Name: [0; PLUGIN_NAME_LEN],
            NormalMemory: 0,
            MemorySwapped: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone)]
/// Record passed by value to `InitiateAudio` (audio #1.1).
pub struct AUDIO_INFO {
    pub hWnd: p_void,
    pub hinst: p_void,

    pub MemoryBswaped: c_int,
    pub HEADER: pu8,
    pub RDRAM: pu8,
    pub DMEM: pu8,
    pub IMEM: pu8,

    pub MI_INTR_REG: pu32,

    pub AI_DRAM_ADDR_REG: pu32,
    pub AI_LEN_REG: pu32,
    pub AI_CONTROL_REG: pu32,
    pub AI_STATUS_REG: pu32,
    pub AI_DACRATE_REG: pu32,
    pub AI_BITRATE_REG: pu32,

    pub CheckInterrupts: p_func,
}

#[repr(C)]
#[derive(Copy, Clone)]
/// Record passed by value to `InitiateGFX` (graphics #1.2 and #1.3).
pub struct GFX_INFO {
    pub hWnd: p_void,
    pub hStatusBar: p_void,

    pub MemoryBswaped: c_int,
    pub HEADER: pu8,
    pub RDRAM: pu8,
    pub DMEM: pu8,
    pub IMEM: pu8,

    pub MI_INTR_REG: pu32,

    pub DPC_START_REG: pu32,
    pub DPC_END_REG: pu32,
    pub DPC_CURRENT_REG: pu32,
    pub DPC_STATUS_REG: pu32,
    pub DPC_CLOCK_REG: pu32,
    pub DPC_BUFBUSY_REG: pu32,
    pub DPC_PIPEBUSY_REG: pu32,
    pub DPC_TMEM_REG: pu32,

    pub VI_STATUS_REG: pu32,
    pub VI_ORIGIN_REG: pu32,
    pub VI_WIDTH_REG: pu32,
    pub VI_INTR_REG: pu32,
    pub VI_V_CURRENT_LINE_REG: pu32,
    pub VI_TIMING_REG: pu32,
    pub VI_V_SYNC_REG: pu32,
    pub VI_H_SYNC_REG: pu32,
    pub VI_LEAP_REG: pu32,
    pub VI_H_START_REG: pu32,
    pub VI_V_START_REG: pu32,
    pub VI_V_BURST_REG: pu32,
    pub VI_X_SCALE_REG: pu32,
    pub VI_Y_SCALE_REG: pu32,

    pub CheckInterrupts: p_func,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
/// Per-slot controller configuration, written by the plugin during init.
pub struct CONTROL {
    pub Present: c_int,
    pub RawData: c_int,
    pub Plugin: c_int,
}

#[repr(C)]
#[derive(Copy, Clone)]
/// Record passed by value to `InitiateControllers` (controller #1.1).
pub struct CONTROL_INFO {
    pub hMainWindow: p_void,
    pub hinst: p_void,

    pub MemoryBswaped: c_int,
    pub HEADER: pu8,
    pub Controls: *mut CONTROL,
}

#[repr(C)]
#[derive(Copy, Clone)]
/// Packed controller state filled in by `GetKeys`.
///
/// The bitfield view (`OS_CONT_PAD`) depends on the compiler's bit
/// allocation order and is intentionally not mirrored here; see the codec in
/// `rcp-plugin-core`.
pub union BUTTONS {
    pub Value: u32,
    pub halfwords: [u16; 2],
    pub bytes: [i8; 4],
}

impl BUTTONS {
    pub const fn zeroed() -> Self {
        Self { Value: 0 }
    }
}

// Entry points shared by every category.

pub type CloseDLL = unsafe extern "C" fn();
pub type DllAbout = unsafe extern "C" fn(hParent: p_void);
pub type DllConfig = unsafe extern "C" fn(hParent: p_void);
pub type DllTest = unsafe extern "C" fn(hParent: p_void);
pub type GetDllInfo = unsafe extern "C" fn(PluginInfo: *mut PLUGIN_INFO);
pub type RomClosed = unsafe extern "C" fn();
pub type RomOpen = unsafe extern "C" fn();

// Audio #1.1.

pub type AiDacrateChanged = unsafe extern "C" fn(SystemType: c_int);
pub type AiLenChanged = unsafe extern "C" fn();
pub type AiReadLength = unsafe extern "C" fn() -> u32;
pub type AiUpdate = unsafe extern "C" fn(Wait: c_int);
pub type InitiateAudio = unsafe extern "C" fn(Audio_Info: AUDIO_INFO) -> c_int;
pub type ProcessAList = unsafe extern "C" fn();

// Graphics #1.3.

pub type CaptureScreen = unsafe extern "C" fn(Directory: *mut c_char);
pub type ChangeWindow = unsafe extern "C" fn();
pub type DrawScreen = unsafe extern "C" fn();
pub type InitiateGFX = unsafe extern "C" fn(Gfx_Info: GFX_INFO) -> c_int;
pub type MoveScreen = unsafe extern "C" fn(xpos: c_int, ypos: c_int);
pub type ProcessDList = unsafe extern "C" fn();
pub type ProcessRDPList = unsafe extern "C" fn();
pub type ShowCFB = unsafe extern "C" fn();
pub type UpdateScreen = unsafe extern "C" fn();
pub type ViStatusChanged = unsafe extern "C" fn();
pub type ViWidthChanged = unsafe extern "C" fn();

// Controller #1.0 / #1.1.

pub type ControllerCommand = unsafe extern "C" fn(Control: c_int, Command: pu8);
pub type GetKeys = unsafe extern "C" fn(Control: c_int, Keys: *mut BUTTONS);
/// `InitiateControllers` as declared by controller #1.0.
pub type InitiateControllers_1_0 = unsafe extern "C" fn(hMainWindow: p_void, Controls: *mut CONTROL);
/// `InitiateControllers` as declared by controller #1.1 (record by value).
pub type InitiateControllers_1_1 = unsafe extern "C" fn(ControlInfo: CONTROL_INFO);
pub type ReadController = unsafe extern "C" fn(Control: c_int, Command: pu8);
pub type WM_KeyDown = unsafe extern "C" fn(wParam: c_uint, lParam: i32);
pub type WM_KeyUp = unsafe extern "C" fn(wParam: c_uint, lParam: i32);

/// Exported symbol names, NUL-terminated for symbol lookup.
pub mod symbols {
    pub const CLOSE_DLL: &[u8] = b"CloseDLL\0";
    pub const DLL_ABOUT: &[u8] = b"DllAbout\0";
    pub const DLL_CONFIG: &[u8] = b"DllConfig\0";
    pub const DLL_TEST: &[u8] = b"DllTest\0";
    pub const GET_DLL_INFO: &[u8] = b"GetDllInfo\0";
    pub const ROM_CLOSED: &[u8] = b"RomClosed\0";
    pub const ROM_OPEN: &[u8] = b"RomOpen\0";

    pub const AI_DACRATE_CHANGED: &[u8] = b"AiDacrateChanged\0";
    pub const AI_LEN_CHANGED: &[u8] = b"AiLenChanged\0";
    pub const AI_READ_LENGTH: &[u8] = b"AiReadLength\0";
    pub const AI_UPDATE: &[u8] = b"AiUpdate\0";
    pub const INITIATE_AUDIO: &[u8] = b"InitiateAudio\0";
    pub const PROCESS_ALIST: &[u8] = b"ProcessAList\0";

    pub const CAPTURE_SCREEN: &[u8] = b"CaptureScreen\0";
    pub const CHANGE_WINDOW: &[u8] = b"ChangeWindow\0";
    pub const DRAW_SCREEN: &[u8] = b"DrawScreen\0";
    pub const INITIATE_GFX: &[u8] = b"InitiateGFX\0";
    pub const MOVE_SCREEN: &[u8] = b"MoveScreen\0";
    pub const PROCESS_DLIST: &[u8] = b"ProcessDList\0";
    pub const PROCESS_RDP_LIST: &[u8] = b"ProcessRDPList\0";
    pub const SHOW_CFB: &[u8] = b"ShowCFB\0";
    pub const UPDATE_SCREEN: &[u8] = b"UpdateScreen\0";
    pub const VI_STATUS_CHANGED: &[u8] = b"ViStatusChanged\0";
    pub const VI_WIDTH_CHANGED: &[u8] = b"ViWidthChanged\0";

    pub const CONTROLLER_COMMAND: &[u8] = b"ControllerCommand\0";
    pub const GET_KEYS: &[u8] = b"GetKeys\0";
    pub const INITIATE_CONTROLLERS: &[u8] = b"InitiateControllers\0";
    pub const READ_CONTROLLER: &[u8] = b"ReadController\0";
    pub const WM_KEY_DOWN: &[u8] = b"WM_KeyDown\0";
    pub const WM_KEY_UP: &[u8] = b"WM_KeyUp\0";
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{align_of, offset_of, size_of};

    const PTR: usize = size_of::<usize>();

    #[test]
    fn plugin_info_layout_is_fixed() {
        assert_eq!(size_of::<PLUGIN_INFO>(), 112);
        assert_eq!(offset_of!(PLUGIN_INFO, Type), 2);
        assert_eq!(offset_of!(PLUGIN_INFO, Name), 4);
        assert_eq!(offset_of!(PLUGIN_INFO, NormalMemory), 104);
        assert_eq!(offset_of!(PLUGIN_INFO, MemorySwapped), 108);
    }

    #[test]
    fn audio_info_layout_matches_header_order() {
        // Two handles, the int flag padded to pointer alignment, then 4
        // memory pointers, 7 register pointers and the callback.
        assert_eq!(offset_of!(AUDIO_INFO, MemoryBswaped), 2 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, HEADER), 3 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, RDRAM), 4 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, IMEM), 6 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, MI_INTR_REG), 7 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, AI_BITRATE_REG), 13 * PTR);
        assert_eq!(offset_of!(AUDIO_INFO, CheckInterrupts), 14 * PTR);
        assert_eq!(size_of::<AUDIO_INFO>(), 15 * PTR);
    }

    #[test]
    fn gfx_info_layout_matches_header_order() {
        assert_eq!(offset_of!(GFX_INFO, MemoryBswaped), 2 * PTR);
        assert_eq!(offset_of!(GFX_INFO, HEADER), 3 * PTR);
        assert_eq!(offset_of!(GFX_INFO, MI_INTR_REG), 7 * PTR);
        assert_eq!(offset_of!(GFX_INFO, DPC_START_REG), 8 * PTR);
        assert_eq!(offset_of!(GFX_INFO, DPC_TMEM_REG), 15 * PTR);
        assert_eq!(offset_of!(GFX_INFO, VI_STATUS_REG), 16 * PTR);
        assert_eq!(offset_of!(GFX_INFO, VI_Y_SCALE_REG), 29 * PTR);
        assert_eq!(offset_of!(GFX_INFO, CheckInterrupts), 30 * PTR);
        assert_eq!(size_of::<GFX_INFO>(), 31 * PTR);
    }

    #[test]
    fn control_info_layout_matches_header_order() {
        assert_eq!(size_of::<CONTROL>(), 12);
        assert_eq!(offset_of!(CONTROL_INFO, MemoryBswaped), 2 * PTR);
        assert_eq!(offset_of!(CONTROL_INFO, HEADER), 3 * PTR);
        assert_eq!(offset_of!(CONTROL_INFO, Controls), 4 * PTR);
        assert_eq!(size_of::<CONTROL_INFO>(), 5 * PTR);
    }

    #[test]
    fn buttons_union_is_one_word() {
        assert_eq!(size_of::<BUTTONS>(), 4);
        assert_eq!(align_of::<BUTTONS>(), 4);
    }

    #[test]
    fn misspelled_transfer_pak_keeps_its_value() {
        assert_eq!(PLUGIN_TANSFER_PAK, 4);
        assert_eq!(PLUGIN_TRANSFER_PAK, PLUGIN_TANSFER_PAK);
    }

    #[test]
    fn symbol_names_are_nul_terminated() {
        for name in [
            symbols::GET_DLL_INFO,
            symbols::INITIATE_AUDIO,
            symbols::INITIATE_GFX,
            symbols::INITIATE_CONTROLLERS,
            symbols::WM_KEY_UP,
        ] {
            assert_eq!(name.last(), Some(&0));
            assert_eq!(name.iter().filter(|&&b| b == 0).count(), 1);
        }
    }
}
