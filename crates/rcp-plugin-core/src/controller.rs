use std::fmt;
use std::os::raw::c_int;

use rcp_plugin_sys as sys;
use thiserror::Error;

use crate::version::InfoShape;

/// Number of controller ports.
pub const MAX_CONTROLLERS: usize = sys::MAX_CONTROLLERS;
/// Channel value that terminates a raw command stream.
pub const END_OF_STREAM: c_int = -1;

/// Largest `tx`/`rx` length a frame header can carry.
pub const MAX_FRAME_PAYLOAD: usize = 0x3F;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("controller slot {0} is outside 0..=3")]
    InvalidSlot(c_int),

    #[error("raw channel {0} is neither a slot nor the end-of-stream marker")]
    InvalidChannel(c_int),

    #[error("unknown accessory value {0}")]
    UnknownAccessory(c_int),

    #[error("{0} does not allow raw data")]
    RawDataUnsupported(InfoShape),

    #[error("raw frame needs {needed} bytes but only {available} are available")]
    FrameTruncated { needed: usize, available: usize },

    #[error("raw frame payload of {0} bytes exceeds 63")]
    FrameTooLong(usize),
}

/// A controller port, 0 through 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerSlot(u8);

impl ControllerSlot {
    pub const ALL: [Self; MAX_CONTROLLERS] = [Self(0), Self(1), Self(2), Self(3)];

    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < MAX_CONTROLLERS {
            Some(Self(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0 as c_int
    }
}

impl TryFrom<c_int> for ControllerSlot {
    type Error = ControllerError;

    fn try_from(raw: c_int) -> Result<Self, Self::Error> {
        u8::try_from(raw)
            .ok()
            .and_then(Self::new)
            .ok_or(ControllerError::InvalidSlot(raw))
    }
}

impl fmt::Display for ControllerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller {}", self.0 + 1)
    }
}

/// Channel argument of `ControllerCommand`/`ReadController`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawChannel {
    Slot(ControllerSlot),
    /// `-1`: the host reached the end of PIF RAM.
    EndOfStream,
}

impl RawChannel {
    pub fn from_raw(raw: c_int) -> Result<Self, ControllerError> {
        if raw == END_OF_STREAM {
            return Ok(Self::EndOfStream);
        }
        ControllerSlot::try_from(raw)
            .map(Self::Slot)
            .map_err(|_| ControllerError::InvalidChannel(raw))
    }

    pub const fn raw(self) -> c_int {
        match self {
            Self::Slot(slot) => slot.raw(),
            Self::EndOfStream => END_OF_STREAM,
        }
    }

    pub const fn slot(self) -> Option<ControllerSlot> {
        match self {
            Self::Slot(slot) => Some(slot),
            Self::EndOfStream => None,
        }
    }
}

impl From<ControllerSlot> for RawChannel {
    fn from(slot: ControllerSlot) -> Self {
        Self::Slot(slot)
    }
}

/// Accessory plugged into a controller (`CONTROL::Plugin`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Accessory {
    #[default]
    None,
    MemPak,
    RumblePak,
    TransferPak,
    /// Raw data passthrough, controller 1.1 and later.
    Raw,
}

impl Accessory {
    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            sys::PLUGIN_NONE => Some(Self::None),
            sys::PLUGIN_MEMPAK => Some(Self::MemPak),
            sys::PLUGIN_RUMBLE_PAK => Some(Self::RumblePak),
            sys::PLUGIN_TANSFER_PAK => Some(Self::TransferPak),
            sys::PLUGIN_RAW => Some(Self::Raw),
            _ => None,
        }
    }

    pub const fn raw(self) -> c_int {
        match self {
            Self::None => sys::PLUGIN_NONE,
            Self::MemPak => sys::PLUGIN_MEMPAK,
            Self::RumblePak => sys::PLUGIN_RUMBLE_PAK,
            Self::TransferPak => sys::PLUGIN_TANSFER_PAK,
            Self::Raw => sys::PLUGIN_RAW,
        }
    }
}

/// Decoded `CONTROL` record for one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerConfig {
    pub present: bool,
    /// The plugin processes PIF commands itself for this slot.
    pub raw_data: bool,
    pub accessory: Accessory,
}

impl ControllerConfig {
    pub fn from_raw(raw: &sys::CONTROL) -> Result<Self, ControllerError> {
        Ok(Self {
            present: raw.Present != 0,
            raw_data: raw.RawData != 0,
            accessory: Accessory::from_raw(raw.Plugin)
                .ok_or(ControllerError::UnknownAccessory(raw.Plugin))?,
        })
    }

    pub fn to_raw(&self) -> sys::CONTROL {
        sys::CONTROL {
            Present: c_int::from(self.present),
            RawData: c_int::from(self.raw_data),
            Plugin: self.accessory.raw(),
        }
    }

    /// Rejects raw-data settings that the negotiated shape does not know.
    pub fn check(&self, shape: InfoShape) -> Result<(), ControllerError> {
        if (self.raw_data || self.accessory == Accessory::Raw) && !shape.allows_raw_data() {
            return Err(ControllerError::RawDataUnsupported(shape));
        }
        Ok(())
    }

    pub fn wants_raw(&self) -> bool {
        self.present && (self.raw_data || self.accessory == Accessory::Raw)
    }
}

/// One framed PIF command: `[tx_len, rx_len, tx.., rx..]`.
///
/// Only the framing is interpreted; the payload belongs to whatever
/// emulates the accessory.
pub struct RawCommand<'a> {
    frame: &'a mut [u8],
}

impl fmt::Debug for RawCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCommand")
            .field("tx", &self.tx())
            .field("rx", &self.rx())
            .finish()
    }
}

impl<'a> RawCommand<'a> {
    /// Frames the start of `buf`.
    pub fn parse(buf: &'a mut [u8]) -> Result<Self, ControllerError> {
        if buf.len() < 2 {
            return Err(ControllerError::FrameTruncated {
                needed: 2,
                available: buf.len(),
            });
        }
        let needed = frame_len(buf[0], buf[1]);
        if buf.len() < needed {
            return Err(ControllerError::FrameTruncated {
                needed,
                available: buf.len(),
            });
        }
        Ok(Self {
            frame: &mut buf[..needed],
        })
    }

    /// Frames a command received through an entry point.
    ///
    /// # Safety
    /// `ptr` must be null or point to a complete frame that stays valid and
    /// unaliased for `'a`.
    pub unsafe fn from_ptr(ptr: *mut u8) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        let (tx, rx) = unsafe { (*ptr, *ptr.add(1)) };
        let len = frame_len(tx, rx);
        let frame = unsafe { std::slice::from_raw_parts_mut(ptr, len) };
        Some(Self { frame })
    }

    #[inline]
    pub fn tx_len(&self) -> usize {
        usize::from(self.frame[0]) & MAX_FRAME_PAYLOAD
    }

    #[inline]
    pub fn rx_len(&self) -> usize {
        usize::from(self.frame[1]) & MAX_FRAME_PAYLOAD
    }

    /// Status bits the responder may set above the 6-bit rx length.
    #[inline]
    pub fn rx_flags(&self) -> u8 {
        self.frame[1] & !(MAX_FRAME_PAYLOAD as u8)
    }

    pub fn set_rx_flags(&mut self, flags: u8) {
        self.frame[1] = (self.frame[1] & MAX_FRAME_PAYLOAD as u8) | (flags & 0xC0);
    }

    pub fn tx(&self) -> &[u8] {
        &self.frame[2..2 + self.tx_len()]
    }

    pub fn rx(&self) -> &[u8] {
        &self.frame[2 + self.tx_len()..]
    }

    pub fn rx_mut(&mut self) -> &mut [u8] {
        let start = 2 + self.tx_len();
        &mut self.frame[start..]
    }

    /// Total frame size including the two header bytes.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx_len() == 0 && self.rx_len() == 0
    }
}

#[inline]
fn frame_len(tx: u8, rx: u8) -> usize {
    2 + (usize::from(tx) & MAX_FRAME_PAYLOAD) + (usize::from(rx) & MAX_FRAME_PAYLOAD)
}

/// Host-owned storage for one raw command frame.
#[derive(Clone, PartialEq, Eq)]
pub struct RawCommandBuf {
    bytes: Vec<u8>,
}

impl fmt::Debug for RawCommandBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawCommandBuf").field(&self.bytes).finish()
    }
}

impl RawCommandBuf {
    /// Builds a frame with `rx_len` response bytes preset to `0xFF`.
    pub fn new(tx: &[u8], rx_len: usize) -> Result<Self, ControllerError> {
        if tx.len() > MAX_FRAME_PAYLOAD {
            return Err(ControllerError::FrameTooLong(tx.len()));
        }
        if rx_len > MAX_FRAME_PAYLOAD {
            return Err(ControllerError::FrameTooLong(rx_len));
        }
        let mut bytes = Vec::with_capacity(2 + tx.len() + rx_len);
        bytes.push(tx.len() as u8);
        bytes.push(rx_len as u8);
        bytes.extend_from_slice(tx);
        bytes.resize(2 + tx.len() + rx_len, 0xFF);
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }

    pub fn command(&mut self) -> RawCommand<'_> {
        // The header was written by `new`, so the frame always fits.
        RawCommand {
            frame: &mut self.bytes,
        }
    }

    pub fn rx(&self) -> &[u8] {
        let tx_len = usize::from(self.bytes[0]) & MAX_FRAME_PAYLOAD;
        &self.bytes[2 + tx_len..]
    }
}

/// Keyboard event forwarded to `WM_KeyDown`/`WM_KeyUp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Virtual key code (`wParam`).
    pub code: u32,
    /// Repeat count, scan code and flags (`lParam`).
    pub param: i32,
}

impl KeyEvent {
    pub const fn new(code: u32, param: i32) -> Self {
        Self { code, param }
    }
}
