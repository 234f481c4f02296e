use std::cell::Cell;
use std::os::raw::c_int;

/// Representation of emulated memory shared through a session.
///
/// One value is chosen when the session is created and applies to every
/// region (RDRAM, DMEM, IMEM, ROM header) for the whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemoryOrder {
    /// Plain byte array in the target's (big-endian) byte sequence.
    Normal,
    /// Each aligned 32-bit word is stored in the host's native order.
    #[default]
    Swapped,
}

impl MemoryOrder {
    /// Decodes the `MemoryBswaped` flag of an info record.
    #[inline]
    pub const fn from_flag(flag: c_int) -> Self {
        if flag != 0 { Self::Swapped } else { Self::Normal }
    }

    #[inline]
    pub const fn flag(self) -> c_int {
        match self {
            Self::Normal => 0,
            Self::Swapped => 1,
        }
    }

    /// Whether byte/halfword addresses need rewriting within a word.
    #[inline]
    pub const fn reorders_bytes(self) -> bool {
        matches!(self, Self::Swapped) && cfg!(target_endian = "little")
    }

    /// Host offset of the target byte at `addr`.
    #[inline]
    pub const fn byte_index(self, addr: usize) -> usize {
        if self.reorders_bytes() { addr ^ 3 } else { addr }
    }

    /// Host offset of the target halfword at `addr` (2-byte aligned).
    #[inline]
    pub const fn half_index(self, addr: usize) -> usize {
        if self.reorders_bytes() { addr ^ 2 } else { addr }
    }

    #[inline]
    fn decode_half(self, raw: [u8; 2]) -> u16 {
        match self {
            Self::Normal => u16::from_be_bytes(raw),
            Self::Swapped => u16::from_ne_bytes(raw),
        }
    }

    #[inline]
    fn encode_half(self, value: u16) -> [u8; 2] {
        match self {
            Self::Normal => value.to_be_bytes(),
            Self::Swapped => value.to_ne_bytes(),
        }
    }

    #[inline]
    fn decode_word(self, raw: [u8; 4]) -> u32 {
        match self {
            Self::Normal => u32::from_be_bytes(raw),
            Self::Swapped => u32::from_ne_bytes(raw),
        }
    }

    #[inline]
    fn encode_word(self, value: u32) -> [u8; 4] {
        match self {
            Self::Normal => value.to_be_bytes(),
            Self::Swapped => value.to_ne_bytes(),
        }
    }

    pub fn read_u8(self, mem: &[Cell<u8>], addr: usize) -> Option<u8> {
        mem.get(self.byte_index(addr)).map(Cell::get)
    }

    pub fn write_u8(self, mem: &[Cell<u8>], addr: usize, value: u8) -> bool {
        let Some(cell) = mem.get(self.byte_index(addr)) else {
            return false;
        };
        cell.set(value);
        true
    }

    pub fn read_u16(self, mem: &[Cell<u8>], addr: usize) -> Option<u16> {
        if addr % 2 != 0 {
            return None;
        }
        let at = self.half_index(addr);
        let cells = span(mem, at, 2)?;
        Some(self.decode_half([cells[0].get(), cells[1].get()]))
    }

    pub fn write_u16(self, mem: &[Cell<u8>], addr: usize, value: u16) -> bool {
        if addr % 2 != 0 {
            return false;
        }
        let at = self.half_index(addr);
        let Some(cells) = span(mem, at, 2) else {
            return false;
        };
        for (cell, byte) in cells.iter().zip(self.encode_half(value)) {
            cell.set(byte);
        }
        true
    }

    pub fn read_u32(self, mem: &[Cell<u8>], addr: usize) -> Option<u32> {
        if addr % 4 != 0 {
            return None;
        }
        let cells = span(mem, addr, 4)?;
        Some(self.decode_word([
            cells[0].get(),
            cells[1].get(),
            cells[2].get(),
            cells[3].get(),
        ]))
    }

    pub fn write_u32(self, mem: &[Cell<u8>], addr: usize, value: u32) -> bool {
        if addr % 4 != 0 {
            return false;
        }
        let Some(cells) = span(mem, addr, 4) else {
            return false;
        };
        for (cell, byte) in cells.iter().zip(self.encode_word(value)) {
            cell.set(byte);
        }
        true
    }

    /// Stores a target-order byte image (e.g. a ROM header) at `addr`.
    pub fn write_bytes(self, mem: &[Cell<u8>], addr: usize, bytes: &[u8]) -> bool {
        let Some(end) = addr.checked_add(bytes.len()) else {
            return false;
        };
        // Byte reordering stays inside the enclosing word, so whole-word
        // bounds are what matters.
        if end.checked_next_multiple_of(4).is_none_or(|end| end > mem.len()) {
            return false;
        }
        for (i, &byte) in bytes.iter().enumerate() {
            mem[self.byte_index(addr + i)].set(byte);
        }
        true
    }

    /// Reads `out.len()` target-order bytes starting at `addr`.
    pub fn read_bytes(self, mem: &[Cell<u8>], addr: usize, out: &mut [u8]) -> bool {
        let Some(end) = addr.checked_add(out.len()) else {
            return false;
        };
        if end.checked_next_multiple_of(4).is_none_or(|end| end > mem.len()) {
            return false;
        }
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = mem[self.byte_index(addr + i)].get();
        }
        true
    }
}

fn span(mem: &[Cell<u8>], at: usize, len: usize) -> Option<&[Cell<u8>]> {
    mem.get(at..at.checked_add(len)?)
}
