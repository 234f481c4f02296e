use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use rcp_plugin_sys as sys;
use thiserror::Error;

use crate::byte_order::MemoryOrder;

/// RDRAM size exposed to plugins (4 MiB base + 4 MiB expansion).
pub const RDRAM_SIZE: usize = 0x80_0000;
/// SP data memory.
pub const DMEM_SIZE: usize = 0x1000;
/// SP instruction memory.
pub const IMEM_SIZE: usize = 0x1000;
/// Cartridge header bytes mirrored for plugins.
pub const ROM_HEADER_SIZE: usize = sys::ROM_HEADER_SIZE;

/// Contiguous host-owned memory regions shared with a plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    Rdram,
    Dmem,
    Imem,
    RomHeader,
}

impl MemoryRegion {
    pub const ALL: [Self; 4] = [Self::Rdram, Self::Dmem, Self::Imem, Self::RomHeader];

    pub const fn size(self) -> usize {
        match self {
            Self::Rdram => RDRAM_SIZE,
            Self::Dmem => DMEM_SIZE,
            Self::Imem => IMEM_SIZE,
            Self::RomHeader => ROM_HEADER_SIZE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Rdram => "RDRAM",
            Self::Dmem => "DMEM",
            Self::Imem => "IMEM",
            Self::RomHeader => "HEADER",
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("{len} bytes at {addr:#x} do not fit in {region}")]
    OutOfRange {
        region: MemoryRegion,
        addr: usize,
        len: usize,
    },
}

/// Zero-initialized bytes at a stable address, writable through shared
/// references and through the raw base pointer handed to a plugin.
struct SharedRegion {
    cells: Box<[Cell<u8>]>,
}

impl SharedRegion {
    fn zeroed(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| Cell::new(0)).collect(),
        }
    }

    fn base_ptr(&self) -> *mut u8 {
        // `Cell<u8>` is `repr(transparent)` over `UnsafeCell<u8>`, so writes
        // through this pointer are permitted.
        self.cells.as_ptr() as *mut u8
    }
}

/// Host side of the Memory Window Descriptor.
///
/// Owns every region of one session. The single `order` field is the only
/// byte-order flag, so all regions agree by construction.
pub struct MemoryWindow {
    order: MemoryOrder,
    rdram: SharedRegion,
    dmem: SharedRegion,
    imem: SharedRegion,
    header: SharedRegion,
}

impl fmt::Debug for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryWindow")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl MemoryWindow {
    pub fn new(order: MemoryOrder) -> Self {
        Self {
            order,
            rdram: SharedRegion::zeroed(RDRAM_SIZE),
            dmem: SharedRegion::zeroed(DMEM_SIZE),
            imem: SharedRegion::zeroed(IMEM_SIZE),
            header: SharedRegion::zeroed(ROM_HEADER_SIZE),
        }
    }

    #[inline]
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    fn shared(&self, region: MemoryRegion) -> &SharedRegion {
        match region {
            MemoryRegion::Rdram => &self.rdram,
            MemoryRegion::Dmem => &self.dmem,
            MemoryRegion::Imem => &self.imem,
            MemoryRegion::RomHeader => &self.header,
        }
    }

    /// Host view of a region's raw storage.
    pub fn region(&self, region: MemoryRegion) -> &[Cell<u8>] {
        &self.shared(region).cells
    }

    /// Base pointer placed into info records.
    pub fn base_ptr(&self, region: MemoryRegion) -> *mut u8 {
        self.shared(region).base_ptr()
    }

    pub fn read_u8(&self, region: MemoryRegion, addr: usize) -> Option<u8> {
        self.order.read_u8(self.region(region), addr)
    }

    pub fn read_u16(&self, region: MemoryRegion, addr: usize) -> Option<u16> {
        self.order.read_u16(self.region(region), addr)
    }

    pub fn read_u32(&self, region: MemoryRegion, addr: usize) -> Option<u32> {
        self.order.read_u32(self.region(region), addr)
    }

    pub fn write_u8(&self, region: MemoryRegion, addr: usize, value: u8) -> bool {
        self.order.write_u8(self.region(region), addr, value)
    }

    pub fn write_u16(&self, region: MemoryRegion, addr: usize, value: u16) -> bool {
        self.order.write_u16(self.region(region), addr, value)
    }

    pub fn write_u32(&self, region: MemoryRegion, addr: usize, value: u32) -> bool {
        self.order.write_u32(self.region(region), addr, value)
    }

    /// Copies target-order bytes into a region.
    pub fn write_bytes(
        &self,
        region: MemoryRegion,
        addr: usize,
        bytes: &[u8],
    ) -> Result<(), MemoryError> {
        if self.order.write_bytes(self.region(region), addr, bytes) {
            Ok(())
        } else {
            Err(MemoryError::OutOfRange {
                region,
                addr,
                len: bytes.len(),
            })
        }
    }

    /// Mirrors the first bytes of a big-endian (`.z64`) ROM image into the
    /// header window.
    pub fn load_rom_header(&self, rom: &[u8]) -> Result<(), MemoryError> {
        let len = rom.len().min(ROM_HEADER_SIZE);
        self.region(MemoryRegion::RomHeader)
            .iter()
            .for_each(|cell| cell.set(0));
        self.write_bytes(MemoryRegion::RomHeader, 0, &rom[..len])
    }
}

/// Plugin side of one region, valid for the borrow `'s` of a session call.
#[derive(Clone, Copy)]
pub struct RegionView<'s> {
    base: NonNull<Cell<u8>>,
    len: usize,
    order: MemoryOrder,
    _session: PhantomData<&'s [Cell<u8>]>,
}

impl fmt::Debug for RegionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionView")
            .field("len", &self.len)
            .field("order", &self.order)
            .finish()
    }
}

impl<'s> RegionView<'s> {
    /// Wraps a pointer received in an info record.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    /// `ptr` must point to `len` bytes of host memory that stay valid, and are
    /// only accessed through `Cell`-like shared access, for `'s`.
    pub unsafe fn from_raw(ptr: *mut u8, len: usize, order: MemoryOrder) -> Option<Self> {
        let base = NonNull::new(ptr.cast::<Cell<u8>>())?;
        Some(Self {
            base,
            len,
            order,
            _session: PhantomData,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// Raw storage, in host representation.
    pub fn cells(&self) -> &'s [Cell<u8>] {
        // Safety: upheld by the contract of `from_raw`.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }

    pub fn read_u8(&self, addr: usize) -> Option<u8> {
        self.order.read_u8(self.cells(), addr)
    }

    pub fn read_u16(&self, addr: usize) -> Option<u16> {
        self.order.read_u16(self.cells(), addr)
    }

    pub fn read_u32(&self, addr: usize) -> Option<u32> {
        self.order.read_u32(self.cells(), addr)
    }

    pub fn write_u8(&self, addr: usize, value: u8) -> bool {
        self.order.write_u8(self.cells(), addr, value)
    }

    pub fn write_u16(&self, addr: usize, value: u16) -> bool {
        self.order.write_u16(self.cells(), addr, value)
    }

    pub fn write_u32(&self, addr: usize, value: u32) -> bool {
        self.order.write_u32(self.cells(), addr, value)
    }

    pub fn read_bytes(&self, addr: usize, out: &mut [u8]) -> bool {
        self.order.read_bytes(self.cells(), addr, out)
    }

    pub fn write_bytes(&self, addr: usize, bytes: &[u8]) -> bool {
        self.order.write_bytes(self.cells(), addr, bytes)
    }
}
