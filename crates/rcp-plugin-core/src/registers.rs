use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A fixed-order set of memory-mapped registers.
///
/// The order of [`RegisterSet::ALL`] is the order the pointers appear in the
/// info records.
pub trait RegisterSet: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn index(self) -> usize;
    fn name(self) -> &'static str;
}

macro_rules! register_set {
    ($(#[$meta:meta])* $ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant),+
        }

        impl RegisterSet for $ty {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[inline]
            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

register_set!(
    /// MIPS interface registers shared with every RCP plugin.
    MiReg {
        Intr => "MI_INTR_REG",
    }
);

register_set!(
    /// Audio interface registers.
    AiReg {
        DramAddr => "AI_DRAM_ADDR_REG",
        Len => "AI_LEN_REG",
        Control => "AI_CONTROL_REG",
        Status => "AI_STATUS_REG",
        Dacrate => "AI_DACRATE_REG",
        Bitrate => "AI_BITRATE_REG",
    }
);

register_set!(
    /// RDP command registers.
    DpcReg {
        Start => "DPC_START_REG",
        End => "DPC_END_REG",
        Current => "DPC_CURRENT_REG",
        Status => "DPC_STATUS_REG",
        Clock => "DPC_CLOCK_REG",
        BufBusy => "DPC_BUFBUSY_REG",
        PipeBusy => "DPC_PIPEBUSY_REG",
        Tmem => "DPC_TMEM_REG",
    }
);

register_set!(
    /// Video interface registers.
    ViReg {
        Status => "VI_STATUS_REG",
        Origin => "VI_ORIGIN_REG",
        Width => "VI_WIDTH_REG",
        Intr => "VI_INTR_REG",
        VCurrentLine => "VI_V_CURRENT_LINE_REG",
        Timing => "VI_TIMING_REG",
        VSync => "VI_V_SYNC_REG",
        HSync => "VI_H_SYNC_REG",
        Leap => "VI_LEAP_REG",
        HStart => "VI_H_START_REG",
        VStart => "VI_V_START_REG",
        VBurst => "VI_V_BURST_REG",
        XScale => "VI_X_SCALE_REG",
        YScale => "VI_Y_SCALE_REG",
    }
);

/// Host-owned storage for one register set.
///
/// Values live at stable addresses for the lifetime of the bank; the
/// pointers from [`RegisterBank::ptr`] are what plugins write through.
pub struct RegisterBank<R: RegisterSet> {
    cells: Box<[Cell<u32>]>,
    _set: PhantomData<R>,
}

impl<R: RegisterSet> fmt::Debug for RegisterBank<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for &reg in R::ALL {
            map.entry(&reg.name(), &format_args!("{:#010x}", self.read(reg)));
        }
        map.finish()
    }
}

impl<R: RegisterSet> Default for RegisterBank<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RegisterSet> RegisterBank<R> {
    pub fn new() -> Self {
        Self {
            cells: R::ALL.iter().map(|_| Cell::new(0)).collect(),
            _set: PhantomData,
        }
    }

    #[inline]
    pub fn read(&self, reg: R) -> u32 {
        self.cells[reg.index()].get()
    }

    #[inline]
    pub fn write(&self, reg: R, value: u32) {
        self.cells[reg.index()].set(value);
    }

    #[inline]
    pub fn set_bits(&self, reg: R, bits: u32) {
        let cell = &self.cells[reg.index()];
        cell.set(cell.get() | bits);
    }

    #[inline]
    pub fn clear_bits(&self, reg: R, bits: u32) {
        let cell = &self.cells[reg.index()];
        cell.set(cell.get() & !bits);
    }

    /// Pointer placed into info records for `reg`.
    #[inline]
    pub fn ptr(&self, reg: R) -> *mut u32 {
        self.cells[reg.index()].as_ptr()
    }
}

/// Plugin side of one register pointer, valid for the borrow `'s`.
#[derive(Clone, Copy)]
pub struct RegisterRef<'s> {
    ptr: NonNull<u32>,
    _session: PhantomData<&'s Cell<u32>>,
}

impl fmt::Debug for RegisterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterRef({:#010x})", self.get())
    }
}

impl RegisterRef<'_> {
    /// # Safety
    /// `ptr` must be null or point to a `u32` that stays valid for `'s` and is
    /// not accessed concurrently.
    pub unsafe fn from_raw(ptr: *mut u32) -> Option<Self> {
        Some(Self {
            ptr: NonNull::new(ptr)?,
            _session: PhantomData,
        })
    }

    #[inline]
    pub fn get(&self) -> u32 {
        unsafe { self.ptr.as_ptr().read_volatile() }
    }

    #[inline]
    pub fn set(&self, value: u32) {
        unsafe { self.ptr.as_ptr().write_volatile(value) }
    }

    #[inline]
    pub fn set_bits(&self, bits: u32) {
        self.set(self.get() | bits);
    }

    #[inline]
    pub fn clear_bits(&self, bits: u32) {
        self.set(self.get() & !bits);
    }
}

/// Register Map Descriptor as seen by a plugin: one pointer per register in
/// fixed order.
#[derive(Clone, Copy)]
pub struct RegisterMap<'s, R: RegisterSet, const N: usize> {
    regs: [RegisterRef<'s>; N],
    _set: PhantomData<R>,
}

impl<R: RegisterSet, const N: usize> fmt::Debug for RegisterMap<'_, R, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for &reg in R::ALL {
            map.entry(&reg.name(), &format_args!("{:#010x}", self.get(reg)));
        }
        map.finish()
    }
}

impl<'s, R: RegisterSet, const N: usize> RegisterMap<'s, R, N> {
    /// Builds the map from pointers listed in `R::ALL` order.
    ///
    /// Returns `None` if any pointer is null or the count does not match.
    ///
    /// # Safety
    /// Same contract as [`RegisterRef::from_raw`] for every pointer.
    pub unsafe fn from_raw(ptrs: [*mut u32; N]) -> Option<Self> {
        if R::ALL.len() != N || ptrs.iter().any(|ptr| ptr.is_null()) {
            return None;
        }
        let regs = ptrs.map(|ptr| RegisterRef {
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            _session: PhantomData,
        });
        Some(Self {
            regs,
            _set: PhantomData,
        })
    }

    #[inline]
    pub fn reg(&self, reg: R) -> RegisterRef<'s> {
        self.regs[reg.index()]
    }

    #[inline]
    pub fn get(&self, reg: R) -> u32 {
        self.regs[reg.index()].get()
    }

    #[inline]
    pub fn set(&self, reg: R, value: u32) {
        self.regs[reg.index()].set(value);
    }
}

pub type AiRegisters<'s> = RegisterMap<'s, AiReg, 6>;
pub type DpcRegisters<'s> = RegisterMap<'s, DpcReg, 8>;
pub type ViRegisters<'s> = RegisterMap<'s, ViReg, 14>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_sets_have_header_counts_and_names() {
        assert_eq!(MiReg::ALL.len(), 1);
        assert_eq!(AiReg::ALL.len(), 6);
        assert_eq!(DpcReg::ALL.len(), 8);
        assert_eq!(ViReg::ALL.len(), 14);

        assert_eq!(AiReg::Dacrate.name(), "AI_DACRATE_REG");
        assert_eq!(ViReg::VCurrentLine.name(), "VI_V_CURRENT_LINE_REG");
        for (i, reg) in ViReg::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn bank_pointers_are_distinct_and_stable() {
        let bank = RegisterBank::<AiReg>::new();
        let before: Vec<_> = AiReg::ALL.iter().map(|&r| bank.ptr(r)).collect();
        let moved = bank;
        let after: Vec<_> = AiReg::ALL.iter().map(|&r| moved.ptr(r)).collect();
        assert_eq!(before, after);

        let mut sorted = after.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), AiReg::ALL.len());
    }

    #[test]
    fn plugin_writes_are_visible_to_host() {
        let bank = RegisterBank::<AiReg>::new();
        let ptrs: [*mut u32; 6] = std::array::from_fn(|i| bank.ptr(AiReg::ALL[i]));
        let map = unsafe { AiRegisters::from_raw(ptrs) }.unwrap();

        bank.write(AiReg::Len, 0x2000);
        assert_eq!(map.get(AiReg::Len), 0x2000);

        map.reg(AiReg::Status).set_bits(0x4000_0000);
        assert_eq!(bank.read(AiReg::Status), 0x4000_0000);
    }

    #[test]
    fn map_rejects_null_pointer() {
        let bank = RegisterBank::<AiReg>::new();
        let mut ptrs: [*mut u32; 6] = std::array::from_fn(|i| bank.ptr(AiReg::ALL[i]));
        ptrs[3] = std::ptr::null_mut();
        assert!(unsafe { AiRegisters::from_raw(ptrs) }.is_none());
    }

    #[test]
    fn bank_bit_helpers() {
        let bank = RegisterBank::<MiReg>::new();
        bank.set_bits(MiReg::Intr, 0x05);
        bank.clear_bits(MiReg::Intr, 0x01);
        assert_eq!(bank.read(MiReg::Intr), 0x04);
    }
}
