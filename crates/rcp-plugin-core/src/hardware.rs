use std::os::raw::c_int;

use rcp_plugin_sys as sys;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// TV system the emulated console runs on.
///
/// Passed to `AiDacrateChanged` so the audio plugin can derive the output
/// frequency from `AI_DACRATE_REG`.
pub enum SystemType {
    #[default]
    Ntsc,
    Pal,
    Mpal,
}

impl SystemType {
    #[inline]
    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            sys::SYSTEM_NTSC => Some(Self::Ntsc),
            sys::SYSTEM_PAL => Some(Self::Pal),
            sys::SYSTEM_MPAL => Some(Self::Mpal),
            _ => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        match self {
            Self::Ntsc => sys::SYSTEM_NTSC,
            Self::Pal => sys::SYSTEM_PAL,
            Self::Mpal => sys::SYSTEM_MPAL,
        }
    }

    #[inline]
    /// Video DAC clock in Hz.
    pub const fn vi_clock_hz(self) -> u32 {
        match self {
            Self::Ntsc => 48_681_812,
            Self::Pal => 49_656_530,
            Self::Mpal => 48_628_316,
        }
    }

    /// Output sample rate selected by a `AI_DACRATE_REG` value.
    pub const fn dac_frequency(self, dacrate: u32) -> u32 {
        self.vi_clock_hz() / (dacrate + 1)
    }
}
