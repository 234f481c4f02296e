use std::fmt;
use std::os::raw::{c_char, c_int};

use log::debug;
use rcp_plugin_sys as sys;
use thiserror::Error;

use crate::byte_order::MemoryOrder;
use crate::version::{ApiVersion, InfoShape, PluginCategory, VersionError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("unknown plugin type {0}")]
    UnknownCategory(u16),

    #[error("plugin name is not NUL-terminated within {} bytes", sys::PLUGIN_NAME_LEN)]
    UnterminatedName,

    #[error("{0} plugin supports neither memory order")]
    NoMemoryMode(PluginCategory),

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Memory representations a module accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemorySupport {
    pub normal: bool,
    pub swapped: bool,
}

impl Default for MemorySupport {
    fn default() -> Self {
        Self::BOTH
    }
}

impl MemorySupport {
    pub const BOTH: Self = Self {
        normal: true,
        swapped: true,
    };
    pub const NORMAL_ONLY: Self = Self {
        normal: true,
        swapped: false,
    };
    pub const SWAPPED_ONLY: Self = Self {
        normal: false,
        swapped: true,
    };

    pub const fn supports(self, order: MemoryOrder) -> bool {
        match order {
            MemoryOrder::Normal => self.normal,
            MemoryOrder::Swapped => self.swapped,
        }
    }

    /// `Swapped` when available, since it needs no per-word conversion.
    pub const fn preferred(self) -> Option<MemoryOrder> {
        if self.swapped {
            Some(MemoryOrder::Swapped)
        } else if self.normal {
            Some(MemoryOrder::Normal)
        } else {
            None
        }
    }

    pub const fn is_empty(self) -> bool {
        !self.normal && !self.swapped
    }
}

/// Decoded `PLUGIN_INFO`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub version: ApiVersion,
    pub category: PluginCategory,
    /// Display name. Not unique across modules.
    pub name: String,
    pub memory: MemorySupport,
}

impl CapabilityDescriptor {
    pub fn new(category: PluginCategory, version: ApiVersion, name: impl Into<String>) -> Self {
        Self {
            version,
            category,
            name: name.into(),
            memory: MemorySupport::BOTH,
        }
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemorySupport) -> Self {
        self.memory = memory;
        self
    }

    /// Decodes and validates a record filled in by `GetDllInfo`.
    ///
    /// Controller records carry reserved words where audio and graphics
    /// advertise memory orders; those are ignored and both orders are
    /// assumed.
    pub fn from_raw(raw: &sys::PLUGIN_INFO) -> Result<Self, CapabilityError> {
        let category =
            PluginCategory::from_raw(raw.Type).ok_or(CapabilityError::UnknownCategory(raw.Type))?;
        let version = ApiVersion::from_raw(raw.Version);
        InfoShape::negotiate(category, version)?;

        let name = decode_name(&raw.Name).ok_or(CapabilityError::UnterminatedName)?;

        let memory = if category.advertises_memory_modes() {
            let memory = MemorySupport {
                normal: raw.NormalMemory != 0,
                swapped: raw.MemorySwapped != 0,
            };
            if memory.is_empty() {
                return Err(CapabilityError::NoMemoryMode(category));
            }
            memory
        } else {
            if raw.NormalMemory != 0 || raw.MemorySwapped != 0 {
                debug!(
                    "ignoring reserved words {:#x}/{:#x} of controller plugin {name:?}",
                    raw.NormalMemory, raw.MemorySwapped
                );
            }
            MemorySupport::BOTH
        };

        Ok(Self {
            version,
            category,
            name,
            memory,
        })
    }

    /// Encodes the record a module hands back from `GetDllInfo`.
    ///
    /// Names longer than 99 bytes are cut at a character boundary.
    pub fn to_raw(&self) -> sys::PLUGIN_INFO {
        let mut raw = sys::PLUGIN_INFO::zeroed();
        raw.Version = self.version.raw();
        raw.Type = self.category.raw();

        let mut end = self.name.len().min(sys::PLUGIN_NAME_LEN - 1);
        while !self.name.is_char_boundary(end) {
            end -= 1;
        }
        for (dst, &src) in raw.Name.iter_mut().zip(&self.name.as_bytes()[..end]) {
            *dst = src as c_char;
        }

        if self.category.advertises_memory_modes() {
            raw.NormalMemory = c_int::from(self.memory.normal);
            raw.MemorySwapped = c_int::from(self.memory.swapped);
        }
        raw
    }

    pub fn shape(&self) -> Result<InfoShape, VersionError> {
        InfoShape::negotiate(self.category, self.version)
    }

    pub fn supports(&self, order: MemoryOrder) -> bool {
        self.memory.supports(order)
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.category, self.version)
    }
}

fn decode_name(raw: &[c_char; sys::PLUGIN_NAME_LEN]) -> Option<String> {
    let bytes: Vec<u8> = raw.iter().map(|&c| c as u8).collect();
    let len = bytes.iter().position(|&b| b == 0)?;
    Some(String::from_utf8_lossy(&bytes[..len]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_info(kind: u16, version: u16, name: &[u8]) -> sys::PLUGIN_INFO {
        let mut raw = sys::PLUGIN_INFO::zeroed();
        raw.Type = kind;
        raw.Version = version;
        for (dst, &src) in raw.Name.iter_mut().zip(name) {
            *dst = src as c_char;
        }
        raw.MemorySwapped = 1;
        raw
    }

    #[test]
    fn decodes_valid_audio_record() {
        let raw = raw_info(sys::PLUGIN_TYPE_AUDIO, 0x0101, b"Null Audio");
        let info = CapabilityDescriptor::from_raw(&raw).unwrap();
        assert_eq!(info.category, PluginCategory::Audio);
        assert_eq!(info.name, "Null Audio");
        assert_eq!(info.memory, MemorySupport::SWAPPED_ONLY);
        assert_eq!(info.shape(), Ok(InfoShape::AudioV1_1));
    }

    #[test]
    fn rejects_unknown_type_and_unterminated_name() {
        let raw = raw_info(1, 0x0101, b"RSP");
        assert_eq!(
            CapabilityDescriptor::from_raw(&raw),
            Err(CapabilityError::UnknownCategory(1))
        );

        let raw = raw_info(sys::PLUGIN_TYPE_GFX, 0x0103, &[b'x'; sys::PLUGIN_NAME_LEN]);
        assert_eq!(
            CapabilityDescriptor::from_raw(&raw),
            Err(CapabilityError::UnterminatedName)
        );
    }

    #[test]
    fn rejects_newer_version_before_reading_the_rest() {
        let raw = raw_info(sys::PLUGIN_TYPE_GFX, 0x0104, &[b'x'; sys::PLUGIN_NAME_LEN]);
        assert!(matches!(
            CapabilityDescriptor::from_raw(&raw),
            Err(CapabilityError::Version(VersionError::Newer { .. }))
        ));
    }

    #[test]
    fn audio_and_gfx_need_a_memory_mode() {
        let mut raw = raw_info(sys::PLUGIN_TYPE_GFX, 0x0102, b"gfx");
        raw.MemorySwapped = 0;
        assert_eq!(
            CapabilityDescriptor::from_raw(&raw),
            Err(CapabilityError::NoMemoryMode(PluginCategory::Gfx))
        );
    }

    #[test]
    fn controller_reserved_words_are_ignored() {
        let mut raw = raw_info(sys::PLUGIN_TYPE_CONTROLLER, 0x0100, b"pad");
        raw.MemorySwapped = 0;
        let info = CapabilityDescriptor::from_raw(&raw).unwrap();
        assert_eq!(info.memory, MemorySupport::BOTH);

        raw.NormalMemory = 0x1234;
        assert!(CapabilityDescriptor::from_raw(&raw).is_ok());
    }

    #[test]
    fn long_names_are_truncated_on_char_boundary() {
        let name = format!("{}é", "a".repeat(98));
        let info = CapabilityDescriptor::new(PluginCategory::Audio, ApiVersion::V1_1, name);
        let raw = info.to_raw();
        assert_eq!(raw.Name[sys::PLUGIN_NAME_LEN - 1], 0);

        let back = CapabilityDescriptor::from_raw(&raw).unwrap();
        assert_eq!(back.name, "a".repeat(98));
    }

    #[test]
    fn encoded_record_decodes_to_itself() {
        let info = CapabilityDescriptor::new(PluginCategory::Gfx, ApiVersion::V1_3, "Soft GFX")
            .with_memory(MemorySupport::NORMAL_ONLY);
        assert_eq!(CapabilityDescriptor::from_raw(&info.to_raw()), Ok(info));
    }

    #[test]
    fn preferred_order_favours_swapped() {
        assert_eq!(MemorySupport::BOTH.preferred(), Some(MemoryOrder::Swapped));
        assert_eq!(
            MemorySupport::NORMAL_ONLY.preferred(),
            Some(MemoryOrder::Normal)
        );
    }
}
