use std::fmt;

use rcp_plugin_sys as sys;
use thiserror::Error;

/// API version in `major.minor` form, encoded as `0xMMmm`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(u16);

impl ApiVersion {
    pub const V1_0: Self = Self(0x0100);
    pub const V1_1: Self = Self(0x0101);
    pub const V1_2: Self = Self(0x0102);
    pub const V1_3: Self = Self(0x0103);

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn minor(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Subsystem a plugin emulates (`PLUGIN_INFO::Type`).
pub enum PluginCategory {
    Gfx,
    Audio,
    Controller,
}

impl PluginCategory {
    pub const ALL: [Self; 3] = [Self::Gfx, Self::Audio, Self::Controller];

    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            sys::PLUGIN_TYPE_GFX => Some(Self::Gfx),
            sys::PLUGIN_TYPE_AUDIO => Some(Self::Audio),
            sys::PLUGIN_TYPE_CONTROLLER => Some(Self::Controller),
            _ => None,
        }
    }

    pub const fn raw(self) -> u16 {
        match self {
            Self::Gfx => sys::PLUGIN_TYPE_GFX,
            Self::Audio => sys::PLUGIN_TYPE_AUDIO,
            Self::Controller => sys::PLUGIN_TYPE_CONTROLLER,
        }
    }

    /// Newest API version this host understands for the category.
    pub const fn host_max_version(self) -> ApiVersion {
        match self {
            Self::Gfx => ApiVersion::from_raw(sys::GFX_API_VERSION),
            Self::Audio => ApiVersion::from_raw(sys::AUDIO_API_VERSION),
            Self::Controller => ApiVersion::from_raw(sys::CONTROLLER_API_VERSION),
        }
    }

    /// Whether the capability record's memory-mode words carry meaning.
    ///
    /// Controller headers declare them as reserved.
    pub const fn advertises_memory_modes(self) -> bool {
        !matches!(self, Self::Controller)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Gfx => "graphics",
            Self::Audio => "audio",
            Self::Controller => "controller",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("{category} plugin version {version} is newer than the supported {supported}")]
    Newer {
        category: PluginCategory,
        version: ApiVersion,
        supported: ApiVersion,
    },

    #[error("{category} plugin version {version} has no known record layout")]
    Unknown {
        category: PluginCategory,
        version: ApiVersion,
    },
}

/// The record shape and entry-point set selected for one negotiated version.
///
/// Exactly one shape is active per loaded module. Later shapes of a category
/// only add fields or entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfoShape {
    /// `AUDIO_INFO` with the ROM header pointer.
    AudioV1_1,
    /// `GFX_INFO` with the ROM header pointer.
    GfxV1_2,
    /// Same record as 1.2; adds `CaptureScreen`, `ShowCFB`, `ProcessRDPList`.
    GfxV1_3,
    /// `InitiateControllers(hMainWindow, CONTROL[4])`.
    ControllerV1_0,
    /// `InitiateControllers(CONTROL_INFO)`, adds raw data accessories.
    ControllerV1_1,
}

impl InfoShape {
    pub const ALL: [Self; 5] = [
        Self::AudioV1_1,
        Self::GfxV1_2,
        Self::GfxV1_3,
        Self::ControllerV1_0,
        Self::ControllerV1_1,
    ];

    /// Selects the shape for a module's advertised category and version.
    ///
    /// Versions above [`PluginCategory::host_max_version`] are rejected before
    /// any layout-dependent call is made; older versions with unknown layouts
    /// are rejected as well.
    pub fn negotiate(category: PluginCategory, version: ApiVersion) -> Result<Self, VersionError> {
        let supported = category.host_max_version();
        if version > supported {
            return Err(VersionError::Newer {
                category,
                version,
                supported,
            });
        }

        let shape = match (category, version) {
            (PluginCategory::Audio, ApiVersion::V1_1) => Self::AudioV1_1,
            (PluginCategory::Gfx, ApiVersion::V1_2) => Self::GfxV1_2,
            (PluginCategory::Gfx, ApiVersion::V1_3) => Self::GfxV1_3,
            (PluginCategory::Controller, ApiVersion::V1_0) => Self::ControllerV1_0,
            (PluginCategory::Controller, ApiVersion::V1_1) => Self::ControllerV1_1,
            _ => return Err(VersionError::Unknown { category, version }),
        };
        Ok(shape)
    }

    pub const fn category(self) -> PluginCategory {
        match self {
            Self::AudioV1_1 => PluginCategory::Audio,
            Self::GfxV1_2 | Self::GfxV1_3 => PluginCategory::Gfx,
            Self::ControllerV1_0 | Self::ControllerV1_1 => PluginCategory::Controller,
        }
    }

    pub const fn version(self) -> ApiVersion {
        match self {
            Self::AudioV1_1 | Self::ControllerV1_1 => ApiVersion::V1_1,
            Self::GfxV1_2 => ApiVersion::V1_2,
            Self::GfxV1_3 => ApiVersion::V1_3,
            Self::ControllerV1_0 => ApiVersion::V1_0,
        }
    }

    /// Size in bytes of the record passed to the initialize entry point.
    ///
    /// Controller 1.0 passes two arguments instead of a record; the size is
    /// that of the argument pair.
    pub const fn record_size(self) -> usize {
        match self {
            Self::AudioV1_1 => size_of::<sys::AUDIO_INFO>(),
            Self::GfxV1_2 | Self::GfxV1_3 => size_of::<sys::GFX_INFO>(),
            Self::ControllerV1_0 => 2 * size_of::<usize>(),
            Self::ControllerV1_1 => size_of::<sys::CONTROL_INFO>(),
        }
    }

    /// Whether the record carries the ROM header pointer and memory-order
    /// flag.
    pub const fn has_memory_window(self) -> bool {
        !matches!(self, Self::ControllerV1_0)
    }

    /// Whether controller slots may select the raw data accessory.
    pub const fn allows_raw_data(self) -> bool {
        matches!(self, Self::ControllerV1_1)
    }
}

impl fmt::Display for InfoShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category(), self.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_displays_major_minor() {
        assert_eq!(ApiVersion::from_raw(0x0103).to_string(), "1.3");
        assert_eq!(ApiVersion::V1_1.major(), 1);
        assert_eq!(ApiVersion::V1_1.minor(), 1);
    }

    #[test]
    fn newer_versions_are_rejected_per_category() {
        let err = InfoShape::negotiate(PluginCategory::Audio, ApiVersion::V1_2).unwrap_err();
        assert!(matches!(err, VersionError::Newer { .. }));

        // 1.2 is newer for audio but fine for graphics.
        assert_eq!(
            InfoShape::negotiate(PluginCategory::Gfx, ApiVersion::V1_2),
            Ok(InfoShape::GfxV1_2)
        );
        assert!(matches!(
            InfoShape::negotiate(PluginCategory::Gfx, ApiVersion::from_raw(0x0104)),
            Err(VersionError::Newer { .. })
        ));
    }

    #[test]
    fn versions_without_known_layout_are_rejected() {
        assert!(matches!(
            InfoShape::negotiate(PluginCategory::Audio, ApiVersion::V1_0),
            Err(VersionError::Unknown { .. })
        ));
        assert!(matches!(
            InfoShape::negotiate(PluginCategory::Gfx, ApiVersion::V1_1),
            Err(VersionError::Unknown { .. })
        ));
        assert!(matches!(
            InfoShape::negotiate(PluginCategory::Controller, ApiVersion::from_raw(0x00FF)),
            Err(VersionError::Unknown { .. })
        ));
    }

    #[test]
    fn every_shape_negotiates_back_to_itself() {
        for shape in InfoShape::ALL {
            assert_eq!(
                InfoShape::negotiate(shape.category(), shape.version()),
                Ok(shape)
            );
        }
    }

    #[test]
    fn category_round_trips_through_raw_tag() {
        for category in PluginCategory::ALL {
            assert_eq!(PluginCategory::from_raw(category.raw()), Some(category));
        }
        assert_eq!(PluginCategory::from_raw(1), None);
        assert_eq!(PluginCategory::from_raw(5), None);
    }
}
