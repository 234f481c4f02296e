use rcp_plugin_core::entry_points::EntryPoint;
use rcp_plugin_core::version::{InfoShape, PluginCategory};
use rcp_plugin_sys as sys;

use super::LoadError;
use super::symbols::Resolver;

/// Entry points every category exports.
#[derive(Clone, Copy, Debug)]
pub struct CommonEntries {
    pub get_dll_info: sys::GetDllInfo,
    pub close_dll: sys::CloseDLL,
    pub rom_closed: sys::RomClosed,
    pub dll_about: Option<sys::DllAbout>,
    pub dll_config: Option<sys::DllConfig>,
    pub dll_test: Option<sys::DllTest>,
}

impl CommonEntries {
    pub(crate) fn resolve(r: &Resolver<'_>) -> Result<Self, LoadError> {
        unsafe {
            Ok(Self {
                get_dll_info: r.required(EntryPoint::GetDllInfo)?,
                close_dll: r.required(EntryPoint::CloseDll)?,
                rom_closed: r.required(EntryPoint::RomClosed)?,
                dll_about: r.optional(EntryPoint::DllAbout),
                dll_config: r.optional(EntryPoint::DllConfig),
                dll_test: r.optional(EntryPoint::DllTest),
            })
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AudioEntries {
    pub initiate: sys::InitiateAudio,
    pub dacrate_changed: sys::AiDacrateChanged,
    pub len_changed: sys::AiLenChanged,
    pub read_length: sys::AiReadLength,
    pub process_alist: sys::ProcessAList,
    pub update: Option<sys::AiUpdate>,
}

#[derive(Clone, Copy, Debug)]
pub struct GfxEntries {
    pub initiate: sys::InitiateGFX,
    pub rom_open: sys::RomOpen,
    pub change_window: sys::ChangeWindow,
    pub draw_screen: sys::DrawScreen,
    pub move_screen: sys::MoveScreen,
    pub process_dlist: sys::ProcessDList,
    pub update_screen: sys::UpdateScreen,
    pub vi_status_changed: sys::ViStatusChanged,
    pub vi_width_changed: sys::ViWidthChanged,
    pub process_rdp_list: Option<sys::ProcessRDPList>,
    pub show_cfb: Option<sys::ShowCFB>,
    pub capture_screen: Option<sys::CaptureScreen>,
}

/// `InitiateControllers` has a different signature per version.
#[derive(Clone, Copy, Debug)]
pub enum InitiateControllers {
    V1_0(sys::InitiateControllers_1_0),
    V1_1(sys::InitiateControllers_1_1),
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerEntries {
    pub initiate: InitiateControllers,
    pub rom_open: sys::RomOpen,
    pub get_keys: Option<sys::GetKeys>,
    pub controller_command: Option<sys::ControllerCommand>,
    pub read_controller: Option<sys::ReadController>,
    pub key_down: Option<sys::WM_KeyDown>,
    pub key_up: Option<sys::WM_KeyUp>,
}

mod sealed {
    pub trait Sealed {}
}

/// A plugin category as a type, selecting the entry-point table and the
/// session operations available.
pub trait Subsystem: sealed::Sealed + Send + 'static {
    const CATEGORY: PluginCategory;

    type Entries: Copy + Send + std::fmt::Debug;

    #[doc(hidden)]
    fn resolve(r: &Resolver<'_>) -> Result<Self::Entries, LoadError>;
}

/// Audio plugins (`PLUGIN_TYPE_AUDIO`).
#[derive(Debug)]
pub enum Audio {}

/// Graphics plugins (`PLUGIN_TYPE_GFX`).
#[derive(Debug)]
pub enum Gfx {}

/// Controller plugins (`PLUGIN_TYPE_CONTROLLER`).
#[derive(Debug)]
pub enum Controller {}

impl sealed::Sealed for Audio {}
impl sealed::Sealed for Gfx {}
impl sealed::Sealed for Controller {}

impl Subsystem for Audio {
    const CATEGORY: PluginCategory = PluginCategory::Audio;
    type Entries = AudioEntries;

    fn resolve(r: &Resolver<'_>) -> Result<AudioEntries, LoadError> {
        unsafe {
            Ok(AudioEntries {
                initiate: r.required(EntryPoint::InitiateAudio)?,
                dacrate_changed: r.required(EntryPoint::AiDacrateChanged)?,
                len_changed: r.required(EntryPoint::AiLenChanged)?,
                read_length: r.required(EntryPoint::AiReadLength)?,
                process_alist: r.required(EntryPoint::ProcessAList)?,
                update: r.optional(EntryPoint::AiUpdate),
            })
        }
    }
}

impl Subsystem for Gfx {
    const CATEGORY: PluginCategory = PluginCategory::Gfx;
    type Entries = GfxEntries;

    fn resolve(r: &Resolver<'_>) -> Result<GfxEntries, LoadError> {
        unsafe {
            Ok(GfxEntries {
                initiate: r.required(EntryPoint::InitiateGfx)?,
                rom_open: r.required(EntryPoint::RomOpen)?,
                change_window: r.required(EntryPoint::ChangeWindow)?,
                draw_screen: r.required(EntryPoint::DrawScreen)?,
                move_screen: r.required(EntryPoint::MoveScreen)?,
                process_dlist: r.required(EntryPoint::ProcessDList)?,
                update_screen: r.required(EntryPoint::UpdateScreen)?,
                vi_status_changed: r.required(EntryPoint::ViStatusChanged)?,
                vi_width_changed: r.required(EntryPoint::ViWidthChanged)?,
                process_rdp_list: r.optional(EntryPoint::ProcessRdpList),
                show_cfb: r.optional(EntryPoint::ShowCfb),
                capture_screen: r.optional(EntryPoint::CaptureScreen),
            })
        }
    }
}

impl Subsystem for Controller {
    const CATEGORY: PluginCategory = PluginCategory::Controller;
    type Entries = ControllerEntries;

    fn resolve(r: &Resolver<'_>) -> Result<ControllerEntries, LoadError> {
        unsafe {
            let initiate = match r.shape() {
                InfoShape::ControllerV1_0 => {
                    InitiateControllers::V1_0(r.required(EntryPoint::InitiateControllers)?)
                }
                _ => InitiateControllers::V1_1(r.required(EntryPoint::InitiateControllers)?),
            };
            Ok(ControllerEntries {
                initiate,
                rom_open: r.required(EntryPoint::RomOpen)?,
                get_keys: r.optional(EntryPoint::GetKeys),
                controller_command: r.optional(EntryPoint::ControllerCommand),
                read_controller: r.optional(EntryPoint::ReadController),
                key_down: r.optional(EntryPoint::KeyDown),
                key_up: r.optional(EntryPoint::KeyUp),
            })
        }
    }
}
