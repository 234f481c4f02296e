use std::ffi::CStr;

use rcp_plugin_sys::symbols;

use crate::version::{InfoShape, PluginCategory};

/// Every exported function named by the plugin headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    GetDllInfo,
    CloseDll,
    RomClosed,
    DllAbout,
    DllConfig,
    DllTest,

    InitiateAudio,
    AiDacrateChanged,
    AiLenChanged,
    AiReadLength,
    AiUpdate,
    ProcessAList,

    InitiateGfx,
    RomOpen,
    CaptureScreen,
    ChangeWindow,
    DrawScreen,
    MoveScreen,
    ProcessDList,
    ProcessRdpList,
    ShowCfb,
    UpdateScreen,
    ViStatusChanged,
    ViWidthChanged,

    InitiateControllers,
    GetKeys,
    ControllerCommand,
    ReadController,
    KeyDown,
    KeyUp,
}

/// Whether a symbol must be exported for a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Required,
    Optional,
    /// Not part of this shape's entry-point set.
    Absent,
}

impl EntryPoint {
    pub const ALL: [Self; 30] = [
        Self::GetDllInfo,
        Self::CloseDll,
        Self::RomClosed,
        Self::DllAbout,
        Self::DllConfig,
        Self::DllTest,
        Self::InitiateAudio,
        Self::AiDacrateChanged,
        Self::AiLenChanged,
        Self::AiReadLength,
        Self::AiUpdate,
        Self::ProcessAList,
        Self::InitiateGfx,
        Self::RomOpen,
        Self::CaptureScreen,
        Self::ChangeWindow,
        Self::DrawScreen,
        Self::MoveScreen,
        Self::ProcessDList,
        Self::ProcessRdpList,
        Self::ShowCfb,
        Self::UpdateScreen,
        Self::ViStatusChanged,
        Self::ViWidthChanged,
        Self::InitiateControllers,
        Self::GetKeys,
        Self::ControllerCommand,
        Self::ReadController,
        Self::KeyDown,
        Self::KeyUp,
    ];

    /// NUL-terminated exported symbol name.
    pub const fn symbol_bytes(self) -> &'static [u8] {
        match self {
            Self::GetDllInfo => symbols::GET_DLL_INFO,
            Self::CloseDll => symbols::CLOSE_DLL,
            Self::RomClosed => symbols::ROM_CLOSED,
            Self::DllAbout => symbols::DLL_ABOUT,
            Self::DllConfig => symbols::DLL_CONFIG,
            Self::DllTest => symbols::DLL_TEST,
            Self::InitiateAudio => symbols::INITIATE_AUDIO,
            Self::AiDacrateChanged => symbols::AI_DACRATE_CHANGED,
            Self::AiLenChanged => symbols::AI_LEN_CHANGED,
            Self::AiReadLength => symbols::AI_READ_LENGTH,
            Self::AiUpdate => symbols::AI_UPDATE,
            Self::ProcessAList => symbols::PROCESS_ALIST,
            Self::InitiateGfx => symbols::INITIATE_GFX,
            Self::RomOpen => symbols::ROM_OPEN,
            Self::CaptureScreen => symbols::CAPTURE_SCREEN,
            Self::ChangeWindow => symbols::CHANGE_WINDOW,
            Self::DrawScreen => symbols::DRAW_SCREEN,
            Self::MoveScreen => symbols::MOVE_SCREEN,
            Self::ProcessDList => symbols::PROCESS_DLIST,
            Self::ProcessRdpList => symbols::PROCESS_RDP_LIST,
            Self::ShowCfb => symbols::SHOW_CFB,
            Self::UpdateScreen => symbols::UPDATE_SCREEN,
            Self::ViStatusChanged => symbols::VI_STATUS_CHANGED,
            Self::ViWidthChanged => symbols::VI_WIDTH_CHANGED,
            Self::InitiateControllers => symbols::INITIATE_CONTROLLERS,
            Self::GetKeys => symbols::GET_KEYS,
            Self::ControllerCommand => symbols::CONTROLLER_COMMAND,
            Self::ReadController => symbols::READ_CONTROLLER,
            Self::KeyDown => symbols::WM_KEY_DOWN,
            Self::KeyUp => symbols::WM_KEY_UP,
        }
    }

    pub fn symbol(self) -> &'static CStr {
        // Every table entry ends with exactly one NUL.
        CStr::from_bytes_with_nul(self.symbol_bytes()).unwrap_or(c"")
    }

    /// Symbol name without the trailing NUL, for logs and error messages.
    pub fn name(self) -> &'static str {
        self.symbol().to_str().unwrap_or("?")
    }

    /// Availability of this entry point for a negotiated shape.
    pub const fn availability(self, shape: InfoShape) -> Availability {
        use Availability::{Absent, Optional, Required};

        match self {
            Self::GetDllInfo | Self::CloseDll | Self::RomClosed => Required,
            Self::DllAbout | Self::DllConfig | Self::DllTest => Optional,
            _ => match shape.category() {
                PluginCategory::Audio => match self {
                    Self::InitiateAudio
                    | Self::AiDacrateChanged
                    | Self::AiLenChanged
                    | Self::AiReadLength
                    | Self::ProcessAList => Required,
                    Self::AiUpdate => Optional,
                    _ => Absent,
                },
                PluginCategory::Gfx => match self {
                    Self::InitiateGfx
                    | Self::RomOpen
                    | Self::ChangeWindow
                    | Self::DrawScreen
                    | Self::MoveScreen
                    | Self::ProcessDList
                    | Self::UpdateScreen
                    | Self::ViStatusChanged
                    | Self::ViWidthChanged => Required,
                    Self::ProcessRdpList | Self::ShowCfb | Self::CaptureScreen => {
                        if matches!(shape, InfoShape::GfxV1_3) {
                            Optional
                        } else {
                            Absent
                        }
                    }
                    _ => Absent,
                },
                PluginCategory::Controller => match self {
                    Self::InitiateControllers | Self::RomOpen => Required,
                    Self::GetKeys
                    | Self::ControllerCommand
                    | Self::ReadController
                    | Self::KeyDown
                    | Self::KeyUp => Optional,
                    _ => Absent,
                },
            },
        }
    }

    /// Entry points a library must export to be loadable for `shape`.
    pub fn required_for(shape: InfoShape) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |e| e.availability(shape) == Availability::Required)
    }
}
