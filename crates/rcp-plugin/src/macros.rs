/// Exports the entry points every category shares.
#[doc(hidden)]
#[macro_export]
macro_rules! __export_common {
    ($ty:ty) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn GetDllInfo(info: *mut $crate::sys::PLUGIN_INFO) {
            unsafe { $crate::module::get_dll_info::<$ty>(info) }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn CloseDLL() {
            unsafe { $crate::module::close_dll::<$ty>() }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn RomClosed() {
            unsafe { $crate::module::rom_closed::<$ty>() }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn DllAbout(parent: $crate::sys::p_void) {
            unsafe { $crate::module::dll_about::<$ty>(parent) }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn DllConfig(parent: $crate::sys::p_void) {
            unsafe { $crate::module::dll_config::<$ty>(parent) }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn DllTest(parent: $crate::sys::p_void) {
            unsafe { $crate::module::dll_test::<$ty>(parent) }
        }
    };
}

/// Exports the C entry points of an [`AudioPlugin`](crate::module::AudioPlugin).
///
/// Use once per `cdylib`.
#[macro_export]
macro_rules! export_audio_plugin {
    ($ty:ty) => {
        #[allow(non_snake_case)]
        mod __rcp_audio_exports {
            #[allow(unused_imports)]
            use super::*;

            $crate::__export_common!($ty);

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn InitiateAudio(
                info: $crate::sys::AUDIO_INFO,
            ) -> ::std::os::raw::c_int {
                unsafe { $crate::module::initiate_audio::<$ty>(info) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn AiDacrateChanged(system: ::std::os::raw::c_int) {
                unsafe { $crate::module::ai_dacrate_changed::<$ty>(system) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn AiLenChanged() {
                unsafe { $crate::module::ai_len_changed::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn AiReadLength() -> u32 {
                unsafe { $crate::module::ai_read_length::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn AiUpdate(wait: ::std::os::raw::c_int) {
                unsafe { $crate::module::ai_update::<$ty>(wait) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ProcessAList() {
                unsafe { $crate::module::process_alist::<$ty>() }
            }
        }
    };
}

/// Exports the C entry points of a [`GfxPlugin`](crate::module::GfxPlugin).
///
/// Use once per `cdylib`.
#[macro_export]
macro_rules! export_gfx_plugin {
    ($ty:ty) => {
        #[allow(non_snake_case)]
        mod __rcp_gfx_exports {
            #[allow(unused_imports)]
            use super::*;

            $crate::__export_common!($ty);

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn InitiateGFX(
                info: $crate::sys::GFX_INFO,
            ) -> ::std::os::raw::c_int {
                unsafe { $crate::module::initiate_gfx::<$ty>(info) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn RomOpen() {
                unsafe { $crate::module::rom_open_gfx::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ChangeWindow() {
                unsafe { $crate::module::change_window::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn DrawScreen() {
                unsafe { $crate::module::draw_screen::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn MoveScreen(x: ::std::os::raw::c_int, y: ::std::os::raw::c_int) {
                unsafe { $crate::module::move_screen::<$ty>(x, y) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ProcessDList() {
                unsafe { $crate::module::process_dlist::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ProcessRDPList() {
                unsafe { $crate::module::process_rdp_list::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ShowCFB() {
                unsafe { $crate::module::show_cfb::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn UpdateScreen() {
                unsafe { $crate::module::update_screen::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ViStatusChanged() {
                unsafe { $crate::module::vi_status_changed::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ViWidthChanged() {
                unsafe { $crate::module::vi_width_changed::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn CaptureScreen(dir: *mut ::std::os::raw::c_char) {
                unsafe { $crate::module::capture_screen::<$ty>(dir) }
            }
        }
    };
}

/// Exports the C entry points of a
/// [`ControllerPlugin`](crate::module::ControllerPlugin) with the 1.1
/// `InitiateControllers`.
///
/// Use once per `cdylib`.
#[macro_export]
macro_rules! export_controller_plugin {
    ($ty:ty) => {
        #[allow(non_snake_case)]
        mod __rcp_controller_exports {
            #[allow(unused_imports)]
            use super::*;

            $crate::__export_common!($ty);

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn InitiateControllers(info: $crate::sys::CONTROL_INFO) {
                unsafe { $crate::module::initiate_controllers::<$ty>(info) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn RomOpen() {
                unsafe { $crate::module::rom_open_controller::<$ty>() }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn GetKeys(control: ::std::os::raw::c_int, keys: *mut $crate::sys::BUTTONS) {
                unsafe { $crate::module::get_keys::<$ty>(control, keys) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ControllerCommand(control: ::std::os::raw::c_int, command: *mut u8) {
                unsafe { $crate::module::controller_command::<$ty>(control, command) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn ReadController(control: ::std::os::raw::c_int, command: *mut u8) {
                unsafe { $crate::module::read_controller::<$ty>(control, command) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn WM_KeyDown(code: ::std::os::raw::c_uint, param: i32) {
                unsafe { $crate::module::key_down::<$ty>(code, param) }
            }

            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn WM_KeyUp(code: ::std::os::raw::c_uint, param: i32) {
                unsafe { $crate::module::key_up::<$ty>(code, param) }
            }
        }
    };
}
