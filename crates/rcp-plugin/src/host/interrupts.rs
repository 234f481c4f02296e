//! Default `CheckInterrupts` callback.
//!
//! The callback takes no arguments, so requests are latched per calling
//! thread. Entry points run on the thread that calls them, which makes the
//! latch observable right after the call returns.

use std::cell::Cell;

use rcp_plugin_sys as sys;

thread_local! {
    static REQUESTS: Cell<u32> = const { Cell::new(0) };
}

/// Records one interrupt request from a module.
pub unsafe extern "C" fn latch_check_interrupts() {
    REQUESTS.with(|count| count.set(count.get().saturating_add(1)));
}

/// The latch as an init-record callback.
pub const LATCH: sys::p_func = Some(latch_check_interrupts);

/// Number of `CheckInterrupts` calls on this thread since the last take.
pub fn take_requests() -> u32 {
    REQUESTS.with(|count| count.replace(0))
}

pub fn pending_requests() -> u32 {
    REQUESTS.with(Cell::get)
}
