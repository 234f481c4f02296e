#![allow(dead_code)]

use once_cell::sync::Lazy;
use rcp_plugin::byte_order::MemoryOrder;
use std::sync::{Mutex, MutexGuard, PoisonError};

static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Plugin slots are process-wide statics, so tests that drive the same plugin
/// type take turns.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub const ORDERS: [MemoryOrder; 2] = [MemoryOrder::Normal, MemoryOrder::Swapped];
