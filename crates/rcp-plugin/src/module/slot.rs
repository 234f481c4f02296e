use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use rcp_plugin_core::entry_points::EntryPoint;

use super::{Plugin, guard};

struct SlotState<P: Plugin> {
    plugin: Option<P>,
    record: Option<P::Record>,
    rom_open: bool,
}

impl<P: Plugin> SlotState<P> {
    fn plugin(&mut self) -> &mut P {
        self.plugin.get_or_insert_with(P::default)
    }
}

/// Module-side state of one plugin: the instance, the init record received
/// from the host, and whether a ROM is open.
///
/// Declare one per plugin type as a `static` and return it from
/// [`Plugin::slot`]:
///
/// ```ignore
/// fn slot() -> &'static PluginSlot<Self> {
///     static SLOT: PluginSlot<MyAudio> = PluginSlot::new();
///     &SLOT
/// }
/// ```
pub struct PluginSlot<P: Plugin> {
    state: Mutex<SlotState<P>>,
}

// Safety: the record only holds addresses of host storage. The host makes one
// call at a time, and every access here happens under the mutex.
unsafe impl<P: Plugin> Sync for PluginSlot<P> {}
unsafe impl<P: Plugin> Send for PluginSlot<P> {}

impl<P: Plugin> fmt::Debug for PluginSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("PluginSlot")
            .field("plugin", &P::NAME)
            .field("initialized", &state.record.is_some())
            .field("rom_open", &state.rom_open)
            .finish()
    }
}

impl<P: Plugin> Default for PluginSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Plugin> PluginSlot<P> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                plugin: None,
                record: None,
                rom_open: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<P>> {
        // A panic inside a guarded call leaves nothing half-written that
        // matters here; keep serving.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the host has initialized the plugin and not closed it.
    pub fn is_initialized(&self) -> bool {
        self.lock().record.is_some()
    }

    pub fn is_rom_open(&self) -> bool {
        self.lock().rom_open
    }

    /// Runs `f` on the plugin instance, creating it if needed.
    pub fn with_plugin<T>(&self, f: impl FnOnce(&mut P) -> T) -> T {
        f(self.lock().plugin())
    }

    /// Stores `record` and runs the plugin's initialize. The record is kept
    /// only if `f` reports success.
    pub(crate) fn initiate(
        &self,
        entry: EntryPoint,
        record: P::Record,
        f: impl FnOnce(&mut P, &P::Record) -> bool,
    ) -> bool {
        let mut state = self.lock();
        if state.record.is_some() {
            warn!("{}: {} called again; replacing the stored record", P::NAME, entry.name());
        }
        let ok = guard(entry, || f(state.plugin(), &record));
        state.record = ok.then_some(record);
        state.rom_open = false;
        debug!("{}: {} -> {ok}", P::NAME, entry.name());
        ok
    }

    /// Runs an emulation call. Before initialize, or after a panic, the
    /// call returns `T::default()`.
    pub(crate) fn call<T: Default>(
        &self,
        entry: EntryPoint,
        f: impl FnOnce(&mut P, &P::Record) -> T,
    ) -> T {
        self.call_inner(entry, false, f)
    }

    /// Like [`PluginSlot::call`], and marks a ROM as open.
    pub(crate) fn call_in_rom<T: Default>(
        &self,
        entry: EntryPoint,
        f: impl FnOnce(&mut P, &P::Record) -> T,
    ) -> T {
        self.call_inner(entry, true, f)
    }

    fn call_inner<T: Default>(
        &self,
        entry: EntryPoint,
        opens_rom: bool,
        f: impl FnOnce(&mut P, &P::Record) -> T,
    ) -> T {
        let mut state = self.lock();
        let Some(record) = state.record else {
            warn!("{}: {} called before initialize", P::NAME, entry.name());
            return T::default();
        };
        if opens_rom {
            state.rom_open = true;
        }
        guard(entry, || f(state.plugin(), &record))
    }

    /// `RomClosed`: forwarded once per open ROM, ignored otherwise.
    pub(crate) fn rom_closed(&self) {
        let mut state = self.lock();
        if !state.rom_open {
            debug!("{}: RomClosed without an open ROM", P::NAME);
            return;
        }
        state.rom_open = false;
        guard(EntryPoint::RomClosed, || state.plugin().rom_closed());
    }

    /// `CloseDLL`: closes any open ROM, then drops the plugin and the record.
    pub(crate) fn close(&self) {
        let mut state = self.lock();
        if state.rom_open {
            state.rom_open = false;
            guard(EntryPoint::RomClosed, || state.plugin().rom_closed());
        }
        if let Some(mut plugin) = state.plugin.take() {
            guard(EntryPoint::CloseDll, || plugin.close());
        }
        state.record = None;
        debug!("{}: closed", P::NAME);
    }
}
