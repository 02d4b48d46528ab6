//! Process-wide mutable state (component C8). Ported from the
//! `globals_t`/`options_t` pair in `scanmem.h`, minus the `static` storage:
//! here it's an explicit struct owned by the REPL loop and threaded through
//! by `&mut`, so nothing in this port needs `unsafe` to touch shared state.

use crate::matches::MatchStore;
use crate::region::{Region, RegionScanLevel};
use crate::scan::DataType;
use crate::target::Target;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scan-configuration knobs, settable via the `option` command. Mirrors
/// `options_t`.
#[derive(Debug, Clone)]
pub struct Options {
    pub scan_data_type: DataType,
    pub region_scan_level: RegionScanLevel,
    pub alignment: u64,
    pub reverse_endianness: bool,
    pub detect_reverse_change: bool,
    pub backend_mode: bool,
    pub dump_with_ascii: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            scan_data_type: DataType::AnyNumber,
            region_scan_level: RegionScanLevel::HeapStackExecutable,
            alignment: 1,
            reverse_endianness: false,
            detect_reverse_change: false,
            backend_mode: false,
            dump_with_ascii: false,
        }
    }
}

/// The process-wide state threaded through every command handler. Mirrors
/// `globals_t`, replacing its `static` storage and its `volatile bool
/// stop_flag` (itself set from a signal handler) with an `Arc<AtomicBool>`
/// any thread (here: just the signal handler) can set without `unsafe`.
pub struct Globals {
    pub target: Option<Target>,
    pub target_pid: Option<i32>,
    pub store: MatchStore,
    pub regions: Vec<Region>,
    pub options: Options,
    pub stop_flag: Arc<AtomicBool>,
    pub scan_progress: f64,
    /// Whether an initial scan has been run since the last `pid`/`reset`.
    /// Distinguishes "no scan yet" from "a scan ran and found nothing",
    /// which an empty `store` alone cannot: the store is also empty
    /// immediately after `reset`.
    pub scanned: bool,
}

impl Default for Globals {
    fn default() -> Self {
        Globals {
            target: None,
            target_pid: None,
            store: MatchStore::new(),
            regions: Vec::new(),
            options: Options::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            scan_progress: 0.0,
            scanned: false,
        }
    }
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_stop(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    pub fn clear_stop(&self) {
        self.stop_flag.store(false, Ordering::SeqCst);
    }

    /// `pid N`: switch target, invalidating the store and region list (and
    /// detaching from whatever was previously attached).
    pub fn set_pid(&mut self, pid: i32) {
        if let Some(target) = self.target.take() {
            let _ = target.detach();
        }
        self.target_pid = Some(pid);
        self.store = MatchStore::new();
        self.regions.clear();
        self.scanned = false;
    }

    /// `reset`: drop the store and re-enumerate regions for the current pid.
    pub fn reset(&mut self) -> Result<(), crate::error::RegionError> {
        self.store = MatchStore::new();
        self.scanned = false;
        if let Some(pid) = self.target_pid {
            self.regions = crate::region::read_regions(pid, self.options.region_scan_level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pid_resets_store_and_regions() {
        let mut globals = Globals::new();
        globals.store.add_element(1, 1, crate::value::FLAG_U8);
        globals.regions.push(Region {
            id: 0,
            start: 0,
            size: 1,
            flags: Default::default(),
            filename: String::new(),
        });
        globals.set_pid(42);
        assert!(globals.store.is_empty());
        assert!(globals.regions.is_empty());
        assert_eq!(globals.target_pid, Some(42));
    }

    #[test]
    fn stop_flag_round_trips() {
        let globals = Globals::new();
        assert!(!globals.should_stop());
        globals.stop_flag.store(true, Ordering::SeqCst);
        assert!(globals.should_stop());
        globals.clear_stop();
        assert!(!globals.should_stop());
    }
}
