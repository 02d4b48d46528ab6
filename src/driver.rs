//! The scan driver (component C6): `searchregions` (initial scan) and
//! `checkmatches` (narrowing scan). Ported from `scanroutines.c`'s
//! `searchregions`/`checkmatches` in spirit — both now live here since,
//! once the routine dispatch was pulled out into `scan::`, what remains is
//! purely the drive loop over regions or over the match store.

use crate::error::{ScanError, TargetError};
use crate::globals::Globals;
use crate::matches::{Entry, MatchStore, Swath};
use crate::scan::{scan_match, validate_combination, DataType, MatchRelation};
use crate::target::Target;
use crate::value::{UserValue, Value};
use tracing::info;

/// Emit a progress update roughly every 10% of `total`, plus once at 100%.
/// `total < 10` is handled by reporting exactly once, at completion, per
/// the guarded-division decision recorded in the design notes.
struct ProgressReporter {
    total: u64,
    last_bucket: u64,
    backend_mode: bool,
}

impl ProgressReporter {
    fn new(total: u64, backend_mode: bool) -> Self {
        ProgressReporter { total, last_bucket: 0, backend_mode }
    }

    fn report(&mut self, globals: &mut Globals, scanned: u64) {
        if self.total == 0 {
            return;
        }
        let bucket = if self.total < 10 {
            if scanned >= self.total { 1 } else { 0 }
        } else {
            (scanned * 10) / self.total
        };
        if bucket == self.last_bucket && scanned != self.total {
            return;
        }
        self.last_bucket = bucket;
        globals.scan_progress = scanned as f64 / self.total as f64;
        if self.backend_mode {
            println!("scan_progress: {scanned} {}", self.total);
        } else {
            info!(scanned, total = self.total, "scan progress");
        }
    }
}

/// Initial scan: enumerate every byte of every region, run the selected
/// routine, and append surviving candidates to a fresh match store. Mirrors
/// `searchregions`.
pub fn searchregions(
    globals: &mut Globals,
    data_type: DataType,
    relation: MatchRelation,
    user: &[UserValue],
) -> Result<(), ScanError> {
    validate_combination(data_type, relation, Some(user))?;
    if globals.regions.is_empty() {
        return Err(ScanError::NoRegions);
    }
    let pid = globals.target_pid.ok_or(ScanError::NoRegions)?;

    let total_bytes: u64 = globals.regions.iter().map(|r| r.size).sum();
    let mut store = MatchStore::new();
    let mut progress = ProgressReporter::new(total_bytes, globals.options.backend_mode);
    let mut scanned = 0u64;

    let mut target = Target::attach(pid).map_err(|_| ScanError::NoRegions)?;

    // One /proc/<pid>/mem handle shared across every region in this pass,
    // rather than reopening it per region as `target.read`'s fast path does.
    let mem_file = std::fs::File::open(format!("/proc/{pid}/mem")).ok();

    'regions: for region in globals.regions.clone() {
        if globals.should_stop() {
            break;
        }
        let len = region.size as usize;
        let mut buf = vec![0u8; len];
        let bytes = match mem_file.as_ref().and_then(|f| crate::target::procmem::pread_at(f, region.start, &mut buf).ok()) {
            Some(n) if n == len => buf,
            _ => match target.read(region.start, len) {
                Ok(b) => b,
                Err(_) => continue,
            },
        };

        let mut carry = 0usize;
        for offset in 0..bytes.len() {
            if globals.should_stop() {
                break 'regions;
            }
            let window_end = (offset + 8).min(bytes.len());
            let window = &bytes[offset..window_end];
            let addr = region.start + offset as u64;

            if carry > 0 {
                store.add_element(addr, bytes[offset], 0);
                carry -= 1;
                scanned += 1;
                progress.report(globals, scanned);
                continue;
            }

            let old = Value::empty();
            let outcome = scan_match(data_type, relation, window, &old, user, globals.options.reverse_endianness);
            if outcome.is_match() {
                store.add_element(addr, bytes[offset], outcome.out_flags);
                carry = outcome.width.saturating_sub(1);
            } else {
                store.add_element(addr, bytes[offset], 0);
            }

            scanned += 1;
            progress.report(globals, scanned);
        }
    }

    let _ = target.detach();
    globals.store = store;
    globals.clear_stop();
    Ok(())
}

/// Narrowing scan: walk the existing store, re-test each candidate against
/// live memory, and build a fresh replacement store. Mirrors
/// `checkmatches`.
pub fn checkmatches(
    globals: &mut Globals,
    data_type: DataType,
    relation: MatchRelation,
    user: &[UserValue],
) -> Result<(), ScanError> {
    validate_combination(data_type, relation, Some(user))?;
    if globals.store.is_empty() {
        return Err(ScanError::NoMatches);
    }
    let pid = globals.target_pid.ok_or(ScanError::NoMatches)?;

    let total_bytes: u64 = globals.store.swaths().iter().map(|s| s.entries.len() as u64).sum();
    let mut progress = ProgressReporter::new(total_bytes, globals.options.backend_mode);
    let mut scanned = 0u64;

    let mut target = Target::attach(pid).map_err(|_| ScanError::NoMatches)?;

    let mut new_swaths: Vec<Swath> = Vec::with_capacity(globals.store.swaths().len());
    let mut new_match_count = 0u64;

    let source_swaths = globals.store.swaths().to_vec();
    'swaths: for (swath_idx, swath) in source_swaths.iter().enumerate() {
        if globals.should_stop() {
            break;
        }
        let mut rebuilt = Swath { first_byte_in_child: swath.first_byte_in_child, entries: Vec::with_capacity(swath.entries.len()) };

        for entry_idx in 0..swath.entries.len() {
            if globals.should_stop() {
                break 'swaths;
            }
            let addr = swath.first_byte_in_child + entry_idx as u64;
            let old_entry = swath.entries[entry_idx];
            scanned += 1;

            if !old_entry.is_match() {
                rebuilt.entries.push(old_entry);
                progress.report(globals, scanned);
                continue;
            }

            let old_value = globals.store.data_to_val(swath_idx, entry_idx);
            let memory = target.peek_value(addr);
            let readable = memory.readable_len();

            // An unreadable page (or one that only partially covers this
            // word) can never sustain a match at the widths it can't back;
            // cap the window to what's actually readable so `scan_numeric`'s
            // `memlen >= width` gate clears the straddling widths, and drop
            // the match outright once nothing is readable at all.
            let new_entry = if readable == 0 {
                Entry { old_byte: memory.bytes[0], flags: 0 }
            } else {
                let window = &memory.bytes[..readable];
                let outcome = scan_match(data_type, relation, window, &old_value, user, globals.options.reverse_endianness);
                Entry {
                    old_byte: memory.bytes[0],
                    flags: if outcome.is_match() { outcome.out_flags } else { 0 },
                }
            };
            if new_entry.is_match() {
                new_match_count += 1;
            }
            rebuilt.entries.push(new_entry);
            progress.report(globals, scanned);
        }

        if !rebuilt.entries.is_empty() {
            new_swaths.push(rebuilt);
        }
    }

    let _ = target.detach();
    globals.store.replace_with(new_swaths, new_match_count);
    globals.clear_stop();
    Ok(())
}

/// `set [ids=]v[/delay]`: write `value` to the given (or all) matches,
/// optionally repeating every `delay` until the stop-flag is raised.
pub fn write_matches(
    globals: &mut Globals,
    ids: &[usize],
    value: &UserValue,
    delay: Option<std::time::Duration>,
) -> Result<(), TargetError> {
    let pid = globals.target_pid.ok_or(TargetError::NoTarget)?;
    loop {
        let mut target = Target::attach(pid)?;
        for &id in ids {
            if let Some((swath_idx, entry_idx)) = globals.store.nth_match(id as u64) {
                let addr = globals.store.address_of(swath_idx, entry_idx);
                target.set_value(addr, value)?;
            }
        }
        target.detach()?;

        match delay {
            Some(interval) if !globals.should_stop() => {
                let mut remaining = interval;
                let slice = std::time::Duration::from_millis(100);
                while remaining > std::time::Duration::ZERO {
                    if globals.should_stop() {
                        break;
                    }
                    let nap = slice.min(remaining);
                    std::thread::sleep(nap);
                    remaining = remaining.saturating_sub(nap);
                }
                if globals.should_stop() {
                    break;
                }
            }
            _ => break,
        }
    }
    globals.clear_stop();
    Ok(())
}
