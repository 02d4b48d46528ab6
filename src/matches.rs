//! The match store (component C4): a sparse vector of candidate bytes kept
//! as a sequence of contiguous-address *swaths*. Ported from
//! `targetmem.c`/`targetmem.h`'s `Array`/`Swath`/`matches_and_old_values_swath`.
//!
//! A raw C swath is a header (`first_byte_in_child`, `number_of_bytes`)
//! followed by a flexible array of `{old_byte, flags}` entries, all inside
//! one realloc'd blob. Here each swath owns its own `Vec<Entry>`; growing a
//! swath is an ordinary `Vec::push`, and there is no base-pointer
//! relocation to correct after a realloc the way the original has to track.

use crate::value::{MatchFlags, Value, FLAGS_ALL};

/// One byte of the store: the byte last observed at this address, and the
/// set of type interpretations still consistent with the scan history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entry {
    pub old_byte: u8,
    pub flags: MatchFlags,
}

impl Entry {
    pub fn is_match(&self) -> bool {
        self.flags != 0
    }
}

/// A run of contiguous target addresses, `[first_byte_in_child ..
/// +entries.len())`.
#[derive(Debug, Clone, Default)]
pub struct Swath {
    pub first_byte_in_child: u64,
    pub entries: Vec<Entry>,
}

impl Swath {
    pub fn end(&self) -> u64 {
        self.first_byte_in_child + self.entries.len() as u64
    }
}

/// Minimum gap (in target-address terms) between the end of one swath and
/// the start of the next before it's cheaper to fill with zero-flag filler
/// entries than to pay for a new swath header. Mirrors the original's
/// `sizeof(Swath) + sizeof(entry)` break-even computed from the equivalent
/// Rust layout: one swath header's worth of bookkeeping (`first_byte_in_child`
/// + the `Vec`'s own pointer/len/cap triple) plus one entry.
pub const SWATH_BREAK_EVEN_GAP: u64 =
    (std::mem::size_of::<u64>() + std::mem::size_of::<Vec<Entry>>() + std::mem::size_of::<Entry>())
        as u64;

/// The candidate-match store: an ordered, non-overlapping sequence of
/// swaths plus a running count of non-zero-flag entries.
#[derive(Debug, Clone, Default)]
pub struct MatchStore {
    swaths: Vec<Swath>,
    match_count: u64,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    pub fn swaths(&self) -> &[Swath] {
        &self.swaths
    }

    pub fn is_empty(&self) -> bool {
        self.swaths.is_empty()
    }

    /// Append one byte at `addr`. Mirrors `add_element`'s contiguous /
    /// gap-filled / new-swath decision.
    pub fn add_element(&mut self, addr: u64, old_byte: u8, flags: MatchFlags) {
        if flags != 0 {
            self.match_count += 1;
        }
        let entry = Entry { old_byte, flags };

        if let Some(last) = self.swaths.last_mut() {
            let gap = addr.saturating_sub(last.end());
            if addr == last.end() {
                last.entries.push(entry);
                return;
            }
            if addr > last.end() && gap < SWATH_BREAK_EVEN_GAP {
                for filler_addr in last.end()..addr {
                    let _ = filler_addr;
                    last.entries.push(Entry::default());
                }
                last.entries.push(entry);
                return;
            }
        }

        self.swaths.push(Swath {
            first_byte_in_child: addr,
            entries: vec![entry],
        });
    }

    /// Reconstruct the value at swath `swath_idx`, entry `entry_idx`: copy
    /// up to 8 consecutive old bytes, then mask flags to what both width
    /// and `flags` of the anchor entry allow. Mirrors `data_to_val`.
    pub fn data_to_val(&self, swath_idx: usize, entry_idx: usize) -> Value {
        let swath = &self.swaths[swath_idx];
        let available = swath.entries.len() - entry_idx;
        let mut bytes = [0u8; 8];
        let take = available.min(8);
        for i in 0..take {
            bytes[i] = swath.entries[entry_idx + i].old_byte;
        }

        let mut flags = FLAGS_ALL;
        if available < 8 {
            flags &= !(crate::value::FLAG_U64 | crate::value::FLAG_S64 | crate::value::FLAG_F64);
        }
        if available < 4 {
            flags &= !(crate::value::FLAG_U32 | crate::value::FLAG_S32 | crate::value::FLAG_F32);
        }
        if available < 2 {
            flags &= !(crate::value::FLAG_U16 | crate::value::FLAG_S16);
        }
        flags &= swath.entries[entry_idx].flags;

        Value { bytes, flags }
    }

    /// Walk the store skipping zero-flag entries, returning the `(swath,
    /// entry)` indices of the `n`-th (0-based) live match. Mirrors
    /// `nth_match`.
    pub fn nth_match(&self, n: u64) -> Option<(usize, usize)> {
        let mut seen = 0u64;
        for (swath_idx, swath) in self.swaths.iter().enumerate() {
            for (entry_idx, entry) in swath.entries.iter().enumerate() {
                if entry.is_match() {
                    if seen == n {
                        return Some((swath_idx, entry_idx));
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    /// Target address of a given `(swath, entry)` pair.
    pub fn address_of(&self, swath_idx: usize, entry_idx: usize) -> u64 {
        self.swaths[swath_idx].first_byte_in_child + entry_idx as u64
    }

    /// Clear the flags of the `n`-th live match without shrinking the
    /// store (the `delete id` command). Returns `false` if `n` is out of
    /// range.
    pub fn clear_match(&mut self, n: u64) -> bool {
        match self.nth_match(n) {
            Some((swath_idx, entry_idx)) => {
                self.swaths[swath_idx].entries[entry_idx].flags = 0;
                self.match_count -= 1;
                true
            }
            None => false,
        }
    }

    /// Drop every entry whose address falls in `[start, end)`, rebuilding
    /// the affected swaths. In this port this is a `Vec` rebuild via
    /// iteration rather than an in-place pointer rewrite, since swaths are
    /// independently owned.
    pub fn delete_in_address_range(&mut self, start: u64, end: u64) {
        let mut rebuilt = Vec::with_capacity(self.swaths.len());
        let mut removed_matches = 0u64;
        for swath in self.swaths.drain(..) {
            let mut current: Option<Swath> = None;
            for (i, entry) in swath.entries.into_iter().enumerate() {
                let addr = swath.first_byte_in_child + i as u64;
                if addr >= start && addr < end {
                    if entry.is_match() {
                        removed_matches += 1;
                    }
                    if let Some(s) = current.take() {
                        if !s.entries.is_empty() {
                            rebuilt.push(s);
                        }
                    }
                    continue;
                }
                match &mut current {
                    Some(s) => s.entries.push(entry),
                    None => {
                        current = Some(Swath {
                            first_byte_in_child: addr,
                            entries: vec![entry],
                        })
                    }
                }
            }
            if let Some(s) = current {
                if !s.entries.is_empty() {
                    rebuilt.push(s);
                }
            }
        }
        self.swaths = rebuilt;
        self.match_count -= removed_matches;
    }

    /// Replace the store's contents with a freshly built narrowing result.
    /// The narrowing scan builds a disjoint `Vec<Swath>`/count pair and
    /// swaps it in here at the end of its pass, which is this port's
    /// substitute for the original's in-place dual-cursor overwrite.
    pub fn replace_with(&mut self, swaths: Vec<Swath>, match_count: u64) {
        self.swaths = swaths;
        self.match_count = match_count;
    }
}
