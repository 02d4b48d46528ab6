//! Cached, word-granular reads of the target's address space via
//! `PTRACE_PEEKDATA` (component C3). Ported from `ptrace.c`'s `peekdata()`.

use crate::error::TargetError;
use crate::value::{Value, FLAGS_ALL};
use nix::sys::ptrace;
use nix::unistd::Pid;
use tracing::debug;

const MAX_CACHE_SIZE: usize = 1024;
const WORD_SIZE: u64 = std::mem::size_of::<libc::c_long>() as u64;

fn round_up_word(n: u64) -> u64 {
    WORD_SIZE * (1 + (n.saturating_sub(1)) / WORD_SIZE)
}

fn round_down_word(n: u64) -> u64 {
    WORD_SIZE * (n / WORD_SIZE)
}

fn ptrace_peek_word(pid: Pid, addr: u64) -> Result<[u8; 8], ()> {
    ptrace::read(pid, addr as ptrace::AddressType)
        .map(|word| word.to_ne_bytes())
        .map_err(|_| ())
}

/// Overlapping-read cache for word-granular `PTRACE_PEEKDATA` access.
/// Reduces the number of actual peeks by ~70% on consecutive reads, per the
/// original's own comment.
#[derive(Debug, Default)]
pub struct PeekCache {
    cache: Vec<u8>,
    base: u64,
    pid: Option<Pid>,
    hits: u64,
    misses: u64,
}

impl PeekCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the cache. Called on attach, matching the original's
    /// `memset(&peekbuf, 0, ...)` right after a successful `PTRACE_ATTACH`.
    pub fn flush(&mut self) {
        self.cache.clear();
        self.base = 0;
        self.pid = None;
    }

    /// Read 8 bytes at `addr`, returning a [`Value`] whose flags mark which
    /// widths were actually backed by readable memory (all of them, unless
    /// the read ran off the end of a mapped page).
    pub fn peek(&mut self, pid: Pid, addr: u64) -> Value {
        let full_hit = self.pid == Some(pid)
            && addr >= self.base
            && addr + 8 - self.base <= self.cache.len() as u64;
        if full_hit {
            self.hits += 1;
            let off = (addr - self.base) as usize;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&self.cache[off..off + 8]);
            return Value { bytes, flags: FLAGS_ALL };
        }

        let partial_hit =
            self.pid == Some(pid) && addr >= self.base && addr - self.base < self.cache.len() as u64;

        let shift1;
        if partial_hit {
            let overrun = (addr + 8) as i64 - (self.base + self.cache.len() as u64) as i64;
            shift1 = round_up_word(overrun.max(0) as u64);
            if self.cache.len() as u64 + shift1 > MAX_CACHE_SIZE as u64 {
                let shift2 = round_down_word(addr - self.base) as usize;
                self.cache.drain(0..shift2);
                self.base += shift2 as u64;
            }
        } else {
            self.misses += 1;
            shift1 = 8;
            self.pid = Some(pid);
            self.cache.clear();
            self.base = addr;
        }

        let mut last_gathered = self.base + self.cache.len() as u64;
        let mut advanced = 0u64;
        while advanced < shift1 {
            let ptrace_addr = self.base + self.cache.len() as u64;
            match ptrace_peek_word(pid, ptrace_addr) {
                Ok(word) => {
                    self.cache.extend_from_slice(&word);
                    last_gathered = ptrace_addr + 8;
                }
                Err(()) => {
                    for j in 1..8u64 {
                        if let Ok(word) = ptrace_peek_word(pid, ptrace_addr - j) {
                            let keep = &word[j as usize..];
                            if self.cache.len() as u64 >= j {
                                let start = self.cache.len() - j as usize;
                                self.cache[start..].copy_from_slice(keep);
                            } else {
                                self.cache.splice(0..0, keep.iter().copied());
                                self.base -= j;
                            }
                            last_gathered = ptrace_addr + 8 - j;
                            break;
                        }
                    }
                    break;
                }
            }
            advanced += 8;
        }

        let mut result = Value::empty();
        let off = (addr - self.base) as usize;
        if addr + 8 <= last_gathered {
            result.bytes.copy_from_slice(&self.cache[off..off + 8]);
            result.flags = FLAGS_ALL;
        } else {
            let successful = last_gathered.saturating_sub(addr) as usize;
            for k in 0..8 {
                result.bytes[k] = if k < successful { self.cache[off + k] } else { 0 };
            }
            result.flags = readable_width_flags(successful);
        }
        debug!(addr, hits = self.hits, misses = self.misses, "peek");
        result
    }

    /// Raw byte read spanning possibly many words, used for ranged reads
    /// that don't need per-width flag tracking (e.g. `dump`/`write`).
    /// Returns an error only if not a single byte of the range is readable.
    pub fn peek_range(&mut self, pid: Pid, addr: u64, len: usize) -> Result<Vec<u8>, TargetError> {
        let mut out = Vec::with_capacity(len);
        let mut cursor = addr;
        while out.len() < len {
            let word = self.peek(pid, cursor);
            let remaining = len - out.len();
            let take = remaining.min(8);
            if word.flags == 0 && out.is_empty() {
                return Err(TargetError::Unreadable);
            }
            out.extend_from_slice(&word.bytes[..take]);
            cursor += 8;
        }
        Ok(out)
    }
}

/// Which width flags survive given that only `successful` leading bytes of
/// an 8-byte read were actually readable.
fn readable_width_flags(successful: usize) -> crate::value::MatchFlags {
    use crate::value::*;
    let mut flags = FLAGS_ALL;
    if successful < 8 {
        flags &= !(FLAG_U64 | FLAG_S64 | FLAG_F64);
    }
    if successful < 4 {
        flags &= !(FLAG_U32 | FLAG_S32 | FLAG_F32);
    }
    if successful < 2 {
        flags &= !(FLAG_U16 | FLAG_S16);
    }
    if successful < 1 {
        flags &= !(FLAG_U8 | FLAG_S8);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_width_flags_full() {
        assert_eq!(readable_width_flags(8), FLAGS_ALL);
    }

    #[test]
    fn readable_width_flags_partial() {
        use crate::value::*;
        let flags = readable_width_flags(2);
        assert_ne!(flags & FLAG_U16, 0);
        assert_eq!(flags & FLAG_U32, 0);
        assert_eq!(flags & FLAG_U64, 0);
    }

    #[test]
    fn readable_width_flags_none() {
        assert_eq!(readable_width_flags(0), 0);
    }

    #[test]
    fn round_up_and_down_word() {
        // matches the C formula's behavior at 0: (0-1)/8 truncates to 0, so
        // the rounded-up result is one word, not zero.
        assert_eq!(round_up_word(0), WORD_SIZE);
        assert_eq!(round_up_word(1), WORD_SIZE);
        assert_eq!(round_up_word(WORD_SIZE), WORD_SIZE);
        assert_eq!(round_down_word(WORD_SIZE + 3), WORD_SIZE);
    }
}
