//! Cross-process memory I/O (component C3): attach/detach via `ptrace`,
//! ranged reads preferring `/proc/<pid>/mem`, word-granular writes via
//! `PTRACE_POKEDATA`. Ported from `ptrace.c`.

pub mod peek;
pub mod procmem;

use crate::error::TargetError;
use crate::value::{UserValue, Value};
use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use peek::PeekCache;
use tracing::{info_span, instrument};

/// A live attachment to a traced process. Every externally exposed read or
/// write is bracketed by attach/detach; the peek cache lives here so it is
/// flushed exactly once per attachment, matching the original's
/// `memset(&peekbuf, ...)` in `attach()`.
pub struct Target {
    pid: Pid,
    cache: PeekCache,
}

impl Target {
    /// `PTRACE_ATTACH`, then wait for the resulting `SIGSTOP`. Mirrors
    /// `attach()`.
    #[instrument(skip_all, fields(pid = pid))]
    pub fn attach(pid: i32) -> Result<Target, TargetError> {
        let nix_pid = Pid::from_raw(pid);
        let span = info_span!("attach", pid);
        let _enter = span.enter();

        ptrace::attach(nix_pid).map_err(|_| TargetError::AttachFailed)?;
        match waitpid(nix_pid, None) {
            Ok(WaitStatus::Stopped(_, _)) => {}
            _ => return Err(TargetError::NotStopped),
        }

        let mut cache = PeekCache::new();
        cache.flush();
        Ok(Target { pid: nix_pid, cache })
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }

    /// `PTRACE_DETACH`. Mirrors `detach()`.
    #[instrument(skip_all, fields(pid = self.pid.as_raw()))]
    pub fn detach(self) -> Result<(), TargetError> {
        ptrace::detach(self.pid, None).map_err(|_| TargetError::DetachFailed)
    }

    /// Read `len` bytes starting at `addr`. Tries `/proc/<pid>/mem` first;
    /// falls back to the ptrace peek cache (used on platforms lacking the
    /// file interface, and to recover the readable prefix near unmapped
    /// page boundaries).
    pub fn read(&mut self, addr: u64, len: usize) -> Result<Vec<u8>, TargetError> {
        if let Ok(bytes) = procmem::read_range(self.pid.as_raw(), addr, len) {
            return Ok(bytes);
        }
        self.cache.peek_range(self.pid, addr, len)
    }

    /// Read a single 8-byte word through the peek cache, with per-width
    /// readability flags. Used inside scan routines, which need to know
    /// which widths are backed by readable memory.
    pub fn peek_value(&mut self, addr: u64) -> Value {
        self.cache.peek(self.pid, addr)
    }

    /// Overwrite the bytes at `addr` with `data`. Tries `/proc/<pid>/mem`
    /// first, same as `read`; falls back to word-granular `PTRACE_POKEDATA`
    /// writes (mirroring `write_array()`) when that interface is
    /// unavailable or rejects the write.
    pub fn write_bytes(&mut self, addr: u64, data: &[u8]) -> Result<(), TargetError> {
        if procmem::write_range(self.pid.as_raw(), addr, data).is_ok() {
            self.cache.flush();
            return Ok(());
        }

        let mut offset = 0usize;
        while offset < data.len() {
            let remaining = data.len() - offset;
            let mut word = [0u8; 8];
            let take = remaining.min(8);
            if take < 8 {
                // partial trailing word: preserve the untouched tail bytes
                let existing = self.cache.peek(self.pid, addr + offset as u64);
                word = existing.bytes;
            }
            word[..take].copy_from_slice(&data[offset..offset + take]);
            let word_addr = (addr + offset as u64) as ptrace::AddressType;
            ptrace::write(self.pid, word_addr, i64::from_ne_bytes(word))
                .map_err(|_| TargetError::WriteFailed)?;
            offset += 8;
        }
        self.cache.flush();
        Ok(())
    }

    /// Overlay the widest mutual type between the current value at `addr`
    /// and `to`, then write the whole 8-byte result back. Mirrors
    /// `setaddr()`.
    pub fn set_value(&mut self, addr: u64, to: &UserValue) -> Result<(), TargetError> {
        use crate::value::*;

        let saved = self.cache.peek(self.pid, addr);
        let mut out = saved;

        if saved.flags & FLAG_U64 != 0 && to.flags & FLAG_U64 != 0 {
            out.bytes = to.u64.to_le_bytes();
        } else if saved.flags & FLAG_S64 != 0 && to.flags & FLAG_S64 != 0 {
            out.bytes = to.s64.to_le_bytes();
        } else if saved.flags & FLAG_F64 != 0 && to.flags & FLAG_F64 != 0 {
            out.bytes = to.f64.to_le_bytes();
        } else if saved.flags & FLAG_U32 != 0 && to.flags & FLAG_U32 != 0 {
            out.bytes[0..4].copy_from_slice(&to.u32.to_le_bytes());
        } else if saved.flags & FLAG_S32 != 0 && to.flags & FLAG_S32 != 0 {
            out.bytes[0..4].copy_from_slice(&to.s32.to_le_bytes());
        } else if saved.flags & FLAG_F32 != 0 && to.flags & FLAG_F32 != 0 {
            out.bytes[0..4].copy_from_slice(&to.f32.to_le_bytes());
        } else if saved.flags & FLAG_U16 != 0 && to.flags & FLAG_U16 != 0 {
            out.bytes[0..2].copy_from_slice(&to.u16.to_le_bytes());
        } else if saved.flags & FLAG_S16 != 0 && to.flags & FLAG_S16 != 0 {
            out.bytes[0..2].copy_from_slice(&to.s16.to_le_bytes());
        } else if saved.flags & FLAG_U8 != 0 && to.flags & FLAG_U8 != 0 {
            out.bytes[0] = to.u8;
        } else if saved.flags & FLAG_S8 != 0 && to.flags & FLAG_S8 != 0 {
            out.bytes[0] = to.s8 as u8;
        } else {
            return Err(TargetError::Unreadable);
        }

        self.write_bytes(addr, &out.bytes)
    }
}

/// Run `f` with a fresh attachment to `pid`, detaching afterward regardless
/// of the result. Used by single-shot commands (`dump`, `write`, `set`) that
/// don't want to manage the attach/detach lifecycle by hand.
pub fn with_attached<T>(
    pid: i32,
    f: impl FnOnce(&mut Target) -> Result<T, TargetError>,
) -> Result<T, TargetError> {
    let mut target = Target::attach(pid)?;
    let result = f(&mut target);
    let _ = target.detach();
    result
}

#[allow(unused_imports)]
use Signal as _;
