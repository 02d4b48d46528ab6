//! `/proc/<pid>/mem` ranged read/write, the file-based fast path for
//! component C3. Falls back to the ptrace peek cache when this interface is
//! unavailable (older kernels, restricted environments) or the read fails.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::FileExt;

pub fn read_range(pid: i32, addr: u64, len: usize) -> io::Result<Vec<u8>> {
    let mut file = File::open(format!("/proc/{pid}/mem"))?;
    let mut buf = vec![0u8; len];
    file.seek(SeekFrom::Start(addr))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn write_range(pid: i32, addr: u64, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(format!("/proc/{pid}/mem"))?;
    file.seek(SeekFrom::Start(addr))?;
    file.write_all(data)
}

/// `pread`-style read that doesn't move a shared file cursor; used when
/// reading many disjoint regions against one open handle (initial scan).
pub fn pread_at(file: &File, addr: u64, buf: &mut [u8]) -> io::Result<usize> {
    file.read_at(buf, addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_known_buffer_via_proc_self_mem() {
        let buf = [0u8; 16];
        let pid = std::process::id() as i32;
        let addr = buf.as_ptr() as u64;

        write_range(pid, addr, b"deadbeefcafebabe").unwrap();
        let read_back = read_range(pid, addr, 16).unwrap();
        assert_eq!(&read_back, b"deadbeefcafebabe");
        assert_eq!(&buf, b"deadbeefcafebabe");
    }
}
