//! Shared helpers for integration tests.
//!
//! Real serial hardware is not assumed; a pseudoterminal pair stands in for
//! a loopback-connected device pair. The master side is driven with raw
//! descriptor I/O while the slave side is exercised through `SerialPort`.

#![cfg(target_os = "linux")]
#![allow(dead_code)]

use std::ffi::CStr;
use std::io;
use std::os::unix::io::RawFd;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ttyport::SerialPort;

/// The master end of a pseudoterminal pair. Closed on drop.
pub struct PtyMaster {
    fd: RawFd,
}

impl PtyMaster {
    /// Sends one byte toward the slave end.
    pub fn send(&self, byte: u8) {
        let len = unsafe { libc::write(self.fd, &byte as *const u8 as *const libc::c_void, 1) };
        assert_eq!(len, 1, "pty master write failed: {}", io::Error::last_os_error());
    }

    /// Receives one byte coming from the slave end (blocking).
    pub fn recv(&self) -> u8 {
        let mut byte = 0u8;
        let len = unsafe { libc::read(self.fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        assert_eq!(len, 1, "pty master read failed: {}", io::Error::last_os_error());
        byte
    }
}

impl Drop for PtyMaster {
    fn drop(&mut self) {
        unsafe { libc::close(self.fd) };
    }
}

/// Allocates a pseudoterminal pair, returning the master handle and the
/// slave device path.
pub fn pty_pair() -> (PtyMaster, PathBuf) {
    let fd = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
    assert!(fd >= 0, "posix_openpt failed: {}", io::Error::last_os_error());

    let master = PtyMaster { fd };
    unsafe {
        assert_eq!(libc::grantpt(fd), 0, "grantpt failed");
        assert_eq!(libc::unlockpt(fd), 0, "unlockpt failed");
    }

    let mut name = [0 as libc::c_char; 128];
    let rc = unsafe { libc::ptsname_r(fd, name.as_mut_ptr(), name.len()) };
    assert_eq!(rc, 0, "ptsname_r failed");

    let path = unsafe { CStr::from_ptr(name.as_ptr()) }
        .to_str()
        .expect("pty slave path is not valid UTF-8")
        .to_owned();

    (master, PathBuf::from(path))
}

/// Polls `is_data_available` until it reports true or `deadline` passes.
pub fn wait_for_data(port: &SerialPort, deadline: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if port.is_data_available().expect("availability query failed") {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

/// Installs a tracing subscriber for test output. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
