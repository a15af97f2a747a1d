//! Raw termios/file-descriptor plumbing for the POSIX serial port handle.
//!
//! `TtyHandle` is the hidden implementation object owned by
//! [`SerialPort`](crate::SerialPort): one raw descriptor plus the line
//! settings captured at open time. Dropping the handle restores the saved
//! settings (best effort) and closes the descriptor, so a handle can never
//! leak an fd. All `unsafe` in the crate lives in this module.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

use libc::{c_int, c_void, speed_t};
use tracing::warn;

use crate::error::{PortError, Result};

/// One open TTY descriptor and the settings snapshot taken when it was
/// opened.
pub(crate) struct TtyHandle {
    fd: RawFd,
    saved: libc::termios,
}

impl TtyHandle {
    /// Opens the device and puts the line into the baseline raw state.
    ///
    /// The device is opened read/write, non-controlling, non-blocking. The
    /// current settings are snapshotted before any modification, then the
    /// baseline is applied: local and output processing fully disabled,
    /// receiver enabled, modem control lines ignored, and `VMIN`/`VTIME`
    /// both zero so a read returns immediately with whatever is buffered.
    /// SIGIO/SIGURG delivery for the descriptor is bound to this process.
    ///
    /// Every failure is reported as `OpenFailed` with the OS error text; the
    /// descriptor opened so far is released before returning.
    pub fn open(path: &Path) -> Result<Self> {
        let cstr = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| PortError::invalid("device path contains a NUL byte"))?;

        let fd = unsafe { libc::open(cstr.as_ptr(), libc::O_RDWR | libc::O_NOCTTY | libc::O_NONBLOCK) };
        if fd < 0 {
            return Err(PortError::open_failed(io::Error::last_os_error()));
        }

        // Snapshot the settings before touching them; they are restored when
        // the handle is dropped.
        let saved = match fetch(fd) {
            Ok(termios) => termios,
            Err(err) => {
                unsafe { libc::close(fd) };
                return Err(PortError::open_failed(err));
            }
        };

        // From here on, dropping `handle` restores the snapshot and closes
        // the fd, covering the remaining failure paths.
        let handle = TtyHandle { fd, saved };

        let mut termios = saved;
        termios.c_lflag = 0;
        termios.c_oflag = 0;
        termios.c_cflag |= libc::CREAD | libc::CLOCAL;
        termios.c_cc[libc::VMIN] = 0;
        termios.c_cc[libc::VTIME] = 0;

        if let Err(err) = apply(fd, &termios) {
            return Err(PortError::open_failed(err));
        }

        if unsafe { libc::fcntl(fd, libc::F_SETOWN, libc::getpid()) } < 0 {
            return Err(PortError::open_failed(io::Error::last_os_error()));
        }

        Ok(handle)
    }

    /// Fetches the live line settings.
    pub fn termios(&self) -> io::Result<libc::termios> {
        fetch(self.fd)
    }

    /// Writes line settings back to the device.
    pub fn set_termios(&self, termios: &libc::termios) -> io::Result<()> {
        apply(self.fd, termios)
    }

    /// Number of bytes currently buffered for reading.
    pub fn bytes_available(&self) -> io::Result<usize> {
        let mut count: c_int = 0;
        if unsafe { libc::ioctl(self.fd, libc::FIONREAD, &mut count) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(count as usize)
    }

    /// Reads at most one byte. `None` means no byte was available.
    pub fn read_one(&self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let len = unsafe { libc::read(self.fd, &mut byte as *mut u8 as *mut c_void, 1) };
        match len {
            n if n < 0 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::WouldBlock {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
            0 => Ok(None),
            _ => Ok(Some(byte)),
        }
    }

    /// Writes exactly one byte.
    pub fn write_one(&self, byte: u8) -> io::Result<()> {
        let len = unsafe { libc::write(self.fd, &byte as *const u8 as *const c_void, 1) };
        match len {
            n if n < 0 => Err(io::Error::last_os_error()),
            0 => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "wrote zero bytes to serial device",
            )),
            _ => Ok(()),
        }
    }
}

impl Drop for TtyHandle {
    fn drop(&mut self) {
        // Restoration is best effort; failure must not escape a destructor.
        if let Err(err) = apply(self.fd, &self.saved) {
            warn!(fd = self.fd, error = %err, "failed to restore saved line settings");
        }
        unsafe { libc::close(self.fd) };
    }
}

fn fetch(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios = unsafe { mem::zeroed::<libc::termios>() };
    if unsafe { libc::tcgetattr(fd, &mut termios) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn apply(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Sets both the input and output speed fields of a settings structure.
pub(crate) fn set_speed(termios: &mut libc::termios, speed: speed_t) -> io::Result<()> {
    if unsafe { libc::cfsetispeed(termios, speed) } < 0
        || unsafe { libc::cfsetospeed(termios, speed) } < 0
    {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Reads the input speed field of a settings structure.
pub(crate) fn input_speed(termios: &libc::termios) -> speed_t {
    unsafe { libc::cfgetispeed(termios) }
}

/// Reads the output speed field of a settings structure.
pub(crate) fn output_speed(termios: &libc::termios) -> speed_t {
    unsafe { libc::cfgetospeed(termios) }
}
