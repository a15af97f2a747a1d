//! The serial port handle: lifecycle, line configuration, and byte I/O.

use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{PortError, Result};
use crate::settings::{BaudRate, CharSize, FlowControl, Parity, PortSettings, StopBits};
use crate::sys::{self, TtyHandle};

/// Sleep between availability polls in [`SerialPort::read_byte_timeout`].
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A handle to one POSIX serial (TTY) device.
///
/// The handle is bound to a device path at construction and starts closed.
/// [`open`](Self::open) acquires the descriptor, snapshots the device's line
/// settings, and applies the raw-mode baseline; [`close`](Self::close)
/// restores the snapshot and releases the descriptor. Dropping an open
/// handle closes it, so a descriptor can never leak.
///
/// All configuration accessors and the I/O operations require the handle to
/// be open and fail with [`PortError::NotOpen`] otherwise. The handle is
/// synchronous and single-owner; it performs no internal locking or
/// buffering.
///
/// ```no_run
/// use ttyport::{PortSettings, SerialPort};
///
/// let mut port = SerialPort::new("/dev/ttyUSB0");
/// port.open_with(&PortSettings::default())?;
/// port.write_byte(0x41)?;
/// let reply = port.read_byte()?;
/// port.close()?;
/// # Ok::<(), ttyport::PortError>(())
/// ```
pub struct SerialPort {
    /// Path to the device file; immutable after construction.
    path: PathBuf,
    /// `Some` exactly while the OS descriptor is held.
    tty: Option<TtyHandle>,
}

impl SerialPort {
    /// Creates a closed handle bound to `path`.
    ///
    /// No OS resource is touched until [`open`](Self::open) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tty: None,
        }
    }

    /// The device path this handle is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the device and applies the raw-mode baseline.
    ///
    /// The device is opened read/write, non-controlling, non-blocking; its
    /// current line settings are saved for restoration at close time; local
    /// and output processing are disabled, the receiver is enabled, modem
    /// control lines are ignored, and `VMIN`/`VTIME` are both zero so reads
    /// return immediately with whatever bytes are buffered.
    ///
    /// # Errors
    ///
    /// * [`PortError::AlreadyOpen`] if the handle is already open (state is
    ///   left unchanged).
    /// * [`PortError::OpenFailed`] if the OS open or the initial settings
    ///   fetch/apply fails.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(PortError::AlreadyOpen);
        }

        let handle = TtyHandle::open(&self.path)?;
        self.tty = Some(handle);
        debug!(path = %self.path.display(), "serial device opened");
        Ok(())
    }

    /// Opens the device, then applies `settings`.
    ///
    /// The parameters are applied in a fixed order: baud rate, character
    /// size, parity, stop bits, flow control. If a configuration step fails
    /// the port **stays open** with whatever configuration succeeded before
    /// the failure; no rollback is attempted.
    pub fn open_with(&mut self, settings: &PortSettings) -> Result<()> {
        self.open()?;
        self.set_baud_rate(settings.baud_rate)?;
        self.set_char_size(settings.char_size)?;
        self.set_parity(settings.parity)?;
        self.set_stop_bits(settings.stop_bits)?;
        self.set_flow_control(settings.flow_control)?;
        Ok(())
    }

    /// Whether the handle currently holds an open descriptor.
    ///
    /// Pure query; never fails.
    pub fn is_open(&self) -> bool {
        self.tty.is_some()
    }

    /// Restores the saved line settings and releases the descriptor.
    ///
    /// Restoration is best effort: a failure to write the saved settings
    /// back is logged as a warning but not surfaced, and the descriptor is
    /// closed regardless.
    ///
    /// # Errors
    ///
    /// [`PortError::NotOpen`] if the handle is already closed.
    pub fn close(&mut self) -> Result<()> {
        let handle = self.tty.take().ok_or(PortError::NotOpen)?;
        drop(handle);
        debug!(path = %self.path.display(), "serial device closed");
        Ok(())
    }

    /// Sets the baud rate for both input and output.
    ///
    /// Fails with [`PortError::UnsupportedBaudRate`] if the OS rejects the
    /// rate, or if the rate read back from the device after the write does
    /// not match the requested one.
    pub fn set_baud_rate(&mut self, baud_rate: BaudRate) -> Result<()> {
        let tty = self.tty()?;
        let mut termios = tty.termios()?;

        let speed = baud_rate.speed();
        sys::set_speed(&mut termios, speed)
            .map_err(|_| PortError::UnsupportedBaudRate(baud_rate.bits_per_second()))?;
        tty.set_termios(&termios)
            .map_err(|_| PortError::UnsupportedBaudRate(baud_rate.bits_per_second()))?;

        // The device may silently accept a rate it cannot produce; read the
        // settings back and compare.
        let applied = tty.termios()?;
        if sys::input_speed(&applied) != speed || sys::output_speed(&applied) != speed {
            return Err(PortError::UnsupportedBaudRate(baud_rate.bits_per_second()));
        }

        debug!(baud = baud_rate.bits_per_second(), "baud rate applied");
        Ok(())
    }

    /// Returns the device's current input baud rate.
    pub fn baud_rate(&self) -> Result<BaudRate> {
        let termios = self.tty()?.termios()?;
        BaudRate::from_speed(sys::input_speed(&termios))
    }

    /// Sets the number of data bits per character.
    pub fn set_char_size(&mut self, char_size: CharSize) -> Result<()> {
        let tty = self.tty()?;
        let mut termios = tty.termios()?;

        termios.c_cflag &= !libc::CSIZE;
        termios.c_cflag |= char_size.bits();

        tty.set_termios(&termios)
            .map_err(|err| PortError::invalid(err.to_string()))
    }

    /// Returns the current number of data bits per character.
    pub fn char_size(&self) -> Result<CharSize> {
        let termios = self.tty()?.termios()?;
        CharSize::from_cflag(termios.c_cflag)
    }

    /// Sets the parity checking mode.
    pub fn set_parity(&mut self, parity: Parity) -> Result<()> {
        let tty = self.tty()?;
        let mut termios = tty.termios()?;

        termios.c_cflag = parity.apply_to_cflag(termios.c_cflag);

        tty.set_termios(&termios)
            .map_err(|err| PortError::invalid(err.to_string()))
    }

    /// Returns the current parity checking mode.
    pub fn parity(&self) -> Result<Parity> {
        let termios = self.tty()?.termios()?;
        Ok(Parity::from_cflag(termios.c_cflag))
    }

    /// Sets the number of stop bits.
    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> Result<()> {
        let tty = self.tty()?;
        let mut termios = tty.termios()?;

        termios.c_cflag = stop_bits.apply_to_cflag(termios.c_cflag);

        tty.set_termios(&termios)
            .map_err(|err| PortError::invalid(err.to_string()))
    }

    /// Returns the current number of stop bits.
    pub fn stop_bits(&self) -> Result<StopBits> {
        let termios = self.tty()?.termios()?;
        Ok(StopBits::from_cflag(termios.c_cflag))
    }

    /// Sets the flow control mode.
    pub fn set_flow_control(&mut self, flow_control: FlowControl) -> Result<()> {
        let tty = self.tty()?;
        let mut termios = tty.termios()?;

        termios.c_cflag = flow_control.apply_to_cflag(termios.c_cflag);

        tty.set_termios(&termios)
            .map_err(|err| PortError::invalid(err.to_string()))
    }

    /// Returns the current flow control mode.
    pub fn flow_control(&self) -> Result<FlowControl> {
        let termios = self.tty()?.termios()?;
        Ok(FlowControl::from_cflag(termios.c_cflag))
    }

    /// Whether at least one byte is currently buffered for reading.
    pub fn is_data_available(&self) -> Result<bool> {
        Ok(self.tty()?.bytes_available()? > 0)
    }

    /// Blocks until a byte is available, then reads it.
    ///
    /// This busy-polls the driver's receive count with no sleep or yield and
    /// has no timeout: if no data ever arrives it spins indefinitely. For a
    /// bounded wait use [`read_byte_timeout`](Self::read_byte_timeout).
    pub fn read_byte(&mut self) -> Result<u8> {
        loop {
            if self.is_data_available()? {
                // The byte can still be gone by the time we read (e.g. the
                // driver flushed its queue); in that case keep waiting.
                if let Some(byte) = self.tty()?.read_one()? {
                    return Ok(byte);
                }
            }
        }
    }

    /// Like [`read_byte`](Self::read_byte), but yields between polls and
    /// gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`PortError::Timeout`] if no byte arrives within `timeout`.
    pub fn read_byte_timeout(&mut self, timeout: Duration) -> Result<u8> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_data_available()? {
                if let Some(byte) = self.tty()?.read_one()? {
                    return Ok(byte);
                }
            }
            if Instant::now() >= deadline {
                return Err(PortError::Timeout(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Writes exactly one byte, unbuffered.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.tty()?.write_one(byte)?;
        Ok(())
    }

    fn tty(&self) -> Result<&TtyHandle> {
        self.tty.as_ref().ok_or(PortError::NotOpen)
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        if self.tty.take().is_some() {
            debug!(path = %self.path.display(), "serial device closed on drop");
        }
    }
}

impl fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}
