//! Object-oriented access to POSIX serial (TTY) devices.
//!
//! This crate is a thin, synchronous wrapper over the operating system's
//! terminal-control interface (`open`, `tcgetattr`, `tcsetattr`, `ioctl`,
//! `read`, `write`). A [`SerialPort`] owns at most one open descriptor at a
//! time, snapshots the device's line settings at open time and restores them
//! at close time, and exposes byte-level reads and writes with
//! blocking-by-polling semantics. There is no internal threading, buffering,
//! or async I/O.
//!
//! # Modules
//!
//! - `error`: the [`PortError`] taxonomy
//! - `settings`: line parameter enumerations and the [`PortSettings`] aggregate
//! - `port`: the [`SerialPort`] handle
//!
//! # Example
//!
//! ```no_run
//! use ttyport::{BaudRate, PortSettings, SerialPort};
//!
//! let mut port = SerialPort::new("/dev/ttyUSB0");
//! port.open_with(&PortSettings {
//!     baud_rate: BaudRate::Baud115200,
//!     ..PortSettings::default()
//! })?;
//!
//! port.write_byte(b'?')?;
//! while !port.is_data_available()? {
//!     // caller-controlled wait
//! }
//! let answer = port.read_byte()?;
//! # let _ = answer;
//! # Ok::<(), ttyport::PortError>(())
//! ```

#[cfg(not(unix))]
compile_error!("ttyport wraps the POSIX terminal-control interface and only supports Unix targets");

pub mod error;
pub mod port;
pub mod settings;

mod sys;

// Re-export commonly used types for convenience
pub use error::{PortError, Result};
pub use port::SerialPort;
pub use settings::{BaudRate, CharSize, FlowControl, Parity, PortSettings, StopBits};
