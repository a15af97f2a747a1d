//! Serial line configuration: closed sets of legal parameter values and
//! their mapping onto the OS termios constants.
//!
//! Each enumeration maps 1:1 onto a `libc` symbolic constant. The mapping
//! toward the OS is total; mapping back from a raw constant fails explicitly
//! for values outside the legal set.

use libc::{speed_t, tcflag_t};
use serde::{Deserialize, Serialize};

use crate::error::{PortError, Result};

/// Serial port baud rates.
///
/// The set is closed: only the standard POSIX rates (plus the Linux
/// high-speed rates on Linux targets) are representable, and raw speed
/// constants outside this set are rejected when read back from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaudRate {
    Baud50,
    Baud75,
    Baud110,
    Baud134,
    Baud150,
    Baud200,
    Baud300,
    Baud600,
    Baud1200,
    Baud1800,
    Baud2400,
    Baud4800,
    Baud9600,
    Baud19200,
    Baud38400,
    Baud57600,
    Baud115200,
    Baud230400,
    #[cfg(target_os = "linux")]
    Baud460800,
    #[cfg(target_os = "linux")]
    Baud500000,
    #[cfg(target_os = "linux")]
    Baud576000,
    #[cfg(target_os = "linux")]
    Baud921600,
    #[cfg(target_os = "linux")]
    Baud1000000,
    #[cfg(target_os = "linux")]
    Baud1152000,
    #[cfg(target_os = "linux")]
    Baud1500000,
    #[cfg(target_os = "linux")]
    Baud2000000,
    #[cfg(target_os = "linux")]
    Baud2500000,
    #[cfg(target_os = "linux")]
    Baud3000000,
    #[cfg(target_os = "linux")]
    Baud3500000,
    #[cfg(target_os = "linux")]
    Baud4000000,
}

impl BaudRate {
    /// The termios speed constant for this rate.
    pub fn speed(self) -> speed_t {
        match self {
            Self::Baud50 => libc::B50,
            Self::Baud75 => libc::B75,
            Self::Baud110 => libc::B110,
            Self::Baud134 => libc::B134,
            Self::Baud150 => libc::B150,
            Self::Baud200 => libc::B200,
            Self::Baud300 => libc::B300,
            Self::Baud600 => libc::B600,
            Self::Baud1200 => libc::B1200,
            Self::Baud1800 => libc::B1800,
            Self::Baud2400 => libc::B2400,
            Self::Baud4800 => libc::B4800,
            Self::Baud9600 => libc::B9600,
            Self::Baud19200 => libc::B19200,
            Self::Baud38400 => libc::B38400,
            Self::Baud57600 => libc::B57600,
            Self::Baud115200 => libc::B115200,
            Self::Baud230400 => libc::B230400,
            #[cfg(target_os = "linux")]
            Self::Baud460800 => libc::B460800,
            #[cfg(target_os = "linux")]
            Self::Baud500000 => libc::B500000,
            #[cfg(target_os = "linux")]
            Self::Baud576000 => libc::B576000,
            #[cfg(target_os = "linux")]
            Self::Baud921600 => libc::B921600,
            #[cfg(target_os = "linux")]
            Self::Baud1000000 => libc::B1000000,
            #[cfg(target_os = "linux")]
            Self::Baud1152000 => libc::B1152000,
            #[cfg(target_os = "linux")]
            Self::Baud1500000 => libc::B1500000,
            #[cfg(target_os = "linux")]
            Self::Baud2000000 => libc::B2000000,
            #[cfg(target_os = "linux")]
            Self::Baud2500000 => libc::B2500000,
            #[cfg(target_os = "linux")]
            Self::Baud3000000 => libc::B3000000,
            #[cfg(target_os = "linux")]
            Self::Baud3500000 => libc::B3500000,
            #[cfg(target_os = "linux")]
            Self::Baud4000000 => libc::B4000000,
        }
    }

    /// Maps a raw termios speed constant back into the legal set.
    ///
    /// Fails with `UnsupportedBaudRate` for constants outside the set.
    pub fn from_speed(speed: speed_t) -> Result<Self> {
        let rate = match speed {
            libc::B50 => Self::Baud50,
            libc::B75 => Self::Baud75,
            libc::B110 => Self::Baud110,
            libc::B134 => Self::Baud134,
            libc::B150 => Self::Baud150,
            libc::B200 => Self::Baud200,
            libc::B300 => Self::Baud300,
            libc::B600 => Self::Baud600,
            libc::B1200 => Self::Baud1200,
            libc::B1800 => Self::Baud1800,
            libc::B2400 => Self::Baud2400,
            libc::B4800 => Self::Baud4800,
            libc::B9600 => Self::Baud9600,
            libc::B19200 => Self::Baud19200,
            libc::B38400 => Self::Baud38400,
            libc::B57600 => Self::Baud57600,
            libc::B115200 => Self::Baud115200,
            libc::B230400 => Self::Baud230400,
            #[cfg(target_os = "linux")]
            libc::B460800 => Self::Baud460800,
            #[cfg(target_os = "linux")]
            libc::B500000 => Self::Baud500000,
            #[cfg(target_os = "linux")]
            libc::B576000 => Self::Baud576000,
            #[cfg(target_os = "linux")]
            libc::B921600 => Self::Baud921600,
            #[cfg(target_os = "linux")]
            libc::B1000000 => Self::Baud1000000,
            #[cfg(target_os = "linux")]
            libc::B1152000 => Self::Baud1152000,
            #[cfg(target_os = "linux")]
            libc::B1500000 => Self::Baud1500000,
            #[cfg(target_os = "linux")]
            libc::B2000000 => Self::Baud2000000,
            #[cfg(target_os = "linux")]
            libc::B2500000 => Self::Baud2500000,
            #[cfg(target_os = "linux")]
            libc::B3000000 => Self::Baud3000000,
            #[cfg(target_os = "linux")]
            libc::B3500000 => Self::Baud3500000,
            #[cfg(target_os = "linux")]
            libc::B4000000 => Self::Baud4000000,
            other => return Err(PortError::UnsupportedBaudRate(other as u32)),
        };
        Ok(rate)
    }

    /// The signaling rate in bits per second.
    pub fn bits_per_second(self) -> u32 {
        match self {
            Self::Baud50 => 50,
            Self::Baud75 => 75,
            Self::Baud110 => 110,
            Self::Baud134 => 134,
            Self::Baud150 => 150,
            Self::Baud200 => 200,
            Self::Baud300 => 300,
            Self::Baud600 => 600,
            Self::Baud1200 => 1200,
            Self::Baud1800 => 1800,
            Self::Baud2400 => 2400,
            Self::Baud4800 => 4800,
            Self::Baud9600 => 9600,
            Self::Baud19200 => 19_200,
            Self::Baud38400 => 38_400,
            Self::Baud57600 => 57_600,
            Self::Baud115200 => 115_200,
            Self::Baud230400 => 230_400,
            #[cfg(target_os = "linux")]
            Self::Baud460800 => 460_800,
            #[cfg(target_os = "linux")]
            Self::Baud500000 => 500_000,
            #[cfg(target_os = "linux")]
            Self::Baud576000 => 576_000,
            #[cfg(target_os = "linux")]
            Self::Baud921600 => 921_600,
            #[cfg(target_os = "linux")]
            Self::Baud1000000 => 1_000_000,
            #[cfg(target_os = "linux")]
            Self::Baud1152000 => 1_152_000,
            #[cfg(target_os = "linux")]
            Self::Baud1500000 => 1_500_000,
            #[cfg(target_os = "linux")]
            Self::Baud2000000 => 2_000_000,
            #[cfg(target_os = "linux")]
            Self::Baud2500000 => 2_500_000,
            #[cfg(target_os = "linux")]
            Self::Baud3000000 => 3_000_000,
            #[cfg(target_os = "linux")]
            Self::Baud3500000 => 3_500_000,
            #[cfg(target_os = "linux")]
            Self::Baud4000000 => 4_000_000,
        }
    }
}

/// Number of bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharSize {
    Bits5,
    Bits6,
    Bits7,
    Bits8,
}

impl CharSize {
    /// The `CSIZE`-field bits for this character size.
    pub fn bits(self) -> tcflag_t {
        match self {
            Self::Bits5 => libc::CS5,
            Self::Bits6 => libc::CS6,
            Self::Bits7 => libc::CS7,
            Self::Bits8 => libc::CS8,
        }
    }

    /// Reads the character size out of a control-flag word.
    ///
    /// Fails with `InvalidArgument` if the `CSIZE` field holds bits that do
    /// not correspond to a legal size on this platform.
    pub fn from_cflag(cflag: tcflag_t) -> Result<Self> {
        match cflag & libc::CSIZE {
            libc::CS5 => Ok(Self::Bits5),
            libc::CS6 => Ok(Self::Bits6),
            libc::CS7 => Ok(Self::Bits7),
            libc::CS8 => Ok(Self::Bits8),
            other => Err(PortError::invalid(format!(
                "unmapped character size bits: {other:#x}"
            ))),
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Parity {
    /// Reads the parity mode out of a control-flag word.
    ///
    /// The enable flag (`PARENB`) is inspected first; only then does the odd
    /// flag (`PARODD`) decide between odd and even.
    pub fn from_cflag(cflag: tcflag_t) -> Self {
        if cflag & libc::PARENB == 0 {
            Self::None
        } else if cflag & libc::PARODD != 0 {
            Self::Odd
        } else {
            Self::Even
        }
    }

    /// Applies this parity mode to a control-flag word.
    pub fn apply_to_cflag(self, cflag: tcflag_t) -> tcflag_t {
        match self {
            Self::None => cflag & !libc::PARENB,
            Self::Odd => cflag | libc::PARENB | libc::PARODD,
            Self::Even => (cflag | libc::PARENB) & !libc::PARODD,
        }
    }
}

/// Number of stop bits transmitted after every character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub fn from_cflag(cflag: tcflag_t) -> Self {
        if cflag & libc::CSTOPB != 0 {
            Self::Two
        } else {
            Self::One
        }
    }

    pub fn apply_to_cflag(self, cflag: tcflag_t) -> tcflag_t {
        match self {
            Self::One => cflag & !libc::CSTOPB,
            Self::Two => cflag | libc::CSTOPB,
        }
    }
}

/// Flow control modes.
///
/// Only hardware (RTS/CTS) flow control is modeled; software XON/XOFF flow
/// control is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowControl {
    None,
    Hardware,
}

impl FlowControl {
    pub fn from_cflag(cflag: tcflag_t) -> Self {
        if cflag & libc::CRTSCTS != 0 {
            Self::Hardware
        } else {
            Self::None
        }
    }

    pub fn apply_to_cflag(self, cflag: tcflag_t) -> tcflag_t {
        match self {
            Self::None => cflag & !libc::CRTSCTS,
            Self::Hardware => cflag | libc::CRTSCTS,
        }
    }
}

/// A full set of line parameters, applied in one call by
/// [`SerialPort::open_with`](crate::SerialPort::open_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Baud rate (bits per second).
    pub baud_rate: BaudRate,

    /// Number of data bits per character.
    pub char_size: CharSize,

    /// Parity checking mode.
    pub parity: Parity,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Flow control mode.
    pub flow_control: FlowControl,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::Baud9600,
            char_size: CharSize::Bits8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}
