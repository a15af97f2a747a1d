//! End-to-end tests over a pseudoterminal pair.
//!
//! The pty slave is opened through `SerialPort`; the master side plays the
//! role of the peer device on a loopback-connected link.

#![cfg(target_os = "linux")]

mod common;

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serial_test::serial;

use common::{init_tracing, pty_pair, wait_for_data};
use ttyport::{
    BaudRate, CharSize, FlowControl, Parity, PortError, PortSettings, SerialPort, StopBits,
};

const DATA_DEADLINE: Duration = Duration::from_secs(2);

#[test]
#[serial]
fn open_close_cycle_tracks_is_open() {
    init_tracing();
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);

    assert!(!port.is_open());
    port.open().unwrap();
    assert!(port.is_open());
    port.close().unwrap();
    assert!(!port.is_open());

    // A second cycle on the same handle works.
    port.open().unwrap();
    assert!(port.is_open());
    port.close().unwrap();
    assert!(!port.is_open());
}

#[test]
#[serial]
fn reopening_an_open_port_fails_and_leaves_it_open() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);

    port.open().unwrap();
    assert!(matches!(port.open(), Err(PortError::AlreadyOpen)));
    assert!(port.is_open());
}

#[test]
#[serial]
fn closing_a_closed_port_fails_with_not_open() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);

    port.open().unwrap();
    port.close().unwrap();
    assert!(matches!(port.close(), Err(PortError::NotOpen)));
}

#[test]
#[serial]
fn char_size_round_trips_for_every_legal_value() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for size in [
        CharSize::Bits5,
        CharSize::Bits6,
        CharSize::Bits7,
        CharSize::Bits8,
    ] {
        port.set_char_size(size).unwrap();
        assert_eq!(port.char_size().unwrap(), size);
    }
}

#[test]
#[serial]
fn parity_round_trips_for_every_legal_value() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for parity in [Parity::Even, Parity::Odd, Parity::None] {
        port.set_parity(parity).unwrap();
        assert_eq!(port.parity().unwrap(), parity);
    }
}

#[test]
#[serial]
fn stop_bits_round_trip_for_every_legal_value() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for stop_bits in [StopBits::Two, StopBits::One] {
        port.set_stop_bits(stop_bits).unwrap();
        assert_eq!(port.stop_bits().unwrap(), stop_bits);
    }
}

#[test]
#[serial]
fn flow_control_round_trips_for_every_legal_value() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for flow in [FlowControl::Hardware, FlowControl::None] {
        port.set_flow_control(flow).unwrap();
        assert_eq!(port.flow_control().unwrap(), flow);
    }
}

#[test]
#[serial]
fn baud_rate_round_trips_on_a_pty() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for rate in [
        BaudRate::Baud50,
        BaudRate::Baud9600,
        BaudRate::Baud115200,
        BaudRate::Baud230400,
    ] {
        port.set_baud_rate(rate).unwrap();
        assert_eq!(port.baud_rate().unwrap(), rate);
    }
}

#[test]
#[serial]
fn setters_preserve_unrelated_settings() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    port.set_baud_rate(BaudRate::Baud19200).unwrap();
    port.set_parity(Parity::Odd).unwrap();
    port.set_char_size(CharSize::Bits7).unwrap();
    port.set_stop_bits(StopBits::Two).unwrap();

    // Each later write must not disturb what came before.
    assert_eq!(port.baud_rate().unwrap(), BaudRate::Baud19200);
    assert_eq!(port.parity().unwrap(), Parity::Odd);
    assert_eq!(port.char_size().unwrap(), CharSize::Bits7);
    assert_eq!(port.stop_bits().unwrap(), StopBits::Two);
}

#[test]
#[serial]
fn loopback_scenario_delivers_the_written_byte() {
    init_tracing();
    let (master, path) = pty_pair();

    // 9600 baud, 8 data bits, no parity, 1 stop bit, no flow control.
    let mut port = SerialPort::new(&path);
    port.open_with(&PortSettings::default()).unwrap();

    assert!(!port.is_data_available().unwrap());
    master.send(0x41);
    assert!(wait_for_data(&port, DATA_DEADLINE), "byte never arrived");
    assert_eq!(port.read_byte().unwrap(), 0x41);
    assert!(!port.is_data_available().unwrap());
}

#[test]
#[serial]
fn written_bytes_reach_the_peer_end() {
    let (master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    for byte in [0x00, 0x41, 0xff] {
        port.write_byte(byte).unwrap();
        assert_eq!(master.recv(), byte);
    }
}

#[test]
#[serial]
fn bounded_read_times_out_without_data() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    let timeout = Duration::from_millis(50);
    let start = Instant::now();
    let err = port.read_byte_timeout(timeout).unwrap_err();
    assert!(start.elapsed() >= timeout);
    assert!(matches!(err, PortError::Timeout(t) if t == timeout));
}

#[test]
#[serial]
fn bounded_read_returns_data_that_arrives_in_time() {
    let (master, path) = pty_pair();
    let mut port = SerialPort::new(&path);
    port.open().unwrap();

    master.send(0x5a);
    let byte = port.read_byte_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(byte, 0x5a);
}

#[test]
#[serial]
fn dropping_an_open_port_releases_the_descriptor() {
    let (_master, path) = pty_pair();

    {
        let mut port = SerialPort::new(&path);
        port.open().unwrap();
        // No explicit close.
    }

    // If the descriptor leaked, the settings snapshot would be gone too; a
    // fresh open on the same path must succeed immediately.
    let mut port = SerialPort::new(&path);
    port.open().unwrap();
    port.close().unwrap();
}

#[test]
#[serial]
fn full_open_applies_all_parameters() {
    let (_master, path) = pty_pair();
    let mut port = SerialPort::new(&path);

    let settings = PortSettings {
        baud_rate: BaudRate::Baud38400,
        char_size: CharSize::Bits7,
        parity: Parity::Even,
        stop_bits: StopBits::Two,
        flow_control: FlowControl::Hardware,
    };
    port.open_with(&settings).unwrap();

    assert_eq!(port.baud_rate().unwrap(), settings.baud_rate);
    assert_eq!(port.char_size().unwrap(), settings.char_size);
    assert_eq!(port.parity().unwrap(), settings.parity);
    assert_eq!(port.stop_bits().unwrap(), settings.stop_bits);
    assert_eq!(port.flow_control().unwrap(), settings.flow_control);
}
