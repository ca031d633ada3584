// src/adapters/mod.rs

//! Concrete [`Transport`](crate::common::Transport) implementations for host platforms.

pub mod serialport;

pub use self::serialport::{list_ports, SerialPortTransport, SerialTransportError};
