// src/adapters/serialport.rs

use std::io::{self, Read, Write};
use std::string::String;
use std::vec::Vec;

use log::{debug, trace};

use crate::common::{hal_traits::Transport, timing};

/// Errors from the host serial port.
#[derive(Debug, thiserror::Error)]
pub enum SerialTransportError {
    #[error("Serial port error: {0}")]
    Port(#[from] ::serialport::Error),
    #[error("Serial I/O error: {0}")]
    Io(#[from] io::Error),
}

/// [`Transport`] over an OS serial port, 8N1 without flow control.
pub struct SerialPortTransport {
    port: Box<dyn ::serialport::SerialPort>,
}

impl core::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("port", &self.port.name())
            .finish()
    }
}

impl SerialPortTransport {
    /// Opens `path` at `baud_rate`.
    ///
    /// Most boards reset when the port opens; callers should wait
    /// [`timing::PORT_SETTLE_TIME`] before expecting frames.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, SerialTransportError> {
        let port = ::serialport::new(path, baud_rate)
            .data_bits(::serialport::DataBits::Eight)
            .parity(::serialport::Parity::None)
            .stop_bits(::serialport::StopBits::One)
            .flow_control(::serialport::FlowControl::None)
            .timeout(timing::PORT_READ_TIMEOUT)
            .open()?;
        debug!("opened {} at {} baud", path, baud_rate);
        Ok(Self { port })
    }

    /// Wraps an already opened port.
    pub fn from_port(port: Box<dyn ::serialport::SerialPort>) -> Self {
        Self { port }
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialPortTransport {
    type Error = SerialTransportError;

    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        let pending = self
            .port
            .bytes_to_read()
            .map_err(|e| nb::Error::Other(SerialTransportError::Port(e)))? as usize;
        if pending == 0 || buf.is_empty() {
            return Err(nb::Error::WouldBlock);
        }

        let want = pending.min(buf.len());
        match self.port.read(&mut buf[..want]) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(n) => {
                trace!("read {} of {} pending bytes", n, pending);
                Ok(n)
            }
            Err(e) if is_transient(&e) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(SerialTransportError::Io(e))),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Errors that only mean "nothing to read right now".
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Names of the serial ports the OS reports, with a short description.
pub fn list_ports() -> Result<Vec<(String, String)>, SerialTransportError> {
    let ports = ::serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let description = describe_port_type(&p.port_type);
            (p.port_name, description)
        })
        .collect())
}

fn describe_port_type(port_type: &::serialport::SerialPortType) -> String {
    match port_type {
        ::serialport::SerialPortType::UsbPort(info) => {
            let mut s = std::format!("USB {:04x}:{:04x}", info.vid, info.pid);
            if let Some(product) = &info.product {
                s.push(' ');
                s.push_str(product);
            }
            s
        }
        ::serialport::SerialPortType::BluetoothPort => "Bluetooth".into(),
        ::serialport::SerialPortType::PciPort => "PCI".into(),
        ::serialport::SerialPortType::Unknown => "Unknown".into(),
    }
}
