// src/bin/sensorlink_monitor.rs

//! Sensor link monitor.
//!
//! Opens the serial port of a sensor peer, ticks the telemetry link at the
//! refresh rate and logs every decoded snapshot, dropped frame and command.
//!
//! ```bash
//! sensorlink-monitor --list-ports
//! RUST_LOG=info sensorlink-monitor --port /dev/ttyACM0
//! sensorlink-monitor --port COM3 --config link.toml
//! ```

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use log::{error, info, warn};

use sensorlink::adapters::{list_ports, SerialPortTransport};
use sensorlink::common::timing;
use sensorlink::{LinkConfig, LinkEvent, Snapshot, TelemetryLink};

fn parse_args() -> ArgMatches {
    Command::new("sensorlink-monitor")
        .about("Poll a serial sensor peer and drive its LED bank")
        .arg(
            Arg::new("list-ports")
                .long("list-ports")
                .short('l')
                .help("List all available serial ports and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .help("Serial port of the peer")
                .value_name("PORT")
                .required_unless_present("list-ports"),
        )
        .arg(
            Arg::new("baud")
                .long("baud")
                .short('b')
                .help("Baud rate")
                .value_name("BAUD")
                .value_parser(clap::value_parser!(u32))
                .default_value("115200"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file overriding the default link configuration")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("rate-hz")
                .long("rate-hz")
                .help("Poll rate in Hz [default: 100]")
                .value_name("HZ")
                .value_parser(clap::value_parser!(u32).range(1..=1000)),
        )
        .get_matches()
}

fn load_config(path: Option<&String>) -> Result<LinkConfig> {
    let config = match path {
        None => LinkConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading config file {}", path))?;
            toml::from_str::<LinkConfig>(&text).with_context(|| format!("parsing config file {}", path))?
        }
    };
    Ok(config)
}

fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    println!("Available serial ports:");
    if ports.is_empty() {
        println!("  (none)");
    }
    for (name, description) in ports {
        println!("  {} - {}", name, description);
    }
    Ok(())
}

fn log_snapshot(snapshot: &Snapshot) {
    let mut line = String::new();
    for (field, channel) in snapshot.channels() {
        let value = match channel.reading() {
            Some(reading) => reading.value.to_string(),
            None => "-".into(),
        };
        line.push_str(&format!("{}={} ", field, value));
    }
    match snapshot.pot_classification() {
        Some(band) => info!("{}| pot band {}", line, band),
        None => info!("{}", line),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = parse_args();

    if matches.get_flag("list-ports") {
        return print_ports();
    }

    let port = matches
        .get_one::<String>("port")
        .ok_or_else(|| anyhow!("--port is required"))?;
    let baud = *matches.get_one::<u32>("baud").unwrap_or(&timing::DEFAULT_BAUD_RATE);
    let tick = match matches.get_one::<u32>("rate-hz") {
        Some(&hz) => Duration::from_secs(1) / hz,
        None => timing::POLL_INTERVAL,
    };
    let config = load_config(matches.get_one::<String>("config"))?;

    let mut link = TelemetryLink::new(config).context("invalid link configuration")?;
    match link.open(SerialPortTransport::open(port, baud)) {
        Ok(()) => {
            info!("connected to {} at {} baud", port, baud);
            thread::sleep(timing::PORT_SETTLE_TIME);
        }
        Err(e) => error!("{}; showing error indicator", e),
    }

    let start = Instant::now();
    loop {
        let result = link.poll(start.elapsed(), |event| match event {
            LinkEvent::Decoded(snapshot) => log_snapshot(snapshot),
            LinkEvent::FrameDropped(e) => warn!("dropped frame: {}", e),
            LinkEvent::CommandSent(command) => info!("sent {}={}", command.subject(), command.action()),
            LinkEvent::DispatchFailed(e) => warn!("command not sent: {}", e),
            LinkEvent::ErrorIndicator(on) => {
                if on {
                    error!("ERROR: serial link unavailable");
                }
            }
        });
        if let Err(e) = result {
            warn!("{}", e);
        }
        thread::sleep(tick);
    }
}
