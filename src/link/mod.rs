// src/link/mod.rs

//! Host side of the telemetry link.
//!
//! [`TelemetryLink`] owns the transport and is driven by the caller's
//! periodic tick: every call to [`TelemetryLink::poll`] drains the bytes
//! that are already pending, decodes each complete line in arrival order,
//! updates the [`Snapshot`] and lets the [`Dispatcher`] react to the pot
//! band. When nothing is pending, `poll` returns at once.

pub mod dispatcher;
pub mod line_buffer;
pub mod snapshot;

pub use dispatcher::Dispatcher;
pub use line_buffer::{Line, LineBuffer, LINE_CAPACITY};
pub use snapshot::{ChannelReading, ChannelState, Snapshot};

use core::fmt::Debug;
use core::time::Duration;

use log::{debug, error, trace, warn};

use crate::common::{
    band::Classification,
    config::{ConfigError, LinkConfig},
    error::{FrameError, LinkError},
    frame::{decode_line, OutboundCommand},
    hal_traits::Transport,
};

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 64;
/// Reads per poll before yielding back to the scheduler, even if more is pending.
const MAX_READS_PER_POLL: usize = 16;

/// Connection state of the link.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LinkState {
    /// Transport not opened yet.
    Disconnected,
    /// Transport open, frames are being polled.
    Connected,
    /// Transport failed to open or kept failing reads. Terminal.
    Erroring,
}

/// Counters surfaced for observability.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkStats {
    pub frames_decoded: u32,
    pub frames_dropped: u32,
    pub commands_sent: u32,
    pub read_faults: u32,
}

/// Things that happened during one poll, reported in order.
#[derive(Debug)]
pub enum LinkEvent<'a, E: Debug> {
    /// A frame decoded; the snapshot reflects it.
    Decoded(&'a Snapshot),
    /// A frame was dropped. Previously held readings are unchanged.
    FrameDropped(FrameError),
    /// The pot band changed and a command reached the transport.
    CommandSent(&'a OutboundCommand),
    /// Sending a command failed; it will be retried on the next decode.
    DispatchFailed(LinkError<E>),
    /// The error indicator flipped.
    ErrorIndicator(bool),
}

/// Telemetry link over a transport `T`.
#[derive(Debug)]
pub struct TelemetryLink<T: Transport> {
    config: LinkConfig,
    state: LinkState,
    transport: Option<T>,
    lines: LineBuffer,
    snapshot: Snapshot,
    dispatcher: Dispatcher,
    stats: LinkStats,
    consecutive_read_faults: u8,
    last_toggle: Option<Duration>,
}

impl<T: Transport> TelemetryLink<T> {
    /// Creates a link in the `Disconnected` state.
    ///
    /// Fails when `config` does not pass [`LinkConfig::validate`].
    pub fn new(config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher = Dispatcher::new(config.subject.clone());
        Ok(Self {
            config,
            state: LinkState::Disconnected,
            transport: None,
            lines: LineBuffer::new(),
            snapshot: Snapshot::new(),
            dispatcher,
            stats: LinkStats::default(),
            consecutive_read_faults: 0,
            last_toggle: None,
        })
    }

    /// Creates a link already connected to `transport`.
    pub fn with_transport(config: LinkConfig, transport: T) -> Result<Self, ConfigError> {
        let mut link = Self::new(config)?;
        link.transport = Some(transport);
        link.state = LinkState::Connected;
        Ok(link)
    }

    /// Takes the outcome of opening the transport.
    ///
    /// `Ok` connects the link. `Err` moves it to `Erroring` for the rest of
    /// the process lifetime and is handed back wrapped as `TransportOpen`.
    pub fn open<E: Debug>(&mut self, opened: Result<T, E>) -> Result<(), LinkError<E>> {
        if self.state != LinkState::Disconnected {
            return Err(LinkError::AlreadyOpened);
        }
        match opened {
            Ok(transport) => {
                debug!("transport open");
                self.transport = Some(transport);
                self.state = LinkState::Connected;
                Ok(())
            }
            Err(e) => {
                error!("transport open failed: {:?}", e);
                self.enter_erroring();
                Err(LinkError::TransportOpen(e))
            }
        }
    }

    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[inline]
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs one cooperative cycle at monotonic time `now`.
    ///
    /// Connected: drains pending bytes and processes complete lines, calling
    /// `on_event` for each outcome in arrival order. Erroring: toggles the
    /// error indicator once per blink period, without touching the transport.
    ///
    /// Returns `Err(LinkError::Io)` on a read fault, after every byte read
    /// before it has been processed. Once `max_read_faults` faults happen in
    /// a row the link is `Erroring` for good.
    pub fn poll<F>(&mut self, now: Duration, mut on_event: F) -> Result<(), LinkError<T::Error>>
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        match self.state {
            LinkState::Disconnected => Err(LinkError::NotConnected),
            LinkState::Erroring => {
                self.blink(now, &mut on_event);
                Ok(())
            }
            LinkState::Connected => self.drain(&mut on_event),
        }
    }

    fn drain<F>(&mut self, on_event: &mut F) -> Result<(), LinkError<T::Error>>
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        let mut chunk = [0u8; READ_CHUNK];
        for _ in 0..MAX_READS_PER_POLL {
            let Some(transport) = self.transport.as_mut() else {
                return Err(LinkError::NotConnected);
            };
            let n = match transport.read_available(&mut chunk) {
                Ok(0) | Err(nb::Error::WouldBlock) => return Ok(()),
                Ok(n) => n.min(READ_CHUNK),
                Err(nb::Error::Other(e)) => return Err(self.read_fault(e)),
            };
            self.consecutive_read_faults = 0;
            trace!("read {} bytes", n);

            for &byte in &chunk[..n] {
                match self.lines.push(byte) {
                    Some(Ok(line)) => self.handle_line(&line, on_event),
                    Some(Err(e)) => self.drop_frame(e, on_event),
                    None => {}
                }
            }
        }
        Ok(())
    }

    fn handle_line<F>(&mut self, line: &str, on_event: &mut F)
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        if line.is_empty() {
            return;
        }

        let readings = match decode_line(line).and_then(|frame| frame.decode()) {
            Ok(readings) => readings,
            Err(e) => return self.drop_frame(e, on_event),
        };

        let pot = self.snapshot.apply(&readings, &self.config);
        self.stats.frames_decoded = self.stats.frames_decoded.saturating_add(1);
        debug!("decoded {:?}", readings);
        on_event(LinkEvent::Decoded(&self.snapshot));

        self.dispatch(pot, on_event);
    }

    fn dispatch<F>(&mut self, pot: Classification, on_event: &mut F)
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        match self.dispatcher.maybe_send(pot, transport) {
            Ok(Some(command)) => {
                self.stats.commands_sent = self.stats.commands_sent.saturating_add(1);
                on_event(LinkEvent::CommandSent(&command));
            }
            Ok(None) => {}
            Err(e) => {
                warn!("command dispatch failed: {:?}", e);
                on_event(LinkEvent::DispatchFailed(e));
            }
        }
    }

    fn drop_frame<F>(&mut self, e: FrameError, on_event: &mut F)
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        self.stats.frames_dropped = self.stats.frames_dropped.saturating_add(1);
        warn!("frame dropped: {}", e);
        on_event(LinkEvent::FrameDropped(e));
    }

    fn read_fault(&mut self, e: T::Error) -> LinkError<T::Error> {
        self.stats.read_faults = self.stats.read_faults.saturating_add(1);
        self.consecutive_read_faults = self.consecutive_read_faults.saturating_add(1);
        warn!(
            "read fault {}/{}: {:?}",
            self.consecutive_read_faults, self.config.max_read_faults, e
        );
        if self.consecutive_read_faults >= self.config.max_read_faults.max(1) {
            error!("giving up on transport after {} consecutive read faults", self.consecutive_read_faults);
            self.enter_erroring();
        }
        LinkError::Io(e)
    }

    fn enter_erroring(&mut self) {
        self.state = LinkState::Erroring;
        self.transport = None;
        self.lines.clear();
        self.snapshot.set_link_erroring();
    }

    fn blink<F>(&mut self, now: Duration, on_event: &mut F)
    where
        F: FnMut(LinkEvent<'_, T::Error>),
    {
        let due = match self.last_toggle {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.error_blink_period(),
        };
        if due {
            self.last_toggle = Some(now);
            let visible = self.snapshot.toggle_error_indicator();
            on_event(LinkEvent::ErrorIndicator(visible));
        }
    }
}
