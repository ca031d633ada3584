// src/link/dispatcher.rs

use log::debug;

use crate::common::{
    band::Classification,
    error::LinkError,
    frame::{OutboundCommand, Subject},
    hal_traits::Transport,
};

/// Sends an LED bank command only when the classified state changes.
///
/// Owns the "last sent" baseline. The baseline starts empty, so the first
/// classification is always transmitted, and it only advances after the
/// transport accepted the write.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    subject: Subject,
    last_sent: Option<Classification>,
}

impl Dispatcher {
    pub fn new(subject: Subject) -> Self {
        Self { subject, last_sent: None }
    }

    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Classification the peer currently shows, if any was sent.
    #[inline]
    pub fn last_sent(&self) -> Option<Classification> {
        self.last_sent
    }

    #[inline]
    pub fn needs_send(&self, new: Classification) -> bool {
        self.last_sent != Some(new)
    }

    /// Transmits a command for `new` if it differs from the baseline.
    ///
    /// Returns `Ok(None)` when nothing had to be sent. On a write error the
    /// baseline is left alone so the next call retries.
    pub fn maybe_send<T>(
        &mut self,
        new: Classification,
        transport: &mut T,
    ) -> Result<Option<OutboundCommand>, LinkError<T::Error>>
    where
        T: Transport + ?Sized,
    {
        if !self.needs_send(new) {
            return Ok(None);
        }

        let command = OutboundCommand::new(&self.subject, new.led_mask()).map_err(LinkError::Encode)?;
        let line = command.encode().map_err(LinkError::Encode)?;
        transport.write(line.as_bytes()).map_err(LinkError::Write)?;

        debug!("sent {:?} -> {}", line.as_str(), new);
        self.last_sent = Some(new);
        Ok(Some(command))
    }

    /// Forgets the baseline; the next classification is sent unconditionally.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::band::AlertBand;
    use std::vec::Vec;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        written: Vec<Vec<u8>>,
        fail_writes: bool,
    }

    #[derive(Debug, PartialEq)]
    struct WriteRefused;

    impl Transport for RecordingTransport {
        type Error = WriteRefused;

        fn read_available(&mut self, _buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
            Err(nb::Error::WouldBlock)
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err(WriteRefused);
            }
            self.written.push(bytes.to_vec());
            Ok(())
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Subject::try_from("rgbLEDs").unwrap())
    }

    #[test]
    fn test_same_band_twice_sends_once() {
        let mut d = dispatcher();
        let mut t = RecordingTransport::default();
        let mid = Classification::Band(AlertBand::Mid);

        let first = d.maybe_send(mid, &mut t).unwrap();
        let second = d.maybe_send(mid, &mut t).unwrap();

        assert_eq!(first.map(|c| c.action()), Some(2));
        assert!(second.is_none());
        assert_eq!(t.written, [b"rgbLEDs=2!79\n".to_vec()]);
    }

    #[test]
    fn test_change_sends_new_command() {
        let mut d = dispatcher();
        let mut t = RecordingTransport::default();
        d.maybe_send(Classification::Band(AlertBand::Low), &mut t).unwrap();
        d.maybe_send(Classification::Band(AlertBand::High), &mut t).unwrap();
        d.maybe_send(Classification::Band(AlertBand::High), &mut t).unwrap();
        assert_eq!(t.written, [b"rgbLEDs=1!173\n".to_vec(), b"rgbLEDs=4!146\n".to_vec()]);
        assert_eq!(d.last_sent(), Some(Classification::Band(AlertBand::High)));
    }

    #[test]
    fn test_first_unknown_is_sent_as_all_off() {
        let mut d = dispatcher();
        let mut t = RecordingTransport::default();
        let cmd = d.maybe_send(Classification::Unknown, &mut t).unwrap().unwrap();
        assert_eq!(cmd.action(), 0);
        assert_eq!(t.written, [b"rgbLEDs=0!243\n".to_vec()]);
    }

    #[test]
    fn test_failed_write_keeps_baseline() {
        let mut d = dispatcher();
        let mut t = RecordingTransport { fail_writes: true, ..Default::default() };
        let low = Classification::Band(AlertBand::Low);

        assert!(matches!(d.maybe_send(low, &mut t), Err(LinkError::Write(WriteRefused))));
        assert_eq!(d.last_sent(), None);

        t.fail_writes = false;
        assert!(d.maybe_send(low, &mut t).unwrap().is_some());
        assert_eq!(d.last_sent(), Some(low));
    }

    #[test]
    fn test_reset_forces_resend() {
        let mut d = dispatcher();
        let mut t = RecordingTransport::default();
        let mid = Classification::Band(AlertBand::Mid);
        d.maybe_send(mid, &mut t).unwrap();
        d.reset();
        assert!(d.maybe_send(mid, &mut t).unwrap().is_some());
        assert_eq!(t.written.len(), 2);
    }
}
