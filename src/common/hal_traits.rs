// src/common/hal_traits.rs

use core::fmt::Debug;

/// Byte transport between the host and the peer.
///
/// The link owns its transport exclusively and only ever calls it from the
/// poll loop, so implementations need no interior synchronization.
pub trait Transport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Copies whatever bytes are already pending into `buf`.
    ///
    /// Returns `Ok(n)` with `n > 0` when bytes were read, or
    /// `Err(nb::Error::WouldBlock)` when nothing is pending. Must never wait
    /// for bytes to arrive. Other errors are returned as
    /// `Err(nb::Error::Other(Self::Error))`.
    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Writes all of `bytes` and flushes them towards the peer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        (**self).read_available(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }
}
