//! Trait abstraction for the half-duplex byte transport to enable testing

use std::io;

/// Byte-level transport the protocol engine talks through
///
/// Reads are destructive. Callers check [`Transport::bytes_available`] before
/// reading so that `read_byte` never has to wait.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Number of received bytes waiting to be read
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read one received byte
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Queue one byte for transmission
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Block until every queued byte has been transmitted
    fn flush(&mut self) -> io::Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory serial port for testing
    #[derive(Debug, Default)]
    pub struct MockSerialPort {
        pub rx: VecDeque<u8>,
        pub written: Vec<u8>,
        pub flush_count: usize,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make bytes available for reading, as if received from the master
        pub fn feed(&mut self, bytes: &[u8]) {
            self.rx.extend(bytes);
        }

        /// Take everything written so far
        pub fn take_written(&mut self) -> Vec<u8> {
            std::mem::take(&mut self.written)
        }
    }

    impl Transport for MockSerialPort {
        fn bytes_available(&mut self) -> io::Result<usize> {
            Ok(self.rx.len())
        }

        fn read_byte(&mut self) -> io::Result<u8> {
            self.rx
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "Mock rx empty"))
        }

        fn write_byte(&mut self, byte: u8) -> io::Result<()> {
            self.written.push(byte);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flush_count += 1;
            Ok(())
        }
    }
}
