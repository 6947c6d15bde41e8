//! Trait abstraction for byte-level input to enable testing

/// Non-blocking byte input from the positioning receiver.
pub trait ByteSource {
    /// Number of bytes that can be read right now without blocking.
    fn available(&mut self) -> usize;

    /// Read one byte. Returns `None` if nothing could be read.
    fn read_byte(&mut self) -> Option<u8>;
}
