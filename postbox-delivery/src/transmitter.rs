//! Pull-based access to a payload for the transport.

use postbox_smtp::ByteSource;

/// Hands out a payload in pieces, front to back.
///
/// Each reader owns its own cursor, so two sends of the same payload never
/// interfere. Once the end is reached every further read returns `0`.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    payload: &'a [u8],
    cursor: usize,
}

impl<'a> PayloadReader<'a> {
    #[must_use]
    pub const fn new(payload: &'a [u8]) -> Self {
        Self { payload, cursor: 0 }
    }

    /// Bytes handed out so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }
}

impl ByteSource for PayloadReader<'_> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.payload[self.cursor..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.cursor += n;
        n
    }
}
