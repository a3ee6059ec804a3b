/// A pull-based source of message bytes.
///
/// The client calls [`ByteSource::read_chunk`] repeatedly while streaming
/// DATA, so the message never has to be handed over in one piece.
pub trait ByteSource: Send {
    /// Copies up to `buf.len()` bytes into `buf` and returns how many were
    /// written. Returning `0` means the source is exhausted.
    fn read_chunk(&mut self, buf: &mut [u8]) -> usize;
}

impl ByteSource for &[u8] {
    fn read_chunk(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        n
    }
}
