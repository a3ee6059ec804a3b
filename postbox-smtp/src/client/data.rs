//! Transparency handling for the DATA phase (RFC 5321 Section 4.5.2).

/// Doubles any `.` that starts a line, tracking line starts across chunks.
#[derive(Debug)]
pub(super) struct DotStuffer {
    at_line_start: bool,
    previous: Option<u8>,
    ends_with_crlf: bool,
}

impl DotStuffer {
    pub(super) const fn new() -> Self {
        Self {
            at_line_start: true,
            previous: None,
            ends_with_crlf: true,
        }
    }

    /// Appends the stuffed form of `chunk` to `out`.
    pub(super) fn stuff(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        for &byte in chunk {
            if self.at_line_start && byte == b'.' {
                out.push(b'.');
            }
            out.push(byte);

            self.at_line_start = byte == b'\n';
            self.ends_with_crlf = self.previous == Some(b'\r') && byte == b'\n';
            self.previous = Some(byte);
        }
    }

    /// The end-of-data marker, with a CRLF first if the content lacked one.
    pub(super) const fn terminator(&self) -> &'static [u8] {
        if self.ends_with_crlf {
            b".\r\n"
        } else {
            b"\r\n.\r\n"
        }
    }
}
