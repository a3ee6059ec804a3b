//! SMTP reply parsing and representation.

use super::error::{ClientError, Result};

/// A single line of an SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// The reply code (e.g., 220, 250, 550).
    pub code: u16,
    /// Whether this is the last line of a multi-line reply.
    pub is_last: bool,
    /// The text following the code.
    pub message: String,
}

/// A complete SMTP reply, which may span several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Response {
    #[must_use]
    pub const fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// The reply text with lines joined by newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// 3xx, e.g. `354` after DATA or `334` during AUTH.
    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// EHLO keywords, i.e. every line after the greeting line.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().skip(1).map(String::as_str)
    }

    /// Whether an EHLO reply advertises `keyword` (case-insensitive).
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.capabilities().any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(keyword))
        })
    }

    /// Mechanisms listed on the `AUTH` capability line, upper-cased.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<String> {
        self.capabilities()
            .filter_map(|line| {
                let mut words = line.split_whitespace();
                words
                    .next()
                    .filter(|first| first.eq_ignore_ascii_case("AUTH"))
                    .map(|_| words.map(str::to_ascii_uppercase).collect::<Vec<_>>())
            })
            .flatten()
            .collect()
    }

    /// Parses a single reply line (without its line ending).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ParseError` if the line doesn't match SMTP format.
    pub fn parse_line(line: &str) -> Result<ResponseLine> {
        let code = line
            .get(..3)
            .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| ClientError::ParseError(format!("Invalid status code: '{line}'")))?
            .parse::<u16>()
            .map_err(|_| ClientError::ParseError(format!("Invalid status code: '{line}'")))?;

        let is_last = match line.as_bytes().get(3) {
            None | Some(b' ') => true,
            Some(b'-') => false,
            Some(c) => {
                return Err(ClientError::ParseError(format!(
                    "Invalid separator character: '{}'",
                    char::from(*c)
                )));
            }
        };

        Ok(ResponseLine {
            code,
            is_last,
            message: line.get(4..).unwrap_or_default().to_string(),
        })
    }

    /// Parses one complete reply from the front of `buffer`.
    ///
    /// Returns the reply and the number of bytes it occupied, or `None` when
    /// the buffer does not yet hold a full reply.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ParseError` if the reply is malformed, or
    /// `ClientError::Utf8Error` if a complete line is not valid UTF-8.
    pub fn parse_response(buffer: &[u8]) -> Result<Option<(Self, usize)>> {
        let mut lines = Vec::new();
        let mut consumed = 0;
        let mut first_code = None;

        while let Some(end) = buffer[consumed..].iter().position(|&b| b == b'\n') {
            let raw = &buffer[consumed..consumed + end];
            consumed += end + 1;

            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.is_empty() {
                continue;
            }

            let parsed = Self::parse_line(std::str::from_utf8(raw)?)?;
            match first_code {
                Some(code) if code != parsed.code => {
                    return Err(ClientError::ParseError(format!(
                        "Status code mismatch in multi-line response: expected {code}, got {}",
                        parsed.code
                    )));
                }
                Some(_) => {}
                None => first_code = Some(parsed.code),
            }

            lines.push(parsed.message);
            if parsed.is_last {
                return Ok(Some((Self::new(parsed.code, lines), consumed)));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_single_line() {
        let line = ResponseLine {
            code: 220,
            is_last: true,
            message: "mail.example.com ESMTP".to_string(),
        };
        assert_eq!(
            Response::parse_line("220 mail.example.com ESMTP").unwrap(),
            line
        );
    }

    #[test]
    fn test_parse_bare_code() {
        let line = Response::parse_line("250").unwrap();
        assert_eq!(line.code, 250);
        assert!(line.is_last);
        assert_eq!(line.message, "");
    }

    #[test]
    fn test_parse_invalid_lines() {
        assert!(Response::parse_line("2").is_err());
        assert!(Response::parse_line("abc hello").is_err());
        assert!(Response::parse_line("250+nope").is_err());
    }

    #[test]
    fn test_parse_multi_line_response() {
        let data = b"250-mail.example.com\r\n250-SIZE 10000000\r\n250 HELP\r\n";
        let (response, consumed) = Response::parse_response(data).unwrap().unwrap();
        assert_eq!(response.code, 250);
        assert_eq!(
            response.lines,
            vec!["mail.example.com", "SIZE 10000000", "HELP"]
        );
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn test_parse_leaves_trailing_bytes() {
        let data = b"250 OK\r\n221 Bye\r\n";
        let (response, consumed) = Response::parse_response(data).unwrap().unwrap();
        assert_eq!(response.code, 250);
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_parse_incomplete_response() {
        let data = b"250-mail.example.com\r\n250-SIZE";
        assert!(Response::parse_response(data).unwrap().is_none());

        // A split multi-byte character in an unfinished line is not an error yet.
        let data = b"250 caf\xc3";
        assert!(Response::parse_response(data).unwrap().is_none());
    }

    #[test]
    fn test_parse_code_mismatch() {
        let data = b"250-first\r\n251 second\r\n";
        assert!(Response::parse_response(data).is_err());
    }

    #[test]
    fn test_capabilities() {
        let data = b"250-mail.example.com\r\n250-STARTTLS\r\n250-AUTH PLAIN login\r\n250 SIZE 1000\r\n";
        let (response, _) = Response::parse_response(data).unwrap().unwrap();

        assert!(response.supports("starttls"));
        assert!(response.supports("SIZE"));
        assert!(!response.supports("mail.example.com"));
        assert_eq!(response.auth_mechanisms(), vec!["PLAIN", "LOGIN"]);
    }

    #[test]
    fn test_classification() {
        assert!(Response::new(250, vec![]).is_success());
        assert!(Response::new(354, vec![]).is_intermediate());
        assert!(!Response::new(354, vec![]).is_success());

        let response = Response::new(550, vec!["Error".to_string()]);
        assert!(!response.is_success());
        assert!(!response.is_intermediate());
    }
}
