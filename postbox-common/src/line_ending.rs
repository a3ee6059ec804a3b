//! Line ending handling for message content.
//!
//! SMTP requires every line of a message to end in CRLF. Caller supplied
//! text rarely does, so bodies are rewritten with [`to_crlf`] before they are
//! placed in a payload.

use std::borrow::Cow;

/// Rewrites every line break in `input` to CRLF.
///
/// A lone `\n` and a lone `\r` each become `\r\n`; an existing `\r\n` pair is
/// copied through once. Nothing is appended: an empty input gives an empty
/// output, and a body that does not end in a line break still does not.
#[must_use]
pub fn to_crlf(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + input.len() / 10);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                output.push_str("\r\n");
            }
            '\n' => output.push_str("\r\n"),
            c => output.push(c),
        }
    }

    output
}

/// Makes caller text safe to place in a single header line.
///
/// Each run of CR/LF characters is replaced with one space so the value can
/// never terminate the header early and introduce a header of its own.
#[must_use]
pub fn header_safe(value: &str) -> Cow<'_, str> {
    if !value.contains(['\r', '\n']) {
        return Cow::Borrowed(value);
    }

    let mut output = String::with_capacity(value.len());
    let mut in_break = false;
    for c in value.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                output.push(' ');
            }
            in_break = true;
        } else {
            output.push(c);
            in_break = false;
        }
    }

    Cow::Owned(output)
}
