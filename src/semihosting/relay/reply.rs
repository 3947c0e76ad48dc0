/*!
 * Reply Decoder
 * Parses `retcode[,errno[,C]]` reply bodies
 */

use crate::core::errors::ReplyError;
use crate::core::limits::BREAK_MARKER;

/// A decoded relay reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayReply {
    pub retcode: i32,
    /// 0 when the front-end omitted it
    pub errno: i32,
    /// User break requested while the call was outstanding
    pub interrupted: bool,
}

impl RelayReply {
    /// Decode a reply body (the text after the `F` marker)
    pub fn decode(body: &[u8]) -> Result<Self, ReplyError> {
        let (negative, rest) = match body.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, body),
        };

        let Some((magnitude, rest)) = hex_field(rest) else {
            return Err(ReplyError::Malformed(String::from_utf8_lossy(body).into_owned()));
        };
        let retcode = if negative {
            (magnitude as i32).wrapping_neg()
        } else {
            magnitude as i32
        };

        let Some((errno, rest)) = rest.strip_prefix(b",").and_then(hex_field) else {
            return Ok(Self {
                retcode,
                errno: 0,
                interrupted: false,
            });
        };

        let interrupted = matches!(rest, [b',', flag, ..] if *flag as char == BREAK_MARKER);
        Ok(Self {
            retcode,
            errno: errno as i32,
            interrupted,
        })
    }
}

/// Longest leading run of hex digits, wrapping like a C `%x` conversion
fn hex_field(input: &[u8]) -> Option<(u32, &[u8])> {
    let digits = input.iter().take_while(|b| b.is_ascii_hexdigit()).count();
    if digits == 0 {
        return None;
    }
    let value = input[..digits].iter().fold(0u32, |acc, &b| {
        let nibble = (b as char).to_digit(16).unwrap_or(0);
        acc.wrapping_shl(4) | nibble
    });
    Some((value, &input[digits..]))
}
