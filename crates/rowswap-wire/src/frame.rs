//! Length-prefixed text frames.
//!
//! A text frame is a 2-byte big-endian length prefix followed by that many
//! UTF-8 bytes. The whole frame must fit inside [`MAX_DATAGRAM`] bytes;
//! encoding fails loudly if it would not. Decoding rejects short buffers,
//! prefixes that overrun the datagram body, and invalid UTF-8.
//!
//! Registration responses use a separate fixed-size frame: a single 4-byte
//! big-endian signed integer.

use rowswap_common::FrameError;

/// Maximum size of any datagram on the wire, prefix included.
pub const MAX_DATAGRAM: usize = 256;

/// Size of the length prefix in bytes.
const PREFIX_LEN: usize = 2;

/// Encodes a text frame.
pub fn encode_text(text: &str) -> Result<Vec<u8>, FrameError> {
    let payload = text.as_bytes();
    let len = PREFIX_LEN + payload.len();
    if len > MAX_DATAGRAM {
        return Err(FrameError::Oversize {
            len,
            max: MAX_DATAGRAM,
        });
    }

    let mut frame = Vec::with_capacity(len);
    frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Decodes a text frame from a received datagram.
///
/// Trailing bytes beyond the declared length are ignored; receive buffers
/// are fixed-size and a datagram may not fill them.
pub fn decode_text(datagram: &[u8]) -> Result<&str, FrameError> {
    if datagram.len() < PREFIX_LEN {
        return Err(FrameError::Truncated {
            len: datagram.len(),
        });
    }

    let declared = u16::from_be_bytes([datagram[0], datagram[1]]) as usize;
    let available = datagram.len() - PREFIX_LEN;
    if declared > available {
        return Err(FrameError::LengthOverrun {
            declared,
            available,
        });
    }

    let payload = &datagram[PREFIX_LEN..PREFIX_LEN + declared];
    Ok(std::str::from_utf8(payload)?)
}

/// Encodes a 4-byte big-endian signed integer frame.
pub fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decodes a 4-byte big-endian signed integer frame.
pub fn decode_i32(datagram: &[u8]) -> Result<i32, FrameError> {
    if datagram.len() < 4 {
        return Err(FrameError::BadResultCodeFrame {
            len: datagram.len(),
        });
    }
    Ok(i32::from_be_bytes([
        datagram[0],
        datagram[1],
        datagram[2],
        datagram[3],
    ]))
}
