//! Swap protocol messages.
//!
//! Request format: `"<line1>,<line2>"`, both zero-based line indices. The
//! reply is free-form outcome text; [`OUTCOME_OK`] is the only success
//! sentinel, anything else describes a failure.

use rowswap_common::FrameError;
use thiserror::Error;

use crate::frame;

/// Success sentinel in a swap reply.
pub const OUTCOME_OK: &str = "OK";

/// Fixed outcome text for a swap request that could not be decoded.
pub const OUTCOME_MALFORMED: &str = "malformed swap request";

/// A swap request that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed swap request")]
pub struct SwapParseError;

/// A decoded swap request: exchange two lines of the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    pub line1: u64,
    pub line2: u64,
}

impl SwapRequest {
    /// Creates a new swap request.
    pub fn new(line1: u64, line2: u64) -> Self {
        Self { line1, line2 }
    }

    /// Renders the request as its wire text.
    pub fn render(&self) -> String {
        format!("{},{}", self.line1, self.line2)
    }

    /// Encodes the request as a datagram frame.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        frame::encode_text(&self.render())
    }

    /// Parses the text of a swap request.
    pub fn parse(text: &str) -> Result<Self, SwapParseError> {
        let (first, second) = text.split_once(',').ok_or(SwapParseError)?;
        if second.contains(',') {
            return Err(SwapParseError);
        }

        let line1: u64 = first.trim().parse().map_err(|_| SwapParseError)?;
        let line2: u64 = second.trim().parse().map_err(|_| SwapParseError)?;
        Ok(Self { line1, line2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(SwapRequest::parse("0,2").unwrap(), SwapRequest::new(0, 2));
        assert_eq!(
            SwapRequest::parse("17,17").unwrap(),
            SwapRequest::new(17, 17)
        );
    }

    #[test]
    fn test_parse_tolerates_spaces() {
        assert_eq!(SwapRequest::parse(" 3 , 5 ").unwrap(), SwapRequest::new(3, 5));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(SwapRequest::parse("3").is_err());
        assert!(SwapRequest::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_tokens() {
        assert!(SwapRequest::parse("1,2,3").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(SwapRequest::parse("one,2").is_err());
        assert!(SwapRequest::parse("1,two").is_err());
    }

    #[test]
    fn test_parse_rejects_negative_indices() {
        assert!(SwapRequest::parse("-1,2").is_err());
    }

    #[test]
    fn test_render_parse_roundtrip() {
        let req = SwapRequest::new(4, 9);
        let frame = req.encode().unwrap();
        let text = frame::decode_text(&frame).unwrap();
        assert_eq!(SwapRequest::parse(text).unwrap(), req);
    }
}
