//! Lookup protocol messages.
//!
//! The request is the raw service name as a text frame. The reply is a
//! tagged text frame — `"FOUND:<address>:<port>"` or `"NOT_FOUND"` — so a
//! negative result is never confused with a malformed reply.

use rowswap_common::{Endpoint, FrameError, ServiceName};
use std::net::IpAddr;
use thiserror::Error;

use crate::frame;

/// Tag prefixing a positive lookup reply.
const FOUND_TAG: &str = "FOUND";

/// The full negative lookup reply.
const NOT_FOUND_TAG: &str = "NOT_FOUND";

/// A lookup reply that could not be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed lookup reply: {0}")]
pub struct ReplyParseError(&'static str);

/// Outcome of a name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupReply {
    /// The name resolves to this endpoint.
    Found(Endpoint),
    /// No live entry under the name. A valid negative result, not an error.
    NotFound,
}

impl LookupReply {
    /// Renders the reply as its wire text.
    pub fn render(&self) -> String {
        match self {
            LookupReply::Found(endpoint) => {
                format!("{}:{}:{}", FOUND_TAG, endpoint.address, endpoint.port)
            }
            LookupReply::NotFound => NOT_FOUND_TAG.to_string(),
        }
    }

    /// Encodes the reply as a datagram frame.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        frame::encode_text(&self.render())
    }

    /// Parses the text of a lookup reply.
    pub fn parse(text: &str) -> Result<Self, ReplyParseError> {
        if text == NOT_FOUND_TAG {
            return Ok(LookupReply::NotFound);
        }

        let rest = text
            .strip_prefix(FOUND_TAG)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or(ReplyParseError("unknown tag"))?;

        // The address may itself contain ':' (IPv6), so split the port off
        // the right-hand side.
        let (address, port) = rest
            .rsplit_once(':')
            .ok_or(ReplyParseError("missing port"))?;
        let address: IpAddr = address
            .parse()
            .map_err(|_| ReplyParseError("unparsable address"))?;
        let port: u16 = port.parse().map_err(|_| ReplyParseError("bad port"))?;

        Ok(LookupReply::Found(Endpoint::new(address, port)))
    }
}

/// Encodes a lookup request for `name`.
pub fn encode_request(name: &ServiceName) -> Result<Vec<u8>, FrameError> {
    frame::encode_text(name.as_str())
}

/// Decodes a lookup request into the requested name.
pub fn decode_request(datagram: &[u8]) -> Result<ServiceName, FrameError> {
    Ok(ServiceName::from(frame::decode_text(datagram)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_roundtrip() {
        let reply = LookupReply::Found(Endpoint::new("10.0.0.5".parse().unwrap(), 7000));
        assert_eq!(reply.render(), "FOUND:10.0.0.5:7000");
        assert_eq!(LookupReply::parse(&reply.render()).unwrap(), reply);
    }

    #[test]
    fn test_not_found_roundtrip() {
        assert_eq!(LookupReply::NotFound.render(), "NOT_FOUND");
        assert_eq!(
            LookupReply::parse("NOT_FOUND").unwrap(),
            LookupReply::NotFound
        );
    }

    #[test]
    fn test_ipv6_endpoint_roundtrip() {
        let reply = LookupReply::Found(Endpoint::new("::1".parse().unwrap(), 9000));
        assert_eq!(LookupReply::parse(&reply.render()).unwrap(), reply);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(LookupReply::parse("MAYBE:10.0.0.5:7000").is_err());
        assert!(LookupReply::parse("").is_err());
    }

    #[test]
    fn test_found_with_bad_endpoint_rejected() {
        assert!(LookupReply::parse("FOUND:nowhere:7000").is_err());
        assert!(LookupReply::parse("FOUND:10.0.0.5:seven").is_err());
        assert!(LookupReply::parse("FOUND:10.0.0.5").is_err());
    }

    #[test]
    fn test_request_roundtrip() {
        let name = ServiceName::from("report.txt");
        let frame = encode_request(&name).unwrap();
        assert_eq!(decode_request(&frame).unwrap(), name);
    }
}
