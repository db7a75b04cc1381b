//! Registration protocol messages.
//!
//! Request format: `"<CMD>:<name>:<port>"` or the address-qualified
//! `"<CMD>:<name>:<address>:<port>"`, where `<CMD>` is `REGISTER` or
//! `DISMISS` (case-insensitive). In the short form the registry infers the
//! service address from the datagram's sender; the port always comes from
//! the payload. The response is a bare 4-byte result code.

use rowswap_common::{is_registrable_port, Endpoint, FrameError, ServiceName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

use crate::frame;

/// Registration command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Claim a name for an endpoint.
    Register,
    /// Release a previously claimed name.
    Dismiss,
}

impl Command {
    /// Returns the wire token for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Register => "REGISTER",
            Command::Dismiss => "DISMISS",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a registration request failed to parse.
///
/// The two variants map onto distinct result codes: an unknown first token
/// is reported as [`ResultCode::UnknownCommand`], everything else as
/// [`ResultCode::MalformedRequest`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestParseError {
    #[error("unknown command token '{0}'")]
    UnknownCommand(String),

    #[error("malformed registration request: {0}")]
    Malformed(&'static str),
}

/// A decoded registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub command: Command,
    pub name: ServiceName,
    /// Explicit service address, present only in the 4-token form.
    pub address: Option<IpAddr>,
    /// Port the service listens on.
    pub port: u16,
}

impl RegistrationRequest {
    /// Builds an address-qualified request (the form a service sends when
    /// advertising itself).
    pub fn advertise(command: Command, name: ServiceName, endpoint: Endpoint) -> Self {
        Self {
            command,
            name,
            address: Some(endpoint.address),
            port: endpoint.port,
        }
    }

    /// Resolves the endpoint this request claims, falling back to the
    /// datagram sender's address when no explicit address was carried.
    pub fn endpoint(&self, sender: SocketAddr) -> Endpoint {
        Endpoint::new(self.address.unwrap_or_else(|| sender.ip()), self.port)
    }

    /// Renders the request as its wire text.
    pub fn render(&self) -> String {
        match self.address {
            Some(address) => format!("{}:{}:{}:{}", self.command, self.name, address, self.port),
            None => format!("{}:{}:{}", self.command, self.name, self.port),
        }
    }

    /// Encodes the request as a datagram frame.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        frame::encode_text(&self.render())
    }

    /// Parses the text of a registration request.
    pub fn parse(text: &str) -> Result<Self, RequestParseError> {
        if text.trim().is_empty() {
            return Err(RequestParseError::Malformed("empty request"));
        }

        let tokens: Vec<&str> = text.split(':').collect();

        // split() always yields at least one token on non-empty input.
        let command = match tokens[0] {
            token if token.eq_ignore_ascii_case("REGISTER") => Command::Register,
            token if token.eq_ignore_ascii_case("DISMISS") => Command::Dismiss,
            token => return Err(RequestParseError::UnknownCommand(token.to_string())),
        };

        let (name, address, port_token) = match tokens.as_slice() {
            [_, name, port] => (ServiceName::from(*name), None, *port),
            [_, name, address, port] => {
                let address: IpAddr = address
                    .parse()
                    .map_err(|_| RequestParseError::Malformed("unparsable service address"))?;
                (ServiceName::from(*name), Some(address), *port)
            }
            _ => return Err(RequestParseError::Malformed("wrong number of tokens")),
        };

        if name.is_blank() {
            return Err(RequestParseError::Malformed("blank service name"));
        }

        let port: u16 = port_token
            .parse()
            .map_err(|_| RequestParseError::Malformed("non-numeric port"))?;
        if !is_registrable_port(port) {
            return Err(RequestParseError::Malformed(
                "port outside the registrable range",
            ));
        }

        Ok(Self {
            command,
            name,
            address,
            port,
        })
    }
}

/// Result code carried in a registration response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    /// The request was applied.
    Ok,
    /// The request could not be parsed.
    MalformedRequest,
    /// The command token was not recognized.
    UnknownCommand,
    /// REGISTER: the name is already claimed.
    FilenameInUse,
    /// REGISTER: the endpoint is already claimed under another name.
    EndpointInUse,
    /// DISMISS: no entry exists under the name.
    FilenameNotInUse,
    /// DISMISS: the stored endpoint does not match the caller's.
    EndpointMismatch,
}

impl ResultCode {
    /// Returns the wire integer for this code.
    pub fn as_i32(&self) -> i32 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::MalformedRequest => 1,
            ResultCode::UnknownCommand => 2,
            ResultCode::FilenameInUse => 3,
            ResultCode::EndpointInUse => 4,
            ResultCode::FilenameNotInUse => 5,
            ResultCode::EndpointMismatch => 6,
        }
    }

    /// Maps a wire integer back to a result code.
    pub fn from_i32(value: i32) -> Result<Self, FrameError> {
        match value {
            0 => Ok(ResultCode::Ok),
            1 => Ok(ResultCode::MalformedRequest),
            2 => Ok(ResultCode::UnknownCommand),
            3 => Ok(ResultCode::FilenameInUse),
            4 => Ok(ResultCode::EndpointInUse),
            5 => Ok(ResultCode::FilenameNotInUse),
            6 => Ok(ResultCode::EndpointMismatch),
            other => Err(FrameError::UnknownResultCode(other)),
        }
    }

    /// Encodes the code as its 4-byte response frame.
    pub fn encode(&self) -> [u8; 4] {
        frame::encode_i32(self.as_i32())
    }

    /// Decodes a response frame into a result code.
    pub fn decode(datagram: &[u8]) -> Result<Self, FrameError> {
        Self::from_i32(frame::decode_i32(datagram)?)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResultCode::Ok => "OK",
            ResultCode::MalformedRequest => "MALFORMED REQUEST",
            ResultCode::UnknownCommand => "UNKNOWN COMMAND",
            ResultCode::FilenameInUse => "FILENAME IN USE",
            ResultCode::EndpointInUse => "SERVICE ENDPOINT IN USE",
            ResultCode::FilenameNotInUse => "FILENAME NOT IN USE",
            ResultCode::EndpointMismatch => "ENDPOINT NOT CONSISTENT WITH FILENAME",
        };
        write!(f, "{}", text)
    }
}
