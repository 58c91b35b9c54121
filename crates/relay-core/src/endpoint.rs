//! Builder / peer endpoint identities.
//!
//! Accepted forms:
//!   PUBKEY@host:port
//!   PUBKEY@https://host:port
//!   https://PUBKEY@host:port
//!
//! The public key travels in the URL userinfo and is stripped from the
//! canonical address.

use thiserror::Error;
use url::Url;

use crate::types::PUBKEY_LEN;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("endpoint has no host")]
    MissingHost,
    #[error("endpoint has no public key")]
    MissingPubkey,
    #[error("invalid public key hex: {0}")]
    PubkeyHex(#[from] hex::FromHexError),
    #[error("public key must be {PUBKEY_LEN} bytes, got {0}")]
    PubkeyLength(usize),
}

/// A builder endpoint: canonical `scheme://host[:port]` plus its BLS public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointIdentity {
    address: String,
    pubkey: [u8; PUBKEY_LEN],
}

impl EndpointIdentity {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        let normalized = match input.split_once('@') {
            // PUBKEY@scheme://host -> scheme://PUBKEY@host
            Some((user, rest)) if rest.starts_with("http") && !user.contains("://") => {
                match rest.split_once("://") {
                    Some((scheme, host)) => format!("{scheme}://{user}@{host}"),
                    None => format!("http://{input}"),
                }
            }
            _ if input.starts_with("http") => input.to_string(),
            _ => format!("http://{input}"),
        };

        let url = Url::parse(&normalized)?;
        let host = url.host_str().ok_or(ParseError::MissingHost)?;

        // `Url::port` hides a port equal to the scheme default; keep it as written.
        let address = match url.port().or_else(|| written_port(&normalized)) {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };

        let username = url.username();
        if username.is_empty() {
            return Err(ParseError::MissingPubkey);
        }
        let bytes = hex::decode(username.strip_prefix("0x").unwrap_or(username))?;
        let pubkey: [u8; PUBKEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseError::PubkeyLength(bytes.len()))?;

        Ok(Self { address, pubkey })
    }

    /// `scheme://host[:port]`, credentials removed.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn pubkey(&self) -> &[u8; PUBKEY_LEN] {
        &self.pubkey
    }

    pub fn pubkey_hex(&self) -> String {
        format!("0x{}", hex::encode(self.pubkey))
    }
}

/// Port spelled out in the authority of `scheme://[user@]host[:port][/...]`.
fn written_port(url: &str) -> Option<u16> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split('/').next().unwrap_or(rest);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let (host, port) = host_port.rsplit_once(':')?;
    if host.starts_with('[') && !host.ends_with(']') {
        return None;
    }
    port.parse().ok()
}

impl std::str::FromStr for EndpointIdentity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
