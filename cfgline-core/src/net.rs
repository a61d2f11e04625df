//! Network-notation converters.
//!
//! Routers write the same network three ways: CIDR (`10.0.0.0/8`), dotted
//! mask (`10.0.0.0/255.0.0.0`), and the `default` alias for the all-zero
//! route. [`NetworkSpec`] normalizes all three to one value and renders the
//! device's preferred form back out.

use std::fmt::{self, Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Errors produced while parsing network notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetAddrError {
    #[error("invalid network '{0}': expected 'default', ADDR/LEN, or ADDR/MASK")]
    InvalidNetwork(String),
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length '{0}': must be 0-32")]
    InvalidPrefixLen(String),
}

/// Convert a prefix length in `0..=32` to a dotted-decimal mask.
pub fn prefix_len_to_mask(len: u8) -> Option<Ipv4Addr> {
    if len > 32 {
        return None;
    }
    let bits = if len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(len))
    };
    Some(Ipv4Addr::from(bits))
}

/// Convert a dotted-decimal mask back to a prefix length.
///
/// Returns `None` for non-contiguous masks; callers fall back to emitting the
/// raw dotted form instead of failing.
pub fn mask_to_prefix_len(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let len = bits.leading_ones();
    if bits != 0 && bits.trailing_zeros() + len != 32 {
        return None;
    }
    Some(len as u8)
}

/// True when `s` parses as an IPv4 address.
pub fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// True when `s` parses as an IPv6 address.
pub fn is_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}

/// A destination network: address plus mask.
///
/// `default` and `0.0.0.0/0.0.0.0` normalize to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NetworkSpec {
    pub prefix: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl NetworkSpec {
    /// The default route, `0.0.0.0/0.0.0.0`.
    pub const DEFAULT: NetworkSpec = NetworkSpec {
        prefix: Ipv4Addr::UNSPECIFIED,
        mask: Ipv4Addr::UNSPECIFIED,
    };

    pub fn new(prefix: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self { prefix, mask }
    }

    /// True for the all-zero default route.
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Prefix length when the mask is contiguous.
    pub fn prefix_len(&self) -> Option<u8> {
        mask_to_prefix_len(self.mask)
    }

    /// Parse `default`, `ADDR/LEN`, or `ADDR/MASK` notation.
    pub fn parse(network: &str) -> Result<Self, NetAddrError> {
        if network == "default" {
            return Ok(Self::DEFAULT);
        }

        let (addr, mask_part) = network
            .split_once('/')
            .ok_or_else(|| NetAddrError::InvalidNetwork(network.to_string()))?;
        let prefix: Ipv4Addr = addr
            .parse()
            .map_err(|_| NetAddrError::InvalidAddress(addr.to_string()))?;

        let mask = if mask_part.contains('.') {
            mask_part
                .parse()
                .map_err(|_| NetAddrError::InvalidAddress(mask_part.to_string()))?
        } else {
            let len: u8 = mask_part
                .parse()
                .map_err(|_| NetAddrError::InvalidPrefixLen(mask_part.to_string()))?;
            prefix_len_to_mask(len)
                .ok_or_else(|| NetAddrError::InvalidPrefixLen(mask_part.to_string()))?
        };

        Ok(Self { prefix, mask })
    }
}

impl FromStr for NetworkSpec {
    type Err = NetAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for NetworkSpec {
    /// Render the device's preferred form: `default` for the all-zero route,
    /// CIDR when the mask is contiguous, raw dotted mask otherwise.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return write!(f, "default");
        }
        match self.prefix_len() {
            Some(len) => write!(f, "{}/{}", self.prefix, len),
            None => write!(f, "{}/{}", self.prefix, self.mask),
        }
    }
}
