//! IPv6 prefix definitions (`ipv6 prefix N ...`).
//!
//! A prefix is keyed by its numeric ID and comes from one of three sources,
//! written as three textual shapes. The delegated forms are tried in order
//! before the static form, which would otherwise swallow the `@` syntax.

use std::net::Ipv6Addr;

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

/// Where a prefix value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum PrefixSource {
    /// A literal prefix written in the configuration.
    Static { prefix: String },
    /// Learned from router advertisements on the named interface.
    Ra { interface: String },
    /// Delegated over DHCPv6-PD on the named interface.
    Dhcpv6Pd { interface: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv6Prefix {
    pub id: u32,
    pub prefix_length: u8,
    #[serde(flatten)]
    pub source: PrefixSource,
}

/// A repeated ID replaces the earlier definition.
pub fn parse_ipv6_prefixes(raw: &str) -> Result<Vec<Ipv6Prefix>, ParseError> {
    let mut prefixes: Vec<Ipv6Prefix> = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("ipv6 prefix ") else {
            continue;
        };
        let Some((id_str, spec)) = rest.split_once(char::is_whitespace) else {
            continue;
        };
        let Ok(id) = id_str.parse() else {
            continue;
        };
        let Some((body, length_str)) = spec.trim().rsplit_once("::/") else {
            continue;
        };
        let Ok(prefix_length) = length_str.parse() else {
            continue;
        };

        let source = if let Some(iface) = body.strip_prefix("ra-prefix@") {
            PrefixSource::Ra {
                interface: iface.to_string(),
            }
        } else if let Some(iface) = body.strip_prefix("dhcp-prefix@") {
            PrefixSource::Dhcpv6Pd {
                interface: iface.to_string(),
            }
        } else {
            PrefixSource::Static {
                prefix: format!("{body}::"),
            }
        };

        let prefix = Ipv6Prefix {
            id,
            prefix_length,
            source,
        };
        match prefixes.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = prefix,
            None => prefixes.push(prefix),
        }
    }

    Ok(prefixes)
}

pub fn build_prefix_command(prefix: &Ipv6Prefix) -> String {
    match &prefix.source {
        PrefixSource::Static { prefix: value } => {
            let body = value.trim_end_matches(':');
            format!("ipv6 prefix {} {body}::/{}", prefix.id, prefix.prefix_length)
        }
        PrefixSource::Ra { interface } => format!(
            "ipv6 prefix {} ra-prefix@{interface}::/{}",
            prefix.id, prefix.prefix_length
        ),
        PrefixSource::Dhcpv6Pd { interface } => format!(
            "ipv6 prefix {} dhcp-prefix@{interface}::/{}",
            prefix.id, prefix.prefix_length
        ),
    }
}

pub fn build_delete_prefix_command(id: u32) -> String {
    format!("no ipv6 prefix {id}")
}

pub fn build_show_prefixes_command() -> String {
    r#"show config | grep "ipv6 prefix""#.to_string()
}

pub fn validate_ipv6_prefix(prefix: &Ipv6Prefix) -> Result<(), ValidateError> {
    if prefix.id == 0 || prefix.id > 255 {
        return Err(ValidateError::new("prefix ID must be between 1 and 255"));
    }
    if prefix.prefix_length == 0 || prefix.prefix_length > 128 {
        return Err(ValidateError::new(
            "prefix length must be between 1 and 128",
        ));
    }
    match &prefix.source {
        PrefixSource::Static { prefix: value } => {
            if value.parse::<Ipv6Addr>().is_err() {
                return Err(ValidateError::new(format!(
                    "invalid IPv6 prefix '{value}'"
                )));
            }
        }
        PrefixSource::Ra { interface } | PrefixSource::Dhcpv6Pd { interface } => {
            if interface.is_empty() {
                return Err(ValidateError::new(
                    "interface is required for delegated prefixes",
                ));
            }
        }
    }
    Ok(())
}
