//! Static NAT descriptors (`nat descriptor type N static`, mapping lines).
//!
//! Mapping lines come in two shapes and the port-based one must be tried
//! first, since the simple `A=B` matcher would otherwise half-match a
//! `A:p=B:p proto` line.

use std::net::Ipv4Addr;

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NatProtocol {
    Tcp,
    Udp,
}

impl NatProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            NatProtocol::Tcp => "tcp",
            NatProtocol::Udp => "udp",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "tcp" => Some(NatProtocol::Tcp),
            "udp" => Some(NatProtocol::Udp),
            _ => None,
        }
    }
}

/// One translation. Ports and protocol are set together for port-based NAT
/// and all absent for plain 1:1 NAT; the validator enforces all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NatStaticEntry {
    pub outside_global: Ipv4Addr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_global_port: Option<u32>,
    pub inside_local: Ipv4Addr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_local_port: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<NatProtocol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NatStatic {
    pub descriptor_id: u32,
    pub entries: Vec<NatStaticEntry>,
}

/// Collects `nat descriptor` lines into per-descriptor records. A mapping
/// line for an ID with no preceding `type` line still creates the record,
/// and unmatched mapping shapes are skipped.
pub fn parse_nat_static(raw: &str) -> Result<Vec<NatStatic>, ParseError> {
    let mut descriptors: Vec<NatStatic> = Vec::new();

    let mut entry = |id: u32, descriptors: &mut Vec<NatStatic>| -> usize {
        match descriptors.iter().position(|d| d.descriptor_id == id) {
            Some(i) => i,
            None => {
                descriptors.push(NatStatic {
                    descriptor_id: id,
                    entries: Vec::new(),
                });
                descriptors.len() - 1
            }
        }
    };

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if let Some(rest) = line.strip_prefix("nat descriptor type ") {
            let Some((id_str, "static")) = rest.split_once(' ') else {
                continue;
            };
            let Ok(id) = id_str.parse() else {
                continue;
            };
            entry(id, &mut descriptors);
        } else if let Some(rest) = line.strip_prefix("nat descriptor static ") {
            let Some((id_str, mapping_str)) = rest.split_once(' ') else {
                continue;
            };
            let Ok(id) = id_str.parse() else {
                continue;
            };
            // Port-based shape first, then plain 1:1.
            let Some(mapping) =
                parse_port_mapping(mapping_str).or_else(|| parse_plain_mapping(mapping_str))
            else {
                continue;
            };
            let i = entry(id, &mut descriptors);
            descriptors[i].entries.push(mapping);
        }
    }

    Ok(descriptors)
}

/// `<outer>:<port>=<inner>:<port> <tcp|udp>`.
fn parse_port_mapping(mapping: &str) -> Option<NatStaticEntry> {
    let (pair, proto_str) = mapping.split_once(' ')?;
    let protocol = NatProtocol::parse(proto_str.trim())?;
    let (outer, inner) = pair.split_once('=')?;
    let (outer_addr, outer_port) = outer.split_once(':')?;
    let (inner_addr, inner_port) = inner.split_once(':')?;
    Some(NatStaticEntry {
        outside_global: outer_addr.parse().ok()?,
        outside_global_port: Some(outer_port.parse().ok()?),
        inside_local: inner_addr.parse().ok()?,
        inside_local_port: Some(inner_port.parse().ok()?),
        protocol: Some(protocol),
    })
}

/// `<outer>=<inner>`.
fn parse_plain_mapping(mapping: &str) -> Option<NatStaticEntry> {
    let (outer, inner) = mapping.split_once('=')?;
    Some(NatStaticEntry {
        outside_global: outer.trim().parse().ok()?,
        outside_global_port: None,
        inside_local: inner.trim().parse().ok()?,
        inside_local_port: None,
        protocol: None,
    })
}

pub fn is_port_based(entry: &NatStaticEntry) -> bool {
    entry.inside_local_port.is_some()
        && entry.outside_global_port.is_some()
        && entry.protocol.is_some()
}

pub fn build_descriptor_type_command(id: u32) -> String {
    format!("nat descriptor type {id} static")
}

pub fn build_mapping_command(id: u32, entry: &NatStaticEntry) -> String {
    if is_port_based(entry) {
        format!(
            "nat descriptor static {id} {}:{}={}:{} {}",
            entry.outside_global,
            entry.outside_global_port.unwrap_or_default(),
            entry.inside_local,
            entry.inside_local_port.unwrap_or_default(),
            entry.protocol.map(NatProtocol::as_str).unwrap_or_default(),
        )
    } else {
        format!(
            "nat descriptor static {id} {}={}",
            entry.outside_global, entry.inside_local
        )
    }
}

pub fn build_delete_descriptor_command(id: u32) -> String {
    format!("no nat descriptor type {id}")
}

pub fn build_delete_mapping_command(id: u32, entry: &NatStaticEntry) -> String {
    format!("no {}", build_mapping_command(id, entry))
}

pub fn build_interface_nat_command(iface: &str, id: u32) -> String {
    format!("ip {iface} nat descriptor {id}")
}

pub fn build_delete_interface_nat_command(iface: &str, id: u32) -> String {
    format!("no ip {iface} nat descriptor {id}")
}

pub fn build_show_nat_static_command() -> String {
    r#"show config | grep "nat descriptor""#.to_string()
}

/// Type line first, then one line per mapping.
pub fn build_nat_static_commands(nat: &NatStatic) -> Vec<String> {
    let mut commands = vec![build_descriptor_type_command(nat.descriptor_id)];
    for entry in &nat.entries {
        commands.push(build_mapping_command(nat.descriptor_id, entry));
    }
    commands
}

pub fn validate_nat_static(nat: &NatStatic) -> Result<(), ValidateError> {
    if nat.descriptor_id == 0 || nat.descriptor_id > 65_535 {
        return Err(ValidateError::new(
            "descriptor ID must be between 1 and 65535",
        ));
    }
    for (i, entry) in nat.entries.iter().enumerate() {
        validate_entry(entry).map_err(|e| ValidateError::new(format!("entry {i}: {e}")))?;
    }
    Ok(())
}

pub fn validate_entry(entry: &NatStaticEntry) -> Result<(), ValidateError> {
    let port_nat = entry.inside_local_port.is_some()
        || entry.outside_global_port.is_some()
        || entry.protocol.is_some();
    if !port_nat {
        return Ok(());
    }
    let inside = entry
        .inside_local_port
        .filter(|p| *p > 0)
        .ok_or_else(|| ValidateError::new("port-based NAT requires inside_local_port"))?;
    let outside = entry
        .outside_global_port
        .filter(|p| *p > 0)
        .ok_or_else(|| ValidateError::new("port-based NAT requires outside_global_port"))?;
    if entry.protocol.is_none() {
        return Err(ValidateError::new("port-based NAT requires a protocol"));
    }
    for port in [inside, outside] {
        if port > 65_535 {
            return Err(ValidateError::new("port must be between 1 and 65535"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_and_mappings_group_by_descriptor() {
        let raw = "\
nat descriptor type 1000 static
nat descriptor static 1000 203.0.113.10=192.168.1.10
nat descriptor static 1000 203.0.113.10:80=192.168.1.20:8080 tcp
";
        let nats = parse_nat_static(raw).unwrap();
        assert_eq!(nats.len(), 1);
        assert_eq!(nats[0].descriptor_id, 1000);
        assert_eq!(nats[0].entries.len(), 2);
        assert_eq!(nats[0].entries[0].protocol, None);
        let port_entry = &nats[0].entries[1];
        assert_eq!(port_entry.outside_global_port, Some(80));
        assert_eq!(port_entry.inside_local_port, Some(8080));
        assert_eq!(port_entry.protocol, Some(NatProtocol::Tcp));
    }

    #[test]
    fn mapping_without_type_line_still_creates_descriptor() {
        let raw = "nat descriptor static 2000 198.51.100.1=10.0.0.1\n";
        let nats = parse_nat_static(raw).unwrap();
        assert_eq!(nats[0].descriptor_id, 2000);
        assert_eq!(nats[0].entries.len(), 1);
    }

    #[test]
    fn masquerade_type_lines_are_ignored() {
        let raw = "nat descriptor type 1 masquerade\n";
        assert!(parse_nat_static(raw).unwrap().is_empty());
    }

    #[test]
    fn zero_port_parses_but_fails_validation() {
        let raw = "nat descriptor static 1 203.0.113.1:80=10.0.0.1:0 tcp\n";
        let nats = parse_nat_static(raw).unwrap();
        assert_eq!(nats[0].entries[0].inside_local_port, Some(0));

        let err = validate_nat_static(&nats[0]).unwrap_err();
        assert!(err.to_string().contains("inside_local_port"));
    }

    #[test]
    fn partial_port_fields_fail_validation() {
        let entry = NatStaticEntry {
            outside_global: "203.0.113.1".parse().unwrap(),
            outside_global_port: None,
            inside_local: "10.0.0.1".parse().unwrap(),
            inside_local_port: Some(80),
            protocol: Some(NatProtocol::Tcp),
        };
        assert!(validate_entry(&entry).is_err());
    }

    #[test]
    fn command_synthesis() {
        let nat = NatStatic {
            descriptor_id: 1000,
            entries: vec![
                NatStaticEntry {
                    outside_global: "203.0.113.10".parse().unwrap(),
                    outside_global_port: None,
                    inside_local: "192.168.1.10".parse().unwrap(),
                    inside_local_port: None,
                    protocol: None,
                },
                NatStaticEntry {
                    outside_global: "203.0.113.10".parse().unwrap(),
                    outside_global_port: Some(443),
                    inside_local: "192.168.1.20".parse().unwrap(),
                    inside_local_port: Some(8443),
                    protocol: Some(NatProtocol::Tcp),
                },
            ],
        };
        let cmds = build_nat_static_commands(&nat);
        assert_eq!(
            cmds,
            vec![
                "nat descriptor type 1000 static".to_string(),
                "nat descriptor static 1000 203.0.113.10=192.168.1.10".to_string(),
                "nat descriptor static 1000 203.0.113.10:443=192.168.1.20:8443 tcp".to_string(),
            ]
        );
        // The synthesized lines parse back to the same record.
        assert_eq!(parse_nat_static(&cmds.join("\n")).unwrap(), vec![nat]);
    }
}
