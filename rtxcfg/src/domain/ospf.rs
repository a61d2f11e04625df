//! OSPF routing process (`ospf ...` and `ip <iface> ospf area ...`).

use std::net::Ipv4Addr;

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaType {
    Normal,
    Stub,
}

/// One OSPF area. IDs may be decimal or dotted decimal; the device accepts
/// both and we keep the textual form it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OspfArea {
    pub id: String,
    pub area_type: AreaType,
    /// Totally stubby: suppress summary LSAs into the stub area.
    pub no_summary: bool,
}

/// An interface assigned to an area via `ip <iface> ospf area <id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OspfInterfaceArea {
    pub interface: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OspfConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_id: Option<Ipv4Addr>,
    pub areas: Vec<OspfArea>,
    pub interface_areas: Vec<OspfInterfaceArea>,
    pub redistribute_static: bool,
}

pub fn parse_ospf_config(raw: &str) -> Result<OspfConfig, ParseError> {
    let mut config = OspfConfig::default();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if let Some(state) = line.strip_prefix("ospf use ") {
            config.enabled = match state.trim() {
                "on" => true,
                "off" => false,
                other => {
                    return Err(ParseError::malformed(
                        line,
                        format!("ospf use expects on or off, got '{other}'"),
                    ))
                }
            };
        } else if let Some(id_str) = line.strip_prefix("ospf router id ") {
            config.router_id = Some(
                id_str
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "bad router ID"))?,
            );
        } else if let Some(rest) = line.strip_prefix("ospf area ") {
            let mut tokens = rest.split_whitespace();
            let Some(id) = tokens.next() else {
                continue;
            };
            let mut area = OspfArea {
                id: id.to_string(),
                area_type: AreaType::Normal,
                no_summary: false,
            };
            if tokens.next() == Some("stub") {
                area.area_type = AreaType::Stub;
                area.no_summary = tokens.next() == Some("no-summary");
            }
            match config.areas.iter_mut().find(|a| a.id == area.id) {
                Some(existing) => *existing = area,
                None => config.areas.push(area),
            }
        } else if line == "ospf import from static" {
            config.redistribute_static = true;
        } else if let Some(rest) = line.strip_prefix("ip ") {
            let Some((iface, area)) = rest.split_once(" ospf area ") else {
                continue;
            };
            config.interface_areas.push(OspfInterfaceArea {
                interface: iface.to_string(),
                area: area.trim().to_string(),
            });
        }
    }

    Ok(config)
}

pub fn build_ospf_use_command(enabled: bool) -> String {
    if enabled {
        "ospf use on".to_string()
    } else {
        "ospf use off".to_string()
    }
}

pub fn build_router_id_command(router_id: Ipv4Addr) -> String {
    format!("ospf router id {router_id}")
}

pub fn build_area_command(area: &OspfArea) -> String {
    let mut cmd = format!("ospf area {}", area.id);
    if area.area_type == AreaType::Stub {
        cmd.push_str(" stub");
        if area.no_summary {
            cmd.push_str(" no-summary");
        }
    }
    cmd
}

pub fn build_delete_area_command(area_id: &str) -> String {
    format!("no ospf area {area_id}")
}

pub fn build_interface_area_command(assignment: &OspfInterfaceArea) -> String {
    format!("ip {} ospf area {}", assignment.interface, assignment.area)
}

pub fn build_delete_interface_area_command(interface: &str) -> String {
    format!("no ip {interface} ospf area")
}

pub fn build_import_static_command() -> String {
    "ospf import from static".to_string()
}

pub fn build_delete_import_static_command() -> String {
    "no ospf import from static".to_string()
}

pub fn build_show_ospf_command() -> String {
    "show config | grep ospf".to_string()
}

fn is_valid_area_id(area_id: &str) -> bool {
    area_id.parse::<u32>().is_ok() || area_id.parse::<Ipv4Addr>().is_ok()
}

pub fn validate_ospf_config(config: &OspfConfig) -> Result<(), ValidateError> {
    if config.enabled && config.router_id.is_none() {
        return Err(ValidateError::new("router_id is required when OSPF is enabled"));
    }
    for area in &config.areas {
        if !is_valid_area_id(&area.id) {
            return Err(ValidateError::new(format!(
                "invalid area ID '{}' (must be decimal or dotted decimal)",
                area.id
            )));
        }
    }
    for assignment in &config.interface_areas {
        if !is_valid_area_id(&assignment.area) {
            return Err(ValidateError::new(format!(
                "invalid area ID '{}' for interface {}",
                assignment.area, assignment.interface
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_configuration() {
        let raw = "\
ospf use on
ospf router id 10.0.0.1
ospf area 0
ospf area 1 stub no-summary
ospf import from static
ip lan1 ospf area 0
ip lan2 ospf area 1
";
        let config = parse_ospf_config(raw).unwrap();
        assert!(config.enabled);
        assert_eq!(config.router_id, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(config.areas.len(), 2);
        assert_eq!(config.areas[0].area_type, AreaType::Normal);
        assert_eq!(config.areas[1].area_type, AreaType::Stub);
        assert!(config.areas[1].no_summary);
        assert!(config.redistribute_static);
        assert_eq!(config.interface_areas.len(), 2);
        assert_eq!(config.interface_areas[1].interface, "lan2");
        assert!(validate_ospf_config(&config).is_ok());
    }

    #[test]
    fn area_redefinition_replaces() {
        let raw = "\
ospf area 1
ospf area 1 stub
";
        let config = parse_ospf_config(raw).unwrap();
        assert_eq!(config.areas.len(), 1);
        assert_eq!(config.areas[0].area_type, AreaType::Stub);
    }

    #[test]
    fn non_ospf_ip_lines_ignored() {
        let raw = "ip route default gateway 10.0.0.1\nospf use off\n";
        let config = parse_ospf_config(raw).unwrap();
        assert!(!config.enabled);
        assert!(config.interface_areas.is_empty());
    }

    #[test]
    fn area_command_shapes() {
        let area = OspfArea {
            id: "0.0.0.1".to_string(),
            area_type: AreaType::Stub,
            no_summary: true,
        };
        assert_eq!(build_area_command(&area), "ospf area 0.0.0.1 stub no-summary");
        let area = OspfArea {
            id: "0".to_string(),
            area_type: AreaType::Normal,
            no_summary: false,
        };
        assert_eq!(build_area_command(&area), "ospf area 0");
    }

    #[test]
    fn enabled_without_router_id_fails_validation() {
        let config = parse_ospf_config("ospf use on\n").unwrap();
        assert!(validate_ospf_config(&config).is_err());
    }

    #[test]
    fn dotted_area_ids_are_valid() {
        let config = parse_ospf_config("ospf area 0.0.0.5\n").unwrap();
        assert!(validate_ospf_config(&config).is_ok());
        let config = parse_ospf_config("ospf area backbone\n").unwrap();
        assert!(validate_ospf_config(&config).is_err());
    }
}
