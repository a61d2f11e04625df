//! Bridge membership (`bridge member bridgeN <iface>...`).
//!
//! A repeated line for the same bridge replaces its member list outright,
//! matching the device behavior of the command.

use cfgline_core::directives;
use serde::Serialize;

use super::{is_numbered_interface, ParseError, ValidateError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeConfig {
    pub name: String,
    pub members: Vec<String>,
}

pub fn parse_bridges(raw: &str) -> Result<Vec<BridgeConfig>, ParseError> {
    let mut bridges: Vec<BridgeConfig> = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("bridge member ") else {
            continue;
        };
        let (name, members_str) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| ParseError::malformed(line, "missing member list"))?;
        let members: Vec<String> = members_str.split_whitespace().map(str::to_string).collect();

        match bridges.iter_mut().find(|b| b.name == name) {
            Some(bridge) => bridge.members = members,
            None => bridges.push(BridgeConfig {
                name: name.to_string(),
                members,
            }),
        }
    }

    Ok(bridges)
}

pub fn build_bridge_member_command(bridge: &BridgeConfig) -> String {
    if bridge.members.is_empty() {
        return format!("bridge member {}", bridge.name);
    }
    format!("bridge member {} {}", bridge.name, bridge.members.join(" "))
}

pub fn build_delete_bridge_command(name: &str) -> String {
    format!("no bridge member {name}")
}

pub fn build_show_bridges_command() -> String {
    r#"show config | grep "bridge member""#.to_string()
}

pub fn validate_bridge_name(name: &str) -> Result<(), ValidateError> {
    let digits = name.strip_prefix("bridge").unwrap_or("");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidateError::new(format!(
            "bridge name must be 'bridgeN', got '{name}'"
        )));
    }
    Ok(())
}

pub fn validate_bridge(bridge: &BridgeConfig) -> Result<(), ValidateError> {
    validate_bridge_name(&bridge.name)?;
    for member in &bridge.members {
        if !is_numbered_interface(member) {
            return Err(ValidateError::new(format!(
                "invalid bridge member '{member}'"
            )));
        }
    }
    for (i, member) in bridge.members.iter().enumerate() {
        if bridge.members[..i].contains(member) {
            return Err(ValidateError::new(format!(
                "duplicate member interface '{member}'"
            )));
        }
    }
    Ok(())
}
