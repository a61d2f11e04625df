//! DHCP client settings (`dhcp client ...`), one record per interface.
//!
//! Settings for an interface are spread over several lines; parsing merges
//! them into one record per interface with later lines overwriting earlier
//! ones for the same field.

use cfgline_core::directives;
use serde::Serialize;

use super::{is_numbered_interface, ParseError, ValidateError};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DhcpClientConfig {
    pub interface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub require_dns: bool,
    /// Only `linkdown` is known; kept as a string for firmware drift.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_on: Option<String>,
}

pub fn parse_dhcp_clients(raw: &str) -> Result<Vec<DhcpClientConfig>, ParseError> {
    let mut configs: Vec<DhcpClientConfig> = Vec::new();

    let entry = |iface: &str, configs: &mut Vec<DhcpClientConfig>| -> usize {
        match configs.iter().position(|c| c.interface == iface) {
            Some(i) => i,
            None => {
                configs.push(DhcpClientConfig {
                    interface: iface.to_string(),
                    ..DhcpClientConfig::default()
                });
                configs.len() - 1
            }
        }
    };

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("dhcp client ") else {
            continue;
        };

        if let Some(rest) = rest.strip_prefix("hostname ") {
            let (iface, value) = split_iface_value(line, rest)?;
            let i = entry(iface, &mut configs);
            configs[i].hostname = Some(value.to_string());
        } else if let Some(rest) = rest.strip_prefix("client-identifier ") {
            let (iface, value) = split_iface_value(line, rest)?;
            let i = entry(iface, &mut configs);
            configs[i].client_id = Some(value.to_string());
        } else if let Some(rest) = rest.strip_prefix("vendor-class-identifier ") {
            let (iface, value) = split_iface_value(line, rest)?;
            let i = entry(iface, &mut configs);
            configs[i].vendor_id = Some(value.to_string());
        } else if let Some(rest) = rest.strip_prefix("require-dns ") {
            let (iface, value) = split_iface_value(line, rest)?;
            let enabled = match value {
                "on" => true,
                "off" => false,
                other => {
                    return Err(ParseError::malformed(
                        line,
                        format!("require-dns expects on or off, got '{other}'"),
                    ))
                }
            };
            let i = entry(iface, &mut configs);
            configs[i].require_dns = enabled;
        } else if let Some(iface) = rest.strip_prefix("release linkdown ") {
            let i = entry(iface.trim(), &mut configs);
            configs[i].release_on = Some("linkdown".to_string());
        }
    }

    Ok(configs)
}

fn split_iface_value<'a>(line: &str, rest: &'a str) -> Result<(&'a str, &'a str), ParseError> {
    rest.split_once(char::is_whitespace)
        .map(|(iface, value)| (iface, value.trim()))
        .ok_or_else(|| ParseError::malformed(line, "missing value after interface"))
}

pub fn build_hostname_command(iface: &str, hostname: &str) -> String {
    format!("dhcp client hostname {iface} {hostname}")
}

pub fn build_delete_hostname_command(iface: &str) -> String {
    format!("no dhcp client hostname {iface}")
}

pub fn build_client_id_command(iface: &str, client_id: &str) -> String {
    format!("dhcp client client-identifier {iface} {client_id}")
}

pub fn build_delete_client_id_command(iface: &str) -> String {
    format!("no dhcp client client-identifier {iface}")
}

pub fn build_vendor_id_command(iface: &str, vendor_id: &str) -> String {
    format!("dhcp client vendor-class-identifier {iface} {vendor_id}")
}

pub fn build_delete_vendor_id_command(iface: &str) -> String {
    format!("no dhcp client vendor-class-identifier {iface}")
}

pub fn build_require_dns_command(iface: &str, enabled: bool) -> String {
    let state = if enabled { "on" } else { "off" };
    format!("dhcp client require-dns {iface} {state}")
}

pub fn build_release_linkdown_command(iface: &str) -> String {
    format!("dhcp client release linkdown {iface}")
}

pub fn build_delete_release_linkdown_command(iface: &str) -> String {
    format!("no dhcp client release linkdown {iface}")
}

pub fn build_show_client_command(iface: &str) -> String {
    format!(r#"show config | grep "dhcp client.*{iface}""#)
}

pub fn validate_dhcp_client(config: &DhcpClientConfig) -> Result<(), ValidateError> {
    if !is_numbered_interface(&config.interface) {
        return Err(ValidateError::new(format!(
            "invalid interface '{}'",
            config.interface
        )));
    }
    if let Some(hostname) = &config.hostname {
        if hostname.is_empty() || hostname.len() > 63 {
            return Err(ValidateError::new(
                "hostname must be between 1 and 63 characters",
            ));
        }
    }
    if let Some(release_on) = &config.release_on {
        if release_on != "linkdown" {
            return Err(ValidateError::new(format!(
                "unknown release trigger '{release_on}'"
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
    fn lines_merge_per_interface() {
        let raw = "\
dhcp client hostname lan2 office-router
dhcp client require-dns lan2 on
dhcp client release linkdown lan2
dhcp client hostname lan3 branch-router
";
        let configs = parse_dhcp_clients(raw).unwrap();
        assert_eq!(configs.len(), 2);
        let lan2 = &configs[0];
        assert_eq!(lan2.interface, "lan2");
        assert_eq!(lan2.hostname.as_deref(), Some("office-router"));
        assert!(lan2.require_dns);
        assert_eq!(lan2.release_on.as_deref(), Some("linkdown"));
        assert_eq!(configs[1].interface, "lan3");
        assert!(!configs[1].require_dns);
    }

    #[test]
    fn identifiers_keep_their_raw_form() {
        let raw = "\
dhcp client client-identifier lan2 01:00:a0:de:01:02:03
dhcp client vendor-class-identifier lan2 Yamaha-RTX
";
        let configs = parse_dhcp_clients(raw).unwrap();
        assert_eq!(configs[0].client_id.as_deref(), Some("01:00:a0:de:01:02:03"));
        assert_eq!(configs[0].vendor_id.as_deref(), Some("Yamaha-RTX"));
    }

    #[test]
    fn bad_require_dns_value_is_an_error() {
        assert!(parse_dhcp_clients("dhcp client require-dns lan2 yes\n").is_err());
    }

    #[test]
    fn validation_rejects_bogus_interface() {
        let config = DhcpClientConfig {
            interface: "eth0".to_string(),
            ..DhcpClientConfig::default()
        };
        assert!(validate_dhcp_client(&config).is_err());

        let config = DhcpClientConfig {
            interface: "lan2".to_string(),
            hostname: Some("rt1".to_string()),
            ..DhcpClientConfig::default()
        };
        assert!(validate_dhcp_client(&config).is_ok());
    }

    #[test]
    fn build_commands() {
        assert_eq!(
            build_hostname_command("lan2", "rt1"),
            "dhcp client hostname lan2 rt1"
        );
        assert_eq!(
            build_require_dns_command("lan2", false),
            "dhcp client require-dns lan2 off"
        );
        assert_eq!(
            build_delete_release_linkdown_command("lan2"),
            "no dhcp client release linkdown lan2"
        );
    }
}
