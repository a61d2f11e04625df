//! DHCP relay settings (`dhcp relay server`, `dhcp relay select`).

use std::net::Ipv4Addr;

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

/// Relay target per scope ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpRelaySelect {
    pub scope_id: u32,
    pub server: Ipv4Addr,
}

/// The relay server list plus per-scope selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DhcpRelayConfig {
    pub servers: Vec<Ipv4Addr>,
    pub selects: Vec<DhcpRelaySelect>,
}

/// The device keeps one global server list; if the dump repeats the
/// directive the last line wins. Selections accumulate per scope ID.
pub fn parse_dhcp_relay(raw: &str) -> Result<DhcpRelayConfig, ParseError> {
    let mut config = DhcpRelayConfig::default();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if let Some(rest) = line.strip_prefix("dhcp relay server ") {
            let mut servers = Vec::new();
            for token in rest.split_whitespace() {
                servers.push(
                    token
                        .parse()
                        .map_err(|_| ParseError::malformed(line, "invalid relay server address"))?,
                );
            }
            config.servers = servers;
        } else if let Some(rest) = line.strip_prefix("dhcp relay select ") {
            let (scope_str, server_str) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| ParseError::malformed(line, "expected SCOPE SERVER"))?;
            let scope_id = scope_str
                .parse()
                .map_err(|_| ParseError::malformed(line, "invalid scope ID"))?;
            let server = server_str
                .trim()
                .parse()
                .map_err(|_| ParseError::malformed(line, "invalid server address"))?;
            config.selects.push(DhcpRelaySelect { scope_id, server });
        }
    }

    Ok(config)
}

pub fn build_relay_server_command(servers: &[Ipv4Addr]) -> Option<String> {
    if servers.is_empty() {
        return None;
    }
    let list: Vec<String> = servers.iter().take(4).map(Ipv4Addr::to_string).collect();
    Some(format!("dhcp relay server {}", list.join(" ")))
}

pub fn build_delete_relay_server_command() -> String {
    "no dhcp relay server".to_string()
}

pub fn build_relay_select_command(select: &DhcpRelaySelect) -> String {
    format!("dhcp relay select {} {}", select.scope_id, select.server)
}

pub fn build_delete_relay_select_command(scope_id: u32) -> String {
    format!("no dhcp relay select {scope_id}")
}

pub fn build_show_relay_command() -> String {
    r#"show config | grep "dhcp relay""#.to_string()
}

pub fn validate_dhcp_relay(config: &DhcpRelayConfig) -> Result<(), ValidateError> {
    if config.servers.len() > 4 {
        return Err(ValidateError::new(format!(
            "maximum 4 relay servers allowed, got {}",
            config.servers.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn servers_and_selects() {
        let raw = "\
dhcp relay server 10.0.0.10 10.0.0.11
dhcp relay select 1 10.0.0.10
dhcp relay select 2 10.0.0.11
";
        let config = parse_dhcp_relay(raw).unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.selects.len(), 2);
        assert_eq!(config.selects[1].scope_id, 2);
        assert!(validate_dhcp_relay(&config).is_ok());
    }

    #[test]
    fn five_servers_fail_validation() {
        let raw = "dhcp relay server 10.0.0.1 10.0.0.2 10.0.0.3 10.0.0.4 10.0.0.5\n";
        let config = parse_dhcp_relay(raw).unwrap();
        assert!(validate_dhcp_relay(&config).is_err());
    }

    #[test]
    fn build_truncates_to_four() {
        let servers: Vec<Ipv4Addr> = (1..=5).map(|n| Ipv4Addr::new(10, 0, 0, n)).collect();
        let cmd = build_relay_server_command(&servers).unwrap();
        assert_eq!(cmd, "dhcp relay server 10.0.0.1 10.0.0.2 10.0.0.3 10.0.0.4");
        assert_eq!(build_relay_server_command(&[]), None);
    }
}
