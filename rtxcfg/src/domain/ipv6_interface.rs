//! Per-interface IPv6 settings (`ipv6 <iface> ...`).
//!
//! Addresses, router advertisement, DHCPv6 service, MTU and security
//! filters all live on separate lines for one interface. The parser takes
//! the whole dump and picks out that interface's lines.

use std::fmt::Write as _;

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

/// Either a literal address or a reference into the prefix table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Ipv6Address {
    /// `2001:db8::1/64`.
    Static { address: String },
    /// `ra-prefix@lan2` plus `::1/64`, resolved by the device at runtime.
    PrefixRef {
        prefix_ref: String,
        interface_id: String,
    },
}

/// Router advertisement settings (`rtadv send ...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtadvConfig {
    pub prefix_id: u32,
    pub o_flag: bool,
    pub m_flag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dhcpv6Service {
    Server,
    Client,
}

impl Dhcpv6Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Dhcpv6Service::Server => "server",
            Dhcpv6Service::Client => "client",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Ipv6InterfaceConfig {
    pub interface: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub addresses: Vec<Ipv6Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtadv: Option<RtadvConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcpv6_service: Option<Dhcpv6Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub secure_filter_in: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub secure_filter_out: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dynamic_filter_out: Vec<u32>,
}

/// Parses every interface that has at least one `ipv6 <iface>` line.
pub fn parse_ipv6_interfaces(raw: &str) -> Result<Vec<Ipv6InterfaceConfig>, ParseError> {
    let mut names: Vec<&str> = Vec::new();
    for directive in directives(raw) {
        let Some(rest) = directive.text.strip_prefix("ipv6 ") else {
            continue;
        };
        let Some(name) = rest.split_whitespace().next() else {
            continue;
        };
        // `ipv6 prefix ...` and `ipv6 route ...` are not interface lines.
        if name == "prefix" || name == "route" {
            continue;
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| parse_ipv6_interface(raw, name))
        .collect()
}

/// Extracts the configuration of one interface from the full dump.
pub fn parse_ipv6_interface(raw: &str, interface: &str) -> Result<Ipv6InterfaceConfig, ParseError> {
    let mut config = Ipv6InterfaceConfig {
        interface: interface.to_string(),
        ..Ipv6InterfaceConfig::default()
    };
    let prefix = format!("ipv6 {interface} ");

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix(&prefix) else {
            continue;
        };

        if let Some(addr_str) = rest.strip_prefix("address ") {
            config.addresses.push(parse_address(addr_str.trim()));
        } else if let Some(rtadv_str) = rest.strip_prefix("rtadv send ") {
            config.rtadv = parse_rtadv(line, rtadv_str)?;
        } else if let Some(service) = rest.strip_prefix("dhcp service ") {
            config.dhcpv6_service = match service.trim() {
                "server" => Some(Dhcpv6Service::Server),
                "client" => Some(Dhcpv6Service::Client),
                other => {
                    return Err(ParseError::malformed(
                        line,
                        format!("unknown dhcp service '{other}'"),
                    ))
                }
            };
        } else if let Some(mtu_str) = rest.strip_prefix("mtu ") {
            config.mtu = Some(
                mtu_str
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "mtu is not a number"))?,
            );
        } else if let Some(list) = rest.strip_prefix("secure filter in ") {
            config.secure_filter_in = parse_filter_list(line, list)?;
        } else if let Some(list) = rest.strip_prefix("secure filter out ") {
            // Dynamic filters follow the static list on the same line.
            match list.split_once(" dynamic ") {
                Some((static_part, dynamic_part)) => {
                    config.secure_filter_out = parse_filter_list(line, static_part)?;
                    config.dynamic_filter_out = parse_filter_list(line, dynamic_part)?;
                }
                None => config.secure_filter_out = parse_filter_list(line, list)?,
            }
        }
    }

    Ok(config)
}

fn parse_address(addr_str: &str) -> Ipv6Address {
    if addr_str.contains('@') {
        if let Some((prefix_ref, interface_id)) = addr_str.split_once("::") {
            return Ipv6Address::PrefixRef {
                prefix_ref: prefix_ref.to_string(),
                interface_id: format!("::{interface_id}"),
            };
        }
    }
    Ipv6Address::Static {
        address: addr_str.to_string(),
    }
}

/// `<prefix_id> [o_flag=on|off] [m_flag=on|off] [lifetime=<secs>]`.
fn parse_rtadv(line: &str, rtadv_str: &str) -> Result<Option<RtadvConfig>, ParseError> {
    let mut tokens = rtadv_str.split_whitespace();
    let Some(id_str) = tokens.next() else {
        return Ok(None);
    };
    let prefix_id = id_str
        .parse()
        .map_err(|_| ParseError::malformed(line, "rtadv prefix ID is not a number"))?;

    let mut rtadv = RtadvConfig {
        prefix_id,
        o_flag: false,
        m_flag: false,
        lifetime: None,
    };
    for token in tokens {
        let lower = token.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("o_flag=") {
            rtadv.o_flag = value == "on";
        } else if let Some(value) = lower.strip_prefix("m_flag=") {
            rtadv.m_flag = value == "on";
        } else if let Some(value) = token.strip_prefix("lifetime=") {
            rtadv.lifetime = Some(
                value
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "rtadv lifetime is not a number"))?,
            );
        }
    }
    Ok(Some(rtadv))
}

fn parse_filter_list(line: &str, list: &str) -> Result<Vec<u32>, ParseError> {
    list.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| ParseError::malformed(line, format!("bad filter number '{token}'")))
        })
        .collect()
}

pub fn build_address_command(iface: &str, addr: &Ipv6Address) -> String {
    match addr {
        Ipv6Address::Static { address } => format!("ipv6 {iface} address {address}"),
        Ipv6Address::PrefixRef {
            prefix_ref,
            interface_id,
        } => format!("ipv6 {iface} address {prefix_ref}{interface_id}"),
    }
}

pub fn build_delete_address_command(iface: &str, addr: Option<&Ipv6Address>) -> String {
    match addr {
        Some(addr) => format!("no {}", build_address_command(iface, addr)),
        None => format!("no ipv6 {iface} address"),
    }
}

pub fn build_rtadv_command(iface: &str, rtadv: &RtadvConfig) -> String {
    let mut cmd = format!(
        "ipv6 {iface} rtadv send {} o_flag={} m_flag={}",
        rtadv.prefix_id,
        if rtadv.o_flag { "on" } else { "off" },
        if rtadv.m_flag { "on" } else { "off" },
    );
    if let Some(lifetime) = rtadv.lifetime {
        let _ = write!(cmd, " lifetime={lifetime}");
    }
    cmd
}

pub fn build_delete_rtadv_command(iface: &str) -> String {
    format!("no ipv6 {iface} rtadv send")
}

pub fn build_dhcpv6_service_command(iface: &str, service: Dhcpv6Service) -> String {
    format!("ipv6 {iface} dhcp service {}", service.as_str())
}

pub fn build_delete_dhcpv6_service_command(iface: &str) -> String {
    format!("no ipv6 {iface} dhcp service")
}

pub fn build_mtu_command(iface: &str, mtu: u32) -> String {
    format!("ipv6 {iface} mtu {mtu}")
}

pub fn build_delete_mtu_command(iface: &str) -> String {
    format!("no ipv6 {iface} mtu")
}

pub fn build_secure_filter_in_command(iface: &str, filters: &[u32]) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    Some(format!(
        "ipv6 {iface} secure filter in {}",
        join_numbers(filters)
    ))
}

pub fn build_secure_filter_out_command(
    iface: &str,
    filters: &[u32],
    dynamic: &[u32],
) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    let mut cmd = format!("ipv6 {iface} secure filter out {}", join_numbers(filters));
    if !dynamic.is_empty() {
        let _ = write!(cmd, " dynamic {}", join_numbers(dynamic));
    }
    Some(cmd)
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_show_interface_command(iface: &str) -> String {
    format!(r#"show config | grep "ipv6 {iface}""#)
}

/// Full teardown of an interface's IPv6 configuration.
pub fn build_delete_interface_commands(iface: &str) -> Vec<String> {
    vec![
        format!("no ipv6 {iface} address"),
        format!("no ipv6 {iface} rtadv send"),
        format!("no ipv6 {iface} dhcp service"),
        format!("no ipv6 {iface} mtu"),
        format!("no ipv6 {iface} secure filter in"),
        format!("no ipv6 {iface} secure filter out"),
    ]
}

pub fn validate_ipv6_interface(config: &Ipv6InterfaceConfig) -> Result<(), ValidateError> {
    validate_interface_name(&config.interface)?;
    for (i, addr) in config.addresses.iter().enumerate() {
        validate_address(addr).map_err(|e| ValidateError::new(format!("address {i}: {e}")))?;
    }
    if let Some(rtadv) = &config.rtadv {
        if rtadv.prefix_id == 0 {
            return Err(ValidateError::new("RTADV prefix_id must be positive"));
        }
    }
    if let Some(mtu) = config.mtu {
        if !(1280..=65_535).contains(&mtu) {
            return Err(ValidateError::new("IPv6 MTU must be between 1280 and 65535"));
        }
    }
    for filter in config
        .secure_filter_in
        .iter()
        .chain(&config.secure_filter_out)
        .chain(&config.dynamic_filter_out)
    {
        if *filter == 0 {
            return Err(ValidateError::new("filter numbers must be positive"));
        }
    }
    Ok(())
}

pub fn validate_interface_name(name: &str) -> Result<(), ValidateError> {
    for prefix in ["lan", "bridge", "pp", "tunnel"] {
        if let Some(digits) = name.strip_prefix(prefix) {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Ok(());
            }
        }
    }
    Err(ValidateError::new(format!(
        "invalid interface name '{name}' (expected lan1, bridge1, pp1, tunnel1, ...)"
    )))
}

fn validate_address(addr: &Ipv6Address) -> Result<(), ValidateError> {
    match addr {
        Ipv6Address::Static { address } => {
            if !address.contains('/') {
                return Err(ValidateError::new(
                    "static address must include a prefix length",
                ));
            }
        }
        Ipv6Address::PrefixRef {
            prefix_ref,
            interface_id,
        } => {
            if !prefix_ref.contains('@') {
                return Err(ValidateError::new(
                    "prefix_ref must name a source interface (e.g. ra-prefix@lan2)",
                ));
            }
            if !interface_id.starts_with("::") {
                return Err(ValidateError::new("interface_id must start with ::"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DUMP: &str = "\
ipv6 lan1 address 2001:db8::1/64
ipv6 lan1 address ra-prefix@lan2::1/64
ipv6 lan1 rtadv send 1 o_flag=on m_flag=off lifetime=1800
ipv6 lan1 dhcp service server
ipv6 lan1 mtu 1460
ipv6 lan1 secure filter in 101000 101001
ipv6 lan1 secure filter out 101099 dynamic 101080 101081
ipv6 lan2 address 2001:db8:1::1/64
";

    #[test]
    fn discovers_all_configured_interfaces() {
        let configs = parse_ipv6_interfaces(DUMP).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].interface, "lan1");
        assert_eq!(configs[1].interface, "lan2");
        assert_eq!(configs[1].addresses.len(), 1);
    }

    #[test]
    fn interface_discovery_skips_prefix_and_route_lines() {
        let raw = "ipv6 prefix 1 2001:db8::/64\nipv6 route default gateway fe80::1%lan2\n";
        assert_eq!(parse_ipv6_interfaces(raw).unwrap(), Vec::new());
    }

    #[test]
    fn selects_only_the_named_interface() {
        let config = parse_ipv6_interface(DUMP, "lan1").unwrap();
        assert_eq!(config.addresses.len(), 2);
        assert_eq!(
            config.addresses[0],
            Ipv6Address::Static {
                address: "2001:db8::1/64".to_string()
            }
        );
        assert_eq!(
            config.addresses[1],
            Ipv6Address::PrefixRef {
                prefix_ref: "ra-prefix@lan2".to_string(),
                interface_id: "::1/64".to_string()
            }
        );
        let rtadv = config.rtadv.as_ref().unwrap();
        assert_eq!(rtadv.prefix_id, 1);
        assert!(rtadv.o_flag);
        assert!(!rtadv.m_flag);
        assert_eq!(rtadv.lifetime, Some(1800));
        assert_eq!(config.dhcpv6_service, Some(Dhcpv6Service::Server));
        assert_eq!(config.mtu, Some(1460));
        assert_eq!(config.secure_filter_in, vec![101000, 101001]);
        assert_eq!(config.secure_filter_out, vec![101099]);
        assert_eq!(config.dynamic_filter_out, vec![101080, 101081]);
    }

    #[test]
    fn rtadv_round_trip() {
        let config = parse_ipv6_interface(DUMP, "lan1").unwrap();
        let cmd = build_rtadv_command("lan1", config.rtadv.as_ref().unwrap());
        assert_eq!(cmd, "ipv6 lan1 rtadv send 1 o_flag=on m_flag=off lifetime=1800");
        let reparsed = parse_ipv6_interface(&cmd, "lan1").unwrap();
        assert_eq!(reparsed.rtadv, config.rtadv);
    }

    #[test]
    fn address_commands() {
        let config = parse_ipv6_interface(DUMP, "lan1").unwrap();
        assert_eq!(
            build_address_command("lan1", &config.addresses[1]),
            "ipv6 lan1 address ra-prefix@lan2::1/64"
        );
        assert_eq!(
            build_delete_address_command("lan1", None),
            "no ipv6 lan1 address"
        );
    }

    #[test]
    fn filter_out_without_dynamic() {
        let config = parse_ipv6_interface("ipv6 lan1 secure filter out 200000\n", "lan1").unwrap();
        assert_eq!(config.secure_filter_out, vec![200000]);
        assert!(config.dynamic_filter_out.is_empty());
        assert_eq!(
            build_secure_filter_out_command("lan1", &config.secure_filter_out, &[]),
            Some("ipv6 lan1 secure filter out 200000".to_string())
        );
    }

    #[test]
    fn mtu_range_is_validated() {
        let mut config = parse_ipv6_interface(DUMP, "lan1").unwrap();
        assert!(validate_ipv6_interface(&config).is_ok());
        config.mtu = Some(1000);
        assert!(validate_ipv6_interface(&config).is_err());
    }

    #[test]
    fn interface_name_validation() {
        assert!(validate_interface_name("lan1").is_ok());
        assert!(validate_interface_name("tunnel12").is_ok());
        assert!(validate_interface_name("eth0").is_err());
        assert!(validate_interface_name("lan").is_err());
    }
}
