//! Configuration domains.
//!
//! One module per configuration category, each owning its record types, a
//! parser for `show config` output, command builders for write-back, and a
//! validator. Parsers never apply semantic range checks; those belong to the
//! validators so that partially valid device state can still be inspected.

use cfgline_core::TokenizeError;
use serde::Serialize;
use thiserror::Error;

pub mod admin;
pub mod bridge;
pub mod dhcp_client;
pub mod dhcp_lease_type;
pub mod dhcp_relay;
pub mod dhcp_scope;
pub mod ipsec_transport;
pub mod ipv6_interface;
pub mod ipv6_prefix;
pub mod nat_static;
pub mod ospf;
pub mod routes;
pub mod static_route;
pub mod system;

/// Errors produced while structurally decomposing configuration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line matched the domain's command prefix but failed decomposition.
    #[error("malformed line '{line}': {reason}")]
    MalformedLine { line: String, reason: String },
    /// The option tail of a line could not be tokenized.
    #[error("bad option tail in '{line}': {source}")]
    BadOptions {
        line: String,
        #[source]
        source: TokenizeError,
    },
}

impl ParseError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        ParseError::MalformedLine {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// A semantic validation failure, reported only by domain validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidateError(pub String);

impl ValidateError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        ValidateError(message.into())
    }
}

/// Parsed records for one domain, tagged by domain.
///
/// The registry hands back parsers for heterogeneous domains; this is the
/// common return currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "domain", content = "records", rename_all = "snake_case")]
pub enum Parsed {
    Routes(Vec<routes::RouteEntry>),
    StaticRoutes(Vec<static_route::StaticRoute>),
    // The serialized tag must equal the registry domain name, which is
    // singular where the variant name is plural.
    #[serde(rename = "dhcp_scope")]
    DhcpScopes(Vec<dhcp_scope::DhcpScope>),
    #[serde(rename = "dhcp_client")]
    DhcpClients(Vec<dhcp_client::DhcpClientConfig>),
    DhcpRelay(dhcp_relay::DhcpRelayConfig),
    #[serde(rename = "dhcp_lease_type")]
    DhcpLeaseTypes(Vec<dhcp_lease_type::DhcpLeaseType>),
    Admin(admin::AdminConfig),
    #[serde(rename = "bridge")]
    Bridges(Vec<bridge::BridgeConfig>),
    NatStatic(Vec<nat_static::NatStatic>),
    #[serde(rename = "ipsec_transport")]
    IpsecTransports(Vec<ipsec_transport::IpsecTransport>),
    #[serde(rename = "ipv6_prefix")]
    Ipv6Prefixes(Vec<ipv6_prefix::Ipv6Prefix>),
    #[serde(rename = "ipv6_interface")]
    Ipv6Interfaces(Vec<ipv6_interface::Ipv6InterfaceConfig>),
    Ospf(ospf::OspfConfig),
    System(system::SystemConfig),
}

impl Parsed {
    /// The domain tag used for registry lookups and report grouping.
    pub fn domain(&self) -> &'static str {
        match self {
            Parsed::Routes(_) => "routes",
            Parsed::StaticRoutes(_) => "static_routes",
            Parsed::DhcpScopes(_) => "dhcp_scope",
            Parsed::DhcpClients(_) => "dhcp_client",
            Parsed::DhcpRelay(_) => "dhcp_relay",
            Parsed::DhcpLeaseTypes(_) => "dhcp_lease_type",
            Parsed::Admin(_) => "admin",
            Parsed::Bridges(_) => "bridge",
            Parsed::NatStatic(_) => "nat_static",
            Parsed::IpsecTransports(_) => "ipsec_transport",
            Parsed::Ipv6Prefixes(_) => "ipv6_prefix",
            Parsed::Ipv6Interfaces(_) => "ipv6_interface",
            Parsed::Ospf(_) => "ospf",
            Parsed::System(_) => "system",
        }
    }

    /// Number of records, for summary output.
    pub fn record_count(&self) -> usize {
        match self {
            Parsed::Routes(v) => v.len(),
            Parsed::StaticRoutes(v) => v.len(),
            Parsed::DhcpScopes(v) => v.len(),
            Parsed::DhcpClients(v) => v.len(),
            Parsed::DhcpRelay(c) => usize::from(!c.servers.is_empty()) + c.selects.len(),
            Parsed::DhcpLeaseTypes(v) => v.len(),
            Parsed::Admin(c) => c.users.len(),
            Parsed::Bridges(v) => v.len(),
            Parsed::NatStatic(v) => v.len(),
            Parsed::IpsecTransports(v) => v.len(),
            Parsed::Ipv6Prefixes(v) => v.len(),
            Parsed::Ipv6Interfaces(v) => v.len(),
            Parsed::Ospf(c) => usize::from(c.enabled || !c.areas.is_empty()),
            Parsed::System(c) => usize::from(*c != system::SystemConfig::default()),
        }
    }

    /// Synthesizes the CLI commands that would recreate these records on a
    /// blank device. The live routing table has no create form and yields
    /// nothing. Users parsed without a password get their attribute line
    /// only; the device never echoes what it cannot restore.
    pub fn create_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        match self {
            Parsed::Routes(_) => {}
            Parsed::StaticRoutes(routes) => {
                for route in routes {
                    for hop in &route.next_hops {
                        commands.push(static_route::build_route_command(route, hop));
                    }
                }
            }
            Parsed::DhcpScopes(scopes) => {
                for scope in scopes {
                    commands.push(dhcp_scope::build_scope_create_command(scope));
                }
            }
            Parsed::DhcpClients(clients) => {
                for client in clients {
                    let iface = &client.interface;
                    if let Some(hostname) = &client.hostname {
                        commands.push(dhcp_client::build_hostname_command(iface, hostname));
                    }
                    if let Some(id) = &client.client_id {
                        commands.push(dhcp_client::build_client_id_command(iface, id));
                    }
                    if let Some(id) = &client.vendor_id {
                        commands.push(dhcp_client::build_vendor_id_command(iface, id));
                    }
                    if client.require_dns {
                        commands.push(dhcp_client::build_require_dns_command(iface, true));
                    }
                    if client.release_on.is_some() {
                        commands.push(dhcp_client::build_release_linkdown_command(iface));
                    }
                }
            }
            Parsed::DhcpRelay(relay) => {
                commands.extend(dhcp_relay::build_relay_server_command(&relay.servers));
                for select in &relay.selects {
                    commands.push(dhcp_relay::build_relay_select_command(select));
                }
            }
            Parsed::DhcpLeaseTypes(types) => {
                for lease in types {
                    commands.push(dhcp_lease_type::build_lease_type_command(lease));
                }
            }
            Parsed::Admin(config) => {
                for user in &config.users {
                    if let Ok(cmd) = admin::build_user_command(user) {
                        commands.push(cmd);
                    }
                    commands.extend(admin::build_user_attribute_command(
                        &user.username,
                        &user.attributes,
                    ));
                }
            }
            Parsed::Bridges(bridges) => {
                for bridge in bridges {
                    commands.push(bridge::build_bridge_member_command(bridge));
                }
            }
            Parsed::NatStatic(descriptors) => {
                for nat in descriptors {
                    commands.extend(nat_static::build_nat_static_commands(nat));
                }
            }
            Parsed::IpsecTransports(transports) => {
                for transport in transports {
                    commands.push(ipsec_transport::build_transport_command(transport));
                }
            }
            Parsed::Ipv6Prefixes(prefixes) => {
                for prefix in prefixes {
                    commands.push(ipv6_prefix::build_prefix_command(prefix));
                }
            }
            Parsed::Ipv6Interfaces(interfaces) => {
                for config in interfaces {
                    let iface = &config.interface;
                    for addr in &config.addresses {
                        commands.push(ipv6_interface::build_address_command(iface, addr));
                    }
                    if let Some(rtadv) = &config.rtadv {
                        commands.push(ipv6_interface::build_rtadv_command(iface, rtadv));
                    }
                    if let Some(service) = config.dhcpv6_service {
                        commands.push(ipv6_interface::build_dhcpv6_service_command(
                            iface, service,
                        ));
                    }
                    if let Some(mtu) = config.mtu {
                        commands.push(ipv6_interface::build_mtu_command(iface, mtu));
                    }
                    commands.extend(ipv6_interface::build_secure_filter_in_command(
                        iface,
                        &config.secure_filter_in,
                    ));
                    commands.extend(ipv6_interface::build_secure_filter_out_command(
                        iface,
                        &config.secure_filter_out,
                        &config.dynamic_filter_out,
                    ));
                }
            }
            Parsed::Ospf(config) => {
                if config.enabled {
                    commands.push(ospf::build_ospf_use_command(true));
                }
                if let Some(router_id) = config.router_id {
                    commands.push(ospf::build_router_id_command(router_id));
                }
                if config.redistribute_static {
                    commands.push(ospf::build_import_static_command());
                }
                for area in &config.areas {
                    commands.push(ospf::build_area_command(area));
                }
                for assignment in &config.interface_areas {
                    commands.push(ospf::build_interface_area_command(assignment));
                }
            }
            Parsed::System(config) => {
                if let Some(tz) = &config.timezone {
                    commands.push(system::build_timezone_command(tz));
                }
                if let Some(console) = &config.console {
                    if let Some(character) = &console.character {
                        commands.push(system::build_console_character_command(character));
                    }
                    if let Some(lines) = &console.lines {
                        commands.push(system::build_console_lines_command(lines));
                    }
                    if let Some(prompt) = &console.prompt {
                        commands.push(system::build_console_prompt_command(prompt));
                    }
                }
                for pb in &config.packet_buffers {
                    commands.push(system::build_packet_buffer_command(pb));
                }
                if let Some(stats) = &config.statistics {
                    if stats.traffic {
                        commands.push(system::build_statistics_traffic_command(true));
                    }
                    if stats.nat {
                        commands.push(system::build_statistics_nat_command(true));
                    }
                }
            }
        }
        commands
    }
}

/// Interface-name check shared by route and bridge validators.
///
/// Accepts the standard numbered interfaces plus the `dhcp`-derived gateway
/// forms (`dhcp`, `dhcp lan2`) and the `null`/`loopback` pseudo interfaces.
pub(crate) fn is_valid_interface(name: &str) -> bool {
    if name == "null" || name == "loopback" || name == "dhcp" {
        return true;
    }
    if let Some(rest) = name.strip_prefix("dhcp ") {
        return is_numbered_interface(rest);
    }
    if let Some(rest) = name.strip_prefix("pp ") {
        return rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty();
    }
    if let Some(rest) = name.strip_prefix("tunnel ") {
        return rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty();
    }
    is_numbered_interface(name)
}

/// `lan1`, `wan1`, `pp1`, `tunnel1`, `loopback1`, `bridge1`, plus the VLAN
/// form `lan1/1`.
pub(crate) fn is_numbered_interface(name: &str) -> bool {
    let (base, vlan) = match name.split_once('/') {
        Some((base, vlan)) => (base, Some(vlan)),
        None => (name, None),
    };
    if let Some(vlan) = vlan {
        if vlan.is_empty() || !vlan.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    for prefix in ["lan", "wan", "pp", "tunnel", "loopback", "bridge"] {
        if let Some(digits) = base.strip_prefix(prefix) {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}
