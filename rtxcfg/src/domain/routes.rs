//! Active routing table (`show ip route`).
//!
//! Unlike the other domains this one reads operational output, not
//! configuration, and the layout differs per device family. RTX830 firmware
//! prints `S 0.0.0.0/0 via 192.168.1.1 dev LAN1 metric 1` style lines while
//! the RTX12xx family prints a columnar table under a header row. Both
//! dialects normalize to the same [`RouteEntry`].

use std::net::Ipv4Addr;

use cfgline_core::NetworkSpec;
use serde::Serialize;

use super::ParseError;

/// Origin protocol of a routing table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProtocol {
    Static,
    Connected,
    Rip,
    Ospf,
    Bgp,
    Ppp,
    Dhcp,
}

impl RouteProtocol {
    /// Single-letter code used by both table layouts.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(RouteProtocol::Static),
            "C" => Some(RouteProtocol::Connected),
            "R" => Some(RouteProtocol::Rip),
            "O" => Some(RouteProtocol::Ospf),
            "B" => Some(RouteProtocol::Bgp),
            "P" => Some(RouteProtocol::Ppp),
            "D" => Some(RouteProtocol::Dhcp),
            _ => None,
        }
    }
}

/// One row of the routing table, dialect-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub destination: NetworkSpec,
    /// `None` for directly connected routes (printed as `*` by RTX12xx).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    pub interface: String,
    pub protocol: RouteProtocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<u32>,
}

/// RTX830 layout: `<code> <dest> [via <gw>] [dev <iface>] [metric <n>]`.
///
/// Lines whose first token is not a protocol code are skipped, so banner
/// and summary lines in the raw output are tolerated.
pub fn parse_routes_rtx830(raw: &str) -> Result<Vec<RouteEntry>, ParseError> {
    let mut routes = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(protocol) = tokens.next().and_then(RouteProtocol::from_code) else {
            continue;
        };
        let Some(dest_str) = tokens.next() else {
            continue;
        };
        let destination: NetworkSpec = dest_str
            .parse()
            .map_err(|_| ParseError::malformed(line, "bad destination"))?;

        let mut entry = RouteEntry {
            destination,
            gateway: None,
            interface: String::new(),
            protocol,
            metric: None,
        };
        while let Some(token) = tokens.next() {
            match token {
                "via" => {
                    let gw = tokens
                        .next()
                        .ok_or_else(|| ParseError::malformed(line, "'via' without gateway"))?;
                    entry.gateway = Some(
                        gw.parse()
                            .map_err(|_| ParseError::malformed(line, "bad gateway address"))?,
                    );
                }
                "dev" => {
                    entry.interface = tokens
                        .next()
                        .ok_or_else(|| ParseError::malformed(line, "'dev' without interface"))?
                        .to_string();
                }
                "metric" => {
                    let m = tokens
                        .next()
                        .ok_or_else(|| ParseError::malformed(line, "'metric' without value"))?;
                    entry.metric = Some(
                        m.parse()
                            .map_err(|_| ParseError::malformed(line, "metric is not a number"))?,
                    );
                }
                _ => {}
            }
        }
        routes.push(entry);
    }

    Ok(routes)
}

/// RTX12xx layout: a `Destination Gateway Interface Protocol Metric` header
/// followed by one aligned row per route. Rows before the header are
/// ignored; a `*` gateway marks a connected route and `-` an absent metric.
pub fn parse_routes_rtx12xx(raw: &str) -> Result<Vec<RouteEntry>, ParseError> {
    let mut routes = Vec::new();
    let mut header_seen = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Destination") {
            header_seen = true;
            continue;
        }
        if !header_seen {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [dest_str, gw_str, iface, code, metric_str] = fields[..] else {
            continue;
        };
        let Some(protocol) = RouteProtocol::from_code(code) else {
            continue;
        };
        let destination: NetworkSpec = dest_str
            .parse()
            .map_err(|_| ParseError::malformed(line, "bad destination"))?;
        let gateway = match gw_str {
            "*" => None,
            addr => Some(
                addr.parse()
                    .map_err(|_| ParseError::malformed(line, "bad gateway address"))?,
            ),
        };
        let metric = match metric_str {
            "-" => None,
            value => Some(
                value
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "metric is not a number"))?,
            ),
        };

        routes.push(RouteEntry {
            destination,
            gateway,
            interface: iface.to_string(),
            protocol,
            metric,
        });
    }

    Ok(routes)
}

pub fn build_show_routes_command() -> String {
    "show ip route".to_string()
}
