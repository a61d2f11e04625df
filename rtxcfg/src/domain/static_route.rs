//! Static route configuration (`ip route ...`).
//!
//! The device prints one line per destination, with equal-cost next hops
//! chained on a single line (`... gateway 10.0.0.1 gateway 10.0.0.2`).
//! Parsing groups hops under their destination and keeps both the line
//! order of destinations and the hop order within each line.

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use cfgline_core::{directives, NetworkSpec, OptionGrammar, Strictness};
use serde::Serialize;

use super::{is_valid_interface, ParseError, ValidateError};

/// Where a next hop forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gateway {
    /// Forward to a neighbor address.
    Ip(Ipv4Addr),
    /// Forward out an interface (`pp 1`, `tunnel 2`, `dhcp lan2`, `null`).
    Iface(String),
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gateway::Ip(addr) => write!(f, "{addr}"),
            Gateway::Iface(name) => f.write_str(name),
        }
    }
}

/// One next hop of a static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextHop {
    pub gateway: Gateway,
    /// Administrative weight. The device omits `weight` for the default of 1.
    pub distance: u32,
    /// Apply the route only to traffic passing the numbered filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<u32>,
    /// Exclude the hop from ECMP unless the others are down.
    pub hide: bool,
    /// Keep the route installed while the gateway is unreachable.
    pub permanent: bool,
    /// Free-form description, greedy to end of line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NextHop {
    pub fn new(gateway: Gateway) -> Self {
        NextHop {
            gateway,
            distance: 1,
            filter: None,
            hide: false,
            permanent: false,
            name: None,
        }
    }
}

/// A destination with its ordered next hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    pub network: NetworkSpec,
    pub next_hops: Vec<NextHop>,
}

fn hop_grammar() -> OptionGrammar {
    OptionGrammar::new(Strictness::Lenient)
        .one("weight")
        .one("filter")
        .flag("hide")
        .flag("keepalive")
        .greedy("name")
}

/// Parses `ip route` lines out of `show config` output.
///
/// Hops for the same destination accumulate across lines in encounter
/// order. Lines negated with `no` and non-route lines are skipped.
pub fn parse_static_routes(raw: &str) -> Result<Vec<StaticRoute>, ParseError> {
    let grammar = hop_grammar();
    let mut routes: Vec<StaticRoute> = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("ip route ") else {
            continue;
        };
        let Some((network_str, gateway_part)) = rest.split_once(" gateway ") else {
            continue;
        };
        let network: NetworkSpec = network_str
            .trim()
            .parse()
            .map_err(|_| ParseError::malformed(line, "bad destination network"))?;

        let mut hops = Vec::new();
        for part in split_on_gateway(gateway_part) {
            hops.push(parse_hop(line, part, &grammar)?);
        }
        if hops.is_empty() {
            return Err(ParseError::malformed(line, "no gateway given"));
        }

        match routes.iter_mut().find(|r| r.network == network) {
            Some(route) => route.next_hops.extend(hops),
            None => routes.push(StaticRoute {
                network,
                next_hops: hops,
            }),
        }
    }

    Ok(routes)
}

/// Splits the tail of a route line into per-hop specifications.
fn split_on_gateway(gateway_part: &str) -> impl Iterator<Item = &str> {
    gateway_part
        .split(" gateway ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

fn parse_hop(line: &str, part: &str, grammar: &OptionGrammar) -> Result<NextHop, ParseError> {
    let mut tokens = part.split_whitespace();
    let Some(first) = tokens.next() else {
        return Err(ParseError::malformed(line, "empty gateway specification"));
    };

    // A two-token interface form consumes the next token as its unit number.
    let (gateway, consumed_second) = match first {
        "pp" | "tunnel" | "dhcp" => match tokens.clone().next() {
            Some(unit) if !grammar.is_keyword(unit) => {
                (Gateway::Iface(format!("{first} {unit}")), true)
            }
            _ if first == "dhcp" => (Gateway::Iface("dhcp".to_string()), false),
            _ => {
                return Err(ParseError::malformed(
                    line,
                    format!("'{first}' gateway needs a unit number"),
                ))
            }
        },
        "null" | "loopback" => (Gateway::Iface(first.to_string()), false),
        other => match other.parse::<Ipv4Addr>() {
            Ok(addr) => (Gateway::Ip(addr), false),
            Err(_) => (Gateway::Iface(other.to_string()), false),
        },
    };
    if consumed_second {
        tokens.next();
    }

    let tail = tokens.collect::<Vec<_>>().join(" ");
    let options = grammar
        .tokenize(&tail)
        .map_err(|source| ParseError::BadOptions {
            line: line.to_string(),
            source,
        })?;

    let mut hop = NextHop::new(gateway);
    if let Some(weight) = options.one("weight") {
        hop.distance = weight
            .parse()
            .map_err(|_| ParseError::malformed(line, "weight is not a number"))?;
    }
    if let Some(filter) = options.one("filter") {
        hop.filter = Some(
            filter
                .parse()
                .map_err(|_| ParseError::malformed(line, "filter is not a number"))?,
        );
    }
    hop.hide = options.flag("hide");
    hop.permanent = options.flag("keepalive");
    hop.name = options.many("name").map(|words| words.join(" "));
    Ok(hop)
}

/// `ip route <network> gateway <gw> [weight N] [filter N] [hide] [keepalive]`.
///
/// The network renders through the default alias and CIDR shortening, so a
/// parse then rebuild of `ip route default gateway 10.0.0.1` is stable.
pub fn build_route_command(route: &StaticRoute, hop: &NextHop) -> String {
    let mut cmd = format!("ip route {} gateway {}", route.network, hop.gateway);
    if hop.distance > 1 {
        let _ = write!(cmd, " weight {}", hop.distance);
    }
    if let Some(filter) = hop.filter {
        let _ = write!(cmd, " filter {filter}");
    }
    if hop.hide {
        cmd.push_str(" hide");
    }
    if hop.permanent {
        cmd.push_str(" keepalive");
    }
    cmd
}

/// `no ip route <network>` or, with a hop, `no ip route <network> gateway <gw>`.
pub fn build_delete_route_command(network: NetworkSpec, hop: Option<&NextHop>) -> String {
    match hop {
        Some(hop) => format!("no ip route {network} gateway {}", hop.gateway),
        None => format!("no ip route {network}"),
    }
}

pub fn build_show_routes_command() -> String {
    r#"show config | grep "ip route""#.to_string()
}

pub fn build_show_route_command(network: NetworkSpec) -> String {
    format!(r#"show config | grep "ip route {network}""#)
}

/// Semantic checks on a route record.
pub fn validate_static_route(route: &StaticRoute) -> Result<(), ValidateError> {
    if route.next_hops.is_empty() {
        return Err(ValidateError::new("at least one next hop is required"));
    }
    for (i, hop) in route.next_hops.iter().enumerate() {
        validate_next_hop(hop).map_err(|e| ValidateError::new(format!("next hop {i}: {e}")))?;
    }
    Ok(())
}

fn validate_next_hop(hop: &NextHop) -> Result<(), ValidateError> {
    if let Gateway::Iface(name) = &hop.gateway {
        if !is_valid_interface(name) {
            return Err(ValidateError::new(format!("invalid interface '{name}'")));
        }
    }
    if hop.distance > 100 {
        return Err(ValidateError::new("distance must be between 0 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_route_single_hop() {
        let routes = parse_static_routes("ip route default gateway 192.168.1.1\n").unwrap();
        assert_eq!(routes.len(), 1);
        assert!(routes[0].network.is_default());
        assert_eq!(
            routes[0].next_hops[0].gateway,
            Gateway::Ip("192.168.1.1".parse().unwrap())
        );
        assert_eq!(routes[0].next_hops[0].distance, 1);
    }

    #[test]
    fn ecmp_hops_keep_line_order() {
        let raw = "ip route default gateway 10.0.0.1 gateway 10.0.0.2 weight 2 gateway 10.0.0.3 weight 3\n";
        let routes = parse_static_routes(raw).unwrap();
        let hops = &routes[0].next_hops;
        assert_eq!(hops.len(), 3);
        assert_eq!(hops[0].gateway, Gateway::Ip("10.0.0.1".parse().unwrap()));
        assert_eq!(hops[1].gateway, Gateway::Ip("10.0.0.2".parse().unwrap()));
        assert_eq!(hops[2].gateway, Gateway::Ip("10.0.0.3".parse().unwrap()));
        assert_eq!(
            hops.iter().map(|h| h.distance).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn interface_gateways() {
        let raw = "\
ip route 10.1.0.0/16 gateway pp 1
ip route 10.2.0.0/16 gateway tunnel 2 keepalive
ip route 10.3.0.0/16 gateway dhcp lan2
ip route 10.4.0.0/16 gateway null
";
        let routes = parse_static_routes(raw).unwrap();
        let ifaces: Vec<_> = routes
            .iter()
            .map(|r| match &r.next_hops[0].gateway {
                Gateway::Iface(name) => name.as_str(),
                other => panic!("expected interface, got {other:?}"),
            })
            .collect();
        assert_eq!(ifaces, vec!["pp 1", "tunnel 2", "dhcp lan2", "null"]);
        assert!(routes[1].next_hops[0].permanent);
    }

    #[test]
    fn hide_and_filter_and_name() {
        let raw = "ip route 172.16.0.0/12 gateway 10.0.0.1 filter 500 hide name backup link\n";
        let routes = parse_static_routes(raw).unwrap();
        let hop = &routes[0].next_hops[0];
        assert_eq!(hop.filter, Some(500));
        assert!(hop.hide);
        assert!(!hop.permanent);
        assert_eq!(hop.name.as_deref(), Some("backup link"));
    }

    #[test]
    fn dotted_mask_destination() {
        let raw = "ip route 192.168.10.0/255.255.255.0 gateway 10.0.0.1\n";
        let routes = parse_static_routes(raw).unwrap();
        assert_eq!(routes[0].network.prefix_len(), Some(24));
        assert_eq!(routes[0].network.to_string(), "192.168.10.0/24");
    }

    #[test]
    fn same_destination_accumulates_across_lines() {
        let raw = "\
ip route default gateway 10.0.0.1
ip route default gateway 10.0.0.2
";
        let routes = parse_static_routes(raw).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].next_hops.len(), 2);
    }

    #[test]
    fn negated_and_foreign_lines_skipped() {
        let raw = "\
no ip route default
ip lan1 address 192.168.1.1/24
ip route default gateway 10.0.0.1
";
        let routes = parse_static_routes(raw).unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn build_round_trip_uses_default_alias() {
        let routes = parse_static_routes("ip route default gateway 192.168.1.1\n").unwrap();
        let cmd = build_route_command(&routes[0], &routes[0].next_hops[0]);
        assert_eq!(cmd, "ip route default gateway 192.168.1.1");
        let again = parse_static_routes(&cmd).unwrap();
        assert_eq!(again, routes);
    }

    #[test]
    fn build_includes_options() {
        let route = StaticRoute {
            network: "10.0.0.0/8".parse().unwrap(),
            next_hops: vec![NextHop {
                gateway: Gateway::Iface("tunnel 1".to_string()),
                distance: 5,
                filter: Some(200),
                hide: false,
                permanent: true,
                name: None,
            }],
        };
        assert_eq!(
            build_route_command(&route, &route.next_hops[0]),
            "ip route 10.0.0.0/8 gateway tunnel 1 weight 5 filter 200 keepalive"
        );
    }

    #[test]
    fn delete_commands() {
        let network: NetworkSpec = "default".parse().unwrap();
        assert_eq!(build_delete_route_command(network, None), "no ip route default");
        let hop = NextHop::new(Gateway::Ip("10.0.0.1".parse().unwrap()));
        assert_eq!(
            build_delete_route_command(network, Some(&hop)),
            "no ip route default gateway 10.0.0.1"
        );
    }

    #[test]
    fn validate_rejects_bad_interface_and_distance() {
        let mut route = StaticRoute {
            network: NetworkSpec::DEFAULT,
            next_hops: vec![NextHop::new(Gateway::Iface("eth0".to_string()))],
        };
        assert!(validate_static_route(&route).is_err());

        route.next_hops[0].gateway = Gateway::Ip("10.0.0.1".parse().unwrap());
        route.next_hops[0].distance = 101;
        assert!(validate_static_route(&route).is_err());

        route.next_hops[0].distance = 100;
        assert!(validate_static_route(&route).is_ok());

        route.next_hops.clear();
        assert!(validate_static_route(&route).is_err());
    }
}
