//! Dialect-sensitive parser dispatch.
//!
//! Firmware families print `show` output in different layouts, so parsers
//! are looked up by (domain, model). An exact model key wins; otherwise the
//! model collapses to its family key (`RTX1220` becomes `RTX12xx`) and that
//! is tried before giving up. The registry is an explicit value owned by the
//! caller, built once at startup. Registration takes the write lock;
//! resolution only ever reads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::domain::{self, ParseError, Parsed};

/// Every configuration domain the registry knows how to dispatch.
pub const DOMAINS: &[&str] = &[
    "routes",
    "static_routes",
    "dhcp_scope",
    "dhcp_client",
    "dhcp_relay",
    "dhcp_lease_type",
    "admin",
    "bridge",
    "nat_static",
    "ipsec_transport",
    "ipv6_prefix",
    "ipv6_interface",
    "ospf",
    "system",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Resolution miss. Never produced for parse failures.
    #[error("no parser registered for domain '{domain}' and model '{model}'")]
    NotFound { domain: String, model: String },
    #[error("registry lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A parser for one configuration domain in one dialect.
pub trait DialectParser: Send + Sync {
    /// Parses raw `show config` style output into typed records.
    fn parse(&self, raw: &str) -> Result<Parsed, ParseError>;

    /// Whether this parser understands the given model's output layout.
    fn can_handle(&self, model: &str) -> bool;
}

/// Adapts a plain parse function into a [`DialectParser`].
///
/// Most domains are dialect-invariant because `show config` echoes the
/// commands that were entered. Only live-status output (the routing table)
/// varies by family.
struct FnParser<F>
where
    F: Fn(&str) -> Result<Parsed, ParseError> + Send + Sync,
{
    parse: F,
}

impl<F> DialectParser for FnParser<F>
where
    F: Fn(&str) -> Result<Parsed, ParseError> + Send + Sync,
{
    fn parse(&self, raw: &str) -> Result<Parsed, ParseError> {
        (self.parse)(raw)
    }

    fn can_handle(&self, _model: &str) -> bool {
        true
    }
}

/// Collapses a model name to its family wildcard key.
///
/// `RTX1220` and `RTX1210` both map to `RTX12xx`. Short names like `vRX`
/// have no family form.
fn family_key(model: &str) -> Option<String> {
    if model.len() < 6 || !model.starts_with("RTX") {
        return None;
    }
    // The model string comes straight from the caller; byte index 5 need
    // not be a char boundary.
    let stem = model.get(..5)?;
    Some(format!("{stem}xx"))
}

#[derive(Default)]
pub struct Registry {
    parsers: RwLock<HashMap<(String, String), Arc<dyn DialectParser>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Stores `parser` under the exact (domain, model) key, replacing any
    /// previous registration.
    pub fn register(
        &self,
        domain: &str,
        model: &str,
        parser: Arc<dyn DialectParser>,
    ) -> Result<(), RegistryError> {
        let mut parsers = self.parsers.write().map_err(|_| RegistryError::Poisoned)?;
        parsers.insert((domain.to_string(), model.to_string()), parser);
        Ok(())
    }

    /// Registers the parser already stored under (domain, model) again under
    /// (domain, alias_model). Fails if the source key is absent.
    pub fn register_alias(
        &self,
        domain: &str,
        model: &str,
        alias_model: &str,
    ) -> Result<(), RegistryError> {
        let mut parsers = self.parsers.write().map_err(|_| RegistryError::Poisoned)?;
        let parser = parsers
            .get(&(domain.to_string(), model.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                domain: domain.to_string(),
                model: model.to_string(),
            })?;
        parsers.insert((domain.to_string(), alias_model.to_string()), parser);
        Ok(())
    }

    /// Exact (domain, model) lookup, then the family wildcard.
    pub fn resolve(
        &self,
        domain: &str,
        model: &str,
    ) -> Result<Arc<dyn DialectParser>, RegistryError> {
        let parsers = self.parsers.read().map_err(|_| RegistryError::Poisoned)?;
        if let Some(parser) = parsers.get(&(domain.to_string(), model.to_string())) {
            return Ok(Arc::clone(parser));
        }
        if let Some(family) = family_key(model) {
            if let Some(parser) = parsers.get(&(domain.to_string(), family)) {
                return Ok(Arc::clone(parser));
            }
        }
        Err(RegistryError::NotFound {
            domain: domain.to_string(),
            model: model.to_string(),
        })
    }

    /// Convenience for resolve-then-parse.
    pub fn parse(&self, domain: &str, model: &str, raw: &str) -> Result<Parsed, RegistryError> {
        let parser = self.resolve(domain, model)?;
        Ok(parser.parse(raw)?)
    }
}

struct Rtx830RoutesParser;

impl DialectParser for Rtx830RoutesParser {
    fn parse(&self, raw: &str) -> Result<Parsed, ParseError> {
        domain::routes::parse_routes_rtx830(raw).map(Parsed::Routes)
    }

    fn can_handle(&self, model: &str) -> bool {
        model == "RTX830" || model == "RTX840"
    }
}

struct Rtx12xxRoutesParser;

impl DialectParser for Rtx12xxRoutesParser {
    fn parse(&self, raw: &str) -> Result<Parsed, ParseError> {
        domain::routes::parse_routes_rtx12xx(raw).map(Parsed::Routes)
    }

    fn can_handle(&self, model: &str) -> bool {
        !matches!(model, "RTX830" | "RTX840")
    }
}

fn invariant(
    parse: impl Fn(&str) -> Result<Parsed, ParseError> + Send + Sync + 'static,
) -> Arc<dyn DialectParser> {
    Arc::new(FnParser { parse })
}

/// Builds the registry with every known dialect wired up.
///
/// Dialect-invariant domains are registered once per supported model; the
/// routing table gets per-family parsers plus the `RTX12xx` wildcard so new
/// models in that family resolve without code changes.
pub fn default_registry(models: &[&str]) -> Result<Registry, RegistryError> {
    let registry = Registry::new();

    let invariants: Vec<(&str, Arc<dyn DialectParser>)> = vec![
        (
            "static_routes",
            invariant(|raw| domain::static_route::parse_static_routes(raw).map(Parsed::StaticRoutes)),
        ),
        (
            "dhcp_scope",
            invariant(|raw| domain::dhcp_scope::parse_dhcp_scopes(raw).map(Parsed::DhcpScopes)),
        ),
        (
            "dhcp_client",
            invariant(|raw| domain::dhcp_client::parse_dhcp_clients(raw).map(Parsed::DhcpClients)),
        ),
        (
            "dhcp_relay",
            invariant(|raw| domain::dhcp_relay::parse_dhcp_relay(raw).map(Parsed::DhcpRelay)),
        ),
        (
            "dhcp_lease_type",
            invariant(|raw| {
                domain::dhcp_lease_type::parse_lease_types(raw).map(Parsed::DhcpLeaseTypes)
            }),
        ),
        (
            "admin",
            invariant(|raw| domain::admin::parse_admin_config(raw).map(Parsed::Admin)),
        ),
        (
            "bridge",
            invariant(|raw| domain::bridge::parse_bridges(raw).map(Parsed::Bridges)),
        ),
        (
            "nat_static",
            invariant(|raw| domain::nat_static::parse_nat_static(raw).map(Parsed::NatStatic)),
        ),
        (
            "ipsec_transport",
            invariant(|raw| {
                domain::ipsec_transport::parse_ipsec_transports(raw).map(Parsed::IpsecTransports)
            }),
        ),
        (
            "ipv6_prefix",
            invariant(|raw| domain::ipv6_prefix::parse_ipv6_prefixes(raw).map(Parsed::Ipv6Prefixes)),
        ),
        (
            "ipv6_interface",
            invariant(|raw| {
                domain::ipv6_interface::parse_ipv6_interfaces(raw).map(Parsed::Ipv6Interfaces)
            }),
        ),
        (
            "ospf",
            invariant(|raw| domain::ospf::parse_ospf_config(raw).map(Parsed::Ospf)),
        ),
        (
            "system",
            invariant(|raw| domain::system::parse_system_config(raw).map(Parsed::System)),
        ),
    ];

    for (domain_name, parser) in &invariants {
        for model in models {
            registry.register(domain_name, model, Arc::clone(parser))?;
        }
    }

    for model in models {
        let parser: Arc<dyn DialectParser> = match *model {
            "RTX830" | "RTX840" => Arc::new(Rtx830RoutesParser),
            _ => Arc::new(Rtx12xxRoutesParser),
        };
        registry.register("routes", model, parser)?;
    }
    if models.contains(&"RTX1210") {
        registry.register_alias("routes", "RTX1210", "RTX12xx")?;
    }

    Ok(registry)
}
