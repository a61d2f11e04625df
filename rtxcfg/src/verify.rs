//! Whole-dump verification.
//!
//! Runs every configuration domain's parser and validator over one
//! `show config` dump and folds the findings into a single report. Parse
//! failures and validation failures stay distinguishable by issue code.

use serde::Serialize;

use crate::domain::{self, Parsed, ValidateError};
use crate::models::load_models_with_source;
use crate::registry::{Registry, RegistryError, DOMAINS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VerifySeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyIssue {
    pub severity: VerifySeverity,
    pub code: String,
    pub domain: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub model: String,
    pub models_source: Option<String>,
    pub supported: bool,
    pub errors: usize,
    pub warnings: usize,
    pub issues: Vec<VerifyIssue>,
}

pub fn build_verify_report(registry: &Registry, model: &str, raw: &str) -> VerifyReport {
    build_verify_report_with_models(registry, model, raw, None)
}

pub fn build_verify_report_with_models(
    registry: &Registry,
    model: &str,
    raw: &str,
    models_dir: Option<&std::path::Path>,
) -> VerifyReport {
    let (table, models_source) = match load_models_with_source(models_dir) {
        Some((table, source)) => (Some(table), Some(source)),
        None => (None, None),
    };
    let supported = table.as_ref().is_some_and(|t| t.is_supported(model));

    let mut issues = Vec::new();
    if !supported {
        issues.push(warn(
            "unsupported_model",
            "",
            &format!("model '{model}' is not in the supported table"),
        ));
    }

    for domain_name in DOMAINS {
        // The routing table is live status output, never part of a config
        // dump.
        if *domain_name == "routes" {
            continue;
        }
        if let Some(table) = table.as_ref() {
            if supported && !table.supports(domain_name, model) {
                issues.push(warn(
                    "domain_unsupported",
                    domain_name,
                    &format!("domain is not available on {model}"),
                ));
                continue;
            }
        }

        match registry.parse(domain_name, model, raw) {
            Ok(parsed) => {
                for failure in validation_failures(&parsed) {
                    issues.push(err("invalid_record", domain_name, &failure.0));
                }
            }
            Err(RegistryError::NotFound { .. }) => {
                issues.push(err(
                    "no_parser",
                    domain_name,
                    &format!("no parser registered for model '{model}'"),
                ));
            }
            Err(e) => {
                issues.push(err("parse_failed", domain_name, &e.to_string()));
            }
        }
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == VerifySeverity::Error)
        .count();
    let warnings = issues
        .iter()
        .filter(|i| i.severity == VerifySeverity::Warning)
        .count();

    VerifyReport {
        model: model.to_string(),
        models_source,
        supported,
        errors,
        warnings,
        issues,
    }
}

fn validation_failures(parsed: &Parsed) -> Vec<ValidateError> {
    let mut failures = Vec::new();
    let mut check = |result: Result<(), ValidateError>| {
        if let Err(e) = result {
            failures.push(e);
        }
    };

    match parsed {
        Parsed::Routes(_) => {}
        Parsed::StaticRoutes(routes) => {
            for route in routes {
                check(domain::static_route::validate_static_route(route));
            }
        }
        Parsed::DhcpScopes(scopes) => {
            for scope in scopes {
                check(domain::dhcp_scope::validate_dhcp_scope(scope));
            }
        }
        Parsed::DhcpClients(clients) => {
            for client in clients {
                check(domain::dhcp_client::validate_dhcp_client(client));
            }
        }
        Parsed::DhcpRelay(relay) => check(domain::dhcp_relay::validate_dhcp_relay(relay)),
        Parsed::DhcpLeaseTypes(types) => {
            for lease in types {
                check(domain::dhcp_lease_type::validate_lease_type(lease));
            }
        }
        Parsed::Admin(admin) => {
            // A dump's `login user <name>` form omits the password, so the
            // attribute-update check applies, not the creation check.
            for user in &admin.users {
                check(domain::admin::validate_user_for_attribute_update(user));
            }
        }
        Parsed::Bridges(bridges) => {
            for bridge in bridges {
                check(domain::bridge::validate_bridge(bridge));
            }
        }
        Parsed::NatStatic(descriptors) => {
            for nat in descriptors {
                check(domain::nat_static::validate_nat_static(nat));
            }
        }
        Parsed::IpsecTransports(transports) => {
            for transport in transports {
                check(domain::ipsec_transport::validate_ipsec_transport(transport));
            }
        }
        Parsed::Ipv6Prefixes(prefixes) => {
            for prefix in prefixes {
                check(domain::ipv6_prefix::validate_ipv6_prefix(prefix));
            }
        }
        Parsed::Ipv6Interfaces(interfaces) => {
            for interface in interfaces {
                check(domain::ipv6_interface::validate_ipv6_interface(interface));
            }
        }
        Parsed::Ospf(config) => check(domain::ospf::validate_ospf_config(config)),
        Parsed::System(config) => check(domain::system::validate_system_config(config)),
    }

    failures
}

pub fn render_verify_text(report: &VerifyReport, verbose: bool) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "verify model={} supported={}",
        report.model, report.supported
    ));
    if verbose {
        let source = report.models_source.as_deref().unwrap_or("none");
        out.push(format!("Using models: {source}"));
    }
    out.push(format!(
        "result errors={} warnings={}",
        report.errors, report.warnings
    ));
    out.push("issues".to_string());
    if report.issues.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for issue in &report.issues {
        let sev = match issue.severity {
            VerifySeverity::Error => "error",
            VerifySeverity::Warning => "warning",
        };
        let domain = if issue.domain.is_empty() {
            String::new()
        } else {
            format!(" {}:", issue.domain)
        };
        out.push(format!("- [{sev}]{domain} {}: {}", issue.code, issue.message));
    }
    out.join("\n")
}

fn err(code: &str, domain: &str, message: &str) -> VerifyIssue {
    VerifyIssue {
        severity: VerifySeverity::Error,
        code: code.to_string(),
        domain: domain.to_string(),
        message: message.to_string(),
    }
}

fn warn(code: &str, domain: &str, message: &str) -> VerifyIssue {
    VerifyIssue {
        severity: VerifySeverity::Warning,
        code: code.to_string(),
        domain: domain.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;

    const CLEAN_DUMP: &str = "\
ip route default gateway 192.168.1.1
dhcp scope 1 192.168.1.2-192.168.1.100/24 gateway 192.168.1.1
login user admin encrypted *
bridge member bridge1 lan1 lan2
";

    #[test]
    fn clean_dump_has_no_errors() {
        let registry = default_registry(&["RTX1210"]).unwrap();
        let report = build_verify_report(&registry, "RTX1210", CLEAN_DUMP);
        assert!(report.supported);
        assert_eq!(report.errors, 0, "issues: {:?}", report.issues);
    }

    #[test]
    fn invalid_records_become_error_issues() {
        let registry = default_registry(&["RTX1210"]).unwrap();
        // Scope ID out of range plus a bridge member that is not an
        // interface.
        let raw = "\
dhcp scope 300 192.168.1.2-192.168.1.100/24
bridge member bridge1 eth0
";
        let report = build_verify_report(&registry, "RTX1210", raw);
        assert!(report.errors >= 2);
        assert!(report.issues.iter().any(|i| i.code == "invalid_record"
            && i.domain == "dhcp_scope"));
        assert!(report.issues.iter().any(|i| i.code == "invalid_record"
            && i.domain == "bridge"));
    }

    #[test]
    fn unknown_model_warns_and_misses_parsers() {
        let registry = default_registry(&["RTX1210"]).unwrap();
        let report = build_verify_report(&registry, "NVR500", "");
        assert!(!report.supported);
        assert!(report
            .issues
            .iter()
            .any(|i| i.code == "unsupported_model"));
        assert!(report.issues.iter().any(|i| i.code == "no_parser"));
    }

    #[test]
    fn text_rendering_lists_issues() {
        let registry = default_registry(&["RTX1210"]).unwrap();
        let report = build_verify_report(&registry, "RTX1210", CLEAN_DUMP);
        let text = render_verify_text(&report, true);
        assert!(text.contains("verify model=RTX1210 supported=true"));
        assert!(text.contains("Using models: embedded"));
        assert!(text.contains("result errors=0"));
    }
}
