//! Per-scope lease allocation policy (`dhcp scope lease type ...`).

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaseType {
    BindOnly,
    BindPriority,
    LeaseOnly,
}

impl LeaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaseType::BindOnly => "bind-only",
            LeaseType::BindPriority => "bind-priority",
            LeaseType::LeaseOnly => "lease-only",
        }
    }

    pub fn parse(token: &str) -> Result<Self, ValidateError> {
        match token {
            "bind-only" => Ok(LeaseType::BindOnly),
            "bind-priority" => Ok(LeaseType::BindPriority),
            "lease-only" => Ok(LeaseType::LeaseOnly),
            other => Err(ValidateError::new(format!(
                "invalid lease type '{other}' (must be bind-only, bind-priority, or lease-only)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpLeaseType {
    pub scope_id: u32,
    pub lease_type: LeaseType,
}

/// Lines with an unknown type token are skipped rather than rejected; the
/// later `show config` firmware revisions add policies this model does not
/// track.
pub fn parse_lease_types(raw: &str) -> Result<Vec<DhcpLeaseType>, ParseError> {
    let mut configs = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("dhcp scope lease type ") else {
            continue;
        };
        let Some((scope_str, type_str)) = rest.split_once(char::is_whitespace) else {
            continue;
        };
        let Ok(scope_id) = scope_str.parse() else {
            continue;
        };
        let Ok(lease_type) = LeaseType::parse(type_str.trim()) else {
            continue;
        };
        configs.push(DhcpLeaseType {
            scope_id,
            lease_type,
        });
    }

    Ok(configs)
}

pub fn build_lease_type_command(config: &DhcpLeaseType) -> String {
    format!(
        "dhcp scope lease type {} {}",
        config.scope_id,
        config.lease_type.as_str()
    )
}

pub fn build_delete_lease_type_command(scope_id: u32) -> String {
    format!("no dhcp scope lease type {scope_id}")
}

pub fn build_show_lease_types_command() -> String {
    r#"show config | grep "dhcp scope lease type""#.to_string()
}

pub fn validate_lease_type(config: &DhcpLeaseType) -> Result<(), ValidateError> {
    if !(1..=255).contains(&config.scope_id) {
        return Err(ValidateError::new("scope ID must be between 1 and 255"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_known_types() {
        let raw = "\
dhcp scope lease type 1 bind-priority
dhcp scope lease type 2 lease-only
dhcp scope lease type 3 first-come
";
        let configs = parse_lease_types(raw).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].lease_type, LeaseType::BindPriority);
        assert_eq!(configs[1].lease_type, LeaseType::LeaseOnly);
    }

    #[test]
    fn round_trip() {
        let config = DhcpLeaseType {
            scope_id: 7,
            lease_type: LeaseType::BindOnly,
        };
        let cmd = build_lease_type_command(&config);
        assert_eq!(cmd, "dhcp scope lease type 7 bind-only");
        assert_eq!(parse_lease_types(&cmd).unwrap(), vec![config]);
    }

    #[test]
    fn lease_type_validation() {
        assert!(LeaseType::parse("bind-priority").is_ok());
        assert!(LeaseType::parse("forever").is_err());
        assert!(validate_lease_type(&DhcpLeaseType {
            scope_id: 0,
            lease_type: LeaseType::BindOnly,
        })
        .is_err());
    }
}
