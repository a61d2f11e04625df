//! DHCP scope configuration (`dhcp scope ...`).
//!
//! This is the strict domain: a line that starts with `dhcp scope` but has a
//! non-numeric ID or a malformed address range aborts the parse. The option
//! tail stays lenient so that firmware-specific flags such as `ma` pass
//! through silently. The device cannot edit a scope in place, so updates are
//! synthesized as a delete of the old scope ID followed by a full recreate.

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use cfgline_core::{directives, parse_duration_seconds, OptionGrammar, Strictness};
use serde::Serialize;

use super::{ParseError, ValidateError};

/// One DHCP address pool, keyed by its numeric scope ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpScope {
    pub id: u32,
    pub range_start: Ipv4Addr,
    pub range_end: Ipv4Addr,
    pub prefix_len: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dns_servers: Vec<Ipv4Addr>,
    /// Lease time in seconds. `expire` in minutes or HH:MM normalizes here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lease_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
}

fn scope_grammar() -> OptionGrammar {
    OptionGrammar::new(Strictness::Lenient)
        .one("gateway")
        .greedy("dns")
        .one("lease")
        .one("domain")
        .one("expire")
        .one("maxexpire")
        .flag("ma")
}

/// Parses every `dhcp scope` line out of a configuration dump.
///
/// Later lines with an already-seen scope ID replace the earlier record,
/// matching how the device treats a re-entered scope command.
pub fn parse_dhcp_scopes(raw: &str) -> Result<Vec<DhcpScope>, ParseError> {
    let mut scopes: Vec<DhcpScope> = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        if !line.starts_with("dhcp scope ") {
            continue;
        }
        // `dhcp scope bind` and `dhcp scope option` sublines belong to other
        // domains; a scope definition's second field is the numeric ID.
        let rest = &line["dhcp scope ".len()..];
        let mut fields = rest.splitn(3, char::is_whitespace);
        let id_str = fields.next().unwrap_or("");
        if id_str == "bind" || id_str == "option" || id_str == "lease" {
            continue;
        }
        let scope = parse_scope_line(line, id_str, fields.next(), fields.next())?;

        match scopes.iter_mut().find(|s| s.id == scope.id) {
            Some(existing) => *existing = scope,
            None => scopes.push(scope),
        }
    }

    Ok(scopes)
}

/// Parses a single `dhcp scope <id> <start>-<end>/<prefix> [options]` line.
pub fn parse_dhcp_scope(line: &str) -> Result<DhcpScope, ParseError> {
    let line = line.trim();
    let rest = line
        .strip_prefix("dhcp scope ")
        .ok_or_else(|| ParseError::malformed(line, "not a dhcp scope line"))?;
    let mut fields = rest.splitn(3, char::is_whitespace);
    let id_str = fields.next().unwrap_or("");
    parse_scope_line(line, id_str, fields.next(), fields.next())
}

fn parse_scope_line(
    line: &str,
    id_str: &str,
    range_str: Option<&str>,
    tail: Option<&str>,
) -> Result<DhcpScope, ParseError> {
    let id: u32 = id_str
        .parse()
        .map_err(|_| ParseError::malformed(line, format!("invalid scope ID '{id_str}'")))?;
    if id == 0 {
        return Err(ParseError::malformed(line, "scope ID must be positive"));
    }

    let range_str =
        range_str.ok_or_else(|| ParseError::malformed(line, "missing address range"))?;
    let (range_start, range_end, prefix_len) = parse_range(line, range_str)?;

    let mut scope = DhcpScope {
        id,
        range_start,
        range_end,
        prefix_len,
        gateway: None,
        dns_servers: Vec::new(),
        lease_seconds: None,
        max_lease_seconds: None,
        domain_name: None,
    };

    if let Some(tail) = tail {
        let options = scope_grammar()
            .tokenize(tail)
            .map_err(|source| ParseError::BadOptions {
                line: line.to_string(),
                source,
            })?;
        if let Some(gateway) = options.one("gateway") {
            scope.gateway = Some(
                gateway
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "invalid gateway address"))?,
            );
        }
        if let Some(servers) = options.many("dns") {
            for server in servers {
                scope.dns_servers.push(
                    server
                        .parse()
                        .map_err(|_| ParseError::malformed(line, "invalid DNS server address"))?,
                );
            }
        }
        if let Some(lease) = options.one("lease") {
            scope.lease_seconds = Some(
                lease
                    .parse()
                    .map_err(|_| ParseError::malformed(line, "invalid lease value"))?,
            );
        }
        if let Some(expire) = options.one("expire") {
            scope.lease_seconds = Some(
                parse_duration_seconds(expire)
                    .map_err(|_| ParseError::malformed(line, "invalid expire value"))?,
            );
        }
        if let Some(maxexpire) = options.one("maxexpire") {
            scope.max_lease_seconds = Some(
                parse_duration_seconds(maxexpire)
                    .map_err(|_| ParseError::malformed(line, "invalid maxexpire value"))?,
            );
        }
        scope.domain_name = options.one("domain").map(str::to_string);
    }

    Ok(scope)
}

/// The `A-B/P` range. Bad addresses or a prefix outside 0..=32 abort the
/// parse; A >= B does not, that check belongs to the validator.
fn parse_range(line: &str, range_str: &str) -> Result<(Ipv4Addr, Ipv4Addr, u8), ParseError> {
    let (range, prefix_str) = range_str
        .split_once('/')
        .ok_or_else(|| ParseError::malformed(line, "expected RANGE/PREFIX"))?;
    let prefix_len: u8 = prefix_str
        .parse()
        .map_err(|_| ParseError::malformed(line, "invalid prefix length"))?;
    if prefix_len > 32 {
        return Err(ParseError::malformed(line, "prefix must be between 0 and 32"));
    }
    let (start_str, end_str) = range
        .split_once('-')
        .ok_or_else(|| ParseError::malformed(line, "expected START-END address range"))?;
    let start = start_str
        .trim()
        .parse()
        .map_err(|_| ParseError::malformed(line, "invalid range start address"))?;
    let end = end_str
        .trim()
        .parse()
        .map_err(|_| ParseError::malformed(line, "invalid range end address"))?;
    Ok((start, end, prefix_len))
}

/// `dhcp scope <id> <start>-<end>/<prefix> [gateway ..] [dns ..] [lease ..]
/// [domain ..]`. One line carries the whole scope.
pub fn build_scope_create_command(scope: &DhcpScope) -> String {
    let mut cmd = format!(
        "dhcp scope {} {}-{}/{}",
        scope.id, scope.range_start, scope.range_end, scope.prefix_len
    );
    if let Some(gateway) = scope.gateway {
        let _ = write!(cmd, " gateway {gateway}");
    }
    if !scope.dns_servers.is_empty() {
        cmd.push_str(" dns");
        for server in &scope.dns_servers {
            let _ = write!(cmd, " {server}");
        }
    }
    if let Some(lease) = scope.lease_seconds {
        let _ = write!(cmd, " lease {lease}");
    }
    if let Some(max) = scope.max_lease_seconds {
        // The maxexpire keyword takes minutes; the device has no seconds form.
        let _ = write!(cmd, " maxexpire {}", max / 60);
    }
    if let Some(domain) = &scope.domain_name {
        let _ = write!(cmd, " domain {domain}");
    }
    cmd
}

pub fn build_scope_delete_command(scope_id: u32) -> String {
    format!("no dhcp scope {scope_id}")
}

pub fn build_show_scopes_command() -> String {
    r#"show config | grep "dhcp scope""#.to_string()
}

/// Delete then recreate. The device has no in-place scope edit, so the two
/// commands form one logical transaction for the caller.
pub fn build_scope_update_commands(scope: &DhcpScope) -> Result<Vec<String>, ValidateError> {
    validate_dhcp_scope(scope)?;
    Ok(vec![
        build_scope_delete_command(scope.id),
        build_scope_create_command(scope),
    ])
}

pub fn validate_dhcp_scope(scope: &DhcpScope) -> Result<(), ValidateError> {
    if scope.id == 0 || scope.id > 255 {
        return Err(ValidateError::new("scope ID must be between 1 and 255"));
    }
    if scope.prefix_len < 8 || scope.prefix_len > 32 {
        return Err(ValidateError::new("prefix must be between 8 and 32"));
    }
    if u32::from(scope.range_start) >= u32::from(scope.range_end) {
        return Err(ValidateError::new("range start must be less than range end"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_option_tail() {
        let scope = parse_dhcp_scope(
            "dhcp scope 1 192.168.1.2-192.168.1.100/24 gateway 192.168.1.1 dns 8.8.8.8 8.8.4.4 expire 12:00 domain example.jp",
        )
        .unwrap();
        assert_eq!(scope.id, 1);
        assert_eq!(scope.range_start, "192.168.1.2".parse::<Ipv4Addr>().unwrap());
        assert_eq!(scope.range_end, "192.168.1.100".parse::<Ipv4Addr>().unwrap());
        assert_eq!(scope.prefix_len, 24);
        assert_eq!(scope.gateway, Some("192.168.1.1".parse().unwrap()));
        assert_eq!(scope.dns_servers.len(), 2);
        assert_eq!(scope.lease_seconds, Some(43_200));
        assert_eq!(scope.domain_name.as_deref(), Some("example.jp"));
    }

    #[test]
    fn expire_minutes_equals_hhmm() {
        let a = parse_dhcp_scope("dhcp scope 1 10.0.0.2-10.0.0.50/24 expire 720").unwrap();
        let b = parse_dhcp_scope("dhcp scope 1 10.0.0.2-10.0.0.50/24 expire 12:00").unwrap();
        assert_eq!(a.lease_seconds, Some(43_200));
        assert_eq!(a.lease_seconds, b.lease_seconds);
    }

    #[test]
    fn unknown_trailing_keyword_is_ignored() {
        let scope =
            parse_dhcp_scope("dhcp scope 2 10.0.0.2-10.0.0.50/24 expire 24:00 ma frobnicate")
                .unwrap();
        assert_eq!(scope.lease_seconds, Some(86_400));
    }

    #[test]
    fn non_numeric_scope_id_fails() {
        let err = parse_dhcp_scope("dhcp scope abc 10.0.0.2-10.0.0.50/24").unwrap_err();
        assert!(err.to_string().contains("invalid scope ID"));
    }

    #[test]
    fn malformed_range_fails() {
        assert!(parse_dhcp_scope("dhcp scope 1 10.0.0.2/24").is_err());
        assert!(parse_dhcp_scope("dhcp scope 1 10.0.0.2-10.0.0.50").is_err());
        assert!(parse_dhcp_scope("dhcp scope 1 10.0.0.2-10.0.0.50/33").is_err());
        assert!(parse_dhcp_scope("dhcp scope 1 bogus-10.0.0.50/24").is_err());
    }

    #[test]
    fn inverted_range_parses_but_fails_validation() {
        let scope = parse_dhcp_scope("dhcp scope 1 10.0.0.50-10.0.0.2/24").unwrap();
        let err = validate_dhcp_scope(&scope).unwrap_err();
        assert!(err.to_string().contains("range start"));
    }

    #[test]
    fn last_definition_of_a_scope_id_wins() {
        let raw = "\
dhcp scope 1 192.168.1.2-192.168.1.100/24
dhcp scope 2 192.168.2.2-192.168.2.100/24
dhcp scope 1 192.168.1.10-192.168.1.200/24
";
        let scopes = parse_dhcp_scopes(raw).unwrap();
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].range_start, "192.168.1.10".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn bind_and_option_sublines_are_skipped() {
        let raw = "\
dhcp scope 1 192.168.1.2-192.168.1.100/24
dhcp scope bind 1 192.168.1.50 00:a0:de:01:02:03
dhcp scope option 1 router=192.168.1.1
";
        let scopes = parse_dhcp_scopes(raw).unwrap();
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn create_round_trip() {
        let scope = DhcpScope {
            id: 5,
            range_start: "172.16.0.10".parse().unwrap(),
            range_end: "172.16.0.99".parse().unwrap(),
            prefix_len: 16,
            gateway: Some("172.16.0.1".parse().unwrap()),
            dns_servers: vec!["1.1.1.1".parse().unwrap()],
            lease_seconds: Some(3600),
            max_lease_seconds: None,
            domain_name: Some("corp.example".to_string()),
        };
        let cmd = build_scope_create_command(&scope);
        assert_eq!(
            cmd,
            "dhcp scope 5 172.16.0.10-172.16.0.99/16 gateway 172.16.0.1 dns 1.1.1.1 lease 3600 domain corp.example"
        );
        let reparsed = parse_dhcp_scope(&cmd).unwrap();
        assert_eq!(reparsed, scope);
    }

    #[test]
    fn maxexpire_survives_a_rebuild() {
        let scope =
            parse_dhcp_scope("dhcp scope 1 192.168.1.2-192.168.1.100/24 expire 12:00 maxexpire 24:00")
                .unwrap();
        assert_eq!(scope.max_lease_seconds, Some(86_400));
        let cmd = build_scope_create_command(&scope);
        assert!(cmd.ends_with(" lease 43200 maxexpire 1440"));
        let reparsed = parse_dhcp_scope(&cmd).unwrap();
        assert_eq!(reparsed.max_lease_seconds, Some(86_400));
    }

    #[test]
    fn update_is_delete_then_create() {
        let scope = parse_dhcp_scope("dhcp scope 3 10.1.0.2-10.1.0.100/24").unwrap();
        let cmds = build_scope_update_commands(&scope).unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], "no dhcp scope 3");
        assert!(cmds[1].starts_with("dhcp scope 3 "));
    }
}
