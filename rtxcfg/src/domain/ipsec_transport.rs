//! IPsec transport mode bindings (`ipsec transport N M <proto> <port>`).

use cfgline_core::directives;
use serde::Serialize;

use super::{ParseError, ValidateError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpsecTransport {
    pub transport_id: u32,
    pub tunnel_id: u32,
    /// `udp` in practice (1701 for L2TP); kept open for drift.
    pub protocol: String,
    pub port: u32,
}

pub fn parse_ipsec_transports(raw: &str) -> Result<Vec<IpsecTransport>, ParseError> {
    let mut transports = Vec::new();

    for directive in directives(raw) {
        if directive.negated {
            continue;
        }
        let line = directive.text;
        let Some(rest) = line.strip_prefix("ipsec transport ") else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let [transport_str, tunnel_str, protocol, port_str] = fields[..] else {
            continue;
        };
        let (Ok(transport_id), Ok(tunnel_id), Ok(port)) =
            (transport_str.parse(), tunnel_str.parse(), port_str.parse())
        else {
            continue;
        };
        transports.push(IpsecTransport {
            transport_id,
            tunnel_id,
            protocol: protocol.to_string(),
            port,
        });
    }

    Ok(transports)
}

pub fn build_transport_command(t: &IpsecTransport) -> String {
    format!(
        "ipsec transport {} {} {} {}",
        t.transport_id, t.tunnel_id, t.protocol, t.port
    )
}

pub fn build_delete_transport_command(transport_id: u32) -> String {
    format!("no ipsec transport {transport_id}")
}

pub fn build_show_transports_command() -> String {
    r#"show config | grep "ipsec transport""#.to_string()
}

pub fn validate_ipsec_transport(t: &IpsecTransport) -> Result<(), ValidateError> {
    if t.transport_id == 0 {
        return Err(ValidateError::new("transport_id must be positive"));
    }
    if t.tunnel_id == 0 {
        return Err(ValidateError::new("tunnel_id must be positive"));
    }
    if !t.protocol.eq_ignore_ascii_case("udp") && !t.protocol.eq_ignore_ascii_case("tcp") {
        return Err(ValidateError::new("protocol must be one of: udp, tcp"));
    }
    if t.port == 0 || t.port > 65_535 {
        return Err(ValidateError::new("port must be between 1 and 65535"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn l2tp_transport_round_trip() {
        let raw = "ipsec transport 1 1 udp 1701\n";
        let transports = parse_ipsec_transports(raw).unwrap();
        assert_eq!(transports.len(), 1);
        let t = &transports[0];
        assert_eq!((t.transport_id, t.tunnel_id, t.port), (1, 1, 1701));
        assert_eq!(t.protocol, "udp");
        assert!(validate_ipsec_transport(t).is_ok());
        assert_eq!(build_transport_command(t), "ipsec transport 1 1 udp 1701");
    }

    #[test]
    fn short_lines_are_skipped() {
        assert!(parse_ipsec_transports("ipsec transport 1 1 udp\n")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let mut t = IpsecTransport {
            transport_id: 1,
            tunnel_id: 1,
            protocol: "icmp".to_string(),
            port: 1701,
        };
        assert!(validate_ipsec_transport(&t).is_err());
        t.protocol = "udp".to_string();
        t.port = 70_000;
        assert!(validate_ipsec_transport(&t).is_err());
    }
}
