use colored::Colorize;

use crate::verify::{render_verify_text, VerifyReport};

/// Render a verify report for terminal output.
pub fn render_verify_colored(report: &VerifyReport, verbose: bool) -> String {
    let raw = render_verify_text(report, verbose);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with("- [error]") {
            line.red().to_string()
        } else if line.starts_with("- [warning]") {
            line.yellow().to_string()
        } else if line.starts_with("result ") {
            line.cyan().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render synthesized CLI commands, one per line.
pub fn render_commands(commands: &[String]) -> String {
    commands
        .iter()
        .map(|c| c.green().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a per-domain record count line.
pub fn render_domain_summary(domain: &str, count: usize) -> String {
    format!("{} records={count}", domain.cyan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;
    use crate::verify::build_verify_report;

    #[test]
    fn colored_output_keeps_every_line() {
        colored::control::set_override(false);
        let registry = default_registry(&["RTX1210"]).unwrap();
        let report = build_verify_report(&registry, "RTX1210", "bridge member bridge1 eth0\n");
        let text = render_verify_colored(&report, false);
        assert!(text.contains("- [error]"));
        assert!(text.contains("result errors=1"));
    }

    #[test]
    fn commands_render_one_per_line() {
        colored::control::set_override(false);
        let commands = vec![
            "dhcp scope 1 192.168.1.2-192.168.1.100/24".to_string(),
            "dhcp scope lease type 1 bind-only".to_string(),
        ];
        assert_eq!(render_commands(&commands).lines().count(), 2);
    }
}
