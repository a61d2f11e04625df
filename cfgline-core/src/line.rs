//! Directive scanning for "show config" style dumps.
//!
//! Router configuration dumps are one directive per line. Negated directives
//! are prefixed with `no `, comments start with `#` or `!`, and blank lines
//! carry no meaning. [`directives`] strips all of that framing so domain
//! parsers only see candidate directive lines in appearance order.

/// One trimmed, non-comment line from a configuration dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Full directive text, including any `no ` prefix.
    pub text: &'a str,
    /// True when the line starts with `no `.
    pub negated: bool,
}

impl<'a> Directive<'a> {
    /// Directive text without the `no ` negation prefix.
    ///
    /// A bare `no` line has an empty body.
    pub fn body(&self) -> &'a str {
        match self.text.strip_prefix("no ") {
            Some(rest) if self.negated => rest.trim_start(),
            _ if self.negated => "",
            _ => self.text,
        }
    }
}

/// Iterate the directive lines of a raw configuration dump.
///
/// Empty lines and comment lines (`#` or `!`) are skipped; everything else is
/// yielded trimmed, in input order.
pub fn directives(raw: &str) -> impl Iterator<Item = Directive<'_>> {
    raw.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            return None;
        }
        Some(Directive {
            text: line,
            negated: line == "no" || line.starts_with("no "),
        })
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::directives;

    #[test]
    fn skips_comments_and_blank_lines() {
        let raw = "# header\n\nip route default gateway 192.168.0.1\n! trailer\n";
        let lines: Vec<_> = directives(raw).map(|d| d.text).collect();
        assert_eq!(lines, vec!["ip route default gateway 192.168.0.1"]);
    }

    #[test]
    fn flags_negated_directives() {
        let raw = "no dhcp scope 1\ndhcp scope 2 192.168.2.2-192.168.2.100/24";
        let parsed: Vec<_> = directives(raw).collect();
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].negated);
        assert_eq!(parsed[0].body(), "dhcp scope 1");
        assert!(!parsed[1].negated);
    }

    #[test]
    fn bare_no_line_has_an_empty_body() {
        let parsed: Vec<_> = directives("no\n").collect();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].negated);
        assert_eq!(parsed[0].body(), "");
    }

    #[test]
    fn preserves_input_order() {
        let raw = "bridge member bridge1 lan1\nbridge member bridge2 lan2\n";
        let lines: Vec<_> = directives(raw).map(|d| d.text).collect();
        assert_eq!(
            lines,
            vec!["bridge member bridge1 lan1", "bridge member bridge2 lan2"]
        );
    }
}
