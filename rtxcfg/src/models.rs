//! Supported-model and per-domain command support tables.
//!
//! The table ships embedded in the binary; an override directory containing
//! a `models.toml` takes precedence so new firmware releases can be covered
//! without rebuilding.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelTable {
    /// Models with full parser coverage.
    pub supported: Vec<String>,
    /// Older models we can identify but do not target.
    #[serde(default)]
    pub known: Vec<String>,
    /// Domains restricted to a subset of models. A missing entry means the
    /// domain works on every supported model.
    #[serde(default)]
    pub domain_support: HashMap<String, Vec<String>>,
}

impl ModelTable {
    pub fn is_supported(&self, model: &str) -> bool {
        self.supported.iter().any(|m| m == model)
    }

    /// Every model name the table mentions, supported first.
    pub fn all_known(&self) -> Vec<&str> {
        self.supported
            .iter()
            .chain(&self.known)
            .map(String::as_str)
            .collect()
    }

    /// Whether `domain` is usable on `model`.
    pub fn supports(&self, domain: &str, model: &str) -> bool {
        match self.domain_support.get(domain) {
            Some(models) => models.iter().any(|m| m == model),
            None => self.is_supported(model),
        }
    }

    /// Known models that do not support `domain`.
    pub fn unsupported_for(&self, domain: &str) -> Vec<&str> {
        self.all_known()
            .into_iter()
            .filter(|model| !self.supports(domain, model))
            .collect()
    }
}

pub fn load_models() -> Option<ModelTable> {
    load_models_with_source(None).map(|(table, _)| table)
}

/// Loads the model table, reporting where it came from (`embedded` or
/// `file:<path>`).
pub fn load_models_with_source(models_dir: Option<&Path>) -> Option<(ModelTable, String)> {
    if let Some(dir) = models_dir {
        let path = dir.join("models.toml");
        if let Ok(table) = load_models_file(&path) {
            return Some((table, format!("file:{}", path.display())));
        }
    }
    let table = parse_models(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/profiles/models.toml"
    )))
    .ok()?;
    Some((table, "embedded".to_string()))
}

fn load_models_file(path: &Path) -> Result<ModelTable, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    parse_models(&raw).map_err(Into::into)
}

fn parse_models(raw: &str) -> Result<ModelTable, toml::de::Error> {
    toml::from_str::<ModelTable>(raw)
}

#[cfg(test)]
mod tests {
    use super::{load_models, load_models_with_source};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn embedded_table_loads() {
        let table = load_models().expect("embedded table");
        assert!(table.is_supported("RTX1220"));
        assert!(table.is_supported("vRX"));
        assert!(!table.is_supported("NVR510"));
        assert!(table.all_known().contains(&"NVR510"));
    }

    #[test]
    fn missing_domain_entry_means_all_supported_models() {
        let table = load_models().expect("embedded table");
        assert!(table.supports("dhcp_scope", "RTX830"));
        assert!(!table.supports("dhcp_scope", "NVR500"));
        assert!(table.unsupported_for("dhcp_scope").contains(&"RTX810"));
    }

    #[test]
    fn source_reports_embedded() {
        let (_, source) = load_models_with_source(None).expect("table");
        assert_eq!(source, "embedded");
    }

    #[test]
    fn source_reports_override_dir() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("models.toml"),
            r#"
supported = ["RTX1210"]
known = []

[domain_support]
routes = ["RTX1210"]
ospf = []
"#,
        )
        .expect("write table");

        let (table, source) = load_models_with_source(Some(dir.path())).expect("table");
        assert!(source.starts_with("file:"));
        assert!(table.supports("routes", "RTX1210"));
        assert!(!table.supports("ospf", "RTX1210"));
    }
}
