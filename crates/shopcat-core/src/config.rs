use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::{CategoryRule, DuplicatePolicy, RuleConfig, RuleSet};
use crate::error::{Result, ShopcatError};
use crate::product::{
    FieldAliases, DEFAULT_BRAND_FIELDS, DEFAULT_CATEGORY_FIELDS, DEFAULT_ID_FIELDS,
    DEFAULT_NAME_FIELDS,
};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# shopcat configuration file
# Location: ~/.shopcat/config.toml

[classifier]
# Include the builtin rule table
# Default: true
builtin = true

# How rules sharing a category name are treated
# independent: each declaration competes on its own score
# merge:       keywords and excludes are unioned, highest priority kept
# last_wins:   the last declaration replaces earlier ones
# Default: "independent"
duplicates = "independent"

[product]
# Candidate keys per field, first non-empty string wins
name_fields = ["name", "Name", "title"]
brand_fields = ["brand"]
category_fields = ["category"]
id_fields = ["_id", "id"]

# Extra rules are evaluated after the builtin table
# [[rules]]
# name = "Capture Cards"
# keywords = ["capture card", "elgato"]
# exclude_keywords = ["laptop"]
# priority = 8
# check = { kind = "tokens", require_any = ["elgato", "avermedia"], forbid = [] }
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub product: ProductConfig,

    /// Additional rules, in evaluation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleConfig>,
}

/// Rule set assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Include the builtin rule table
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Same-name rule handling
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            duplicates: DuplicatePolicy::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Field alias lists for product documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    #[serde(default = "default_name_fields")]
    pub name_fields: Vec<String>,

    #[serde(default = "default_brand_fields")]
    pub brand_fields: Vec<String>,

    #[serde(default = "default_category_fields")]
    pub category_fields: Vec<String>,

    #[serde(default = "default_id_fields")]
    pub id_fields: Vec<String>,
}

fn default_name_fields() -> Vec<String> {
    to_owned_list(DEFAULT_NAME_FIELDS)
}

fn default_brand_fields() -> Vec<String> {
    to_owned_list(DEFAULT_BRAND_FIELDS)
}

fn default_category_fields() -> Vec<String> {
    to_owned_list(DEFAULT_CATEGORY_FIELDS)
}

fn default_id_fields() -> Vec<String> {
    to_owned_list(DEFAULT_ID_FIELDS)
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name_fields: default_name_fields(),
            brand_fields: default_brand_fields(),
            category_fields: default_category_fields(),
            id_fields: default_id_fields(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| ShopcatError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || ShopcatError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "classifier.builtin" => {
                self.classifier.builtin = value.trim().parse().map_err(|_| invalid())?;
            }
            "classifier.duplicates" => {
                self.classifier.duplicates = DuplicatePolicy::parse(value).ok_or_else(invalid)?;
            }
            "product.name_fields" => self.product.name_fields = parse_field_list(value, invalid)?,
            "product.brand_fields" => {
                self.product.brand_fields = parse_field_list(value, invalid)?
            }
            "product.category_fields" => {
                self.product.category_fields = parse_field_list(value, invalid)?
            }
            "product.id_fields" => self.product.id_fields = parse_field_list(value, invalid)?,
            _ => {
                return Err(ShopcatError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "classifier.builtin".to_string(),
                self.classifier.builtin.to_string(),
            ),
            (
                "classifier.duplicates".to_string(),
                self.classifier.duplicates.as_str().to_string(),
            ),
            (
                "product.name_fields".to_string(),
                format!("{:?}", self.product.name_fields),
            ),
            (
                "product.brand_fields".to_string(),
                format!("{:?}", self.product.brand_fields),
            ),
            (
                "product.category_fields".to_string(),
                format!("{:?}", self.product.category_fields),
            ),
            (
                "product.id_fields".to_string(),
                format!("{:?}", self.product.id_fields),
            ),
        ]
    }

    /// Builtin rules (if enabled) followed by configured rules, with the
    /// duplicate policy applied
    pub fn rule_set(&self) -> Result<RuleSet> {
        let base = if self.classifier.builtin {
            RuleSet::builtin()
        } else {
            RuleSet::default()
        };

        let rules = base
            .extend(self.rules.iter().map(CategoryRule::from))?
            .with_duplicates(self.classifier.duplicates);

        tracing::debug!(
            rules = rules.len(),
            custom = self.rules.len(),
            builtin = self.classifier.builtin,
            "assembled rule set"
        );
        Ok(rules)
    }

    /// Convert to FieldAliases for product parsing
    pub fn field_aliases(&self) -> FieldAliases {
        FieldAliases {
            id: self.product.id_fields.clone(),
            name: self.product.name_fields.clone(),
            brand: self.product.brand_fields.clone(),
            category: self.product.category_fields.clone(),
        }
    }
}

/// Parse a field list; an empty list would make every record blank.
fn parse_field_list(
    value: &str,
    invalid: impl Fn() -> ShopcatError,
) -> Result<Vec<String>> {
    let items = parse_string_list(value);
    if items.is_empty() {
        return Err(invalid());
    }
    Ok(items)
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();

    // JSON array format: ["a", "b"]
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    // Comma-separated format: a,b,c or "a","b"
    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Classifier;
    use crate::product::ProductRecord;

    #[test]
    fn test_parse_string_list_comma() {
        let result = parse_string_list("name,title");
        assert_eq!(result, vec!["name", "title"]);
    }

    #[test]
    fn test_parse_string_list_json() {
        let result = parse_string_list(r#"["name", "Name"]"#);
        assert_eq!(result, vec!["name", "Name"]);
    }

    #[test]
    fn test_parse_string_list_empty() {
        assert!(parse_string_list("[]").is_empty());
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("product.name_fields", "productName,title").unwrap();
        assert_eq!(config.product.name_fields, vec!["productName", "title"]);

        config.set("classifier.duplicates", "last-wins").unwrap();
        assert_eq!(config.classifier.duplicates, DuplicatePolicy::LastWins);
        assert_eq!(
            config.get("classifier.duplicates").as_deref(),
            Some("last_wins")
        );

        config.set("classifier.builtin", "false").unwrap();
        assert!(!config.classifier.builtin);
    }

    #[test]
    fn test_config_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("classifier.builtin", "maybe"),
            Err(ShopcatError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("product.name_fields", "[]"),
            Err(ShopcatError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("nope", "1"),
            Err(ShopcatError::ConfigKeyNotFound { .. })
        ));
        assert_eq!(config.get("nope"), None);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.classifier.builtin);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_init_template_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::init(dir.path()).unwrap();
        assert!(path.exists());

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.classifier.duplicates, DuplicatePolicy::Independent);
        assert_eq!(config.product.name_fields, vec!["name", "Name", "title"]);
    }

    #[test]
    fn test_save_and_load_with_rules() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.classifier.duplicates = DuplicatePolicy::Merge;
        config.rules.push(RuleConfig {
            name: "Capture Cards".to_string(),
            keywords: vec!["capture card".to_string()],
            exclude_keywords: Vec::new(),
            priority: 8,
            check: None,
        });
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.classifier.duplicates, DuplicatePolicy::Merge);
        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].name, "Capture Cards");
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[classifier\nbuiltin = ").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ShopcatError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_rule_set_from_config() {
        let config: Config = toml::from_str(
            r#"
            [classifier]
            builtin = false

            [[rules]]
            name = "Capture Cards"
            keywords = ["capture card", "elgato"]
            priority = 8
            check = { kind = "tokens", forbid = ["laptop"] }
            "#,
        )
        .unwrap();

        let rules = config.rule_set().unwrap();
        assert_eq!(rules.names(), vec!["Capture Cards"]);

        let classifier = Classifier::new(rules);
        let product = ProductRecord::named("Elgato 4K60 Capture Card");
        assert_eq!(classifier.detect_category(&product), Some("Capture Cards"));
        let laptop = ProductRecord::named("Laptop with Elgato capture card");
        assert_eq!(classifier.detect_category(&laptop), None);
    }

    #[test]
    fn test_rule_set_rejects_empty_keywords() {
        let config: Config = toml::from_str(
            r#"
            [[rules]]
            name = "Broken"
            keywords = [""]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.rule_set(),
            Err(ShopcatError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_field_aliases() {
        let mut config = Config::default();
        config.product.name_fields = vec!["productName".to_string()];
        let aliases = config.field_aliases();
        assert_eq!(aliases.name, vec!["productName"]);
        assert_eq!(aliases.id, vec!["_id", "id"]);
    }
}
