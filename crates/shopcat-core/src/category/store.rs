//! Rule Set
//!
//! 分類器が評価する不変・順序付きのルール列。
//! ビルトインテーブルと設定ルールから一度だけ組み立て、`Classifier::new`に渡す。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::builtin::BUILTIN_RULES;
use super::rule::{CategoryRule, RecordCheck, DEFAULT_RULE_PRIORITY};

/// 同じカテゴリ名で複数宣言されたルールの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 各宣言が独立したスコアで競う（デフォルト）
    #[default]
    Independent,
    /// キーワードと除外語を和集合、priorityは最大値
    Merge,
    /// 後の宣言が先の宣言を同じ位置で置き換える
    LastWins,
}

impl DuplicatePolicy {
    pub const ALL: [DuplicatePolicy; 3] = [Self::Independent, Self::Merge, Self::LastWins];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Merge => "merge",
            Self::LastWins => "last_wins",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().replace('-', "_").to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// 順序付きカテゴリルール
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    /// ビルトインテーブルのみ（全宣言を保持）
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.iter().map(CategoryRule::from).collect(),
        }
    }

    /// 呼び出し側のルールを検証して保持
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self> {
        Self::default().extend(rules)
    }

    /// 既存ルールの後ろに追加
    pub fn extend(mut self, rules: impl IntoIterator<Item = CategoryRule>) -> Result<Self> {
        for rule in rules {
            rule.validate()?;
            self.rules.push(rule);
        }
        Ok(self)
    }

    /// 同名宣言を正規化する。
    ///
    /// 統合後のルールは最初の宣言の位置に残る。
    pub fn with_duplicates(self, policy: DuplicatePolicy) -> Self {
        let merge = match policy {
            DuplicatePolicy::Independent => return self,
            DuplicatePolicy::Merge => true,
            DuplicatePolicy::LastWins => false,
        };

        let mut rules: Vec<CategoryRule> = Vec::with_capacity(self.rules.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for rule in self.rules {
            let existing = positions.get(rule.name()).copied();
            match existing {
                Some(idx) if merge => rules[idx].absorb(rule),
                Some(idx) => rules[idx] = rule,
                None => {
                    positions.insert(rule.name().to_string(), rules.len());
                    rules.push(rule);
                }
            }
        }

        tracing::debug!(policy = policy.as_str(), rules = rules.len(), "collapsed duplicate rules");
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryRule> {
        self.rules.iter()
    }

    /// カテゴリの全宣言
    pub fn get(&self, name: &str) -> Vec<&CategoryRule> {
        self.rules.iter().filter(|r| r.name() == name).collect()
    }

    /// 重複なしのカテゴリ名一覧（宣言順）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.name()) {
                names.push(rule.name());
            }
        }
        names
    }

    /// 複数回宣言されたカテゴリ名
    pub fn duplicate_names(&self) -> Vec<&str> {
        self.names()
            .into_iter()
            .filter(|name| self.rules.iter().filter(|r| r.name() == *name).count() > 1)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CategoryRule;
    type IntoIter = std::slice::Iter<'a, CategoryRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// `config.toml`の`[[rules]]`エントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// カテゴリ表示名
    pub name: String,
    /// マッチ対象の部分文字列
    pub keywords: Vec<String>,
    /// 除外する部分文字列
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_keywords: Vec<String>,
    /// 優先度（省略可）
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// 追加レコードチェック（省略可）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<RecordCheck>,
}

fn default_priority() -> i32 {
    DEFAULT_RULE_PRIORITY
}

impl From<&RuleConfig> for CategoryRule {
    fn from(entry: &RuleConfig) -> Self {
        let rule = CategoryRule::new(entry.name.clone(), &entry.keywords)
            .with_excludes(&entry.exclude_keywords)
            .with_priority(entry.priority);
        match &entry.check {
            Some(check) => rule.with_check(check.clone()),
            None => rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopcatError;

    fn rule(name: &str, keywords: &[&str], priority: i32) -> CategoryRule {
        CategoryRule::new(name, keywords.iter()).with_priority(priority)
    }

    #[test]
    fn test_rule_set_builtin() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.len(), BUILTIN_RULES.len());
        assert_eq!(rules.get("RAM").len(), 2);
        assert!(rules.get("nonexistent").is_empty());
        assert_eq!(rules.duplicate_names(), vec!["Motherboards", "RAM"]);
    }

    #[test]
    fn test_names_are_distinct_and_ordered() {
        let rules = RuleSet::builtin();
        let names = rules.names();
        assert_eq!(names[0], "Processors");
        assert_eq!(names.iter().filter(|n| **n == "RAM").count(), 1);
        assert!(names.len() < rules.len());
    }

    #[test]
    fn test_new_rejects_invalid_rule() {
        let result = RuleSet::new(vec![rule("Storage", &["ssd"], 5), rule("Empty", &[], 5)]);
        match result {
            Err(ShopcatError::InvalidRule { name, .. }) => assert_eq!(name, "Empty"),
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_independent_keeps_everything() {
        let rules = RuleSet::builtin().with_duplicates(DuplicatePolicy::Independent);
        assert_eq!(rules.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_last_wins_replaces_in_place() {
        let rules = RuleSet::new(vec![
            rule("RAM", &["ram"], 8),
            rule("Storage", &["ssd"], 8),
            rule("RAM", &["sodimm"], 9),
        ])
        .unwrap()
        .with_duplicates(DuplicatePolicy::LastWins);

        assert_eq!(rules.names(), vec!["RAM", "Storage"]);
        assert_eq!(rules.rules()[0].keywords(), ["sodimm"]);
        assert_eq!(rules.rules()[0].priority(), 9);
    }

    #[test]
    fn test_merge_unions_keywords() {
        let rules = RuleSet::new(vec![
            rule("RAM", &["ram"], 8),
            rule("Storage", &["ssd"], 8),
            rule("RAM", &["sodimm"], 9),
        ])
        .unwrap()
        .with_duplicates(DuplicatePolicy::Merge);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[0].keywords(), ["ram", "sodimm"]);
        assert_eq!(rules.rules()[0].priority(), 9);
    }

    #[test]
    fn test_duplicate_policy_parse() {
        assert_eq!(DuplicatePolicy::parse("merge"), Some(DuplicatePolicy::Merge));
        assert_eq!(
            DuplicatePolicy::parse("Last-Wins"),
            Some(DuplicatePolicy::LastWins)
        );
        assert_eq!(DuplicatePolicy::parse("first"), None);
    }

    #[test]
    fn test_rule_from_config() {
        let entry: RuleConfig = toml::from_str(
            r#"
            name = "Capture Cards"
            keywords = ["Capture Card", "elgato"]
            exclude_keywords = ["laptop"]
            "#,
        )
        .unwrap();
        let rule = CategoryRule::from(&entry);
        assert_eq!(rule.keywords(), ["capture card", "elgato"]);
        assert_eq!(rule.priority(), DEFAULT_RULE_PRIORITY);
        assert!(rule.check().is_none());
    }
}
