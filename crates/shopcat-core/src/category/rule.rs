//! Category Rule
//!
//! キーワードルール一件分の定義。
//! 商品名に必要な語、除外語、優先度、レコード全体への追加チェックを持つ。

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopcatError};
use crate::product::ProductRecord;

/// 設定でpriority省略時の優先度
pub const DEFAULT_RULE_PRIORITY: i32 = 5;

/// キーワード・除外判定の後に評価する追加チェック
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordCheck {
    /// 商品名かブランドに`require_any`のいずれかを含む（空なら無条件）。
    /// 商品名は`forbid`を一つも含まない。
    Tokens {
        #[serde(default)]
        require_any: Vec<String>,
        #[serde(default)]
        forbid: Vec<String>,
    },
    /// 呼び出し側が渡す述語（設定ファイルでは表現不可）
    #[serde(skip)]
    Predicate(Arc<dyn Fn(&ProductRecord) -> bool + Send + Sync>),
}

impl RecordCheck {
    pub fn tokens<R, F, S, T>(require_any: R, forbid: F) -> Self
    where
        R: IntoIterator<Item = S>,
        F: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::Tokens {
            require_any: normalize_terms(require_any),
            forbid: normalize_terms(forbid),
        }
    }

    pub fn predicate(f: impl Fn(&ProductRecord) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    /// `name`は小文字化済みの商品名
    pub fn passes(&self, product: &ProductRecord, name: &str) -> bool {
        match self {
            Self::Tokens {
                require_any,
                forbid,
            } => {
                let brand = product.brand.to_lowercase();
                let required = require_any.is_empty()
                    || require_any
                        .iter()
                        .any(|t| name.contains(t.as_str()) || brand.contains(t.as_str()));
                required && !forbid.iter().any(|t| name.contains(t.as_str()))
            }
            Self::Predicate(f) => f(product),
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::Tokens {
                require_any,
                forbid,
            } => Self::tokens(require_any, forbid),
            other => other,
        }
    }
}

impl fmt::Debug for RecordCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokens {
                require_any,
                forbid,
            } => f
                .debug_struct("Tokens")
                .field("require_any", require_any)
                .field("forbid", forbid)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// カテゴリルール（照合語は小文字化済み）
#[derive(Debug, Clone)]
pub struct CategoryRule {
    name: String,
    keywords: Vec<String>,
    exclude_keywords: Vec<String>,
    priority: i32,
    check: Option<RecordCheck>,
}

impl CategoryRule {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            keywords: normalize_terms(keywords),
            exclude_keywords: Vec::new(),
            priority: DEFAULT_RULE_PRIORITY,
            check: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_excludes<I, S>(mut self, exclude_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_keywords = normalize_terms(exclude_keywords);
        self
    }

    pub fn with_check(mut self, check: RecordCheck) -> Self {
        self.check = Some(check.normalized());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn exclude_keywords(&self) -> &[String] {
        &self.exclude_keywords
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn check(&self) -> Option<&RecordCheck> {
        self.check.as_ref()
    }

    /// 決してマッチしないルールを拒否する
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ShopcatError::InvalidRule {
                name: self.name.clone(),
                reason: "category name is empty".to_string(),
            });
        }
        if self.keywords.is_empty() {
            return Err(ShopcatError::InvalidRule {
                name: self.name.clone(),
                reason: "no keywords".to_string(),
            });
        }
        Ok(())
    }

    /// `name`（小文字化済み）に含まれるキーワード（宣言順）
    pub fn matched_keywords(&self, name: &str) -> Vec<&str> {
        self.keywords
            .iter()
            .filter(|k| name.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_keywords
            .iter()
            .any(|k| name.contains(k.as_str()))
    }

    /// 同名カテゴリの後続宣言をこのルールに統合
    pub(crate) fn absorb(&mut self, other: CategoryRule) {
        for keyword in other.keywords {
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        for keyword in other.exclude_keywords {
            if !self.exclude_keywords.contains(&keyword) {
                self.exclude_keywords.push(keyword);
            }
        }
        self.priority = self.priority.max(other.priority);
        if self.check.is_none() {
            self.check = other.check;
        }
    }
}

/// 小文字化し空白のみの語を除く（空文字列は何にでもマッチするため）
fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .filter(|t| !t.trim().is_empty())
        .collect()
}
