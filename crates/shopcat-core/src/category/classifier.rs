//! Category Classifier
//!
//! `RuleSet`の全ルールを商品名に対してスコアリングし、最高スコアを選ぶ。
//! キーワードが小文字化した商品名に一つ以上含まれ、除外語を含まず、
//! レコードチェック（あれば）を通過したルールが候補になる。
//! スコアはマッチしたキーワード長の合計+priority。同点なら先のルールが勝つ。

use serde::Serialize;

use crate::product::ProductRecord;

use super::batch::{BatchReport, CategoryPatch};
use super::rule::CategoryRule;
use super::store::RuleSet;

/// 候補ルールとそのスコア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    /// RuleSet内の位置
    pub rule_index: usize,
    pub category: &'a str,
    pub score: i64,
    pub matched_keywords: Vec<&'a str>,
}

/// 保存カテゴリと検出カテゴリの照合結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_correct: bool,
    pub detected_category: Option<String>,
    pub current_category: String,
}

/// 商品カテゴリ分類器
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// ビルトインルールテーブルで初期化
    pub fn builtin() -> Self {
        Self::new(RuleSet::builtin())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 全候補ルール（宣言順）
    pub fn candidates(&self, product: &ProductRecord) -> Vec<RuleMatch<'_>> {
        let name = product.name.to_lowercase();
        if name.is_empty() {
            return Vec::new();
        }

        self.rules
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| score_rule(idx, rule, &name, product))
            .collect()
    }

    /// 最高スコアのルール（同点なら先勝ち）
    pub fn best_match(&self, product: &ProductRecord) -> Option<RuleMatch<'_>> {
        let mut best: Option<RuleMatch<'_>> = None;
        for candidate in self.candidates(product) {
            let leads = best
                .as_ref()
                .map_or(true, |current| candidate.score > current.score);
            if leads {
                best = Some(candidate);
            }
        }
        best
    }

    /// 商品の検出カテゴリ（候補なしなら`None`）
    pub fn detect_category(&self, product: &ProductRecord) -> Option<&str> {
        self.best_match(product).map(|m| m.category)
    }

    /// 保存カテゴリと検出カテゴリを比較する。
    ///
    /// 検出できない商品は常に正しいとみなす。
    pub fn validate_product_category(&self, product: &ProductRecord) -> Validation {
        let detected = self.detect_category(product);
        let is_correct = match detected {
            None => true,
            Some(detected) => product.category.to_lowercase() == detected.to_lowercase(),
        };

        Validation {
            is_correct,
            detected_category: detected.map(str::to_string),
            current_category: product.category.clone(),
        }
    }

    /// 未設定または誤ったカテゴリを直す更新パッチ
    pub fn correction(&self, product: &ProductRecord) -> Option<CategoryPatch> {
        let validation = self.validate_product_category(product);
        if validation.is_correct && product.has_category() {
            return None;
        }

        validation
            .detected_category
            .as_deref()
            .map(CategoryPatch::for_category)
    }

    /// 商品リスト全体を一括検証
    pub fn batch_validate_products(&self, products: &[ProductRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        for product in products {
            let validation = self.validate_product_category(product);
            report.record(product, &validation);
        }

        tracing::debug!(
            total = report.stats.total,
            correct = report.stats.correct,
            incorrect = report.stats.incorrect,
            uncategorized = report.stats.uncategorized,
            "batch validation finished"
        );
        report
    }
}

fn score_rule<'a>(
    idx: usize,
    rule: &'a CategoryRule,
    name: &str,
    product: &ProductRecord,
) -> Option<RuleMatch<'a>> {
    let matched = rule.matched_keywords(name);
    if matched.is_empty() {
        return None;
    }

    if rule.is_excluded(name) {
        tracing::trace!(category = rule.name(), product = name, "excluded by keyword");
        return None;
    }

    if let Some(check) = rule.check() {
        if !check.passes(product, name) {
            tracing::trace!(category = rule.name(), product = name, "rejected by record check");
            return None;
        }
    }

    let keyword_len: usize = matched.iter().map(|k| k.chars().count()).sum();
    Some(RuleMatch {
        rule_index: idx,
        category: rule.name(),
        score: keyword_len as i64 + i64::from(rule.priority()),
        matched_keywords: matched,
    })
}
