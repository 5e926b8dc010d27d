//! Batch validation results
//!
//! 一括検証の集計結果と更新パッチ。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::product::ProductRecord;

use super::classifier::Validation;
use super::slug::category_slug;

/// 商品リストの集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub uncategorized: usize,
    /// 検出カテゴリ -> 商品数（保存カテゴリによらない）
    pub by_category: BTreeMap<String, usize>,
}

/// 保存カテゴリが検出カテゴリと一致しない商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mismatch {
    pub id: Option<String>,
    pub name: String,
    pub current_category: String,
    pub detected_category: String,
    /// 検出カテゴリへの更新パッチ
    pub correction: CategoryPatch,
}

/// 集計と不一致レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub stats: BatchStats,
    pub incorrect_products: Vec<Mismatch>,
}

impl BatchReport {
    /// 商品一件を集計
    pub fn record(&mut self, product: &ProductRecord, validation: &Validation) {
        self.stats.total += 1;

        if !product.has_category() {
            self.stats.uncategorized += 1;
        } else if validation.is_correct {
            self.stats.correct += 1;
        } else {
            self.stats.incorrect += 1;
            if let Some(detected) = &validation.detected_category {
                self.incorrect_products.push(Mismatch {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    current_category: validation.current_category.clone(),
                    detected_category: detected.clone(),
                    correction: CategoryPatch::for_category(detected),
                });
            }
        }

        if let Some(detected) = &validation.detected_category {
            *self.stats.by_category.entry(detected.clone()).or_insert(0) += 1;
        }
    }

    /// 独立に処理したシャードのレポートを結合する。
    ///
    /// 件数は加算、`other`の不一致は`self`の後ろに続く。
    pub fn merge(mut self, other: BatchReport) -> Self {
        self.stats.total += other.stats.total;
        self.stats.correct += other.stats.correct;
        self.stats.incorrect += other.stats.incorrect;
        self.stats.uncategorized += other.stats.uncategorized;
        for (category, count) in other.stats.by_category {
            *self.stats.by_category.entry(category).or_insert(0) += count;
        }
        self.incorrect_products.extend(other.incorrect_products);
        self
    }

    /// カテゴリ設定済み商品のうち正しいものの割合（0.0-1.0）
    pub fn accuracy(&self) -> Option<f64> {
        let categorized = self.stats.correct + self.stats.incorrect;
        if categorized == 0 {
            return None;
        }
        Some(self.stats.correct as f64 / categorized as f64)
    }
}

/// ストレージ層が一件分受け付ける更新パッチ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub category: String,
    pub category_slug: String,
}

impl CategoryPatch {
    pub fn for_category(category: &str) -> Self {
        Self {
            category: category.to_string(),
            category_slug: category_slug(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(is_correct: bool, detected: Option<&str>, current: &str) -> Validation {
        Validation {
            is_correct,
            detected_category: detected.map(str::to_string),
            current_category: current.to_string(),
        }
    }

    #[test]
    fn test_record_three_way_split() {
        let mut report = BatchReport::default();

        let uncategorized = ProductRecord::named("RTX 4070");
        report.record(&uncategorized, &validation(true, Some("Graphics Cards"), ""));

        let correct = ProductRecord::named("RTX 4070").with_category("Graphics Cards");
        report.record(&correct, &validation(true, Some("Graphics Cards"), "Graphics Cards"));

        let wrong = ProductRecord::named("RTX 4070")
            .with_id("p3")
            .with_category("Monitors");
        report.record(&wrong, &validation(false, Some("Graphics Cards"), "Monitors"));

        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.uncategorized, 1);
        assert_eq!(report.stats.correct, 1);
        assert_eq!(report.stats.incorrect, 1);
        assert_eq!(report.stats.by_category.get("Graphics Cards"), Some(&3));
        assert_eq!(report.incorrect_products[0].id.as_deref(), Some("p3"));
        assert_eq!(report.incorrect_products[0].current_category, "Monitors");
        assert_eq!(
            report.incorrect_products[0].correction,
            CategoryPatch {
                category: "Graphics Cards".to_string(),
                category_slug: "graphics-cards".to_string(),
            }
        );
    }

    #[test]
    fn test_no_detection_not_counted_by_category() {
        let mut report = BatchReport::default();
        let product = ProductRecord::named("Water Bottle").with_category("Kitchen");
        report.record(&product, &validation(true, None, "Kitchen"));

        assert_eq!(report.stats.correct, 1);
        assert!(report.stats.by_category.is_empty());
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut left = BatchReport::default();
        left.record(
            &ProductRecord::named("a").with_category("RAM"),
            &validation(false, Some("Storage"), "RAM"),
        );
        let mut right = BatchReport::default();
        right.record(&ProductRecord::named("b"), &validation(true, Some("Storage"), ""));

        let merged = left.merge(right);
        assert_eq!(merged.stats.total, 2);
        assert_eq!(merged.stats.incorrect, 1);
        assert_eq!(merged.stats.uncategorized, 1);
        assert_eq!(merged.stats.by_category.get("Storage"), Some(&2));
        assert_eq!(merged.incorrect_products.len(), 1);
    }

    #[test]
    fn test_accuracy() {
        let mut report = BatchReport::default();
        assert_eq!(report.accuracy(), None);

        report.record(
            &ProductRecord::named("a").with_category("RAM"),
            &validation(true, Some("RAM"), "RAM"),
        );
        report.record(
            &ProductRecord::named("b").with_category("RAM"),
            &validation(false, Some("Storage"), "RAM"),
        );
        assert_eq!(report.accuracy(), Some(0.5));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = BatchReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["stats"].get("byCategory").is_some());
        assert!(json.get("incorrectProducts").is_some());
    }

    #[test]
    fn test_mismatch_serializes_correction() {
        let mut report = BatchReport::default();
        report.record(
            &ProductRecord::named("Logitech G502 Wireless Mouse")
                .with_id("1")
                .with_category("Keyboards"),
            &validation(false, Some("Mice"), "Keyboards"),
        );

        let json = serde_json::to_value(&report).unwrap();
        let mismatch = &json["incorrectProducts"][0];
        assert_eq!(mismatch["currentCategory"], "Keyboards");
        assert_eq!(mismatch["correction"]["category"], "Mice");
        assert_eq!(mismatch["correction"]["categorySlug"], "mice");
    }
}
