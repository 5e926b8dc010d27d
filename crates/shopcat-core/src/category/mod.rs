//! # Category Module
//!
//! 商品名からストア商品のカテゴリを検出する機能を提供する。
//!
//! ## マッチングモデル
//!
//! カテゴリルールはキーワード、除外キーワード、優先度、任意のレコードチェックを持つ。
//! 小文字化した商品名に対して、以下をすべて満たすルールが候補になる：
//!
//! - キーワードのいずれかが商品名の部分文字列である
//! - 除外キーワードがどれも商品名に含まれない
//! - レコードチェック（あれば）を通過する
//!
//! スコアは`sum(len(マッチしたキーワード)) + priority`。最高スコアが勝ち、
//! 同点なら先に宣言されたルールを採用する。
//!
//! ## モジュール構成
//!
//! - `builtin`: 標準ルールテーブル
//! - `rule`: ルール単体とレコードチェック
//! - `store`: 順序付きルールセットと重複宣言の扱い
//! - `classifier`: 検出、検証、修正パッチ、一括処理
//! - `batch`: 一括検証レポートの型
//! - `slug`: カテゴリスラッグ
//!
//! ## 使用例
//!
//! ```rust
//! use shopcat_core::category::{category_slug, Classifier};
//! use shopcat_core::ProductRecord;
//!
//! // ビルトインルールで分類
//! let classifier = Classifier::builtin();
//! let product = ProductRecord::named("Corsair Vengeance 16GB DDR4 RAM");
//! assert_eq!(classifier.detect_category(&product), Some("RAM"));
//!
//! let report = classifier.batch_validate_products(&[product.with_category("Storage")]);
//! assert_eq!(report.stats.incorrect, 1);
//!
//! assert_eq!(category_slug("Graphics Cards"), "graphics-cards");
//! ```
//!
//! ### カスタムルールセット
//!
//! ```rust
//! use shopcat_core::category::{CategoryRule, Classifier, RuleSet};
//! use shopcat_core::ProductRecord;
//!
//! let rules = RuleSet::new(vec![
//!     CategoryRule::new("Capture Cards", ["capture card", "elgato"]).with_priority(8),
//! ])
//! .unwrap();
//! let classifier = Classifier::new(rules);
//! let product = ProductRecord::named("Elgato HD60 X Capture Card");
//! assert_eq!(classifier.detect_category(&product), Some("Capture Cards"));
//! ```

mod batch;
mod builtin;
mod classifier;
mod rule;
mod slug;
mod store;

// Re-exports
pub use batch::{BatchReport, BatchStats, CategoryPatch, Mismatch};
pub use builtin::{BuiltinRule, BUILTIN_RULES};
pub use classifier::{Classifier, RuleMatch, Validation};
pub use rule::{CategoryRule, RecordCheck, DEFAULT_RULE_PRIORITY};
pub use slug::category_slug;
pub use store::{DuplicatePolicy, RuleConfig, RuleSet};
