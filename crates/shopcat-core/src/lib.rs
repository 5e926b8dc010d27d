pub mod category;
pub mod config;
pub mod error;
pub mod product;

pub use config::Config;
pub use error::{Result, ShopcatError};
pub use product::{load_products, read_products, FieldAliases, InputFormat, ProductRecord};

// Category system
pub use category::{
    category_slug, BatchReport, BatchStats, CategoryPatch, CategoryRule, Classifier,
    DuplicatePolicy, Mismatch, RecordCheck, RuleConfig, RuleMatch, RuleSet, Validation,
    BUILTIN_RULES,
};
