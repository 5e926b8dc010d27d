//! Builtin Category Rules
//!
//! ストアの標準ルールテーブル（PCパーツ・周辺機器）。
//! MotherboardsとRAMは汎用語とチップセット/モジュール語で二重に宣言されている。
//! 二つ目の宣言の扱いは`DuplicatePolicy`を参照。

use super::rule::{CategoryRule, RecordCheck};

/// 静的ルール定義
#[derive(Debug, Clone)]
pub struct BuiltinRule {
    /// カテゴリ表示名
    pub name: &'static str,
    /// 小文字化した商品名から探す部分文字列
    pub keywords: &'static [&'static str],
    /// 商品名に一つでも含まれればルール対象外
    pub exclude_keywords: &'static [&'static str],
    /// キーワードスコアへの加算値（大きいほど優先）
    pub priority: i32,
    /// トークンチェック: 商品名かブランドにいずれかが必要
    pub require_any: &'static [&'static str],
    /// トークンチェック: 商品名に含まれてはならない語
    pub forbid: &'static [&'static str],
}

pub const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        name: "Processors",
        keywords: &[
            "processor",
            "cpu",
            "intel core",
            "core i3",
            "core i5",
            "core i7",
            "core i9",
            "ryzen",
            "threadripper",
            "xeon",
            "pentium",
            "celeron",
            "athlon",
        ],
        exclude_keywords: &["cooler", "cooling", "thermal", "fan", "heatsink", "bracket"],
        priority: 10,
        require_any: &["intel", "amd", "ryzen"],
        forbid: &["laptop", "notebook"],
    },
    BuiltinRule {
        name: "Graphics Cards",
        keywords: &[
            "graphics card",
            "video card",
            "gpu",
            "geforce",
            "rtx",
            "gtx",
            "radeon",
            "quadro",
        ],
        exclude_keywords: &["laptop", "notebook", "riser", "support bracket", "holder"],
        priority: 10,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Motherboards",
        keywords: &["motherboard", "mainboard", "mobo"],
        exclude_keywords: &["laptop", "standoff", "screws"],
        priority: 9,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "RAM",
        keywords: &["ram", "memory", "ddr3", "ddr4", "ddr5", "dimm"],
        exclude_keywords: &[
            "laptop", "notebook", "graphics", "gpu", "card", "ssd", "flash", "usb", "sodimm",
            "so-dimm",
        ],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Storage",
        keywords: &[
            "ssd",
            "hdd",
            "nvme",
            "m.2",
            "hard drive",
            "hard disk",
            "solid state",
            "external drive",
            "flash drive",
            "usb drive",
        ],
        exclude_keywords: &["enclosure", "caddy", "heatsink"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Power Supplies",
        keywords: &["power supply", "psu", "80 plus", "80+", "modular"],
        exclude_keywords: &["cable", "extension", "tester"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Cases",
        keywords: &[
            "pc case",
            "computer case",
            "chassis",
            "mid tower",
            "mid-tower",
            "full tower",
            "mini tower",
            "atx case",
        ],
        exclude_keywords: &["phone case", "carrying case", "laptop", "case fan"],
        priority: 7,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "CPU Coolers",
        keywords: &[
            "cpu cooler",
            "cooler",
            "liquid cooling",
            "aio",
            "heatsink",
            "radiator",
            "case fan",
            "thermal paste",
        ],
        exclude_keywords: &["laptop", "cooling pad", "phone", "ssd heatsink", "m.2"],
        priority: 9,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Monitors",
        keywords: &[
            "monitor",
            "display",
            "144hz",
            "165hz",
            "240hz",
            "ultrawide",
            "curved screen",
        ],
        exclude_keywords: &[
            "monitor arm",
            "monitor stand",
            "monitor mount",
            "laptop",
            "cable",
            "adapter",
        ],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Keyboards",
        keywords: &[
            "keyboard",
            "keycap",
            "keycaps",
            "mechanical keyboard",
            "keyboard switches",
        ],
        exclude_keywords: &["laptop", "notebook", "piano", "keyboard tray", "wrist rest"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Mice",
        keywords: &["mouse", "mice", "gaming mouse", "wireless mouse"],
        exclude_keywords: &["mouse pad", "mousepad", "mouse bungee", "mouse skates"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Mouse Pads",
        keywords: &["mouse pad", "mousepad", "desk mat", "deskmat"],
        exclude_keywords: &[],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Headsets",
        keywords: &["headset", "headphone", "headphones", "earbuds", "earphones"],
        exclude_keywords: &["stand", "hanger", "holder", "ear pads", "replacement"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Speakers",
        keywords: &["speaker", "speakers", "soundbar", "subwoofer"],
        exclude_keywords: &["headphone", "headset", "cable"],
        priority: 7,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Webcams",
        keywords: &["webcam", "web camera", "web cam"],
        exclude_keywords: &["cover", "mount"],
        priority: 8,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Networking",
        keywords: &[
            "router",
            "wifi adapter",
            "wi-fi adapter",
            "ethernet",
            "network card",
            "network switch",
            "modem",
            "access point",
            "mesh wifi",
        ],
        exclude_keywords: &["cable"],
        priority: 7,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Laptops",
        keywords: &["laptop", "notebook", "macbook", "chromebook", "ultrabook"],
        exclude_keywords: &[
            "bag",
            "backpack",
            "sleeve",
            "stand",
            "charger",
            "adapter",
            "cooling pad",
            "skin",
            "sodimm",
            "so-dimm",
            "screen protector",
        ],
        priority: 9,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Gaming Chairs",
        keywords: &["gaming chair", "office chair", "ergonomic chair"],
        exclude_keywords: &["chair mat", "cushion"],
        priority: 6,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "Motherboards",
        keywords: &[
            "b450", "b550", "b650", "b660", "b760", "x570", "x670", "z690", "z790", "h610",
            "lga1200", "lga1700", "am4", "am5", "micro-atx", "mini-itx",
        ],
        exclude_keywords: &[
            "case",
            "cooler",
            "power supply",
            "psu",
            "processor",
            "cpu",
            "laptop",
            "bracket",
        ],
        priority: 7,
        require_any: &[],
        forbid: &[],
    },
    BuiltinRule {
        name: "RAM",
        keywords: &[
            "sodimm",
            "so-dimm",
            "ram kit",
            "rgb ram",
            "desktop memory",
            "laptop memory",
            "3200mhz",
            "3600mhz",
            "6000mhz",
        ],
        exclude_keywords: &["graphics", "gpu", "ssd", "flash"],
        priority: 9,
        require_any: &[],
        forbid: &[],
    },
];

impl From<&BuiltinRule> for CategoryRule {
    fn from(builtin: &BuiltinRule) -> Self {
        let rule = CategoryRule::new(builtin.name, builtin.keywords.iter())
            .with_excludes(builtin.exclude_keywords.iter())
            .with_priority(builtin.priority);

        if builtin.require_any.is_empty() && builtin.forbid.is_empty() {
            rule
        } else {
            rule.with_check(RecordCheck::tokens(
                builtin.require_any.iter(),
                builtin.forbid.iter(),
            ))
        }
    }
}
