/// カテゴリ名のURLセーフなスラッグ。
///
/// 小文字化し、連続する空白を一つの`-`に置き換え、`[a-z0-9-]`以外を除去する。
/// 二回適用しても結果は変わらない。
pub fn category_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.to_lowercase().chars() {
        if is_separator(c) {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// Unicode空白文字とU+FEFF（BOM）
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}
