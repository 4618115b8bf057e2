//! Prefecture table and address splitting.
//!
//! The canonical prefecture order is the JIS X 0401 code order (Hokkaido
//! first, Okinawa last). It drives the `prefecture` sort key and the order
//! of the sidebar tree.

use std::sync::LazyLock;

use regex::Regex;

/// All 47 prefectures in JIS X 0401 order.
pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県",
    "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府", "兵庫県",
    "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県",
    "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Municipalities whose own name contains `市`, which the generic pattern
/// would cut short.
const CITY_NAME_EXCEPTIONS: &[&str] = &[
    "四日市市", "廿日市市", "野々市市", "市川市", "市原市", "市貝町", "市川三郷町",
];

/// `郡` + town/village, or the first municipality suffix.
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?郡.+?[町村]|.+?[市区町村])").expect("valid regex"));

/// Leading postal code such as `〒150-0001 `.
static POSTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^〒?\s*\d{3}-?\d{4}\s*").expect("valid regex"));

/// Position of a prefecture in the canonical order, or `None` if unknown.
pub fn prefecture_rank(name: &str) -> Option<usize> {
    PREFECTURES.iter().position(|p| *p == name)
}

/// Sort rank with unknown prefectures placed after every known one.
pub fn prefecture_sort_rank(name: &str) -> usize {
    prefecture_rank(name).unwrap_or(PREFECTURES.len())
}

/// Check whether a string is one of the 47 prefecture names.
pub fn is_prefecture(name: &str) -> bool {
    prefecture_rank(name).is_some()
}

/// Split a free-text Japanese address into `(prefecture, city)`.
///
/// Either part is `None` when it cannot be recognised. A leading postal code
/// is ignored.
pub fn split_address(address: &str) -> (Option<String>, Option<String>) {
    let trimmed = address.trim();
    let trimmed = POSTAL_RE.replace(trimmed, "");
    let trimmed = trimmed.trim_start();

    let Some(prefecture) = PREFECTURES.iter().find(|p| trimmed.starts_with(*p)) else {
        return (None, None);
    };

    let rest = trimmed[prefecture.len()..].trim_start();
    let city = CITY_NAME_EXCEPTIONS
        .iter()
        .find(|c| rest.starts_with(*c))
        .map(|c| c.to_string())
        .or_else(|| {
            CITY_RE
                .captures(rest)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        });

    (Some(prefecture.to_string()), city)
}
