//! Typed input records and the name-derived keys used to group them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading characters of a portfolio name that form its group.
pub const GROUP_LEN: usize = 5;

/// Variant suffix marker; a portfolio name ending in `_REX<digits>` is a copy
/// of the base portfolio.
const VARIANT_MARKER: &str = "_REX";

/// Identifier of the user owning a portfolio.
///
/// Spreadsheets store ids either as numbers or as text. Integral numbers are
/// kept as `Int`; anything else keeps its cell text. Numeric ids sort before
/// text ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl UserId {
    /// Build an id from a numeric cell. Fractional values fall back to text.
    pub fn from_number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            UserId::Int(value as i64)
        } else {
            UserId::Text(value.to_string())
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Int(id) => write!(f, "{}", id),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Int(id)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        UserId::Int(id.into())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

/// One row of the PNL sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct PnlRecord {
    pub user_id: UserId,
    pub portfolio_name: String,
    /// `None` when the PNL cell was blank.
    pub pnl: Option<f64>,
    pub strategy_tag: String,
}

impl PnlRecord {
    pub fn new(
        user_id: impl Into<UserId>,
        portfolio_name: &str,
        pnl: Option<f64>,
        strategy_tag: &str,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            portfolio_name: portfolio_name.to_string(),
            pnl,
            strategy_tag: strategy_tag.to_string(),
        }
    }

    pub fn clean_name(&self) -> &str {
        clean_name(&self.portfolio_name)
    }

    pub fn portfolio_group(&self) -> &str {
        portfolio_group(&self.portfolio_name)
    }
}

/// Strip a trailing `_REX<digits>` suffix.
///
/// The suffix must sit at the very end of the name and carry at least one
/// ASCII digit. Only one suffix is removed.
pub fn clean_name(name: &str) -> &str {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() == name.len() {
        return name;
    }
    stem.strip_suffix(VARIANT_MARKER).unwrap_or(name)
}

/// First `GROUP_LEN` characters of the name, or the whole name if shorter.
pub fn portfolio_group(name: &str) -> &str {
    match name.char_indices().nth(GROUP_LEN) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_strips_suffix() {
        assert_eq!(clean_name("ABCDE_REX12"), "ABCDE");
        assert_eq!(clean_name("ABCDE_REX1"), "ABCDE");
        assert_eq!(clean_name("ABCDE"), "ABCDE");
    }

    #[test]
    fn test_clean_name_anchor() {
        // marker without digits, or not at the end, is left alone
        assert_eq!(clean_name("ABCDE_REX"), "ABCDE_REX");
        assert_eq!(clean_name("ABC_REX12_X"), "ABC_REX12_X");
        assert_eq!(clean_name("ABC_REX12A"), "ABC_REX12A");
        assert_eq!(clean_name("ABCDE12"), "ABCDE12");
        assert_eq!(clean_name("A_REX1_REX2"), "A_REX1");
        assert_eq!(clean_name(""), "");
    }

    #[test]
    fn test_portfolio_group() {
        assert_eq!(portfolio_group("ABCDEFG"), "ABCDE");
        assert_eq!(portfolio_group("AB"), "AB");
        assert_eq!(portfolio_group("ABCDE"), "ABCDE");
        assert_eq!(portfolio_group(""), "");
        assert_eq!(portfolio_group("ÄÖÜßéXYZ"), "ÄÖÜßé");
    }

    #[test]
    fn test_group_ignores_clean_name() {
        let r = PnlRecord::new(1, "AB_REX7", Some(1.0), "X");
        assert_eq!(r.portfolio_group(), "AB_RE");
        assert_eq!(r.clean_name(), "AB");
    }

    #[test]
    fn test_user_id_ordering() {
        let mut ids = vec![
            UserId::from("b"),
            UserId::from(10),
            UserId::from("a"),
            UserId::from(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![UserId::Int(2), UserId::Int(10), UserId::from("a"), UserId::from("b")]
        );
    }

    #[test]
    fn test_user_id_from_number() {
        assert_eq!(UserId::from_number(42.0), UserId::Int(42));
        assert_eq!(UserId::from_number(-3.0), UserId::Int(-3));
        assert_eq!(UserId::from_number(1.5), UserId::Text("1.5".to_string()));
        assert_eq!(UserId::Int(7).to_string(), "7");
    }
}
