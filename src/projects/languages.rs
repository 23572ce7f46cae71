//! Language-composition descriptor: `"Rust:70,Python:30"`.
//!
//! Percentages are kept verbatim; nothing checks that they parse or sum to 100.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub name: String,
    pub percent: String,
}

/// Entries without a `:` or with an empty name are dropped; order is preserved.
pub fn parse(descriptor: &str) -> Vec<LanguageShare> {
    descriptor
        .split(',')
        .filter_map(|entry| {
            let (name, percent) = entry.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(LanguageShare {
                name: name.to_string(),
                percent: percent.trim().to_string(),
            })
        })
        .collect()
}

pub fn render(shares: &[LanguageShare]) -> String {
    shares
        .iter()
        .map(|s| format!("{}:{}", s.name, s.percent))
        .collect::<Vec<_>>()
        .join(",")
}
