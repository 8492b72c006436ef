//! # 化学元素
//!
//! 元素符号表与元素列表解析（如 `"Li,Fe,P,O"`）。
//!
//! ## 依赖关系
//! - 被 `models/query.rs` 和 `cli/` 使用
//! - 纯静态数据，无外部依赖

use crate::error::{MatAggError, Result};
use std::fmt;

/// 元素周期表（按原子序数排列）
pub static ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 经过校验的元素符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element(&'static str);

impl Element {
    /// 解析单个元素符号，大小写不敏感（`li` → `Li`）
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        let mut chars = token.chars();
        let normalized = match chars.next() {
            Some(first) => {
                let mut s = first.to_ascii_uppercase().to_string();
                s.push_str(&chars.as_str().to_ascii_lowercase());
                s
            }
            None => {
                return Err(MatAggError::validation("empty element symbol"));
            }
        };

        ELEMENT_SYMBOLS
            .iter()
            .find(|&&sym| sym == normalized)
            .map(|&sym| Element(sym))
            .ok_or_else(|| {
                MatAggError::validation(format!("'{}' is not a chemical element symbol", token))
            })
    }

    pub fn symbol(&self) -> &'static str {
        self.0
    }

}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// 解析逗号分隔的元素列表
///
/// 重复元素只保留第一次出现；空列表为校验错误。
pub fn parse_element_list(input: &str) -> Result<Vec<Element>> {
    let mut elements: Vec<Element> = Vec::new();

    for token in input.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let element = Element::parse(token)?;
        if !elements.contains(&element) {
            elements.push(element);
        }
    }

    if elements.is_empty() {
        return Err(MatAggError::validation(format!(
            "element list '{}' contains no element symbols",
            input
        )));
    }

    Ok(elements)
}
