//! # 材料性质目录
//!
//! 定义性质取值类型以及已知性质的静态目录：
//! 规范名称、API 响应中的 JSON 路径、显示标签、单位、精度、报告分组，
//! 以及是否支持服务端范围过滤。
//!
//! ## 依赖关系
//! - 被 `models/record.rs`, `client/`, `analysis/` 使用
//! - 无外部模块依赖

use crate::error::{MatAggError, Result};
use std::fmt;

/// 缺失值在表格和报告中的显示标记
pub const NOT_AVAILABLE: &str = "N/A";

/// 性质取值
///
/// 缺失值用 `Option<PropertyValue>` 的 `None` 表示，与 `Number(0.0)` 区分。
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl PropertyValue {
    /// 数值视图；文本和布尔值返回 `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// 按指定小数位显示
    pub fn display_with_precision(&self, precision: Option<usize>) -> String {
        match (self, precision) {
            (PropertyValue::Number(v), Some(p)) => format!("{:.*}", p, v),
            (PropertyValue::Number(v), None) => format!("{}", v),
            (PropertyValue::Text(s), _) => s.clone(),
            (PropertyValue::Flag(true), _) => "Yes".to_string(),
            (PropertyValue::Flag(false), _) => "No".to_string(),
        }
    }

    /// CSV 单元格文本（数值保留完整精度）
    pub fn to_csv_field(&self) -> String {
        match self {
            PropertyValue::Number(v) => v.to_string(),
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::Flag(b) => b.to_string(),
        }
    }

    /// 从 CSV 单元格还原；空字符串视为缺失
    ///
    /// 目录中的性质按其取值类型解码；未知列中只有有限数值被视为数字。
    /// 解码失败时保留为文本。
    pub fn from_csv_field(name: &str, field: &str) -> Option<Self> {
        if field.is_empty() {
            return None;
        }
        let number = || {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(PropertyValue::Number)
        };
        let flag = || match field {
            "true" => Some(PropertyValue::Flag(true)),
            "false" => Some(PropertyValue::Flag(false)),
            _ => None,
        };

        let decoded = match lookup(name).map(|def| def.kind) {
            Some(ValueKind::Number) => number(),
            Some(ValueKind::Flag) => flag(),
            Some(ValueKind::Text) => None,
            None => number().or_else(flag),
        };
        Some(decoded.unwrap_or_else(|| PropertyValue::Text(field.to_string())))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with_precision(None))
    }
}

/// 性质的取值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Text,
    Flag,
}

/// 报告中的性质分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyGroup {
    Structure,
    Thermodynamics,
    Electronic,
    Magnetic,
    Mechanical,
    Other,
}

impl PropertyGroup {
    pub const ALL: [PropertyGroup; 6] = [
        PropertyGroup::Structure,
        PropertyGroup::Thermodynamics,
        PropertyGroup::Electronic,
        PropertyGroup::Magnetic,
        PropertyGroup::Mechanical,
        PropertyGroup::Other,
    ];
}

impl fmt::Display for PropertyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyGroup::Structure => write!(f, "Structure"),
            PropertyGroup::Thermodynamics => write!(f, "Thermodynamic Properties"),
            PropertyGroup::Electronic => write!(f, "Electronic Properties"),
            PropertyGroup::Magnetic => write!(f, "Magnetic Properties"),
            PropertyGroup::Mechanical => write!(f, "Mechanical Properties"),
            PropertyGroup::Other => write!(f, "Other"),
        }
    }
}

/// 已知性质定义
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    /// 规范名称（CSV 列名、过滤条件中使用）
    pub name: &'static str,
    /// API 响应中的 JSON 路径
    pub path: &'static [&'static str],
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub precision: Option<usize>,
    pub kind: ValueKind,
    pub group: PropertyGroup,
    /// 服务端支持 `<name>_min` / `<name>_max` 范围过滤
    pub range_filter: bool,
}

impl PropertyDef {
    /// 请求 `_fields` 时使用的顶层字段名
    pub fn api_field(&self) -> &'static str {
        self.path[0]
    }
}

/// 性质目录（按报告显示顺序）
pub static CATALOG: &[PropertyDef] = &[
    PropertyDef {
        name: "spacegroup",
        path: &["symmetry", "symbol"],
        label: "Spacegroup",
        unit: None,
        precision: None,
        kind: ValueKind::Text,
        group: PropertyGroup::Structure,
        range_filter: false,
    },
    PropertyDef {
        name: "crystal_system",
        path: &["symmetry", "crystal_system"],
        label: "Crystal System",
        unit: None,
        precision: None,
        kind: ValueKind::Text,
        group: PropertyGroup::Structure,
        range_filter: false,
    },
    PropertyDef {
        name: "nsites",
        path: &["nsites"],
        label: "Sites",
        unit: None,
        precision: Some(0),
        kind: ValueKind::Number,
        group: PropertyGroup::Structure,
        range_filter: true,
    },
    PropertyDef {
        name: "volume",
        path: &["volume"],
        label: "Volume",
        unit: Some("Å³"),
        precision: Some(3),
        kind: ValueKind::Number,
        group: PropertyGroup::Structure,
        range_filter: true,
    },
    PropertyDef {
        name: "formation_energy_per_atom",
        path: &["formation_energy_per_atom"],
        label: "Formation Energy per Atom",
        unit: Some("eV/atom"),
        precision: Some(4),
        kind: ValueKind::Number,
        group: PropertyGroup::Thermodynamics,
        range_filter: true,
    },
    PropertyDef {
        name: "energy_above_hull",
        path: &["energy_above_hull"],
        label: "Energy Above Hull",
        unit: Some("eV/atom"),
        precision: Some(4),
        kind: ValueKind::Number,
        group: PropertyGroup::Thermodynamics,
        range_filter: true,
    },
    PropertyDef {
        name: "is_stable",
        path: &["is_stable"],
        label: "Is Stable",
        unit: None,
        precision: None,
        kind: ValueKind::Flag,
        group: PropertyGroup::Thermodynamics,
        range_filter: false,
    },
    PropertyDef {
        name: "density",
        path: &["density"],
        label: "Density",
        unit: Some("g/cm³"),
        precision: Some(2),
        kind: ValueKind::Number,
        group: PropertyGroup::Thermodynamics,
        range_filter: true,
    },
    PropertyDef {
        name: "band_gap",
        path: &["band_gap"],
        label: "Band Gap",
        unit: Some("eV"),
        precision: Some(2),
        kind: ValueKind::Number,
        group: PropertyGroup::Electronic,
        range_filter: true,
    },
    PropertyDef {
        name: "is_metal",
        path: &["is_metal"],
        label: "Is Metal",
        unit: None,
        precision: None,
        kind: ValueKind::Flag,
        group: PropertyGroup::Electronic,
        range_filter: false,
    },
    PropertyDef {
        name: "efermi",
        path: &["efermi"],
        label: "Fermi Energy",
        unit: Some("eV"),
        precision: Some(4),
        kind: ValueKind::Number,
        group: PropertyGroup::Electronic,
        range_filter: true,
    },
    PropertyDef {
        name: "e_electronic",
        path: &["e_electronic"],
        label: "Electronic Dielectric Constant",
        unit: None,
        precision: Some(3),
        kind: ValueKind::Number,
        group: PropertyGroup::Electronic,
        range_filter: true,
    },
    PropertyDef {
        name: "total_magnetization",
        path: &["total_magnetization"],
        label: "Total Magnetization",
        unit: Some("μB/f.u."),
        precision: Some(3),
        kind: ValueKind::Number,
        group: PropertyGroup::Magnetic,
        range_filter: true,
    },
    PropertyDef {
        name: "ordering",
        path: &["ordering"],
        label: "Magnetic Ordering",
        unit: None,
        precision: None,
        kind: ValueKind::Text,
        group: PropertyGroup::Magnetic,
        range_filter: false,
    },
    PropertyDef {
        name: "k_vrh",
        path: &["bulk_modulus", "vrh"],
        label: "Bulk Modulus (K_VRH)",
        unit: Some("GPa"),
        precision: Some(1),
        kind: ValueKind::Number,
        group: PropertyGroup::Mechanical,
        range_filter: true,
    },
    PropertyDef {
        name: "g_vrh",
        path: &["shear_modulus", "vrh"],
        label: "Shear Modulus (G_VRH)",
        unit: Some("GPa"),
        precision: Some(1),
        kind: ValueKind::Number,
        group: PropertyGroup::Mechanical,
        range_filter: true,
    },
    PropertyDef {
        name: "homogeneous_poisson",
        path: &["homogeneous_poisson"],
        label: "Poisson Ratio",
        unit: None,
        precision: Some(3),
        kind: ValueKind::Number,
        group: PropertyGroup::Mechanical,
        range_filter: true,
    },
];

/// `search` 默认获取的性质
pub const SEARCH_PROPERTIES: &[&str] = &[
    "formation_energy_per_atom",
    "energy_above_hull",
    "band_gap",
    "density",
    "k_vrh",
    "g_vrh",
    "total_magnetization",
    "e_electronic",
    "ordering",
];

/// `stable` 默认获取的性质
pub const STABLE_PROPERTIES: &[&str] = &[
    "formation_energy_per_atom",
    "energy_above_hull",
    "band_gap",
    "density",
    "k_vrh",
    "spacegroup",
];

/// `compare` 默认获取的性质
pub const COMPARE_PROPERTIES: &[&str] = &[
    "formation_energy_per_atom",
    "energy_above_hull",
    "band_gap",
    "density",
    "k_vrh",
    "g_vrh",
];

/// 查找性质定义
pub fn lookup(name: &str) -> Option<&'static PropertyDef> {
    CATALOG.iter().find(|def| def.name == name)
}

/// 所有已知性质名（`summary` 使用）
pub fn all_property_names() -> Vec<String> {
    CATALOG.iter().map(|def| def.name.to_string()).collect()
}

/// 校验性质名是否在目录中
pub fn validate_property(name: &str) -> Result<&'static PropertyDef> {
    lookup(name).ok_or_else(|| {
        MatAggError::validation(format!(
            "unknown property '{}' (known: {})",
            name,
            CATALOG
                .iter()
                .map(|d| d.name)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

/// 校验性质名且要求为数值型（过滤、排序、相关性分析使用）
pub fn validate_numeric_property(name: &str) -> Result<&'static PropertyDef> {
    let def = validate_property(name)?;
    if def.kind != ValueKind::Number {
        return Err(MatAggError::validation(format!(
            "property '{}' is not numeric and cannot be compared, sorted or correlated",
            name
        )));
    }
    Ok(def)
}

/// 解析逗号分隔的性质列表（保持顺序，去重）
pub fn parse_property_list(input: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        validate_property(token)?;
        if !names.iter().any(|n| n == token) {
            names.push(token.to_string());
        }
    }
    if names.is_empty() {
        return Err(MatAggError::validation(format!(
            "property list '{}' is empty",
            input
        )));
    }
    Ok(names)
}

/// `band_gap` → `Band Gap`
pub fn humanize(name: &str) -> String {
    if let Some(def) = lookup(name) {
        return def.label.to_string();
    }
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 缺失值显示为 `N/A`
pub fn display_value(name: &str, value: Option<&PropertyValue>) -> String {
    match value {
        Some(v) => v.display_with_precision(lookup(name).and_then(|d| d.precision)),
        None => NOT_AVAILABLE.to_string(),
    }
}
