//! 内存数据源，供单元测试使用。

use super::MaterialsSource;
use crate::error::{MatAggError, Result};
use crate::models::{MaterialRecord, QueryRequest};

/// 固定记录集合；`failure` 设置时所有调用返回 `RetrievalError`
#[derive(Debug, Default)]
pub struct FixtureSource {
    records: Vec<MaterialRecord>,
    failure: Option<String>,
}

impl FixtureSource {
    pub fn new(records: Vec<MaterialRecord>) -> Self {
        FixtureSource {
            records,
            failure: None,
        }
    }

    /// `mp-1` .. `mp-n`，带 band_gap 与 formation_energy_per_atom
    pub fn numbered(n: usize) -> Self {
        let records = (1..=n)
            .map(|i| {
                MaterialRecord::new(format!("mp-{}", i), format!("Li{}O", i))
                    .with_number("formation_energy_per_atom", -(i as f64) * 0.25)
                    .with_number("band_gap", i as f64 * 0.5)
            })
            .collect();
        Self::new(records)
    }

    pub fn failing(reason: &str) -> Self {
        FixtureSource {
            records: Vec::new(),
            failure: Some(reason.to_string()),
        }
    }

    pub fn push(&mut self, record: MaterialRecord) {
        self.records.push(record);
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(MatAggError::retrieval(reason.clone())),
            None => Ok(()),
        }
    }
}

impl MaterialsSource for FixtureSource {
    fn query(&self, _request: &QueryRequest, _properties: &[String]) -> Result<Vec<MaterialRecord>> {
        self.check()?;
        Ok(self.records.clone())
    }

    fn fetch_by_ids(&self, ids: &[String], _properties: &[String]) -> Result<Vec<MaterialRecord>> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}
