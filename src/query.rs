//! Lookup and filter operations over the record store.

use crate::normalize::{match_key, normalize};
use crate::store::{MeasurementRecord, RecordStore};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Result of an id lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a MeasurementRecord),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn record(self) -> Option<&'a MeasurementRecord> {
        match self {
            Lookup::Found(r) => Some(r),
            Lookup::NotFound => None,
        }
    }
}

/// Read-only query service. Cheap to clone; every clone shares the store.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<RecordStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// First `limit` records in store order, or all of them when `limit` is `None`
    pub fn list_all(&self, limit: Option<usize>) -> &[MeasurementRecord] {
        let all = self.store.all_records();
        match limit {
            Some(n) => &all[..n.min(all.len())],
            None => all,
        }
    }

    /// Exact match on `id`
    pub fn get_by_id(&self, id: &str) -> Lookup<'_> {
        match self.store.find_by_id(id) {
            Some(r) => Lookup::Found(r),
            None => Lookup::NotFound,
        }
    }

    /// Case- and accent-insensitive substring filter on department, and on
    /// municipality when one is given (blank counts as absent).
    pub fn filter_by_location(
        &self,
        departamento: &str,
        municipio: Option<&str>,
    ) -> Vec<&MeasurementRecord> {
        let dpto = match_key(&normalize(departamento));
        let mun = municipio
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| match_key(&normalize(m)));

        self.store
            .with_location_keys()
            .filter(|(_, (rec_dpto, rec_mun))| {
                rec_dpto.contains(&dpto)
                    && mun.as_ref().is_none_or(|m| rec_mun.contains(m.as_str()))
            })
            .map(|(r, _)| r)
            .collect()
    }

    /// Records whose `Periodo` contains at least one of `tokens`
    /// (case-insensitive substring).
    pub fn filter_by_period(&self, tokens: &BTreeSet<String>) -> Vec<&MeasurementRecord> {
        let needles: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if needles.is_empty() {
            return Vec::new();
        }
        self.store
            .all_records()
            .iter()
            .filter(|r| {
                let periodo = r.periodo.to_lowercase();
                needles.iter().any(|n| periodo.contains(n.as_str()))
            })
            .collect()
    }
}
