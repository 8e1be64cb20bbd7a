//! Search, filter and sort over listed rows
//!
//! Queries are pure: the store loads the committed rows and hands them to
//! [`Query::apply`]. Every ordering ends on the primary key so the result is
//! total and repeatable.

use crate::dimension::Dimension;
use crate::ecosystem::Ecosystem;
use crate::key::ActivationKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    /// Newest first
    #[default]
    New,
    /// Oldest first
    Old,
    /// Alphabetical by name, or by namespace then key
    AZ,
    /// Reverse alphabetical
    ZA,
}

impl Sort {
    /// Parse a request parameter. Unknown values fall back to [`Sort::New`].
    ///
    /// `"language"` used to sort by ecosystem and now sorts alphabetically.
    pub fn from_param(param: &str) -> Self {
        match param.trim() {
            "old" => Sort::Old,
            "a_z" | "language" => Sort::AZ,
            "z_a" => Sort::ZA,
            _ => Sort::New,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Sort::New => "new",
            Sort::Old => "old",
            Sort::AZ => "a_z",
            Sort::ZA => "z_a",
        }
    }

    /// Total order of two rows under this sort.
    pub fn compare<T: Searchable>(&self, a: &T, b: &T) -> Ordering {
        match self {
            Sort::New => b
                .created_at()
                .cmp(&a.created_at())
                .then_with(|| b.record_id().cmp(&a.record_id())),
            Sort::Old => a
                .created_at()
                .cmp(&b.created_at())
                .then_with(|| a.record_id().cmp(&b.record_id())),
            Sort::AZ => a
                .sort_name()
                .cmp(&b.sort_name())
                .then_with(|| a.record_id().cmp(&b.record_id())),
            Sort::ZA => b
                .sort_name()
                .cmp(&a.sort_name())
                .then_with(|| b.record_id().cmp(&a.record_id())),
        }
    }
}

/// A row that can be listed.
pub trait Searchable {
    /// Columns matched by the free-text query.
    fn search_columns(&self) -> Vec<&str>;

    fn ecosystem(&self) -> Ecosystem;

    fn created_at(&self) -> DateTime<Utc>;

    /// Primary key, the final tie-break.
    fn record_id(&self) -> u64;

    /// Lowercased columns for alphabetical order, most significant first.
    fn sort_name(&self) -> Vec<String>;

    fn is_retired(&self) -> bool {
        false
    }
}

impl Searchable for ActivationKey {
    fn search_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.namespace.as_str(),
            self.key.as_str(),
            self.library_name.as_str(),
        ];
        if let Some(project_name) = &self.project_name {
            columns.push(project_name);
        }
        columns
    }

    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn record_id(&self) -> u64 {
        self.id.raw()
    }

    fn sort_name(&self) -> Vec<String> {
        vec![self.namespace.to_lowercase(), self.key.to_lowercase()]
    }

    fn is_retired(&self) -> bool {
        self.retired
    }
}

impl Searchable for Dimension {
    fn search_columns(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn record_id(&self) -> u64 {
        self.id
    }

    fn sort_name(&self) -> Vec<String> {
        vec![self.name.to_lowercase()]
    }
}

/// Search text, ecosystem filter, retirement filter and order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Case-insensitive substring; blank matches everything.
    pub q: String,
    /// Allowed ecosystems; empty allows all.
    pub ecosystems: Vec<Ecosystem>,
    pub sort: Sort,
    /// Leave out retired rows.
    pub active_only: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = q.into();
        self
    }

    pub fn ecosystems(mut self, ecosystems: impl IntoIterator<Item = Ecosystem>) -> Self {
        self.ecosystems = ecosystems.into_iter().collect();
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn active_only(mut self, value: bool) -> Self {
        self.active_only = value;
        self
    }

    /// Whether a row passes every filter.
    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        if self.active_only && row.is_retired() {
            return false;
        }
        if !self.ecosystems.is_empty() && !self.ecosystems.contains(&row.ecosystem()) {
            return false;
        }
        let needle = self.q.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        row.search_columns()
            .iter()
            .any(|column| column.to_lowercase().contains(&needle))
    }

    /// Filter and order `rows`.
    pub fn apply<T: Searchable>(&self, rows: Vec<T>) -> Vec<T> {
        let mut rows: Vec<T> = rows.into_iter().filter(|row| self.matches(row)).collect();
        sort_rows(&mut rows, self.sort);
        rows
    }
}

pub fn sort_rows<T: Searchable>(rows: &mut [T], sort: Sort) {
    rows.sort_by(|a, b| sort.compare(a, b));
}
