use std::cmp::Ordering;

use crate::error::{BudgetError, Result};
use crate::models::{Transaction, COLUMNS, VALUE_COL};

/// One search term per grid column. Empty terms match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: [String; COLUMNS.len()],
}

impl Filter {
    pub fn term(&self, column: usize) -> &str {
        self.terms.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set_term(&mut self, column: usize, term: &str) {
        if let Some(slot) = self.terms.get_mut(column) {
            *slot = term.to_string();
        }
    }

    pub fn push_char(&mut self, column: usize, c: char) {
        if let Some(slot) = self.terms.get_mut(column) {
            slot.push(c);
        }
    }

    pub fn pop_char(&mut self, column: usize) {
        if let Some(slot) = self.terms.get_mut(column) {
            slot.pop();
        }
    }

    pub fn clear(&mut self) {
        self.terms = Default::default();
    }

    pub fn is_empty(&self) -> bool {
        self.terms.iter().all(|t| t.trim().is_empty())
    }

    pub fn matches(&self, row: &Transaction) -> bool {
        self.terms.iter().enumerate().all(|(col, term)| {
            let term = term.trim();
            term.is_empty() || row.column(col).to_lowercase().contains(&term.to_lowercase())
        })
    }

    /// Parse `COLUMN=TERM` pairs, e.g. `category=housing`.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut filter = Filter::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, term) = pair
                .split_once('=')
                .ok_or_else(|| BudgetError::InvalidFilter(pair.to_string()))?;
            let column = column_index(name)
                .ok_or_else(|| BudgetError::UnknownColumn(name.trim().to_string()))?;
            filter.set_term(column, term);
        }
        Ok(filter)
    }
}

pub fn column_index(name: &str) -> Option<usize> {
    let name = name.trim();
    COLUMNS.iter().position(|c| c.eq_ignore_ascii_case(name))
}

/// Indices of the rows that pass `filter`, in their original order.
pub fn apply(rows: &[Transaction], filter: &Filter) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| filter.matches(row))
        .map(|(i, _)| i)
        .collect()
}

/// Credits add, everything else subtracts; rows without a numeric value are skipped.
pub fn signed_sum<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    rows.into_iter()
        .filter_map(|row| {
            let value = row.amount()?;
            Some(if row.is_credit() { value } else { -value })
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub descending: bool,
}

impl SortKey {
    /// Next column in the cycle: none, then each column ascending, then none again.
    pub fn cycle(current: Option<SortKey>) -> Option<SortKey> {
        match current {
            None => Some(SortKey { column: 0, descending: false }),
            Some(key) if key.column + 1 < COLUMNS.len() => Some(SortKey {
                column: key.column + 1,
                descending: key.descending,
            }),
            Some(_) => None,
        }
    }

    pub fn reversed(self) -> SortKey {
        SortKey {
            descending: !self.descending,
            ..self
        }
    }
}

/// Stable sort of `view` (indices into `rows`) by `key`.
pub fn sort_view(rows: &[Transaction], view: &mut [usize], key: SortKey) {
    view.sort_by(|&a, &b| {
        let ord = compare(&rows[a], &rows[b], key.column);
        if key.descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn compare(a: &Transaction, b: &Transaction, column: usize) -> Ordering {
    if column == VALUE_COL {
        // unparseable values sort before any number
        return match (a.amount(), b.amount()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
    }
    a.column(column)
        .to_lowercase()
        .cmp(&b.column(column).to_lowercase())
}
