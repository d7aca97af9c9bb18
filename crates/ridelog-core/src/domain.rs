use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use serde::Serialize;

use crate::columns::require;
use crate::error::{PipelineError, Result};

/// Finite set of labels observed in a column, with stable codes in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDomain {
    values: Vec<String>,
}

impl CategoryDomain {
    pub fn discover<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let unique: BTreeSet<&str> = values.into_iter().flatten().collect();
        Self {
            values: unique.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn from_column(df: &DataFrame, name: &str) -> Result<Self> {
        let column = require(df, name)?.str()?;
        Ok(Self::discover(column.iter()))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn code_of(&self, value: &str) -> Option<u32> {
        self.values
            .binary_search_by(|label| label.as_str().cmp(value))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn label(&self, code: u32) -> Option<&str> {
        self.values.get(code as usize).map(String::as_str)
    }

    /// Code of every value in `name`. A null or a label outside the domain is an error.
    pub fn encode(&self, df: &DataFrame, name: &str) -> Result<Vec<u32>> {
        let column = require(df, name)?.str()?;
        column
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value.and_then(|label| self.code_of(label)).ok_or_else(|| {
                    PipelineError::Validation(format!(
                        "row {row} of '{name}' holds {value:?}, which is not in the domain"
                    ))
                })
            })
            .collect()
    }

    /// Occurrences of each code, indexed by code.
    pub fn tally(&self, codes: &[u32]) -> Vec<usize> {
        let mut counts = vec![0usize; self.values.len()];
        for code in codes {
            if let Some(count) = counts.get_mut(*code as usize) {
                *count += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn discovers_sorted_unique_labels() {
        let domain = CategoryDomain::discover([
            Some("Personal"),
            Some("Business"),
            None,
            Some("Business"),
        ]);
        assert_eq!(domain.values(), ["Business", "Personal"]);
        assert_eq!(domain.code_of("Personal"), Some(1));
        assert_eq!(domain.label(0), Some("Business"));
        assert_eq!(domain.code_of("Commute"), None);
    }

    #[test]
    fn encodes_and_tallies_a_column() {
        let df = df!("Category" => &["Personal", "Business", "Business"]).unwrap();
        let domain = CategoryDomain::from_column(&df, "Category").unwrap();

        let codes = domain.encode(&df, "Category").unwrap();
        assert_eq!(codes, [1, 0, 0]);
        assert_eq!(domain.tally(&codes), [2, 1]);
    }

    #[test]
    fn labels_outside_the_domain_are_rejected() {
        let domain = CategoryDomain::discover([Some("Business")]);
        let df = df!("Category" => &[Some("Business"), Some("Commute")]).unwrap();

        let err = domain.encode(&df, "Category").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(err.to_string().contains("Commute"));
    }

    #[test]
    fn empty_input_gives_empty_domain() {
        let domain = CategoryDomain::discover(std::iter::empty::<Option<&str>>());
        assert!(domain.is_empty());
        assert_eq!(domain.label(0), None);
    }
}
