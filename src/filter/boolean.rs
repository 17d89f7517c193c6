//! Boolean combination of filters.

use crate::error::Result;
use crate::filter::{DocSet, Filter};
use crate::reader::SegmentReader;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
}

/// A clause in a boolean filter.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The filter for this clause.
    pub filter: Box<dyn Filter>,
    /// The occurrence requirement.
    pub occur: Occur,
}

/// Combines clauses the way a boolean query does.
///
/// A candidate is kept when it passes every `Must` clause and at least one
/// `Should` clause (if there are any). Each clause sees the incoming candidates,
/// not the output of its siblings.
#[derive(Debug, Clone, Default)]
pub struct BooleanFilter {
    clauses: Vec<BooleanClause>,
}

impl BooleanFilter {
    /// Create a boolean filter with no clauses; it accepts every candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause.
    pub fn add_clause<F: Filter + 'static>(mut self, filter: F, occur: Occur) -> Self {
        self.clauses.push(BooleanClause {
            filter: Box::new(filter),
            occur,
        });
        self
    }

    /// Add a MUST clause.
    pub fn must<F: Filter + 'static>(self, filter: F) -> Self {
        self.add_clause(filter, Occur::Must)
    }

    /// Add a SHOULD clause.
    pub fn should<F: Filter + 'static>(self, filter: F) -> Self {
        self.add_clause(filter, Occur::Should)
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }
}

impl Filter for BooleanFilter {
    fn apply(&self, segment: &dyn SegmentReader, candidates: DocSet) -> Result<DocSet> {
        let mut result = candidates.clone();
        let mut any_should: Option<DocSet> = None;

        for clause in &self.clauses {
            let matched = clause.filter.apply(segment, candidates.clone())?;
            match clause.occur {
                Occur::Must => result.intersect_with(&matched),
                Occur::Should => match any_should.as_mut() {
                    Some(union) => union.union_with(&matched),
                    None => any_should = Some(matched),
                },
            }
        }

        if let Some(union) = any_should {
            result.intersect_with(&union);
        }
        Ok(result)
    }

    fn description(&self) -> String {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                };
                format!("{prefix}{}", clause.filter.description())
            })
            .collect();
        format!("({})", clauses.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
