//! Family graph: couples and parent/child groupings inferred from relation
//! codes.
//!
//! Families do not exist as rows on the interview form. They are derived per
//! export from the individuals' relation codes and identified by a
//! [`FamilyKey`], so that facts declared from either side of a relationship
//! land on the same unit.

mod builder;

pub use builder::build_family_graph;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::model::Rin;

/// Canonical identity of a family unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FamilyKey {
    /// A couple, stored as `(smaller rin, larger rin)`.
    Couple(Rin, Rin),
    /// A lone parent.
    Single(Rin),
}

impl FamilyKey {
    /// Couple key for two rins in either order.
    pub fn couple(a: Rin, b: Rin) -> Self {
        FamilyKey::Couple(a.min(b), a.max(b))
    }

    pub fn single(rin: Rin) -> Self {
        FamilyKey::Single(rin)
    }
}

/// Cross-reference identifier, without the surrounding `@` delimiters.
impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyKey::Couple(lo, hi) => write!(f, "FAM_COUPLE_{}_{}", lo, hi),
            FamilyKey::Single(rin) => write!(f, "FAM_SINGLE_{}", rin),
        }
    }
}

/// One inferred family: an optional couple plus children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUnit {
    pub key: FamilyKey,
    pub husband: Option<Rin>,
    pub wife: Option<Rin>,
    /// Children in ascending rin order.
    pub children: BTreeSet<Rin>,
}

impl FamilyUnit {
    fn new(key: FamilyKey) -> Self {
        Self {
            key,
            husband: None,
            wife: None,
            children: BTreeSet::new(),
        }
    }

    /// True if `rin` is this family's husband or wife.
    pub fn is_spouse(&self, rin: Rin) -> bool {
        self.husband == Some(rin) || self.wife == Some(rin)
    }

    pub fn has_child(&self, rin: Rin) -> bool {
        self.children.contains(&rin)
    }

    pub fn is_empty(&self) -> bool {
        self.husband.is_none() && self.wife.is_none() && self.children.is_empty()
    }
}

/// Non-fatal data-quality findings from a graph build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// More than two parents were declared for one child; only the first two
    /// (ascending rin) form the family.
    ExtraParents { child: Rin, ignored: Vec<Rin> },
    /// Both partners of a couple declared sexes that resolve to the same slot.
    SlotConflict { key: FamilyKey, husband: Rin, wife: Rin },
    /// A relation code named the row's own rin.
    SelfReference { rin: Rin },
    /// The same rin appears on more than one row; the first row is used for
    /// lookups.
    DuplicateRin { rin: Rin },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::ExtraParents { child, ignored } => write!(
                f,
                "child {} has more than two parents; ignoring {:?}",
                child, ignored
            ),
            GraphWarning::SlotConflict { key, husband, wife } => write!(
                f,
                "{}: both partners resolve to the same slot; using husband={} wife={}",
                key, husband, wife
            ),
            GraphWarning::SelfReference { rin } => {
                write!(f, "rin {} references itself; relation ignored", rin)
            }
            GraphWarning::DuplicateRin { rin } => {
                write!(f, "rin {} appears on more than one row", rin)
            }
        }
    }
}

/// Arena of family units in creation order, indexed by key.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    units: Vec<FamilyUnit>,
    index: HashMap<FamilyKey, usize>,
    warnings: Vec<GraphWarning>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the unit for `key`, creating it at the end of the arena if it
    /// does not exist yet. Repeated calls with the same key return the same
    /// unit.
    pub fn fetch_or_create(&mut self, key: FamilyKey) -> &mut FamilyUnit {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.units.push(FamilyUnit::new(key));
                let slot = self.units.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };
        &mut self.units[slot]
    }

    pub fn get(&self, key: &FamilyKey) -> Option<&FamilyUnit> {
        self.index.get(key).map(|&slot| &self.units[slot])
    }

    /// Units in creation order.
    pub fn units(&self) -> &[FamilyUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Families in which `rin` is husband or wife, in creation order.
    pub fn spouse_families(&self, rin: Rin) -> impl Iterator<Item = &FamilyUnit> {
        self.units.iter().filter(move |unit| unit.is_spouse(rin))
    }

    /// Families listing `rin` as a child, in creation order.
    pub fn child_families(&self, rin: Rin) -> impl Iterator<Item = &FamilyUnit> {
        self.units.iter().filter(move |unit| unit.has_child(rin))
    }

    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, warning: GraphWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_couple_key_is_order_independent() {
        assert_eq!(FamilyKey::couple(4, 2), FamilyKey::couple(2, 4));
        assert_eq!(FamilyKey::couple(4, 2), FamilyKey::Couple(2, 4));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(FamilyKey::couple(2, 1).to_string(), "FAM_COUPLE_1_2");
        assert_eq!(FamilyKey::single(5).to_string(), "FAM_SINGLE_5");
    }

    #[test]
    fn test_fetch_or_create_is_idempotent() {
        let mut graph = FamilyGraph::new();
        graph.fetch_or_create(FamilyKey::couple(1, 2)).husband = Some(1);
        graph.fetch_or_create(FamilyKey::single(7)).children.insert(8);
        graph.fetch_or_create(FamilyKey::couple(2, 1)).children.insert(3);

        assert_eq!(graph.len(), 2);
        let unit = graph.get(&FamilyKey::Couple(1, 2)).unwrap();
        assert_eq!(unit.husband, Some(1));
        assert!(unit.has_child(3));
        assert_eq!(graph.units()[1].key, FamilyKey::Single(7));
    }

    #[test]
    fn test_spouse_and_child_lookups() {
        let mut graph = FamilyGraph::new();
        let unit = graph.fetch_or_create(FamilyKey::couple(1, 2));
        unit.husband = Some(1);
        unit.wife = Some(2);
        unit.children.insert(3);

        assert_eq!(graph.spouse_families(1).count(), 1);
        assert_eq!(graph.spouse_families(3).count(), 0);
        assert_eq!(graph.child_families(3).count(), 1);
    }

    #[test]
    fn test_duplicate_warnings_collapse() {
        let mut graph = FamilyGraph::new();
        graph.warn(GraphWarning::SelfReference { rin: 4 });
        graph.warn(GraphWarning::SelfReference { rin: 4 });
        assert_eq!(graph.warnings().len(), 1);
    }
}
