//! Two-pass family graph construction from relation codes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{FamilyGraph, FamilyKey, FamilyUnit, GraphWarning};
use crate::model::{Individual, Rin};
use crate::relation::{parse_relation, RelationFact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Husband,
    Wife,
}

/// Slot for `person` in a couple with `other`: husband when male, or when sex
/// is unknown and `person` has the smaller rin; wife otherwise.
fn slot_for(person: &Individual, other: Rin) -> Slot {
    if person.sex.is_male() || (person.sex.is_unknown() && person.rin < other) {
        Slot::Husband
    } else {
        Slot::Wife
    }
}

fn place(unit: &mut FamilyUnit, rin: Rin, slot: Slot) {
    match slot {
        Slot::Husband => unit.husband = Some(rin),
        Slot::Wife => unit.wife = Some(rin),
    }
}

/// Build the family graph for one export.
///
/// Pass A creates a unit per couple code and assigns husband/wife slots.
/// Pass B groups every child under the family of its first two parents
/// (ascending rin). Key set and membership do not depend on the order of
/// `individuals`; unit creation order follows couple declarations in input
/// order, then children in ascending rin order.
pub fn build_family_graph(individuals: &[Individual]) -> FamilyGraph {
    let mut graph = FamilyGraph::new();

    let mut by_rin: HashMap<Rin, &Individual> = HashMap::with_capacity(individuals.len());
    for ind in individuals {
        if by_rin.contains_key(&ind.rin) {
            graph.warn(GraphWarning::DuplicateRin { rin: ind.rin });
        } else {
            by_rin.insert(ind.rin, ind);
        }
    }

    let facts: Vec<(Rin, RelationFact)> = individuals
        .iter()
        .map(|ind| (ind.rin, parse_relation(&ind.relation)))
        .collect();

    // Pass A: couples
    for (rin, fact) in &facts {
        if let RelationFact::CoupleOf(partner) = fact {
            if partner == rin {
                graph.warn(GraphWarning::SelfReference { rin: *rin });
                continue;
            }
            assign_couple(&mut graph, &by_rin, *rin, *partner);
        }
    }

    // Pass B: parent/child
    let mut parent_of: BTreeMap<Rin, BTreeSet<Rin>> = BTreeMap::new();
    for (rin, fact) in &facts {
        match fact {
            RelationFact::ChildOfParents(parents) => {
                for parent in parents {
                    if parent == rin {
                        graph.warn(GraphWarning::SelfReference { rin: *rin });
                        continue;
                    }
                    parent_of.entry(*rin).or_default().insert(*parent);
                }
            }
            RelationFact::ParentOfChild(child) => {
                if child == rin {
                    graph.warn(GraphWarning::SelfReference { rin: *rin });
                    continue;
                }
                parent_of.entry(*child).or_default().insert(*rin);
            }
            RelationFact::CoupleOf(_) | RelationFact::None => {}
        }
    }

    for (child, parents) in &parent_of {
        let mut ordered = parents.iter().copied();
        let key = match (ordered.next(), ordered.next()) {
            (Some(first), Some(second)) => FamilyKey::couple(first, second),
            (Some(only), None) => FamilyKey::single(only),
            _ => continue,
        };
        let ignored: Vec<Rin> = ordered.collect();
        if !ignored.is_empty() {
            graph.warn(GraphWarning::ExtraParents {
                child: *child,
                ignored,
            });
        }
        graph.fetch_or_create(key).children.insert(*child);
    }

    graph
}

/// Resolve the couple `a`/`b` onto its family unit. Participants missing from
/// the individual list are left unassigned.
fn assign_couple(graph: &mut FamilyGraph, by_rin: &HashMap<Rin, &Individual>, a: Rin, b: Rin) {
    let key = FamilyKey::couple(a, b);
    let (lo, hi) = (a.min(b), a.max(b));
    let lo_slot = by_rin.get(&lo).map(|person| slot_for(person, hi));
    let hi_slot = by_rin.get(&hi).map(|person| slot_for(person, lo));

    if lo_slot.is_none() && hi_slot.is_none() {
        return;
    }

    let lo_unknown = by_rin.get(&lo).is_some_and(|p| p.sex.is_unknown());
    let hi_unknown = by_rin.get(&hi).is_some_and(|p| p.sex.is_unknown());

    let unit = graph.fetch_or_create(key);
    let conflict = match (lo_slot, hi_slot) {
        (Some(l), Some(h)) if l == h => {
            let other = if l == Slot::Husband { Slot::Wife } else { Slot::Husband };
            if lo_unknown && !hi_unknown {
                // Declared sex wins over the rin tie-break.
                place(unit, hi, h);
                place(unit, lo, other);
                None
            } else if hi_unknown && !lo_unknown {
                place(unit, lo, l);
                place(unit, hi, other);
                None
            } else {
                // Contested slot stays with the smaller rin.
                place(unit, lo, l);
                place(unit, hi, other);
                Some((unit.husband.unwrap_or(lo), unit.wife.unwrap_or(hi)))
            }
        }
        (l, h) => {
            if let Some(l) = l {
                place(unit, lo, l);
            }
            if let Some(h) = h {
                place(unit, hi, h);
            }
            None
        }
    };

    if let Some((husband, wife)) = conflict {
        graph.warn(GraphWarning::SlotConflict { key, husband, wife });
    }
}
