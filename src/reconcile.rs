//! Batch reconciliation: optionality widening, same-name merging and the
//! collision/reuse logic that folds a freshly generated batch of classes
//! into the set already emitted.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::model::ClassModel;
use crate::ty::TypeExpr;

/// Renames produced while reconciling a batch, in application order. The
/// caller still holding a type that references a batch class applies this
/// before keeping it.
#[derive(Debug, Default)]
pub struct Substitution(IndexMap<String, String>);

impl Substitution {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply(&self, ty: &mut TypeExpr) {
        for (old, new) in &self.0 {
            ty.substitute(old, new);
        }
    }

    fn record(&mut self, old: String, new: String) {
        self.0.insert(old, new);
    }
}

/// Mark fields optional when some record of a same-name group lacks them.
///
/// A widened union gains an `Any` alternative; a widened list is wrapped so
/// it renders as `Optional[List[...]]`.
pub fn set_optional(batch: &mut [ClassModel]) {
    let names: Vec<String> = batch.iter().map(|c| c.class_name.clone()).collect();
    for i in 0..batch.len() {
        let name = &names[i];
        let group: Vec<&ClassModel> = batch.iter().filter(|c| &c.class_name == name).collect();
        if group.len() < 2 {
            continue;
        }
        let partial: Vec<String> = group
            .iter()
            .flat_map(|c| c.attributes.iter().map(|a| a.name.clone()))
            .filter(|field| !group.iter().all(|c| c.attribute(field).is_some()))
            .collect();
        for attr in &mut batch[i].attributes {
            if partial.contains(&attr.name) {
                attr.ty.widen_optional();
            }
        }
    }
}

/// Fold a batch so every class name appears once: optional widening first,
/// then same-name records merge field-by-field. First-occurrence order is
/// preserved; fields new to the merged record are appended.
pub fn merge_classes(mut batch: Vec<ClassModel>) -> Vec<ClassModel> {
    set_optional(&mut batch);
    let mut merged: Vec<ClassModel> = Vec::new();
    for cm in batch {
        match merged.iter_mut().find(|e| e.class_name == cm.class_name) {
            Some(existing) => {
                for attr in cm.attributes {
                    match existing
                        .attributes
                        .iter_mut()
                        .find(|e| e.name == attr.name)
                    {
                        Some(slot) => {
                            let current =
                                std::mem::replace(&mut slot.ty, TypeExpr::atom("Any"));
                            slot.ty = current.merge(attr.ty);
                        }
                        None => existing.attributes.push(attr),
                    }
                }
            }
            None => merged.push(cm),
        }
    }
    merged
}

/// Fold `batch` into the already-emitted `existing` classes.
///
/// Each batch class, in order: with reuse enabled, a structural twin among
/// `existing` replaces it outright; otherwise a name collision gets a
/// numbered rename. Either way references inside the rest of the batch are
/// rewritten immediately, and the rename/reuse is recorded for the caller's
/// pending field type.
pub fn reconcile_into(
    existing: &mut Vec<ClassModel>,
    batch: Vec<ClassModel>,
    prefer_reuse: bool,
) -> Substitution {
    let mut subs = Substitution::default();
    let mut queue: VecDeque<ClassModel> = batch.into();
    while let Some(mut cm) = queue.pop_front() {
        if prefer_reuse {
            if let Some(twin) = existing.iter().find(|e| e.structurally_equal(&cm)) {
                let target = twin.class_name.clone();
                log::debug!("reusing class {} for {}", target, cm.class_name);
                for rest in queue.iter_mut() {
                    rest.substitute(&cm.class_name, &target);
                }
                subs.record(cm.class_name, target);
                continue;
            }
        }
        if existing.iter().any(|e| e.class_name == cm.class_name) {
            let mut taken: Vec<String> =
                existing.iter().map(|e| e.class_name.clone()).collect();
            taken.extend(queue.iter().map(|q| q.class_name.clone()));
            let renamed = crate::ident::non_duplicate_name(&cm.class_name, &taken);
            log::debug!("renaming class {} to {}", cm.class_name, renamed);
            for rest in queue.iter_mut() {
                rest.substitute(&cm.class_name, &renamed);
            }
            subs.record(cm.class_name.clone(), renamed.clone());
            cm.class_name = renamed;
        }
        existing.push(cm);
    }
    subs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{TypeExpr, TypeSet};

    fn class(name: &str, fields: &[(&str, TypeExpr)]) -> ClassModel {
        let mut cm = ClassModel::new(name);
        for (field, ty) in fields {
            cm.push_attribute(*field, ty.clone());
        }
        cm
    }

    #[test]
    fn set_optional_widens_partial_fields() {
        let mut batch = vec![
            class("Item", &[("id", TypeExpr::atom("int")), ("note", TypeExpr::atom("str"))]),
            class("Item", &[("id", TypeExpr::atom("int"))]),
        ];
        set_optional(&mut batch);
        assert_eq!(batch[0].attribute("id").unwrap().ty.render(), "int");
        assert_eq!(batch[0].attribute("note").unwrap().ty.render(), "Optional[str]");
    }

    #[test]
    fn set_optional_wraps_lists() {
        let mut batch = vec![
            class("Item", &[("tags", TypeExpr::list(TypeSet::of_atom("str")))]),
            class("Item", &[("id", TypeExpr::atom("int"))]),
        ];
        set_optional(&mut batch);
        assert_eq!(
            batch[0].attribute("tags").unwrap().ty.render(),
            "Optional[List[str]]"
        );
        assert_eq!(batch[1].attribute("id").unwrap().ty.render(), "Optional[int]");
    }

    #[test]
    fn merge_unifies_same_name_records() {
        let merged = merge_classes(vec![
            class("Item", &[("value", TypeExpr::atom("int"))]),
            class("Item", &[("value", TypeExpr::atom("str"))]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].attribute("value").unwrap().ty.render(),
            "Union[int, str]"
        );
    }

    #[test]
    fn merge_keeps_first_occurrence_order() {
        let merged = merge_classes(vec![
            class("A", &[("x", TypeExpr::atom("int"))]),
            class("B", &[("y", TypeExpr::atom("str"))]),
            class("A", &[("x", TypeExpr::atom("int")), ("z", TypeExpr::atom("bool"))]),
        ]);
        let names: Vec<&str> = merged.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        let fields: Vec<&str> = merged[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(fields, ["x", "z"]);
    }

    #[test]
    fn merge_widens_numeric_fields_to_float() {
        let merged = merge_classes(vec![
            class("Reading", &[("x", TypeExpr::atom("int"))]),
            class("Reading", &[("x", TypeExpr::atom("float"))]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attribute("x").unwrap().ty.render(), "float");

        // and the other insertion order
        let merged = merge_classes(vec![
            class("Reading", &[("x", TypeExpr::atom("float"))]),
            class("Reading", &[("x", TypeExpr::atom("int"))]),
        ]);
        assert_eq!(merged[0].attribute("x").unwrap().ty.render(), "float");
    }

    #[test]
    fn merge_is_total_on_identical_records() {
        let merged = merge_classes(vec![
            class("Item", &[("id", TypeExpr::atom("int"))]),
            class("Item", &[("id", TypeExpr::atom("int"))]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attribute("id").unwrap().ty.render(), "int");
    }

    #[test]
    fn reconcile_renames_on_collision() {
        let mut existing = vec![class("Item", &[("name", TypeExpr::atom("str"))])];
        let batch = vec![
            class("Item", &[("price", TypeExpr::atom("float"))]),
            class("Cart", &[("item", TypeExpr::atom("Item"))]),
        ];
        let subs = reconcile_into(&mut existing, batch, false);
        let names: Vec<&str> = existing.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, ["Item", "Item1", "Cart"]);
        // the later batch member now references the renamed class
        assert!(existing[2].references("Item1"));

        let mut pending = TypeExpr::atom("Item");
        subs.apply(&mut pending);
        assert_eq!(pending.render(), "Item1");
    }

    #[test]
    fn reconcile_reuses_structural_twins() {
        let mut existing = vec![class("User1", &[("name", TypeExpr::atom("str"))])];
        let batch = vec![class("User2", &[("name", TypeExpr::atom("str"))])];
        let subs = reconcile_into(&mut existing, batch, true);
        assert_eq!(existing.len(), 1);
        let mut pending = TypeExpr::atom("User2");
        subs.apply(&mut pending);
        assert_eq!(pending.render(), "User1");
    }

    #[test]
    fn reconcile_without_reuse_keeps_twins_separate() {
        let mut existing = vec![class("User1", &[("name", TypeExpr::atom("str"))])];
        let batch = vec![class("User2", &[("name", TypeExpr::atom("str"))])];
        let subs = reconcile_into(&mut existing, batch, false);
        assert_eq!(existing.len(), 2);
        assert!(subs.is_empty());
    }

    #[test]
    fn reconcile_reuse_still_renames_unequal_collisions() {
        let mut existing = vec![class("Item", &[("name", TypeExpr::atom("str"))])];
        let batch = vec![class("Item", &[("price", TypeExpr::atom("float"))])];
        let subs = reconcile_into(&mut existing, batch, true);
        assert_eq!(existing[1].class_name, "Item1");
        let mut pending = TypeExpr::atom("Item");
        subs.apply(&mut pending);
        assert_eq!(pending.render(), "Item1");
    }
}
