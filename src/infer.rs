//! Schema inference: walk a JSON value and produce class models.
//!
//! The walk is depth-first. Each object key either contributes a primitive
//! atom or recurses; recursion produces a batch of classes that is
//! reconciled into the classes accumulated so far before the field type is
//! recorded. A record's own class is pushed after all of its fields, so
//! dependencies precede dependents in the raw output.

use serde_json::Value;

use crate::config::GenerateConfig;
use crate::error::Error;
use crate::ident;
use crate::model::ClassModel;
use crate::reconcile;
use crate::ty::{DICT_ANY, TypeExpr, TypeSet};

/// Entry point: dispatch on the shape of the top-level value.
///
/// An object is analyzed directly. An array is accepted when every element
/// is a non-empty object; each element is analyzed under the root name and
/// the per-element records merge into one. Anything else is rejected.
pub fn generate(value: &Value, root: &str, cfg: &GenerateConfig) -> Result<Vec<ClassModel>, Error> {
    match value {
        Value::Object(_) => classes_of_object(value, root, &[], cfg, 0),
        Value::Array(items) => {
            let all_records = !items.is_empty()
                && items
                    .iter()
                    .all(|v| matches!(v, Value::Object(m) if !m.is_empty()));
            if !all_records {
                return Err(Error::InvalidShape);
            }
            let mut batch = Vec::new();
            for item in items {
                batch.extend(classes_of_object(item, root, &[], cfg, 1)?);
            }
            Ok(reconcile::merge_classes(batch))
        }
        _ => Err(Error::InvalidShape),
    }
}

fn primitive_atom(value: &Value) -> &'static str {
    match value {
        Value::Null => "Any",
        Value::Bool(_) => "bool",
        Value::String(_) => "str",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        _ => unreachable!("composite value has no primitive atom"),
    }
}

/// Analyze one object. Returns every class it gave rise to, the object's own
/// record last. `existent` carries the class names claimed by enclosing
/// scopes; names minted here must not clash with them.
fn classes_of_object(
    value: &Value,
    name: &str,
    existent: &[String],
    cfg: &GenerateConfig,
    depth: usize,
) -> Result<Vec<ClassModel>, Error> {
    if depth >= cfg.max_depth {
        return Err(Error::DepthLimit(cfg.max_depth));
    }
    let map = match value {
        Value::Object(map) => map,
        _ => return Err(Error::InvalidShape),
    };

    let mut emitted: Vec<ClassModel> = Vec::new();
    let mut record = ClassModel::new(name);
    for (key, val) in map {
        let mut used: Vec<String> = existent.to_vec();
        used.extend(emitted.iter().map(|c| c.class_name.clone()));
        used.push(name.to_string());

        match val {
            Value::Object(inner) if !inner.is_empty() => {
                let class = ident::non_duplicate_name(&ident::class_name(key), &used);
                let batch = classes_of_object(val, &class, &used, cfg, depth + 1)?;
                let mut ty = TypeExpr::atom(class);
                let subs = reconcile::reconcile_into(&mut emitted, batch, cfg.prefer_class_reuse);
                subs.apply(&mut ty);
                record.push_attribute(key, ty);
            }
            Value::Object(_) => record.push_attribute(key, TypeExpr::atom(DICT_ANY)),
            Value::Array(items) => {
                let (batch, mut ty) = classes_of_array(items, key, &used, cfg, depth + 1)?;
                let subs = reconcile::reconcile_into(&mut emitted, batch, cfg.prefer_class_reuse);
                subs.apply(&mut ty);
                record.push_attribute(key, ty);
            }
            primitive => record.push_attribute(key, TypeExpr::atom(primitive_atom(primitive))),
        }
    }
    emitted.push(record);
    Ok(emitted)
}

/// Analyze an array held under `key`. Returns the classes its elements gave
/// rise to plus the list type for the holding field.
fn classes_of_array(
    items: &[Value],
    key: &str,
    used: &[String],
    cfg: &GenerateConfig,
    depth: usize,
) -> Result<(Vec<ClassModel>, TypeExpr), Error> {
    if depth >= cfg.max_depth {
        return Err(Error::DepthLimit(cfg.max_depth));
    }
    if items.is_empty() {
        return Ok((Vec::new(), TypeExpr::list(TypeSet::new())));
    }
    if items.iter().all(Value::is_object) {
        return classes_of_record_array(items, key, used, cfg, depth);
    }
    if items.iter().all(Value::is_array) {
        // arrays of arrays collapse into a single nested list member
        let mut batch = Vec::new();
        let mut members = TypeSet::new();
        for item in items {
            if let Value::Array(inner) = item {
                let (classes, ty) = classes_of_array(inner, key, used, cfg, depth + 1)?;
                batch.extend(classes);
                members.insert(ty)?;
            }
        }
        return Ok((reconcile::merge_classes(batch), TypeExpr::list(members)));
    }
    classes_of_mixed_array(items, key, used, cfg, depth)
}

/// All elements are objects: generate one record per element under a shared
/// class name, then merge. A merged record with no fields is discarded and
/// the element type degrades to a generic mapping.
fn classes_of_record_array(
    items: &[Value],
    key: &str,
    used: &[String],
    cfg: &GenerateConfig,
    depth: usize,
) -> Result<(Vec<ClassModel>, TypeExpr), Error> {
    let class = ident::non_duplicate_name(&ident::class_name(&ident::element_class_name(key)), used);
    let mut batch = Vec::new();
    for item in items {
        match item {
            Value::Object(map) if map.is_empty() => batch.push(ClassModel::new(class.clone())),
            _ => batch.extend(classes_of_object(item, &class, used, cfg, depth + 1)?),
        }
    }
    let merged = reconcile::merge_classes(batch);
    if merged.len() == 1 && merged[0].attributes.is_empty() {
        return Ok((Vec::new(), TypeExpr::list_of_atom(DICT_ANY)));
    }
    Ok((merged, TypeExpr::list_of_atom(class)))
}

/// Heterogeneous elements: each contributes one alternative to the list's
/// member set. Object elements still generate classes.
fn classes_of_mixed_array(
    items: &[Value],
    key: &str,
    used: &[String],
    cfg: &GenerateConfig,
    depth: usize,
) -> Result<(Vec<ClassModel>, TypeExpr), Error> {
    let class = ident::non_duplicate_name(&ident::class_name(&ident::element_class_name(key)), used);
    let mut batch = Vec::new();
    let mut members = TypeSet::new();
    for item in items {
        match item {
            Value::Object(map) if map.is_empty() => members.insert_atom(DICT_ANY),
            Value::Object(_) => {
                batch.extend(classes_of_object(item, &class, used, cfg, depth + 1)?);
                members.insert_atom(class.clone());
            }
            Value::Array(inner) => {
                let (classes, ty) = classes_of_array(inner, key, used, cfg, depth + 1)?;
                batch.extend(classes);
                members.insert(ty)?;
            }
            primitive => members.insert_atom(primitive_atom(primitive)),
        }
    }
    Ok((reconcile::merge_classes(batch), TypeExpr::list(members)))
}
