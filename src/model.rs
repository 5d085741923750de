//! Intermediate representation of a generated class.

use crate::ty::TypeExpr;

/// One field of a generated class. `name` starts as the raw JSON key and is
/// sanitized just before rendering; `alias` is set when sanitization changed
/// it and never overwritten afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassAttribute {
    pub name: String,
    pub ty: TypeExpr,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassModel {
    pub class_name: String,
    pub attributes: Vec<ClassAttribute>,
}

impl ClassModel {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn push_attribute(&mut self, name: impl Into<String>, ty: TypeExpr) {
        self.attributes.push(ClassAttribute {
            name: name.into(),
            ty,
            alias: None,
        });
    }

    pub fn attribute(&self, name: &str) -> Option<&ClassAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Field-by-field equivalence, ignoring class name and field order.
    pub fn structurally_equal(&self, other: &ClassModel) -> bool {
        self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .all(|a| other.attribute(&a.name).is_some_and(|b| b.ty == a.ty))
    }

    /// Rewrite references to a renamed class in every field type.
    pub fn substitute(&mut self, old: &str, new: &str) {
        for attr in &mut self.attributes {
            attr.ty.substitute(old, new);
        }
    }

    /// Whether any field references `class_name`.
    pub fn references(&self, class_name: &str) -> bool {
        self.attributes.iter().any(|a| a.ty.contains_atom(class_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{TypeExpr, TypeSet};

    fn sample(name: &str) -> ClassModel {
        let mut cm = ClassModel::new(name);
        cm.push_attribute("id", TypeExpr::atom("int"));
        cm.push_attribute("tags", TypeExpr::list(TypeSet::of_atom("str")));
        cm
    }

    #[test]
    fn structural_equality_ignores_name_and_order() {
        let a = sample("User");
        let mut b = ClassModel::new("Customer");
        b.push_attribute("tags", TypeExpr::list(TypeSet::of_atom("str")));
        b.push_attribute("id", TypeExpr::atom("int"));
        assert!(a.structurally_equal(&b));
    }

    #[test]
    fn structural_equality_compares_types() {
        let a = sample("User");
        let mut b = sample("User");
        b.attributes[0].ty = TypeExpr::atom("str");
        assert!(!a.structurally_equal(&b));

        let mut c = sample("User");
        c.push_attribute("extra", TypeExpr::atom("bool"));
        assert!(!a.structurally_equal(&c));
    }

    #[test]
    fn substitute_rewrites_references() {
        let mut cm = ClassModel::new("Cart");
        cm.push_attribute("item", TypeExpr::atom("Item"));
        cm.push_attribute("extras", TypeExpr::list(TypeSet::of_atom("Item")));
        cm.substitute("Item", "Item1");
        assert!(cm.references("Item1"));
        assert!(!cm.references("Item"));
    }
}
