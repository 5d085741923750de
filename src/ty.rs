//! Type-expression algebra.
//!
//! A field's type is a small canonical-form lattice: a set of atom tags
//! (`str`, `int`, `float`, `bool`, `Any`, or a generated class name) plus at
//! most one nested list member. Keeping the list member in its own slot makes
//! "a container holds at most one list" a structural fact instead of a
//! runtime check, the same way the inference state keeps one arm per kind.
//!
//! Joins are order-independent: atoms live in a `BTreeSet` and merging two
//! list members unions their member sets recursively.

use std::collections::BTreeSet;

use crate::error::Error;

/// Atom tag for a JSON null / missing value.
pub const ANY: &str = "Any";
/// Atom tag standing in for an empty object (renders as a generic mapping).
pub const DICT_ANY: &str = "Dict[str, Any]";

/// Member set of a union or list container.
///
/// Invariants:
/// - at most one nested list member (the `list` slot);
/// - never holds both `int` and `float`: inserting `float` evicts `int`,
///   inserting `int` while `float` is present is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSet {
    atoms: BTreeSet<String>,
    list: Option<Box<TypeSet>>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_atom(atom: impl Into<String>) -> Self {
        let mut set = Self::default();
        set.insert_atom(atom);
        set
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.list.is_none()
    }

    pub fn insert_atom(&mut self, atom: impl Into<String>) {
        let atom = atom.into();
        // numeric widening: int ⊔ float = float
        if atom == "int" && self.atoms.contains("float") {
            return;
        }
        if atom == "float" {
            self.atoms.remove("int");
        }
        self.atoms.insert(atom);
    }

    pub fn insert_list(&mut self, members: TypeSet) {
        match &mut self.list {
            Some(existing) => existing.merge(members),
            None => self.list = Some(Box::new(members)),
        }
    }

    /// Insert an arbitrary type expression as one alternative.
    ///
    /// A `List` merges into the list slot; a `Union` of a single atom is that
    /// atom. Any other `Union` is a caller error: containers nest lists,
    /// never other unions.
    pub fn insert(&mut self, value: TypeExpr) -> Result<(), Error> {
        match value {
            TypeExpr::List(members) => {
                self.insert_list(members);
                Ok(())
            }
            TypeExpr::Union(set) => match set.into_single_atom() {
                Some(atom) => {
                    self.insert_atom(atom);
                    Ok(())
                }
                None => Err(Error::ConstraintViolation(
                    "cannot insert a union into a type container".into(),
                )),
            },
        }
    }

    /// Union of both member sets, in place.
    pub fn merge(&mut self, other: TypeSet) {
        for atom in other.atoms {
            self.insert_atom(atom);
        }
        if let Some(list) = other.list {
            self.insert_list(*list);
        }
    }

    pub fn contains_atom(&self, atom: &str) -> bool {
        self.atoms.contains(atom)
            || self
                .list
                .as_ref()
                .is_some_and(|list| list.contains_atom(atom))
    }

    /// Replace a named-reference atom everywhere, including nested lists.
    pub fn substitute(&mut self, old: &str, new: &str) {
        if self.atoms.remove(old) {
            self.insert_atom(new);
        }
        if let Some(list) = &mut self.list {
            list.substitute(old, new);
        }
    }

    fn into_single_atom(mut self) -> Option<String> {
        if self.list.is_none() && self.atoms.len() == 1 {
            self.atoms.pop_first()
        } else {
            None
        }
    }

    /// Render this set with union semantics: `Any` folds into `Optional`,
    /// alternatives are sorted lexicographically by rendered text.
    fn render_union(&self) -> String {
        let mut alts: Vec<String> = self
            .atoms
            .iter()
            .filter(|atom| atom.as_str() != ANY)
            .cloned()
            .collect();
        if let Some(list) = &self.list {
            alts.push(list.render_list());
        }
        alts.sort();

        let optional = self.atoms.contains(ANY);
        match (optional, alts.len()) {
            (_, 0) => ANY.to_string(),
            (true, 1) => format!("Optional[{}]", alts[0]),
            (true, _) => format!("Optional[Union[{}]]", alts.join(", ")),
            (false, 1) => alts.remove(0),
            (false, _) => format!("Union[{}]", alts.join(", ")),
        }
    }

    fn render_list(&self) -> String {
        if self.is_empty() {
            "List".to_string()
        } else {
            format!("List[{}]", self.render_union())
        }
    }
}

/// A field's type: alternatives (`Union`) or an array of alternatives
/// (`List`). The two variants share member-set behavior and nothing else;
/// rendering and the nested-list collapse rule differ, so this is a tagged
/// sum rather than a hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    Union(TypeSet),
    List(TypeSet),
}

impl TypeExpr {
    pub fn atom(name: impl Into<String>) -> Self {
        TypeExpr::Union(TypeSet::of_atom(name))
    }

    pub fn list(members: TypeSet) -> Self {
        TypeExpr::List(members)
    }

    pub fn list_of_atom(name: impl Into<String>) -> Self {
        TypeExpr::List(TypeSet::of_atom(name))
    }

    /// Combine two expressions observed for the same field.
    ///
    /// Two lists merge member-wise; a list meeting a union is absorbed as an
    /// alternative of the union, not into it.
    pub fn merge(self, other: TypeExpr) -> TypeExpr {
        match (self, other) {
            (TypeExpr::Union(mut a), TypeExpr::Union(b)) => {
                a.merge(b);
                TypeExpr::Union(a)
            }
            (TypeExpr::List(mut a), TypeExpr::List(b)) => {
                a.merge(b);
                TypeExpr::List(a)
            }
            (TypeExpr::Union(mut a), TypeExpr::List(b)) => {
                a.insert_list(b);
                TypeExpr::Union(a)
            }
            (TypeExpr::List(a), TypeExpr::Union(mut b)) => {
                b.insert_list(a);
                TypeExpr::Union(b)
            }
        }
    }

    pub fn contains_atom(&self, atom: &str) -> bool {
        self.members().contains_atom(atom)
    }

    pub fn substitute(&mut self, old: &str, new: &str) {
        self.members_mut().substitute(old, new);
    }

    /// Wrap this type as optional: a union gains an `Any` alternative, a
    /// list becomes `Union { Any, the list }`.
    pub fn widen_optional(&mut self) {
        match self {
            TypeExpr::Union(set) => set.insert_atom(ANY),
            TypeExpr::List(_) => {
                let list = std::mem::replace(self, TypeExpr::Union(TypeSet::new()));
                if let (TypeExpr::List(members), TypeExpr::Union(set)) = (list, &mut *self) {
                    set.insert_atom(ANY);
                    set.insert_list(members);
                }
            }
        }
    }

    /// The only place type annotation text is produced.
    pub fn render(&self) -> String {
        match self {
            TypeExpr::Union(set) => set.render_union(),
            TypeExpr::List(set) => set.render_list(),
        }
    }

    fn members(&self) -> &TypeSet {
        match self {
            TypeExpr::Union(set) | TypeExpr::List(set) => set,
        }
    }

    fn members_mut(&mut self) -> &mut TypeSet {
        match self {
            TypeExpr::Union(set) | TypeExpr::List(set) => set,
        }
    }
}
