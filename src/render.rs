//! Emit Python source from class models.
//!
//! Output is bit-exact by contract: field lines, import lines and blank-line
//! placement all follow fixed rules so the same input always produces the
//! same text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::GenerateConfig;
use crate::model::ClassModel;

/// Stable topological order, dependencies first.
///
/// Repeatedly emit the first class whose referenced classes are all already
/// emitted (or not part of this set). The inference walk already produces a
/// nearly sorted list, so this mostly preserves input order. A reference
/// cycle cannot occur in tree-shaped JSON, but if the invariant is ever
/// broken the first remaining class is taken to guarantee termination.
pub fn order_classes(mut classes: Vec<ClassModel>) -> Vec<ClassModel> {
    let mut ordered = Vec::with_capacity(classes.len());
    while !classes.is_empty() {
        let next = classes
            .iter()
            .position(|c| {
                classes
                    .iter()
                    .filter(|other| other.class_name != c.class_name)
                    .all(|other| !c.references(&other.class_name))
            })
            .unwrap_or(0);
        ordered.push(classes.remove(next));
    }
    ordered
}

/// Render one class body. No trailing newline; the document assembler owns
/// separation.
pub fn render_class(cm: &ClassModel, cfg: &GenerateConfig) -> String {
    let indent = cfg.indent_unit();
    let mut out = format!("class {}(BaseModel):", cm.class_name);
    if cm.attributes.is_empty() {
        out.push_str(&format!("\n{indent}pass"));
        return out;
    }
    for attr in &cm.attributes {
        let annotation = attr.ty.render();
        let optional = annotation.starts_with("Optional[");
        let line = match (&attr.alias, optional) {
            (Some(alias), true) => {
                let alias = escape_alias(alias);
                format!("{}: {} = Field(None, alias='{}')", attr.name, annotation, alias)
            }
            (Some(alias), false) => {
                let alias = escape_alias(alias);
                format!("{}: {} = Field(..., alias='{}')", attr.name, annotation, alias)
            }
            (None, true) => format!("{}: {} = None", attr.name, annotation),
            (None, false) => format!("{}: {}", attr.name, annotation),
        };
        out.push_str(&format!("\n{indent}{line}"));
    }
    out
}

// Aliases land inside single-quoted Python string literals, so quotes and
// backslashes in raw keys must be escaped to keep the output parseable.
fn escape_alias(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

const TYPING_NAMES: [&str; 5] = ["Any", "Dict", "List", "Optional", "Union"];

// A typing name counts as used only in type position: preceded by start of
// line, whitespace or '[', and followed by end of line, whitespace, ',', '['
// or ']'. This keeps class names like `AnyData` and fields like `field_Any`
// from dragging in imports.
static TYPING_USES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TYPING_NAMES
        .iter()
        .map(|name| {
            let re = Regex::new(&format!(r"(?m)(?:^|[\s\[]){name}(?:$|[\s,\[\]])")).unwrap();
            (*name, re)
        })
        .collect()
});

/// Import lines for a rendered body: the `typing` line (omitted when no
/// typing name is used) followed by the `pydantic` line.
pub fn render_imports(body: &str) -> String {
    let typing: Vec<&str> = TYPING_USES
        .iter()
        .filter(|(_, re)| re.is_match(body))
        .map(|(name, _)| *name)
        .collect();

    let mut pydantic = vec!["BaseModel"];
    if body.contains("= Field(") {
        pydantic.push("Field");
    }
    let pydantic_line = format!("from pydantic import {}", pydantic.join(", "));

    if typing.is_empty() {
        pydantic_line
    } else {
        format!("from typing import {}\n\n{}", typing.join(", "), pydantic_line)
    }
}

/// Assemble the final document: future import, import block, two blank
/// lines, classes separated by two blank lines. No trailing newline.
pub fn render_document(classes: &[ClassModel], cfg: &GenerateConfig) -> String {
    let body = classes
        .iter()
        .map(|c| render_class(c, cfg))
        .collect::<Vec<_>>()
        .join("\n\n\n");
    let imports = render_imports(&body);
    format!("from __future__ import annotations\n\n{imports}\n\n\n{body}")
}
