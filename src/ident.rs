//! Identifier derivation: JSON keys to Python class and field names.
//!
//! All naming decisions live here so the inference and rendering passes can
//! treat names as opaque strings. Everything is deterministic; the only
//! state is the caller-supplied list of names already taken.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ClassAttribute;

/// Python keywords, matched case-sensitively.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

fn is_keyword(word: &str) -> bool {
    PYTHON_KEYWORDS.contains(&word)
}

/// Map common accented Latin letters to their ASCII base letter. Anything
/// not covered passes through and gets dropped by the alphanumeric filter.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Derive a PascalCase class name from a raw JSON key.
///
/// Diacritics fold to ASCII, everything outside `[A-Za-z0-9 _]` is dropped,
/// segments split on space/underscore runs and each gets its first letter
/// uppercased. Keyword collisions grow a suffix; a leading digit gets a
/// `Class_` prefix.
pub fn class_name(raw: &str) -> String {
    class_name_reserved(raw, is_keyword)
}

pub fn class_name_reserved(raw: &str, reserved: impl Fn(&str) -> bool) -> String {
    let cleaned: String = raw
        .chars()
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    let mut name: String = cleaned
        .split([' ', '_'])
        .filter(|seg| !seg.is_empty())
        .map(capitalize)
        .collect();

    if reserved(&name) {
        // grow the name one letter of "Model" at a time until it clears
        let mut candidate = name.clone();
        for c in "Model".chars() {
            candidate.push(c);
            if !reserved(&candidate) {
                break;
            }
        }
        if reserved(&candidate) {
            let mut n = 1usize;
            loop {
                let numbered = format!("{candidate}{n}");
                if !reserved(&numbered) {
                    candidate = numbered;
                    break;
                }
                n += 1;
            }
        }
        name = candidate;
    }

    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name = format!("Class_{name}");
    }
    name
}

/// Append a numeric suffix until the candidate is unused. The bare candidate
/// wins when free; matching is case-sensitive and exact.
pub fn non_duplicate_name(candidate: &str, used: &[String]) -> String {
    let taken = |name: &str| used.iter().any(|u| u == name);
    if !taken(candidate) {
        return candidate.to_string();
    }
    let mut n = 1usize;
    loop {
        let numbered = format!("{candidate}{n}");
        if !taken(&numbered) {
            return numbered;
        }
        n += 1;
    }
}

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
];

// words whose plural equals (or is treated as) the singular
const INVARIANT_NOUNS: &[&str] = &[
    "data", "news", "series", "species", "sheep", "fish", "deer",
    "information", "equipment", "money", "media",
];

/// Dictionary-plus-suffix-rule singularization. Returns `None` when the word
/// is not recognizably plural.
fn singularize(word: &str) -> Option<String> {
    let lower = word.to_ascii_lowercase();
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(p, _)| *p == lower) {
        return Some((*singular).to_string());
    }
    if INVARIANT_NOUNS.contains(&lower.as_str()) {
        return None;
    }
    if lower.len() > 3 && lower.ends_with("ies") {
        return Some(format!("{}y", &word[..word.len() - 3]));
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return None;
    }
    for suffix in ["ches", "shes", "xes", "zes", "ses"] {
        if lower.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if lower.ends_with('s') {
        return Some(word[..word.len() - 1].to_string());
    }
    None
}

/// Name for the per-element class of an array held under `key`: the
/// singularized key, or the key with an `Item` suffix when singularization
/// does not apply.
pub fn element_class_name(key: &str) -> String {
    match singularize(key) {
        Some(singular) => singular,
        None => format!("{key}Item"),
    }
}

static UPPER_RUN_BEFORE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static LOWER_TO_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Sanitize a raw JSON key into a Python field name. Returns the name and,
/// when it no longer equals the raw key, the alias to preserve.
///
/// Order matters: keyword escape, then digit prefix, then the optional
/// camelCase fold, then symbol replacement. The fold splits acronym
/// boundaries before ordinary case boundaries so `getHTTPResponse` becomes
/// `get_http_response` rather than `get_httpresponse`.
pub fn field_name(raw: &str, alias_camel_case: bool) -> (String, Option<String>) {
    let mut name = raw.to_string();
    if is_keyword(&name) {
        name.push('_');
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name = format!("field_{name}");
    }
    if alias_camel_case {
        name = UPPER_RUN_BEFORE_WORD
            .replace_all(&name, "${1}_${2}")
            .into_owned();
        name = LOWER_TO_UPPER.replace_all(&name, "${1}_${2}").into_owned();
        name = name.to_lowercase();
    }
    name = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let alias = (name != raw).then(|| raw.to_string());
    (name, alias)
}

/// Sanitize every field of a class in place and resolve residual name
/// collisions.
///
/// Within a colliding group the field whose name survived sanitization
/// unaltered keeps it; altered claimants get `_1`, `_2`, ... in order of
/// appearance. When every claimant was altered, the first keeps the base
/// name.
pub fn sanitize_fields(attrs: &mut [ClassAttribute], alias_camel_case: bool) {
    for attr in attrs.iter_mut() {
        let (name, alias) = field_name(&attr.name, alias_camel_case);
        attr.name = name;
        if attr.alias.is_none() {
            attr.alias = alias;
        }
    }

    let mut taken: Vec<String> = attrs.iter().map(|a| a.name.clone()).collect();
    let names: Vec<String> = taken.clone();
    for base in &names {
        let group: Vec<usize> = attrs
            .iter()
            .enumerate()
            .filter(|(_, a)| &a.name == base)
            .map(|(i, _)| i)
            .collect();
        if group.len() < 2 {
            continue;
        }
        let keeper = group
            .iter()
            .position(|&i| attrs[i].alias.is_none())
            .unwrap_or(0);
        let mut n = 1usize;
        for (pos, &i) in group.iter().enumerate() {
            if pos == keeper {
                continue;
            }
            let renamed = loop {
                let candidate = format!("{base}_{n}");
                n += 1;
                if !taken.iter().any(|t| t == &candidate) {
                    break candidate;
                }
            };
            taken.push(renamed.clone());
            attrs[i].name = renamed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::TypeExpr;

    #[test]
    fn class_name_basic_shapes() {
        assert_eq!(class_name("user"), "User");
        assert_eq!(class_name("user profile"), "UserProfile");
        assert_eq!(class_name("user_profile"), "UserProfile");
        assert_eq!(class_name("user__  _profile"), "UserProfile");
        assert_eq!(class_name("user-INFO_01"), "UserINFO01");
    }

    #[test]
    fn class_name_folds_diacritics() {
        assert_eq!(class_name("usuário_fiél"), "UsuarioFiel");
        assert_eq!(class_name("ação"), "Acao");
    }

    #[test]
    fn class_name_drops_symbols() {
        assert_eq!(class_name("foo.bar"), "Foobar");
        assert_eq!(class_name("@#$%"), "");
    }

    #[test]
    fn class_name_keyword_escape() {
        assert_eq!(class_name("true"), "TrueM");
        assert_eq!(class_name("none"), "NoneM");
        assert_eq!(class_name("for"), "For");
    }

    #[test]
    fn class_name_keyword_escape_exhausts_to_numbers() {
        let reserved = ["True", "TrueM", "TrueMo", "TrueMod", "TrueMode", "TrueModel"];
        let name = class_name_reserved("true", |s| reserved.contains(&s));
        assert_eq!(name, "TrueModel1");
    }

    #[test]
    fn class_name_leading_digit() {
        assert_eq!(class_name("123model"), "Class_123model");
        assert_eq!(class_name("42_data"), "Class_42Data");
    }

    #[test]
    fn non_duplicate_name_fills_gaps() {
        let used = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(non_duplicate_name("Data", &used(&[])), "Data");
        assert_eq!(non_duplicate_name("Data", &used(&["Data"])), "Data1");
        assert_eq!(
            non_duplicate_name("Data", &used(&["Data", "Data1", "Data3"])),
            "Data2"
        );
        // case-sensitive
        assert_eq!(non_duplicate_name("Data", &used(&["data"])), "Data");
    }

    #[test]
    fn singularize_rules() {
        assert_eq!(element_class_name("items"), "item");
        assert_eq!(element_class_name("shortcuts"), "shortcut");
        assert_eq!(element_class_name("users"), "user");
        assert_eq!(element_class_name("categories"), "category");
        assert_eq!(element_class_name("boxes"), "box");
        assert_eq!(element_class_name("branches"), "branch");
        assert_eq!(element_class_name("children"), "child");
    }

    #[test]
    fn singularize_no_op_appends_item() {
        assert_eq!(element_class_name("user"), "userItem");
        assert_eq!(element_class_name("data"), "dataItem");
        assert_eq!(element_class_name("status"), "statusItem");
    }

    #[test]
    fn field_name_plain_passthrough() {
        assert_eq!(field_name("name", false), ("name".into(), None));
        assert_eq!(field_name("userName", false), ("userName".into(), None));
    }

    #[test]
    fn field_name_keyword_and_digit() {
        assert_eq!(field_name("for", false), ("for_".into(), Some("for".into())));
        assert_eq!(field_name("class", true), ("class_".into(), Some("class".into())));
        assert_eq!(
            field_name("123status", false),
            ("field_123status".into(), Some("123status".into()))
        );
    }

    #[test]
    fn field_name_symbol_replacement() {
        assert_eq!(
            field_name("price (USD)", false),
            ("price__USD_".into(), Some("price (USD)".into()))
        );
        assert_eq!(
            field_name("cpu%%usage!!!", false),
            ("cpu__usage___".into(), Some("cpu%%usage!!!".into()))
        );
    }

    #[test]
    fn field_name_camel_fold() {
        let fold = |raw: &str| field_name(raw, true).0;
        assert_eq!(fold("userName"), "user_name");
        assert_eq!(fold("HTMLParser"), "html_parser");
        assert_eq!(fold("getHTTPResponse"), "get_http_response");
        assert_eq!(fold("parseXMLAndJSON"), "parse_xml_and_json");
        assert_eq!(fold("VALUE"), "value");
        assert_eq!(fold("error404Code"), "error404_code");
        assert_eq!(fold("1stPlace"), "field_1st_place");
        assert_eq!(fold("price($USD)"), "price__usd_");
        assert_eq!(fold("order#ID"), "order_id");
        assert_eq!(fold("last-Modified@Date"), "last_modified_date");
    }

    fn attr(raw: &str) -> ClassAttribute {
        ClassAttribute {
            name: raw.to_string(),
            ty: TypeExpr::atom("str"),
            alias: None,
        }
    }

    #[test]
    fn collisions_prefer_the_unaltered_field() {
        let mut attrs = vec![attr("VALUE"), attr("value")];
        sanitize_fields(&mut attrs, true);
        assert_eq!(attrs[0].name, "value_1");
        assert_eq!(attrs[0].alias.as_deref(), Some("VALUE"));
        assert_eq!(attrs[1].name, "value");
        assert_eq!(attrs[1].alias, None);
    }

    #[test]
    fn collisions_number_altered_claimants_in_order() {
        let mut attrs = vec![attr("attr!"), attr("attr@"), attr("attr#"), attr("attr")];
        sanitize_fields(&mut attrs, false);
        assert_eq!(attrs[0].name, "attr_");
        assert_eq!(attrs[1].name, "attr__1");
        assert_eq!(attrs[2].name, "attr__2");
        assert_eq!(attrs[3].name, "attr");
        assert_eq!(attrs[3].alias, None);
    }

    #[test]
    fn collisions_with_separator_variants() {
        let mut attrs = vec![attr("first-name"), attr("first_name"), attr("first name")];
        sanitize_fields(&mut attrs, false);
        assert_eq!(attrs[0].name, "first_name_1");
        assert_eq!(attrs[0].alias.as_deref(), Some("first-name"));
        assert_eq!(attrs[1].name, "first_name");
        assert_eq!(attrs[1].alias, None);
        assert_eq!(attrs[2].name, "first_name_2");
        assert_eq!(attrs[2].alias.as_deref(), Some("first name"));
    }
}
