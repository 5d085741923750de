//! Infer pydantic models from JSON samples.
//!
//! Feed in a JSON document and get back Python source defining one
//! `BaseModel` class per distinct record shape, dependencies first:
//!
//! ```
//! use serde_json::json;
//! use pydgen::{generate_pydantic_code, GenerateConfig};
//!
//! let value = json!({"user": {"name": "ada"}, "count": 2});
//! let code = generate_pydantic_code(&value, "Model", &GenerateConfig::default()).unwrap();
//! assert!(code.contains("class User(BaseModel):"));
//! assert!(code.contains("class Model(BaseModel):"));
//! ```

pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod ident;
pub mod infer;
pub mod model;
pub mod reconcile;
pub mod render;
pub mod ty;

pub use config::{ForceOptional, GenerateConfig};
pub use error::Error;
use serde_json::Value;

/// Generate pydantic source for a decoded JSON value.
///
/// The top-level value must be an object or a non-empty array of non-empty
/// objects. `root` names the class for the top-level record; nested class
/// names are derived from the keys that hold them.
pub fn generate_pydantic_code(
    value: &Value,
    root: &str,
    cfg: &GenerateConfig,
) -> Result<String, Error> {
    cfg.validate()?;
    let mut classes = infer::generate(value, root, cfg)?;

    match cfg.force_optional {
        ForceOptional::None => {}
        ForceOptional::OnlyRootClass => {
            if let Some(root_class) = classes.iter_mut().find(|c| c.class_name == root) {
                for attr in &mut root_class.attributes {
                    attr.ty.widen_optional();
                }
            }
        }
        ForceOptional::AllClasses => {
            for class in &mut classes {
                for attr in &mut class.attributes {
                    attr.ty.widen_optional();
                }
            }
        }
    }

    for class in &mut classes {
        ident::sanitize_fields(&mut class.attributes, cfg.alias_camel_case);
    }
    let classes = render::order_classes(classes);
    log::debug!("generated {} class(es) for root {root}", classes.len());
    Ok(render::render_document(&classes, cfg))
}

/// Convenience wrapper: decode JSON text, then generate.
pub fn generate_pydantic_code_from_str(
    src: &str,
    root: &str,
    cfg: &GenerateConfig,
) -> Result<String, Error> {
    let value = decode::value_from_str(src)?;
    generate_pydantic_code(&value, root, cfg)
}
