//! Generation settings.

use crate::error::Error;

/// Which classes get every field forced to optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForceOptional {
    /// Optionality comes from the data alone.
    #[default]
    None,
    /// Only the root class gets forced-optional fields.
    OnlyRootClass,
    /// Every generated class gets forced-optional fields.
    AllClasses,
}

/// Knobs for a generation run. `Default` matches pydantic conventions:
/// four-space indentation, no aliasing magic, no class reuse.
#[derive(Clone, Debug)]
pub struct GenerateConfig {
    /// Spaces per indentation level. Ignored when `use_tabs` is set.
    pub indentation: usize,
    /// Indent with a single tab per level instead of spaces.
    pub use_tabs: bool,
    /// Replace structurally identical classes with a reference to the first
    /// equivalent one instead of emitting a numbered duplicate.
    pub prefer_class_reuse: bool,
    /// Fold camelCase keys to snake_case field names (with a pydantic alias
    /// preserving the original key).
    pub alias_camel_case: bool,
    pub force_optional: ForceOptional,
    /// Maximum object/array nesting accepted before giving up.
    pub max_depth: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            indentation: 4,
            use_tabs: false,
            prefer_class_reuse: false,
            alias_camel_case: false,
            force_optional: ForceOptional::None,
            max_depth: 128,
        }
    }
}

impl GenerateConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.indentation == 0 {
            return Err(Error::InvalidConfiguration(
                "Indentation must be greater than 0".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfiguration(
                "Maximum depth must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The indentation string for one level.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indentation)
        }
    }
}
