//! Minimal CLI: JSON samples in → pydantic models out
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use crate::config::{ForceOptional, GenerateConfig};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer pydantic BaseModel classes from JSON sample documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(flatten)]
    input_settings: InputSettings,

    /// class name for the top-level record of each document
    #[arg(long, default_value = "Model")]
    root_name: String,

    /// spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indentation: usize,

    /// indent with tabs instead of spaces
    #[arg(long, default_value_t = false)]
    use_tabs: bool,

    /// reuse structurally identical classes instead of numbering duplicates
    #[arg(long, default_value_t = false)]
    reuse_classes: bool,

    /// fold camelCase keys to snake_case and keep the original as an alias
    #[arg(long, default_value_t = false)]
    alias_camel_case: bool,

    /// force fields to be optional
    #[arg(long, value_enum, default_value = "none")]
    force_optional: ForceOptionalMode,

    /// maximum accepted object/array nesting
    #[arg(long, default_value_t = 128)]
    max_depth: usize,

    /// output .py file (stdout if omitted); treated as a directory when
    /// multiple inputs resolve
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /data/items)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ForceOptionalMode {
    /// optionality comes from the data alone
    None,
    /// only the root class
    Root,
    /// every generated class
    All,
}

impl From<ForceOptionalMode> for ForceOptional {
    fn from(mode: ForceOptionalMode) -> Self {
        match mode {
            ForceOptionalMode::None => ForceOptional::None,
            ForceOptionalMode::Root => ForceOptional::OnlyRootClass,
            ForceOptionalMode::All => ForceOptional::AllClasses,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        // debug path
        if self.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }

        let cfg = GenerateConfig {
            indentation: self.indentation,
            use_tabs: self.use_tabs,
            prefer_class_reuse: self.reuse_classes,
            alias_camel_case: self.alias_camel_case,
            force_optional: self.force_optional.into(),
            max_depth: self.max_depth,
        };
        cfg.validate()?;

        let source_paths = resolve_file_path_patterns(&self.input_settings.input)?;

        // inputs are independent; process them in parallel, report in order
        let outputs: Vec<(PathBuf, anyhow::Result<String>)> = source_paths
            .par_iter()
            .map(|path| (path.clone(), self.process_file(path, &cfg)))
            .collect();

        let multiple = outputs.len() > 1;
        let mut failures = 0usize;
        let mut used_stems: Vec<String> = Vec::new();
        for (path, result) in outputs {
            match result {
                Ok(code) => self.write_output(&path, &code, multiple, &mut used_stems)?,
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {error:#}", "error:".red().bold(), path.display());
                }
            }
        }
        if failures > 0 {
            anyhow::bail!("{failures} input(s) failed");
        }
        Ok(())
    }

    fn process_file(&self, path: &Path, cfg: &GenerateConfig) -> anyhow::Result<String> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        let value = crate::decode::value_from_str(&source)?;
        let value = match self.input_settings.json_pointer.as_deref() {
            Some(pointer) => value
                .pointer(pointer)
                .with_context(|| format!("JSON pointer {pointer} matched nothing"))?,
            None => &value,
        };
        log::info!("generating models for {}", path.display());
        Ok(crate::generate_pydantic_code(value, &self.root_name, cfg)?)
    }

    fn write_output(
        &self,
        source: &Path,
        code: &str,
        multiple: bool,
        used_stems: &mut Vec<String>,
    ) -> anyhow::Result<()> {
        match self.out.as_ref() {
            Some(out) if multiple => {
                std::fs::create_dir_all(out)?;
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "model".to_string());
                // inputs from different directories may share a stem
                let stem = crate::ident::non_duplicate_name(&stem, used_stems);
                used_stems.push(stem.clone());
                let target = out.join(&stem).with_extension("py");
                std::fs::write(&target, format!("{code}\n"))?;
            }
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(out, format!("{code}\n"))?;
            }
            None => {
                if multiple {
                    println!("# {}", source.display());
                }
                println!("{code}");
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
