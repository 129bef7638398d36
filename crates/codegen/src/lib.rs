//! # rungs-codegen
//!
//! The scaffolding capability behind `rungs generate`: renders a sqlx/serde
//! model skeleton per model name into the requested output directory.

pub mod templates;
pub mod writer;

pub use writer::CodeWriter;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rungs_core::{MigrateResult, ModelGenerator};

use crate::templates::{render_template, MODEL_TEMPLATE};

pub struct CodeGenerator {
    writer: CodeWriter,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            writer: CodeWriter::new(),
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelGenerator for CodeGenerator {
    fn generate_model(&self, model: &str, output_path: &Path) -> MigrateResult<PathBuf> {
        let module = module_name(model);
        let mut context = HashMap::new();
        context.insert("name", type_name(model));
        context.insert("table", table_name(&module));

        let content = render_template(MODEL_TEMPLATE, &context);
        let path = output_path.join(format!("{}.rs", module));
        self.writer.write_if_changed(&path, &content)?;
        Ok(path)
    }
}

/// `user_profile` / `user-profile` / `UserProfile` all map to `user_profile`
fn module_name(model: &str) -> String {
    let mut result = String::new();
    for (i, c) in model.trim().chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '-' || c == ' ' {
            if !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn type_name(model: &str) -> String {
    module_name(model)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn table_name(module: &str) -> String {
    format!("{}s", module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn name_conversions() {
        assert_eq!(module_name("UserProfile"), "user_profile");
        assert_eq!(module_name("user-profile"), "user_profile");
        assert_eq!(type_name("user_profile"), "UserProfile");
        assert_eq!(type_name("user"), "User");
        assert_eq!(table_name("user"), "users");
    }

    #[test]
    fn generates_a_model_file() {
        let dir = TempDir::new().unwrap();
        let path = CodeGenerator::new()
            .generate_model("user_profile", dir.path())
            .unwrap();

        assert!(path.ends_with("user_profile.rs"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("pub struct UserProfile {"));
        assert!(content.contains("\"user_profiles\""));
        assert!(content.contains("derive(Debug, Clone, Serialize, Deserialize, FromRow)"));
    }

    #[test]
    fn regeneration_is_stable() {
        let dir = TempDir::new().unwrap();
        let generator = CodeGenerator::new();
        let first = generator.generate_model("post", dir.path()).unwrap();
        let before = fs::read_to_string(&first).unwrap();
        let second = generator.generate_model("post", dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(before, fs::read_to_string(&second).unwrap());
    }
}
