use std::collections::HashMap;

/// Replace `{{key}}` placeholders with values from the context
pub fn render_template(template: &str, context: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

pub static MODEL_TEMPLATE: &str = r#"use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct {{name}} {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Create{{name}} {
    // Fields required to create a {{name}}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update{{name}} {
    // Optional fields for a partial update
}

impl {{name}} {
    pub const TABLE: &'static str = "{{table}}";
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholders() {
        let mut context = HashMap::new();
        context.insert("name", "User".to_string());
        context.insert("table", "users".to_string());

        let rendered = render_template(MODEL_TEMPLATE, &context);
        assert!(rendered.contains("pub struct User {"));
        assert!(rendered.contains("pub struct CreateUser {"));
        assert!(rendered.contains("\"users\""));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let rendered = render_template("{{missing}}", &HashMap::new());
        assert_eq!(rendered, "{{missing}}");
    }
}
