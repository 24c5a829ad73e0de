// dwh-core/src/infrastructure/compiler/jinja.rs

// Turns the warehouse statement templates into SQL the engine can run.
// Values that land inside string literals (S3 paths, role ARN) go through the
// `literal` filter; identifiers are validated when the configuration loads.

use minijinja::{Environment, UndefinedBehavior};

use crate::application::ports::TemplateEngine;
use crate::error::DwhError;
use crate::infrastructure::error::InfrastructureError;

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // A typo in a template variable must not silently render as ''.
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_filter("literal", |value: &str| value.replace('\'', "''"));

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, DwhError> {
        self.env
            .render_str(template, context)
            .map_err(|e| DwhError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
