//! Template engine for dynamic mocked results.
//!
//! Uses Handlebars to render string fields of a result against the live
//! operation: `{{operationName}}`, `{{variables.<key>}}`, and
//! `{{wildcards.<key>}}` for values the wildcard stage removed.

use crate::operation::Operation;
use crate::variables::Variables;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;

/// Template engine for rendering dynamic results.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

/// Context for template rendering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext<'a> {
    pub operation_name: &'a str,
    /// Variables the operation was matched with
    pub variables: &'a Variables,
    /// Variables stripped as wildcards before matching
    pub wildcards: &'a Variables,
}

impl<'a> TemplateContext<'a> {
    pub fn for_operation(operation: &'a Operation) -> Self {
        Self {
            operation_name: operation.display_name(),
            variables: &operation.variables,
            wildcards: &operation.stripped,
        }
    }
}

handlebars_helper!(upper_helper: |s: str| s.to_uppercase());
handlebars_helper!(lower_helper: |s: str| s.to_lowercase());
handlebars_helper!(json_helper: |v: Json| serde_json::to_string(v).unwrap_or_default());

impl TemplateEngine {
    /// Create a new template engine.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.register_helper("json", Box::new(json_helper));
        handlebars.register_helper("uuid", Box::new(uuid_helper));
        handlebars.register_helper("now", Box::new(now_helper));
        handlebars.register_helper("random", Box::new(random_helper));
        handlebars.register_helper("default", Box::new(default_helper));
        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars.register_helper("lower", Box::new(lower_helper));

        // Results are JSON, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render a template string for an operation.
    pub fn render(
        &self,
        template: &str,
        operation: &Operation,
    ) -> Result<String, handlebars::RenderError> {
        self.handlebars
            .render_template(template, &TemplateContext::for_operation(operation))
    }

    /// Render every string containing template syntax inside a JSON value.
    pub fn render_json(
        &self,
        value: &serde_json::Value,
        operation: &Operation,
    ) -> Result<serde_json::Value, handlebars::RenderError> {
        self.render_json_value(value, &TemplateContext::for_operation(operation))
    }

    fn render_json_value(
        &self,
        value: &serde_json::Value,
        ctx: &TemplateContext<'_>,
    ) -> Result<serde_json::Value, handlebars::RenderError> {
        match value {
            serde_json::Value::String(s) if s.contains("{{") => {
                let rendered = self.handlebars.render_template(s, ctx)?;
                Ok(serde_json::Value::String(rendered))
            }
            serde_json::Value::Array(arr) => arr
                .iter()
                .map(|v| self.render_json_value(v, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            serde_json::Value::Object(obj) => {
                let mut rendered = serde_json::Map::new();
                for (k, v) in obj {
                    rendered.insert(k.clone(), self.render_json_value(v, ctx)?);
                }
                Ok(serde_json::Value::Object(rendered))
            }
            _ => Ok(value.clone()),
        }
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Custom Handlebars helpers

fn uuid_helper(
    _: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let uuid = format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        rng.gen::<u32>(),
        rng.gen::<u16>(),
        rng.gen::<u16>() & 0x0fff,
        (rng.gen::<u16>() & 0x3fff) | 0x8000,
        rng.gen::<u64>() & 0xffffffffffff,
    );
    out.write(&uuid)?;
    Ok(())
}

fn now_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let format = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%dT%H:%M:%S%.3fZ");

    out.write(&chrono::Utc::now().format(format).to_string())?;
    Ok(())
}

fn random_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    use rand::Rng;

    let min = h.param(0).and_then(|v| v.value().as_i64()).unwrap_or(0);
    let max = h.param(1).and_then(|v| v.value().as_i64()).unwrap_or(100);

    let value = rand::thread_rng().gen_range(min..=max.max(min));
    out.write(&value.to_string())?;
    Ok(())
}

/// `{{default value "fallback"}}`: the value unless it is null, missing, or "".
fn default_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let fallback = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    match h.param(0).map(|v| v.value()) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => out.write(s)?,
        Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {
            out.write(fallback)?
        }
        Some(other) => out.write(&other.to_string())?,
    }
    Ok(())
}
