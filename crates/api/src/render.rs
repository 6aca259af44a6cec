//! Page rendering boundary.
//!
//! Handlers build a [`TemplateData`] bag and ask a [`Renderer`] to turn a
//! logical template name into HTML. [`PageRenderer`] is the built-in
//! implementation: a bare document carrying the page payload as an embedded
//! JSON block, which a front end (or a test) reads back.

use std::collections::{BTreeMap, HashSet};

use bookings_core::forms::FormErrors;
use serde::Serialize;
use serde_json::{Map, Value};

/// Every template the handlers ask for.
pub const TEMPLATES: &[&str] = &[
    "home.page.tmpl",
    "about.page.tmpl",
    "contact.page.tmpl",
    "room.page.tmpl",
    "not-found.page.tmpl",
    "search-availability.page.tmpl",
    "choose-room.page.tmpl",
    "make-reservation.page.tmpl",
    "reservation-summary.page.tmpl",
    "login.page.tmpl",
    "admin-dashboard.page.tmpl",
    "admin-new-reservations.page.tmpl",
    "admin-all-reservations.page.tmpl",
    "admin-reservations-calendar.page.tmpl",
    "admin-reservations-show.page.tmpl",
    "admin-users.page.tmpl",
    "admin-users-new.page.tmpl",
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template data error: {0}")]
    Data(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// TemplateData
// ---------------------------------------------------------------------------

/// Submitted values and per-field errors for a form being (re)displayed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormState {
    pub values: Map<String, Value>,
    pub errors: FormErrors,
}

/// Everything a template can see.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub string_map: BTreeMap<String, String>,
    pub data: Map<String, Value>,
    pub form: FormState,
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub is_authenticated: bool,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_string(), value.into());
        self
    }

    pub fn with_data(mut self, key: &str, value: &impl Serialize) -> Result<Self, RenderError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Attach submitted form values (any struct serializing to an object).
    pub fn with_form_values(mut self, values: &impl Serialize) -> Result<Self, RenderError> {
        if let Value::Object(map) = serde_json::to_value(values)? {
            self.form.values = map;
        }
        Ok(self)
    }

    pub fn with_form_errors(mut self, errors: FormErrors) -> Self {
        self.form.errors = errors;
        self
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, RenderError>;
}

/// Emits a minimal HTML document per page.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    templates: HashSet<String>,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(TEMPLATES.iter().copied())
    }
}

impl PageRenderer {
    pub fn new<'a>(templates: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            templates: templates.into_iter().map(str::to_string).collect(),
        }
    }
}

impl Renderer for PageRenderer {
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, RenderError> {
        if !self.templates.contains(template) {
            return Err(RenderError::TemplateNotFound(template.to_string()));
        }
        let title = data
            .string_map
            .get("title")
            .map(String::as_str)
            .unwrap_or("Bookings");
        let payload = script_safe_json(&serde_json::to_string(data)?);

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body data-template=\"{template}\">\n\
             <script type=\"application/json\" id=\"page-data\">{payload}</script>\n\
             </body>\n</html>\n",
            title = escape_html(title),
            template = escape_html(template),
        ))
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make serialized JSON safe to place inside a `<script>` element. The
/// replacements only ever occur inside JSON strings, where `\uXXXX` escapes
/// decode back to the same characters.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_payload(html: &str) -> Value {
        let start = html.find("id=\"page-data\">").unwrap() + "id=\"page-data\">".len();
        let end = html[start..].find("</script>").unwrap() + start;
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn unknown_template_fails() {
        let err = PageRenderer::default()
            .render("missing.page.tmpl", &TemplateData::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }

    #[test]
    fn script_breakout_is_neutralized() {
        let data = TemplateData::new()
            .with_data("name", &"</script><b>x</b>")
            .unwrap();
        let html = PageRenderer::default()
            .render("home.page.tmpl", &data)
            .unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
        assert_eq!(extract_payload(&html)["data"]["name"], "</script><b>x</b>");
    }

    #[test]
    fn title_is_escaped() {
        let data = TemplateData::new().with_string("title", "Tom & Jerry's <Room>");
        let html = PageRenderer::default()
            .render("room.page.tmpl", &data)
            .unwrap();
        assert!(html.contains("<title>Tom &amp; Jerry&#39;s &lt;Room&gt;</title>"));
    }
}
