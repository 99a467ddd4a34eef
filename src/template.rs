//! Output canvas presets, keyed by template id.

use crate::error::{PostweaveError, PostweaveResult};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Template {
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Immutable registry of output formats, injected at startup.
#[derive(Clone, Debug)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// The built-in social formats.
    pub fn builtin() -> Self {
        let t = |id: &str, name: &str, width: u32, height: u32| Template {
            id: id.to_string(),
            name: name.to_string(),
            width,
            height,
        };
        Self {
            templates: vec![
                t("instagram-post", "Instagram Post", 1080, 1080),
                t("instagram-story", "Instagram Story", 1080, 1920),
                t("facebook-post", "Facebook Post", 1200, 630),
                t("linkedin-post", "LinkedIn Post", 1200, 627),
            ],
        }
    }

    pub fn get(&self, id: &str) -> PostweaveResult<&Template> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| PostweaveError::UnknownTemplate(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}
