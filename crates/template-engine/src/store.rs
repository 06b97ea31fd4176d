//! In-memory template store
//!
//! Keeps templates in insertion order. Persistence is the caller's concern:
//! every mutating operation returns the affected template so it can be
//! written through to a backing store.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{Clock, DocError, DocResult};
use tracing::{debug, info};
use uuid::Uuid;

use crate::registry;
use crate::template::{NewTemplate, Template, TemplateType, TemplateUpdate};
use crate::variables::{render_template, RenderedTemplate};

/// List filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFilter {
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default, rename = "type")]
    pub template_type: Option<TemplateType>,
}

/// What [`TemplateStore::retire`] did with a template
#[derive(Debug, Clone, PartialEq)]
pub enum Retired {
    /// Used at least once, so kept but switched off
    Deactivated(Template),
    Deleted(Template),
}

#[derive(Clone)]
pub struct TemplateStore {
    templates: Vec<Template>,
    clock: Arc<dyn Clock>,
}

impl TemplateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            templates: Vec::new(),
            clock,
        }
    }

    /// Store preloaded with existing templates (e.g. read back from a database)
    pub fn with_templates(clock: Arc<dyn Clock>, templates: Vec<Template>) -> Self {
        Self { templates, clock }
    }

    /// Store seeded with the built-in lease, notice, receipt and report templates
    pub fn seeded(clock: Arc<dyn Clock>) -> DocResult<Self> {
        let mut store = Self::new(clock);
        for input in registry::builtin_templates() {
            store.create(input)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> DocResult<&Template> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| DocError::not_found("Template", id))
    }

    fn get_mut(&mut self, id: &str) -> DocResult<&mut Template> {
        self.templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DocError::not_found("Template", id))
    }

    pub fn create(&mut self, input: NewTemplate) -> DocResult<Template> {
        require_text("name", &input.name)?;
        require_text("description", &input.description)?;
        require_text("body", &input.body)?;

        let template = Template::new(Uuid::new_v4().to_string(), input, self.clock.now());
        info!(
            "Created template {} ({}) with {} variables",
            template.id,
            template.name,
            template.variables().len()
        );
        self.templates.push(template.clone());
        Ok(template)
    }

    pub fn update(&mut self, id: &str, update: TemplateUpdate) -> DocResult<Template> {
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        if let Some(description) = &update.description {
            require_text("description", description)?;
        }
        if let Some(body) = &update.body {
            require_text("body", body)?;
        }

        let now = self.clock.now();
        let template = self.get_mut(id)?;

        if let Some(name) = update.name {
            template.name = name;
        }
        if let Some(template_type) = update.template_type {
            template.template_type = template_type;
        }
        if let Some(description) = update.description {
            template.description = description;
        }
        if let Some(body) = update.body {
            if body != template.body() {
                template.set_body(body);
            }
        }
        if let Some(is_active) = update.is_active {
            template.is_active = is_active;
        }
        template.last_modified = now;

        debug!("Updated template {}", id);
        Ok(template.clone())
    }

    /// Copy a template under a new id with " (Copy)" appended and no usage
    pub fn duplicate(&mut self, id: &str) -> DocResult<Template> {
        let original = self.get(id)?;
        let input = NewTemplate {
            name: format!("{} (Copy)", original.name),
            template_type: original.template_type.clone(),
            description: original.description.clone(),
            body: original.body().to_string(),
            is_active: original.is_active,
        };

        let copy = Template::new(Uuid::new_v4().to_string(), input, self.clock.now());
        info!("Duplicated template {} as {}", id, copy.id);
        self.templates.push(copy.clone());
        Ok(copy)
    }

    /// Remove a template; documents generated from it are unaffected
    pub fn delete(&mut self, id: &str) -> DocResult<Template> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DocError::not_found("Template", id))?;
        let removed = self.templates.remove(pos);
        info!("Deleted template {} ({})", removed.id, removed.name);
        Ok(removed)
    }

    pub fn toggle_active(&mut self, id: &str) -> DocResult<Template> {
        let now = self.clock.now();
        let template = self.get_mut(id)?;
        template.is_active = !template.is_active;
        template.last_modified = now;
        debug!("Template {} active={}", id, template.is_active);
        Ok(template.clone())
    }

    /// Count one more document produced from this template
    pub fn record_usage(&mut self, id: &str) -> DocResult<Template> {
        let template = self.get_mut(id)?;
        template.increment_usage();
        debug!("Template {} usage={}", id, template.usage_count());
        Ok(template.clone())
    }

    /// Deactivate a template that has been used, delete one that has not
    pub fn retire(&mut self, id: &str) -> DocResult<Retired> {
        if self.get(id)?.usage_count() > 0 {
            let now = self.clock.now();
            let template = self.get_mut(id)?;
            template.is_active = false;
            template.last_modified = now;
            info!("Retired template {} by deactivating it", id);
            Ok(Retired::Deactivated(template.clone()))
        } else {
            self.delete(id).map(Retired::Deleted)
        }
    }

    /// Substitute values into an active template and count the use
    pub fn render(
        &mut self,
        id: &str,
        values: &BTreeMap<String, String>,
    ) -> DocResult<(Template, RenderedTemplate)> {
        let template = self.get(id)?;
        if !template.is_active {
            return Err(DocError::validation(
                "template",
                format!("template '{}' is inactive", template.name),
            ));
        }
        let rendered = render_template(template.body(), values);
        let template = self.record_usage(id)?;
        Ok((template, rendered))
    }

    pub fn list(&self, filter: &TemplateFilter) -> Vec<&Template> {
        let needle = filter
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.templates
            .iter()
            .filter(|t| needle.as_deref().map_or(true, |n| t.matches_search(n)))
            .filter(|t| {
                filter
                    .template_type
                    .as_ref()
                    .map_or(true, |ty| &t.template_type == ty)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}

fn require_text(field: &str, value: &str) -> DocResult<()> {
    if value.trim().is_empty() {
        Err(DocError::validation(field, format!("{} is required", field)))
    } else {
        Ok(())
    }
}
