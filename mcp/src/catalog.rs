//! Server-side catalog of MCP features.
//!
//! Holds one [`FeatureSet`] per feature kind, keyed the way the protocol
//! identifies each kind:
//! - Tools and prompts by name
//! - Resources by URI
//! - Resource templates by URI template
//!
//! Mutations that change a kind's contents broadcast a
//! [`CatalogEvent::ListChanged`] so sessions can emit list-changed
//! notifications.

use std::fmt;

pub use rmcp::model::{Prompt, RawResource, RawResourceTemplate, Tool};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    config::{DuplicatePolicy, FeatureConfig},
    error::{FeatureError, FeatureResult},
    pagination::{Page, Paginator},
    registry::FeatureSet,
};

/// Kind of feature exposed by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Tool,
    Prompt,
    Resource,
    ResourceTemplate,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureKind::Tool => "tool",
            FeatureKind::Prompt => "prompt",
            FeatureKind::Resource => "resource",
            FeatureKind::ResourceTemplate => "resource template",
        };
        f.write_str(name)
    }
}

/// Change notification published by [`FeatureCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEvent {
    ListChanged(FeatureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub tools: usize,
    pub prompts: usize,
    pub resources: usize,
    pub resource_templates: usize,
}

#[derive(Debug)]
pub struct FeatureCatalog {
    tools: FeatureSet<Tool, String>,
    prompts: FeatureSet<Prompt, String>,
    resources: FeatureSet<RawResource, String>,
    resource_templates: FeatureSet<RawResourceTemplate, String>,
    paginator: Paginator,
    duplicate_policy: DuplicatePolicy,
    events: broadcast::Sender<CatalogEvent>,
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::build(&FeatureConfig::default())
    }
}

impl FeatureCatalog {
    pub fn new(config: &FeatureConfig) -> FeatureResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &FeatureConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            tools: FeatureSet::new(|tool: &Tool| tool.name.to_string()),
            prompts: FeatureSet::new(|prompt: &Prompt| prompt.name.clone()),
            resources: FeatureSet::new(|resource: &RawResource| resource.uri.clone()),
            resource_templates: FeatureSet::new(|template: &RawResourceTemplate| {
                template.uri_template.clone()
            }),
            paginator: Paginator::new(config.page_size),
            duplicate_policy: config.duplicate_policy,
            events,
        }
    }

    /// Subscribe to list-changed events.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            tools: self.tools.len(),
            prompts: self.prompts.len(),
            resources: self.resources.len(),
            resource_templates: self.resource_templates.len(),
        }
    }

    // --- Tools ---

    pub fn tools(&self) -> &FeatureSet<Tool, String> {
        &self.tools
    }

    pub fn add_tools(&self, tools: impl IntoIterator<Item = Tool>) -> FeatureResult<()> {
        self.register(FeatureKind::Tool, &self.tools, tools)
    }

    pub fn remove_tools<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        self.unregister(FeatureKind::Tool, &self.tools, names)
    }

    pub fn get_tool(&self, name: &str) -> FeatureResult<Tool> {
        self.tools
            .get(name)
            .ok_or_else(|| FeatureError::not_found(FeatureKind::Tool, name))
    }

    pub fn list_tools(&self, cursor: Option<&str>) -> FeatureResult<Page<Tool>> {
        self.paginator.paginate(&self.tools, cursor)
    }

    // --- Prompts ---

    pub fn prompts(&self) -> &FeatureSet<Prompt, String> {
        &self.prompts
    }

    pub fn add_prompts(&self, prompts: impl IntoIterator<Item = Prompt>) -> FeatureResult<()> {
        self.register(FeatureKind::Prompt, &self.prompts, prompts)
    }

    pub fn remove_prompts<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        self.unregister(FeatureKind::Prompt, &self.prompts, names)
    }

    pub fn get_prompt(&self, name: &str) -> FeatureResult<Prompt> {
        self.prompts
            .get(name)
            .ok_or_else(|| FeatureError::not_found(FeatureKind::Prompt, name))
    }

    pub fn list_prompts(&self, cursor: Option<&str>) -> FeatureResult<Page<Prompt>> {
        self.paginator.paginate(&self.prompts, cursor)
    }

    // --- Resources ---

    pub fn resources(&self) -> &FeatureSet<RawResource, String> {
        &self.resources
    }

    pub fn add_resources(
        &self,
        resources: impl IntoIterator<Item = RawResource>,
    ) -> FeatureResult<()> {
        self.register(FeatureKind::Resource, &self.resources, resources)
    }

    pub fn remove_resources<'a>(&self, uris: impl IntoIterator<Item = &'a str>) -> bool {
        self.unregister(FeatureKind::Resource, &self.resources, uris)
    }

    pub fn get_resource(&self, uri: &str) -> FeatureResult<RawResource> {
        self.resources
            .get(uri)
            .ok_or_else(|| FeatureError::not_found(FeatureKind::Resource, uri))
    }

    pub fn list_resources(&self, cursor: Option<&str>) -> FeatureResult<Page<RawResource>> {
        self.paginator.paginate(&self.resources, cursor)
    }

    // --- Resource templates ---

    pub fn resource_templates(&self) -> &FeatureSet<RawResourceTemplate, String> {
        &self.resource_templates
    }

    pub fn add_resource_templates(
        &self,
        templates: impl IntoIterator<Item = RawResourceTemplate>,
    ) -> FeatureResult<()> {
        self.register(
            FeatureKind::ResourceTemplate,
            &self.resource_templates,
            templates,
        )
    }

    pub fn remove_resource_templates<'a>(
        &self,
        uri_templates: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        self.unregister(
            FeatureKind::ResourceTemplate,
            &self.resource_templates,
            uri_templates,
        )
    }

    pub fn get_resource_template(&self, uri_template: &str) -> FeatureResult<RawResourceTemplate> {
        self.resource_templates
            .get(uri_template)
            .ok_or_else(|| FeatureError::not_found(FeatureKind::ResourceTemplate, uri_template))
    }

    pub fn list_resource_templates(
        &self,
        cursor: Option<&str>,
    ) -> FeatureResult<Page<RawResourceTemplate>> {
        self.paginator.paginate(&self.resource_templates, cursor)
    }

    // --- Internals ---

    fn register<T>(
        &self,
        kind: FeatureKind,
        set: &FeatureSet<T, String>,
        entries: impl IntoIterator<Item = T>,
    ) -> FeatureResult<()> {
        let entries: Vec<T> = entries.into_iter().collect();
        if entries.is_empty() {
            return Ok(());
        }

        match self.duplicate_policy {
            DuplicatePolicy::Replace => set.add(entries),
            DuplicatePolicy::Reject => set.try_add(entries).map_err(|key| {
                warn!("Rejected duplicate {} registration: '{}'", kind, key);
                FeatureError::Duplicate { kind, key }
            })?,
        }

        self.notify(kind);
        Ok(())
    }

    fn unregister<'a, T>(
        &self,
        kind: FeatureKind,
        set: &FeatureSet<T, String>,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        let changed = set.remove(keys);
        if changed {
            self.notify(kind);
        }
        changed
    }

    fn notify(&self, kind: FeatureKind) {
        // Err only means nobody is subscribed.
        if self.events.send(CatalogEvent::ListChanged(kind)).is_err() {
            debug!("No subscribers for {} list change", kind);
        }
    }
}
