//! Resource module
//!
//! Project scope, resource paths and paginated listings shared by every
//! API surface.

mod fetcher;
pub mod validate;

pub use fetcher::{for_each_item, Page};
pub use validate::{require, required, OpError, OpResult};

use std::fmt;

/// Project scope for every project-bound operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    project_id: String,
}

impl ProjectContext {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `projects/{project_id}`
    pub fn parent_path(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    /// Reference to a named resource inside this project
    pub fn resource(&self, kind: ResourceKind, name: &str) -> ResourceRef {
        ResourceRef {
            kind,
            name: name.to_string(),
            path: kind.path(&self.project_id, name),
        }
    }

    pub fn topic(&self, name: &str) -> ResourceRef {
        self.resource(ResourceKind::Topic, name)
    }

    pub fn subscription(&self, name: &str) -> ResourceRef {
        self.resource(ResourceKind::Subscription, name)
    }
}

/// Kinds of control-plane resources addressed by path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Topic,
    Subscription,
    Project,
}

impl ResourceKind {
    fn path(self, project_id: &str, name: &str) -> String {
        match self {
            Self::Topic => format!("projects/{}/topics/{}", project_id, name),
            Self::Subscription => format!("projects/{}/subscriptions/{}", project_id, name),
            Self::Project => format!("projects/{}", name),
        }
    }

    /// Capitalized label used in user messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Topic => "Topic",
            Self::Subscription => "Subscription",
            Self::Project => "Project",
        }
    }
}

/// Fully-qualified reference to a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    kind: ResourceKind,
    name: String,
    path: String,
}

impl ResourceRef {
    /// Reference to a project, which is its own scope
    pub fn project(project_id: &str) -> Self {
        Self {
            kind: ResourceKind::Project,
            name: project_id.to_string(),
            path: ResourceKind::Project.path(project_id, project_id),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Last segment of a resource path (`projects/p/topics/t` -> `t`)
pub fn short_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
