//! GCP Projects
//!
//! Listing, searching and describing projects through Resource Manager v3.

pub mod menu;
pub mod operations;

#[cfg(test)]
pub(crate) mod fake;

use crate::gcp::client::add_query_params;
use crate::gcp::{ApiError, GcpClient, OperationResult};
use crate::resource::{short_name, Page, ResourceRef};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query matching every active project
pub const ACTIVE_PROJECTS_QUERY: &str = "state:ACTIVE";

/// Project information
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    /// `projects/{number}`
    pub name: String,
    pub project_id: String,
    pub display_name: String,
    pub state: String,
    pub parent: String,
    pub create_time: String,
    pub update_time: String,
    pub labels: BTreeMap<String, String>,
}

impl Project {
    /// Numeric project number taken from the resource name
    pub fn project_number(&self) -> &str {
        short_name(&self.name)
    }
}

/// Search query for projects whose name or ID starts with `term`
pub fn search_query(term: &str) -> String {
    format!("(displayName:{term}* OR id:{term}*) AND {ACTIVE_PROJECTS_QUERY}")
}

/// Remote Resource Manager API
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn search_projects(
        &self,
        query: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Project>>;

    async fn get_project(&self, project: &ResourceRef) -> OperationResult<Project>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsPage {
    #[serde(default)]
    projects: Vec<Project>,
    next_page_token: Option<String>,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> OperationResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Unknown(format!("Unexpected Resource Manager response: {}", e)))
}

#[async_trait]
impl ProjectsApi for GcpClient {
    async fn search_projects(
        &self,
        query: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Project>> {
        let url = add_query_params(
            &format!("{}:search", self.resourcemanager_url("projects")),
            &[("query", Some(query)), ("pageToken", page_token.as_deref())],
        )?;
        let page: ProjectsPage = decode(self.get(&url).await?)?;
        Ok(Page::new(page.projects, page.next_page_token))
    }

    async fn get_project(&self, project: &ResourceRef) -> OperationResult<Project> {
        decode(self.get(&self.resourcemanager_url(project.path())).await?)
    }
}
