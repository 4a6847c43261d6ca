//! In-memory Resource Manager for tests

use super::{Project, ProjectsApi, ACTIVE_PROJECTS_QUERY};
use crate::gcp::{ApiError, OperationResult};
use crate::resource::{Page, ResourceRef};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serves a fixed project list one project per page. Search matches the
/// term embedded in the query as an ID or display-name prefix.
#[derive(Default)]
pub struct FakeProjects {
    projects: Vec<Project>,
    failure: Option<ApiError>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeProjects {
    pub fn new(ids: &[&str]) -> Self {
        let projects = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Project {
                name: format!("projects/{}", 1000 + i),
                project_id: id.to_string(),
                display_name: id.to_uppercase(),
                state: "ACTIVE".to_string(),
                create_time: "2024-01-01T00:00:00Z".to_string(),
                ..Project::default()
            })
            .collect();
        Self {
            projects,
            ..Self::default()
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn enter(&self) -> OperationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

fn search_term(query: &str) -> Option<&str> {
    let rest = query.strip_prefix("(displayName:")?;
    rest.split('*').next()
}

#[async_trait]
impl ProjectsApi for FakeProjects {
    async fn search_projects(
        &self,
        query: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Project>> {
        self.enter()?;
        self.queries.lock().unwrap().push(query.to_string());

        let matching: Vec<&Project> = match search_term(query) {
            Some(term) => self
                .projects
                .iter()
                .filter(|p| p.project_id.starts_with(term) || p.display_name.starts_with(term))
                .collect(),
            None if query == ACTIVE_PROJECTS_QUERY => self.projects.iter().collect(),
            None => Vec::new(),
        };

        let index: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let items: Vec<Project> = matching.get(index).map(|p| (*p).clone()).into_iter().collect();
        let next = (index + 1 < matching.len()).then(|| (index + 1).to_string());
        Ok(Page::new(items, next))
    }

    async fn get_project(&self, project: &ResourceRef) -> OperationResult<Project> {
        self.enter()?;
        self.projects
            .iter()
            .find(|p| p.project_id == project.name())
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Project not found".into()))
    }
}
