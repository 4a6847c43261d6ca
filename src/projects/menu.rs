//! Interactive projects menu

use super::{operations, ProjectsApi};
use crate::menu::{Dispatch, Field, Menu, MenuEntry};
use crate::ui::Console;
use async_trait::async_trait;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectsCommand {
    ListAll,
    Details(String),
    Search(String),
}

pub static PROJECTS_MENU: Menu<ProjectsCommand> = Menu {
    title: "GCP PROJECTS MENU",
    entries: &[
        MenuEntry {
            label: "List all projects",
            announce: Some("📋 Listing all projects..."),
            fields: &[],
            rejection: "",
            build: |_| ProjectsCommand::ListAll,
        },
        MenuEntry {
            label: "Get project details",
            announce: None,
            fields: &[Field::required("Project ID")],
            rejection: "Project ID cannot be empty",
            build: |mut a| ProjectsCommand::Details(a.text()),
        },
        MenuEntry {
            label: "Search projects",
            announce: None,
            fields: &[Field::required("search query (project ID or name)")],
            rejection: "Search query cannot be empty",
            build: |mut a| ProjectsCommand::Search(a.text()),
        },
    ],
};

pub struct ProjectsHandler<'a> {
    pub api: &'a dyn ProjectsApi,
}

#[async_trait(?Send)]
impl Dispatch<ProjectsCommand> for ProjectsHandler<'_> {
    async fn dispatch<W: Write>(&self, command: ProjectsCommand, console: &mut Console<W>) {
        let api = self.api;
        let _ = match command {
            ProjectsCommand::ListAll => operations::list_all_projects(api, console).await.map(drop),
            ProjectsCommand::Details(id) => {
                operations::get_project_details(api, console, &id).await.map(drop)
            }
            ProjectsCommand::Search(query) => {
                operations::search_projects(api, console, &query).await.map(drop)
            }
        };
    }
}
