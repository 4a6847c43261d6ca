//! Project operations

use super::{search_query, Project, ProjectsApi, ACTIVE_PROJECTS_QUERY};
use crate::resource::{for_each_item, require, OpResult, ResourceRef};
use crate::ui::console::BANNER_WIDTH;
use crate::ui::{Console, ErrorReport};
use std::io::Write;

fn print_summary<W: Write>(console: &mut Console<W>, n: usize, project: &Project) {
    console.notice(format!("{}. Project ID: {}", n, project.project_id));
    console.line(format!("   Name: {}", project.display_name));
    console.line(format!("   State: {}", project.state));
}

/// List every active project the caller can see
pub async fn list_all_projects<W: Write>(
    api: &dyn ProjectsApi,
    console: &mut Console<W>,
) -> OpResult<usize> {
    console.banner("GCP PROJECTS LIST", BANNER_WIDTH);

    let listed = for_each_item(
        |token| api.search_projects(ACTIVE_PROJECTS_QUERY, token),
        |n, project: Project| {
            print_summary(console, n, &project);
            if !project.parent.is_empty() {
                console.line(format!("   Parent: {}", project.parent));
            }
            console.line(format!("   Created: {}", project.create_time));
            console.rule('-', BANNER_WIDTH);
        },
    )
    .await;

    let count = match listed {
        Ok(count) => count,
        Err(e) => {
            ErrorReport::new("listing projects")
                .permission("resourcemanager.projects.get")
                .render(console, &e);
            return Err(e.into());
        }
    };

    if count == 0 {
        console.notice("No projects found.");
        console.line("Make sure you have the 'resourcemanager.projects.get' permission.");
    } else {
        console.notice(format!("Total Projects Found: {}", count));
    }
    console.rule('=', BANNER_WIDTH);

    Ok(count)
}

/// Describe one project
pub async fn get_project_details<W: Write>(
    api: &dyn ProjectsApi,
    console: &mut Console<W>,
    project_id: &str,
) -> OpResult<Project> {
    let project_id = require(console, "Project ID", project_id)?;

    let project = match api.get_project(&ResourceRef::project(project_id)).await {
        Ok(project) => project,
        Err(e) => {
            ErrorReport::new("getting project details")
                .permission("resourcemanager.projects.get")
                .not_found("Project", project_id)
                .render(console, &e);
            return Err(e.into());
        }
    };

    console.banner(format!("PROJECT DETAILS: {}", project_id), BANNER_WIDTH);
    console.line(format!("Display Name: {}", project.display_name));
    console.line(format!("Project ID: {}", project.project_id));
    console.line(format!("Project Number: {}", project.project_number()));
    console.line(format!("State: {}", project.state));
    console.line(format!("Created: {}", project.create_time));
    console.line(format!("Updated: {}", project.update_time));
    if !project.parent.is_empty() {
        console.line(format!("Parent: {}", project.parent));
    }
    if !project.labels.is_empty() {
        console.notice("Labels:");
        for (key, value) in &project.labels {
            console.line(format!("  {}: {}", key, value));
        }
    }
    console.rule('=', BANNER_WIDTH);

    Ok(project)
}

/// Search active projects by ID or display-name prefix
pub async fn search_projects<W: Write>(
    api: &dyn ProjectsApi,
    console: &mut Console<W>,
    query: &str,
) -> OpResult<usize> {
    let term = require(console, "Search query", query)?;
    console.banner(format!("SEARCHING PROJECTS: '{}'", term), BANNER_WIDTH);

    let search = search_query(term);
    let listed = for_each_item(
        |token| api.search_projects(&search, token),
        |n, project: Project| {
            print_summary(console, n, &project);
            console.rule('-', BANNER_WIDTH);
        },
    )
    .await;

    let count = match listed {
        Ok(count) => count,
        Err(e) => {
            ErrorReport::new("searching projects")
                .permission("resourcemanager.projects.get")
                .render(console, &e);
            return Err(e.into());
        }
    };

    if count == 0 {
        console.notice(format!("No projects found matching '{}'", term));
    } else {
        console.notice(format!("Found {} matching project(s)", count));
    }
    console.rule('=', BANNER_WIDTH);

    Ok(count)
}
