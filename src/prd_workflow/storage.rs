//! Project record storage
//!
//! Project and metadata records for one project live in
//! `projects/{id}/project.json` and `projects/{id}/metadata.json`.

use crate::error::{AppError, AppResult};
use crate::file_storage::{ArtifactKind, ArtifactStore};
use crate::models::{Project, ProjectMetadata};
use chrono::{DateTime, Utc};

/// Generate a new project id (`project-{millis}-{suffix}`)
pub fn generate_project_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("project-{}-{}", now.timestamp_millis(), &suffix[..9])
}

/// Create the project and metadata records for a new project
///
/// Metadata is written first so a listed project always has metadata.
pub fn create_project(store: &ArtifactStore, name: &str) -> AppResult<Project> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Project name is required"));
    }

    let now = Utc::now();
    let id = generate_project_id(now);
    let project = Project::new(id.clone(), name.to_string(), now);
    let metadata = ProjectMetadata::new(&id, now);

    store.put_json(&id, &ArtifactKind::Metadata, &metadata)?;
    store.put_json(&id, &ArtifactKind::Project, &project)?;

    log::info!("Created project {} ({})", id, name);
    Ok(project)
}

/// Load a project record
pub fn load_project(store: &ArtifactStore, project_id: &str) -> AppResult<Project> {
    store
        .try_get_json(project_id, &ArtifactKind::Project)?
        .ok_or_else(|| AppError::not_found(format!("Project not found: {}", project_id)))
}

/// Load a project's metadata, failing with `NotFound` if the project is unknown
pub fn load_metadata(store: &ArtifactStore, project_id: &str) -> AppResult<ProjectMetadata> {
    if !store.project_exists(project_id)? {
        return Err(AppError::not_found(format!("Project not found: {}", project_id)));
    }
    store.get_json(project_id, &ArtifactKind::Metadata)
}

/// Fail with `NotFound` unless the project exists
pub fn require_project(store: &ArtifactStore, project_id: &str) -> AppResult<()> {
    if store.project_exists(project_id)? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Project not found: {}", project_id)))
    }
}

/// Read-modify-write the project record
pub fn update_project<F>(store: &ArtifactStore, project_id: &str, update: F) -> AppResult<Project>
where
    F: FnOnce(&mut Project) -> AppResult<()>,
{
    require_project(store, project_id)?;
    store.update_json(project_id, &ArtifactKind::Project, |project: &mut Project| {
        update(project)?;
        project.updated_at = Utc::now();
        Ok(())
    })
}

/// Read-modify-write the metadata record
pub fn update_metadata<F>(
    store: &ArtifactStore,
    project_id: &str,
    update: F,
) -> AppResult<ProjectMetadata>
where
    F: FnOnce(&mut ProjectMetadata) -> AppResult<()>,
{
    require_project(store, project_id)?;
    store.update_json(project_id, &ArtifactKind::Metadata, |metadata: &mut ProjectMetadata| {
        update(metadata)?;
        metadata.last_edited = Utc::now();
        Ok(())
    })
}

/// List all projects, most recently updated first
///
/// Unreadable project records are skipped with a warning.
pub fn list_projects(store: &ArtifactStore) -> AppResult<Vec<Project>> {
    let mut projects = Vec::new();
    for id in store.list_project_ids()? {
        match store.get_json::<Project>(&id, &ArtifactKind::Project) {
            Ok(project) => projects.push(project),
            Err(e) => log::warn!("Skipping unreadable project {}: {}", id, e),
        }
    }
    projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prd_workflow::state::{ProjectStatus, ProjectStep};
    use tempfile::TempDir;

    #[test]
    fn test_generate_project_id_format() {
        let id = generate_project_id(Utc::now());
        assert!(id.starts_with("project-"));
        assert_eq!(id.split('-').count(), 3);
        assert_ne!(id, generate_project_id(Utc::now()));
    }

    #[test]
    fn test_create_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());

        let project = create_project(&store, "  Acme  ").unwrap();
        assert_eq!(project.name, "Acme");
        assert_eq!(project.status, ProjectStatus::Draft);

        let loaded = load_project(&store, &project.id).unwrap();
        assert_eq!(loaded, project);

        let metadata = load_metadata(&store, &project.id).unwrap();
        assert_eq!(metadata.project_id, project.id);
        assert_eq!(metadata.current_step, ProjectStep::Questions);
    }

    #[test]
    fn test_blank_name_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        assert!(matches!(create_project(&store, "   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_missing_project_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        assert!(matches!(load_project(&store, "nope"), Err(AppError::NotFound(_))));
        assert!(matches!(load_metadata(&store, "nope"), Err(AppError::NotFound(_))));
        assert!(matches!(
            update_metadata(&store, "nope", |_| Ok(())),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());

        let first = create_project(&store, "First").unwrap();
        let second = create_project(&store, "Second").unwrap();
        update_project(&store, &first.id, |p| {
            p.name = "First (renamed)".into();
            Ok(())
        })
        .unwrap();

        let listed = list_projects(&store).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }
}
