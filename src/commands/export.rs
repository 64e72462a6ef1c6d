// Backend commands for packaging a project for download

use super::ServiceContext;
use crate::error::AppResult;
use crate::export::{self, ExportArchive};
use crate::models::{Target, TargetInfo};
use crate::prd_workflow;

/// Package a project's artifacts for a target
pub async fn package_for_target(
    ctx: &ServiceContext,
    project_id: &str,
    target: Target,
) -> AppResult<ExportArchive> {
    target.require_available()?;
    let metadata = prd_workflow::load_metadata(&ctx.store, project_id)?;
    let registered = metadata
        .generation
        .map(|g| g.files_for(target))
        .unwrap_or_default();

    log::info!("Exporting project {} for {}", project_id, target.display_name());
    export::package_for_target(
        &ctx.store,
        &ctx.rule_templates_dir,
        project_id,
        target,
        &registered,
    )
}

/// Every known target with its availability and documentation files
pub fn list_targets() -> Vec<TargetInfo> {
    Target::all().iter().copied().map(TargetInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::docs::generate_doc_file;
    use crate::commands::projects::{create_project, CreateProjectRequest};
    use crate::commands::test_support::context;
    use crate::error::AppError;
    use crate::file_storage::ArtifactKind;

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let (_dir, ctx, _model) = context();
        assert!(matches!(
            package_for_target(&ctx, "project-missing", Target::Cursor).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_nora_export_uses_registry() {
        let (_dir, ctx, model) = context();
        let project = create_project(&ctx, CreateProjectRequest { name: "Acme".into() })
            .await
            .unwrap();
        ctx.store
            .put_text(&project.id, &ArtifactKind::RefinedPrd, "REFINED")
            .unwrap();

        let before = package_for_target(&ctx, &project.id, Target::Nora).await.unwrap();

        model.push_ok("bugs");
        generate_doc_file(&ctx, &project.id, "Bug_tracking.md", Target::Nora)
            .await
            .unwrap();
        let after = package_for_target(&ctx, &project.id, Target::Nora).await.unwrap();

        assert_eq!(after.filename, format!("nora-project-{}.zip", project.id));
        assert!(after.bytes.len() > before.bytes.len());
    }

    #[test]
    fn test_list_targets() {
        let targets = list_targets();
        assert_eq!(targets.len(), Target::all().len());
        assert_eq!(targets.iter().filter(|t| t.available).count(), 2);
    }
}
