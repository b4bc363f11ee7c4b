use tracing::{info, instrument, warn};
use uuid::Uuid;

use curricula_auth::{Action, Grant, Resource};
use curricula_core::AppError;
use curricula_models::{CurriculumEntry, CurriculumFields, CurriculumFilterParams, ImportRequest};

use crate::metrics::track_curriculum_write;
use crate::modules::curriculum::import::prepare_import;
use crate::store::Store;

pub struct CurriculumService;

impl CurriculumService {
    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn Store,
        filters: &CurriculumFilterParams,
    ) -> Result<Vec<CurriculumEntry>, AppError> {
        store.list_entries(filters).await
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn Store, id: Uuid) -> Result<CurriculumEntry, AppError> {
        store
            .find_entry(id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry not found"))
    }

    #[instrument(skip(store, fields), fields(user_id = ?grant.user_id()))]
    pub async fn create(
        store: &dyn Store,
        grant: &Grant,
        fields: &CurriculumFields,
    ) -> Result<CurriculumEntry, AppError> {
        grant.ensure(Action::Create, Resource::Curriculum)?;

        if fields.is_empty() {
            return Err(AppError::validation("No data provided"));
        }

        let entry = store.insert_entry(fields).await?;
        track_curriculum_write("create", 1);
        info!(entry_id = %entry.id, "Curriculum entry created");

        Ok(entry)
    }

    #[instrument(skip(store, fields), fields(user_id = ?grant.user_id()))]
    pub async fn update(
        store: &dyn Store,
        grant: &Grant,
        id: Uuid,
        fields: &CurriculumFields,
    ) -> Result<CurriculumEntry, AppError> {
        grant.ensure(Action::Update, Resource::Curriculum)?;

        if fields.is_empty() {
            return Err(AppError::validation("No data provided"));
        }

        let entry = store
            .update_entry(id, fields)
            .await?
            .ok_or_else(|| AppError::not_found("Entry not found"))?;
        track_curriculum_write("update", 1);

        Ok(entry)
    }

    #[instrument(skip(store), fields(user_id = ?grant.user_id()))]
    pub async fn delete(store: &dyn Store, grant: &Grant, id: Uuid) -> Result<(), AppError> {
        grant.ensure(Action::Delete, Resource::Curriculum)?;

        if !store.delete_entry(id).await? {
            return Err(AppError::not_found("Entry not found"));
        }
        track_curriculum_write("delete", 1);
        info!(entry_id = %id, "Curriculum entry deleted");

        Ok(())
    }

    /// Validates every row, then inserts them one at a time.
    ///
    /// Not atomic: when the store fails part-way the rows already inserted
    /// stay, and the error says how many there were.
    #[instrument(skip(store, request), fields(user_id = ?grant.user_id()))]
    pub async fn import(
        store: &dyn Store,
        grant: &Grant,
        request: &ImportRequest,
    ) -> Result<Vec<CurriculumEntry>, AppError> {
        grant.ensure(Action::Create, Resource::Curriculum)?;

        let rows = prepare_import(request)?;
        let total = rows.len();
        let mut inserted = Vec::with_capacity(total);

        for fields in &rows {
            match store.insert_entry(fields).await {
                Ok(entry) => inserted.push(entry),
                Err(err) => {
                    let committed = inserted.len();
                    warn!(committed, total, "Import stopped by a store failure");
                    track_curriculum_write("import", committed);
                    return Err(err.with_public_message(format!(
                        "Import stopped after {committed} of {total} rows were committed"
                    )));
                }
            }
        }

        track_curriculum_write("import", total);
        info!(count = total, "Curriculum rows imported");

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curricula_auth::{Principal, Role, authorize};
    use curricula_core::ErrorKind;

    use crate::store::CurriculumStore;
    use crate::store::memory::MemoryStore;

    fn grant(action: Action) -> Grant {
        let owner = Principal::Authenticated {
            user_id: Uuid::new_v4(),
            role: Some(Role::Owner),
        };
        authorize(&owner, action, Resource::Curriculum).unwrap()
    }

    fn fields(grade: &str, subject: &str) -> CurriculumFields {
        CurriculumFields {
            grade: Some(grade.to_string()),
            subject: Some(subject.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_empty_fails_before_store() {
        let store = MemoryStore::new();
        let err = CurriculumService::create(&store, &grant(Action::Create), &CurriculumFields::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_grant_for_other_operation_is_refused() {
        let store = MemoryStore::new();
        let err = CurriculumService::create(&store, &grant(Action::Delete), &fields("5", "Math"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InternalError);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_exactly() {
        let store = MemoryStore::new();
        let create = grant(Action::Create);
        CurriculumService::create(&store, &create, &fields("5", "Math")).await.unwrap();
        CurriculumService::create(&store, &create, &fields("3", "ELA")).await.unwrap();
        CurriculumService::create(&store, &create, &fields("50", "Math")).await.unwrap();

        let all = CurriculumService::list(&store, &CurriculumFilterParams::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let grade_five = CurriculumFilterParams {
            grade: Some("5".to_string()),
            ..Default::default()
        };
        let matched = CurriculumService::list(&store, &grade_five).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].grade.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_is_not_found() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();

        let err = CurriculumService::update(&store, &grant(Action::Update), missing, &fields("5", "Math"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = CurriculumService::delete(&store, &grant(Action::Delete), missing)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_overwrites_only_given_fields() {
        let store = MemoryStore::new();
        let entry = CurriculumService::create(&store, &grant(Action::Create), &fields("5", "Math"))
            .await
            .unwrap();

        let patch = CurriculumFields {
            subject: Some("Science".to_string()),
            ..Default::default()
        };
        let updated = CurriculumService::update(&store, &grant(Action::Update), entry.id, &patch)
            .await
            .unwrap();

        assert_eq!(updated.grade.as_deref(), Some("5"));
        assert_eq!(updated.subject.as_deref(), Some("Science"));
        assert_eq!(updated.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn test_import_partial_failure_reports_committed_rows() {
        let store = MemoryStore::new();
        store.fail_inserts_after(2);
        let request = ImportRequest {
            csv: Some("Grade\n1\n2\n3\n4".to_string()),
            rows: None,
        };

        let err = CurriculumService::import(&store, &grant(Action::Create), &request)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpstreamStoreError);
        assert_eq!(err.message(), "Import stopped after 2 of 4 rows were committed");
        let remaining = store.list_entries(&CurriculumFilterParams::default()).await.unwrap();
        assert_eq!(remaining.len(), 2);
    }

    #[tokio::test]
    async fn test_import_invalid_row_inserts_nothing() {
        let store = MemoryStore::new();
        let request = ImportRequest {
            csv: Some("Grade,Colour\n1,red".to_string()),
            rows: None,
        };

        let err = CurriculumService::import(&store, &grant(Action::Create), &request)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(store.insert_calls(), 0);
    }
}
