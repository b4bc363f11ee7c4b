use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use curricula_core::{AppError, AppFuture};
use curricula_models::{
    CurriculumEntry, CurriculumFields, CurriculumFilterParams, District, Grade, NewProfile,
    Profile, Subject, UpdateProfileDto,
};

use super::{CurriculumStore, ProfileStore, ReferenceStore};

const ENTRY_COLUMNS: &str = "id, quarter, grade, subject, curriculum, unit, week, date, \
    scope_link, assessment_name, assessment_link, standards, learning_targets, \
    success_criteria, theme, title, fq, class_name, task, choice_text, required_text, created_at";

const PROFILE_COLUMNS: &str =
    "id, provider_subject, email, role, district, assigned_subject, assigned_grade, created_at";

/// PostgreSQL-backed store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CurriculumStore for PgStore {
    fn list_entries<'a>(
        &'a self,
        filters: &'a CurriculumFilterParams,
    ) -> AppFuture<'a, Vec<CurriculumEntry>> {
        Box::pin(async move {
            let mut query = QueryBuilder::<Postgres>::new("SELECT ");
            query.push(ENTRY_COLUMNS);
            query.push(" FROM curriculum_entries WHERE TRUE");

            // column names come from the fixed filter list, values are bound
            for (column, value) in filters.constraints() {
                query
                    .push(" AND ")
                    .push(column)
                    .push(" = ")
                    .push_bind(value.to_string());
            }
            query.push(" ORDER BY created_at DESC");

            query
                .build_query_as::<CurriculumEntry>()
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn find_entry(&self, id: Uuid) -> AppFuture<'_, Option<CurriculumEntry>> {
        Box::pin(async move {
            let sql = format!("SELECT {ENTRY_COLUMNS} FROM curriculum_entries WHERE id = $1");
            sqlx::query_as::<_, CurriculumEntry>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn insert_entry<'a>(&'a self, fields: &'a CurriculumFields) -> AppFuture<'a, CurriculumEntry> {
        Box::pin(async move {
            let entries = fields.entries();
            if entries.is_empty() {
                return Err(AppError::validation("No data provided"));
            }

            let mut query = QueryBuilder::<Postgres>::new("INSERT INTO curriculum_entries (");
            {
                let mut columns = query.separated(", ");
                for (column, _) in &entries {
                    columns.push(*column);
                }
            }
            query.push(") VALUES (");
            {
                let mut values = query.separated(", ");
                for (_, value) in &entries {
                    values.push_bind(value.to_string());
                }
            }
            query.push(") RETURNING ");
            query.push(ENTRY_COLUMNS);

            query
                .build_query_as::<CurriculumEntry>()
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn update_entry<'a>(
        &'a self,
        id: Uuid,
        fields: &'a CurriculumFields,
    ) -> AppFuture<'a, Option<CurriculumEntry>> {
        Box::pin(async move {
            let entries = fields.entries();
            if entries.is_empty() {
                return self.find_entry(id).await;
            }

            let mut query = QueryBuilder::<Postgres>::new("UPDATE curriculum_entries SET ");
            {
                let mut assignments = query.separated(", ");
                for (column, value) in &entries {
                    assignments.push(format!("{column} = "));
                    assignments.push_bind_unseparated(value.to_string());
                }
            }
            query.push(" WHERE id = ");
            query.push_bind(id);
            query.push(" RETURNING ");
            query.push(ENTRY_COLUMNS);

            query
                .build_query_as::<CurriculumEntry>()
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn delete_entry(&self, id: Uuid) -> AppFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM curriculum_entries WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(AppError::store)?;

            Ok(result.rows_affected() > 0)
        })
    }
}

impl ProfileStore for PgStore {
    fn find_profile(&self, id: Uuid) -> AppFuture<'_, Option<Profile>> {
        Box::pin(async move {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
            sqlx::query_as::<_, Profile>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn find_profile_by_email<'a>(&'a self, email: &'a str) -> AppFuture<'a, Option<Profile>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {PROFILE_COLUMNS} FROM profiles WHERE LOWER(email) = LOWER($1) \
                 ORDER BY created_at LIMIT 1"
            );
            sqlx::query_as::<_, Profile>(&sql)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn list_profiles(&self) -> AppFuture<'_, Vec<Profile>> {
        Box::pin(async move {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC");
            sqlx::query_as::<_, Profile>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn bootstrap_profile<'a>(&'a self, new: &'a NewProfile) -> AppFuture<'a, Profile> {
        Box::pin(async move {
            let sql = format!(
                r#"INSERT INTO profiles (provider_subject, email, role)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (provider_subject) DO UPDATE SET email = EXCLUDED.email
                   RETURNING {PROFILE_COLUMNS}"#
            );
            sqlx::query_as::<_, Profile>(&sql)
                .bind(&new.provider_subject)
                .bind(&new.email)
                .bind(new.role.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn update_profile<'a>(
        &'a self,
        id: Uuid,
        changes: &'a UpdateProfileDto,
    ) -> AppFuture<'a, Option<Profile>> {
        Box::pin(async move {
            if changes.is_empty() {
                return self.find_profile(id).await;
            }

            let mut query = QueryBuilder::<Postgres>::new("UPDATE profiles SET ");
            {
                let mut assignments = query.separated(", ");
                if let Some(role) = changes.role {
                    assignments.push("role = ");
                    assignments.push_bind_unseparated(role.as_str().to_string());
                }
                if let Some(district) = &changes.district {
                    assignments.push("district = ");
                    assignments.push_bind_unseparated(district.clone());
                }
                if let Some(subject) = &changes.assigned_subject {
                    assignments.push("assigned_subject = ");
                    assignments.push_bind_unseparated(subject.map(|s| s.as_str().to_string()));
                }
                if let Some(grade) = &changes.assigned_grade {
                    assignments.push("assigned_grade = ");
                    assignments.push_bind_unseparated(grade.map(|g| g.as_str().to_string()));
                }
            }
            query.push(" WHERE id = ");
            query.push_bind(id);
            query.push(" RETURNING ");
            query.push(PROFILE_COLUMNS);

            query
                .build_query_as::<Profile>()
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }
}

impl ReferenceStore for PgStore {
    fn list_districts(&self) -> AppFuture<'_, Vec<District>> {
        Box::pin(async move {
            sqlx::query_as::<_, District>("SELECT id, name FROM district ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }

    fn list_grades(&self) -> AppFuture<'_, Vec<Grade>> {
        Box::pin(async move {
            sqlx::query_as::<_, Grade>(
                "SELECT id, name, numeric_order FROM grade ORDER BY numeric_order",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::store)
        })
    }

    fn list_subjects(&self) -> AppFuture<'_, Vec<Subject>> {
        Box::pin(async move {
            sqlx::query_as::<_, Subject>("SELECT id, name FROM subject ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::store)
        })
    }
}
