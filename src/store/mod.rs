//! Persistence seams.
//!
//! Handlers and services talk to the data store through these traits so the
//! PostgreSQL implementation can be swapped for [`memory::MemoryStore`] in
//! tests. Methods return boxed futures to keep the traits object-safe; the
//! application state holds an `Arc<dyn Store>`.
//!
//! Every failure of the underlying store surfaces as an
//! [`ErrorKind::UpstreamStoreError`](curricula_core::ErrorKind). Absence of a
//! row is not an error at this layer: lookups return `Option`, deletes `bool`.

use uuid::Uuid;

use curricula_core::AppFuture;
use curricula_models::{
    CurriculumEntry, CurriculumFields, CurriculumFilterParams, District, Grade, NewProfile,
    Profile, Subject, UpdateProfileDto,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

pub trait CurriculumStore: Send + Sync {
    /// Entries matching every active filter, newest first.
    fn list_entries<'a>(
        &'a self,
        filters: &'a CurriculumFilterParams,
    ) -> AppFuture<'a, Vec<CurriculumEntry>>;

    fn find_entry(&self, id: Uuid) -> AppFuture<'_, Option<CurriculumEntry>>;

    fn insert_entry<'a>(&'a self, fields: &'a CurriculumFields) -> AppFuture<'a, CurriculumEntry>;

    /// Overwrites the set columns. `None` when no entry has this id.
    fn update_entry<'a>(
        &'a self,
        id: Uuid,
        fields: &'a CurriculumFields,
    ) -> AppFuture<'a, Option<CurriculumEntry>>;

    /// `false` when no entry has this id.
    fn delete_entry(&self, id: Uuid) -> AppFuture<'_, bool>;
}

pub trait ProfileStore: Send + Sync {
    /// Point read keyed by profile id.
    fn find_profile(&self, id: Uuid) -> AppFuture<'_, Option<Profile>>;

    fn find_profile_by_email<'a>(&'a self, email: &'a str) -> AppFuture<'a, Option<Profile>>;

    /// Newest first.
    fn list_profiles(&self) -> AppFuture<'_, Vec<Profile>>;

    /// Returns the profile for this provider subject, creating it with the
    /// given role when missing. An existing profile keeps its role and only
    /// has its email refreshed.
    fn bootstrap_profile<'a>(&'a self, new: &'a NewProfile) -> AppFuture<'a, Profile>;

    fn update_profile<'a>(
        &'a self,
        id: Uuid,
        changes: &'a UpdateProfileDto,
    ) -> AppFuture<'a, Option<Profile>>;
}

pub trait ReferenceStore: Send + Sync {
    /// Ordered by name.
    fn list_districts(&self) -> AppFuture<'_, Vec<District>>;

    /// Ordered by `numeric_order`.
    fn list_grades(&self) -> AppFuture<'_, Vec<Grade>>;

    /// Ordered by name.
    fn list_subjects(&self) -> AppFuture<'_, Vec<Subject>>;
}

/// Everything the service needs from the data store.
pub trait Store: CurriculumStore + ProfileStore + ReferenceStore {}

impl<T> Store for T where T: CurriculumStore + ProfileStore + ReferenceStore {}
