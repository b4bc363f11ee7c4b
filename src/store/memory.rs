//! In-process store for tests.
//!
//! Behaves like [`PgStore`](super::PgStore) for everything the service relies
//! on (ordering, not-found as `None`, bootstrap keeping existing roles) and
//! can be told to fail so error paths are reachable without a database.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::anyhow;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use curricula_core::{AppError, AppFuture};
use curricula_models::{
    CurriculumEntry, CurriculumFields, CurriculumFilterParams, District, Grade, GradeLevel,
    NewProfile, Profile, Subject, SubjectArea, UpdateProfileDto,
};

use super::{CurriculumStore, ProfileStore, ReferenceStore};

#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<Vec<CurriculumEntry>>,
    profiles: RwLock<Vec<Profile>>,
    districts: RwLock<Vec<District>>,
    insert_calls: AtomicUsize,
    /// Inserts beyond this count fail; `usize::MAX` disables.
    insert_budget: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            profiles: RwLock::new(Vec::new()),
            districts: RwLock::new(Vec::new()),
            insert_calls: AtomicUsize::new(0),
            insert_budget: AtomicUsize::new(usize::MAX),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of `insert_entry` calls that reached the store.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Lets `n` more inserts succeed, then fails every following one.
    pub fn fail_inserts_after(&self, n: usize) {
        self.insert_budget.store(n, Ordering::SeqCst);
    }

    /// Makes every operation fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn add_district(&self, name: &str) -> District {
        let district = District {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.districts.write().await.push(district.clone());
        district
    }

    /// Inserts a profile directly, bypassing the sign-in flow.
    pub async fn add_profile(&self, email: &str, role: Option<&str>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            provider_subject: format!("test|{}", Uuid::new_v4()),
            email: email.to_string(),
            role: role.map(str::to_string),
            district: None,
            assigned_subject: None,
            assigned_grade: None,
            created_at: self.next_timestamp_for_profiles().await,
        };
        self.profiles.write().await.push(profile.clone());
        profile
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store(anyhow!("memory store is unavailable")));
        }
        Ok(())
    }

    // Strictly increasing timestamps keep newest-first ordering deterministic.
    async fn next_timestamp_for_entries(&self) -> chrono::DateTime<Utc> {
        let entries = self.entries.read().await;
        next_after(entries.iter().map(|e| e.created_at).max())
    }

    async fn next_timestamp_for_profiles(&self) -> chrono::DateTime<Utc> {
        let profiles = self.profiles.read().await;
        next_after(profiles.iter().map(|p| p.created_at).max())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn next_after(latest: Option<chrono::DateTime<Utc>>) -> chrono::DateTime<Utc> {
    let now = Utc::now();
    match latest {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}

impl CurriculumStore for MemoryStore {
    fn list_entries<'a>(
        &'a self,
        filters: &'a CurriculumFilterParams,
    ) -> AppFuture<'a, Vec<CurriculumEntry>> {
        Box::pin(async move {
            self.check_available()?;
            let mut entries: Vec<CurriculumEntry> = self
                .entries
                .read()
                .await
                .iter()
                .filter(|entry| filters.matches(entry))
                .cloned()
                .collect();
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(entries)
        })
    }

    fn find_entry(&self, id: Uuid) -> AppFuture<'_, Option<CurriculumEntry>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .find(|entry| entry.id == id)
                .cloned())
        })
    }

    fn insert_entry<'a>(&'a self, fields: &'a CurriculumFields) -> AppFuture<'a, CurriculumEntry> {
        Box::pin(async move {
            self.check_available()?;
            let call = self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.insert_budget.load(Ordering::SeqCst) {
                return Err(AppError::store(anyhow!("insert rejected by memory store")));
            }

            let created_at = self.next_timestamp_for_entries().await;
            let entry = CurriculumEntry::new(Uuid::new_v4(), created_at, fields);
            self.entries.write().await.push(entry.clone());
            Ok(entry)
        })
    }

    fn update_entry<'a>(
        &'a self,
        id: Uuid,
        fields: &'a CurriculumFields,
    ) -> AppFuture<'a, Option<CurriculumEntry>> {
        Box::pin(async move {
            self.check_available()?;
            let mut entries = self.entries.write().await;
            Ok(entries.iter_mut().find(|entry| entry.id == id).map(|entry| {
                entry.apply(fields);
                entry.clone()
            }))
        })
    }

    fn delete_entry(&self, id: Uuid) -> AppFuture<'_, bool> {
        Box::pin(async move {
            self.check_available()?;
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            Ok(entries.len() < before)
        })
    }
}

impl ProfileStore for MemoryStore {
    fn find_profile(&self, id: Uuid) -> AppFuture<'_, Option<Profile>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self
                .profiles
                .read()
                .await
                .iter()
                .find(|profile| profile.id == id)
                .cloned())
        })
    }

    fn find_profile_by_email<'a>(&'a self, email: &'a str) -> AppFuture<'a, Option<Profile>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self
                .profiles
                .read()
                .await
                .iter()
                .find(|profile| profile.email.eq_ignore_ascii_case(email))
                .cloned())
        })
    }

    fn list_profiles(&self) -> AppFuture<'_, Vec<Profile>> {
        Box::pin(async move {
            self.check_available()?;
            let mut profiles = self.profiles.read().await.clone();
            profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(profiles)
        })
    }

    fn bootstrap_profile<'a>(&'a self, new: &'a NewProfile) -> AppFuture<'a, Profile> {
        Box::pin(async move {
            self.check_available()?;
            let created_at = self.next_timestamp_for_profiles().await;
            let mut profiles = self.profiles.write().await;

            if let Some(existing) = profiles
                .iter_mut()
                .find(|profile| profile.provider_subject == new.provider_subject)
            {
                existing.email = new.email.clone();
                return Ok(existing.clone());
            }

            let profile = Profile {
                id: Uuid::new_v4(),
                provider_subject: new.provider_subject.clone(),
                email: new.email.clone(),
                role: Some(new.role.as_str().to_string()),
                district: None,
                assigned_subject: None,
                assigned_grade: None,
                created_at,
            };
            profiles.push(profile.clone());
            Ok(profile)
        })
    }

    fn update_profile<'a>(
        &'a self,
        id: Uuid,
        changes: &'a UpdateProfileDto,
    ) -> AppFuture<'a, Option<Profile>> {
        Box::pin(async move {
            self.check_available()?;
            let mut profiles = self.profiles.write().await;
            Ok(profiles
                .iter_mut()
                .find(|profile| profile.id == id)
                .map(|profile| {
                    changes.apply(profile);
                    profile.clone()
                }))
        })
    }
}

impl ReferenceStore for MemoryStore {
    fn list_districts(&self) -> AppFuture<'_, Vec<District>> {
        Box::pin(async move {
            self.check_available()?;
            let mut districts = self.districts.read().await.clone();
            districts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(districts)
        })
    }

    fn list_grades(&self) -> AppFuture<'_, Vec<Grade>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(GradeLevel::ALL
                .into_iter()
                .enumerate()
                .map(|(order, grade)| Grade {
                    id: Uuid::from_u128(order as u128 + 1),
                    name: grade.as_str().to_string(),
                    numeric_order: order as i32,
                })
                .collect())
        })
    }

    fn list_subjects(&self) -> AppFuture<'_, Vec<Subject>> {
        Box::pin(async move {
            self.check_available()?;
            let mut subjects: Vec<Subject> = SubjectArea::ALL
                .into_iter()
                .enumerate()
                .map(|(index, subject)| Subject {
                    id: Uuid::from_u128(index as u128 + 100),
                    name: subject.as_str().to_string(),
                })
                .collect();
            subjects.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(subjects)
        })
    }
}
