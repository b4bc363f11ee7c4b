//! Administrative operations run outside the HTTP surface.
//!
//! No HTTP path can create an administrator from nothing, so the first one
//! is granted here against an existing profile (the person must have signed
//! in once).

use tracing::info;

use curricula_auth::Role;
use curricula_core::AppError;
use curricula_models::{Profile, UpdateProfileDto};

use crate::store::Store;

/// Assigns `role` to the profile with this email (case-insensitive).
pub async fn set_role(store: &dyn Store, email: &str, role: Role) -> Result<Profile, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }

    let profile = store.find_profile_by_email(email).await?.ok_or_else(|| {
        AppError::not_found(format!(
            "No profile for {email}. The user must sign in once before a role can be assigned."
        ))
    })?;

    let changes = UpdateProfileDto {
        role: Some(role),
        ..Default::default()
    };
    let updated = store
        .update_profile(profile.id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No profile for {email}")))?;

    info!(profile_id = %updated.id, role = %role, "Role assigned from CLI");
    Ok(updated)
}

pub async fn list_profiles(store: &dyn Store) -> Result<Vec<Profile>, AppError> {
    store.list_profiles().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use curricula_core::ErrorKind;

    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_set_role_on_existing_profile() {
        let store = MemoryStore::new();
        store.add_profile("Head@District.org", Some("viewer")).await;

        let updated = set_role(&store, "head@district.org", Role::Administrator)
            .await
            .unwrap();
        assert_eq!(updated.role(), Some(Role::Administrator));
    }

    #[tokio::test]
    async fn test_set_role_requires_profile() {
        let store = MemoryStore::new();
        let err = set_role(&store, "nobody@district.org", Role::Owner)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
