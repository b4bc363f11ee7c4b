use tracing::{info, instrument};
use uuid::Uuid;

use curricula_auth::{Action, Grant, Resource};
use curricula_core::AppError;
use curricula_models::{Profile, UpdateProfileDto};

use crate::middleware::auth::Caller;
use crate::store::Store;

pub struct UserService;

impl UserService {
    /// The caller's own profile, from the lookup already done for this request.
    #[instrument(skip(caller), fields(principal = caller.principal.label()))]
    pub fn me(caller: &Caller) -> Result<Profile, AppError> {
        caller.require_user_id()?;
        caller
            .profile
            .clone()
            .ok_or_else(|| AppError::not_found("Profile not found"))
    }

    #[instrument(skip(store))]
    pub async fn list(store: &dyn Store, grant: &Grant) -> Result<Vec<Profile>, AppError> {
        grant.ensure(Action::Read, Resource::UserRole)?;
        store.list_profiles().await
    }

    #[instrument(skip(store), fields(admin_id = ?grant.user_id()))]
    pub async fn update(
        store: &dyn Store,
        grant: &Grant,
        id: Uuid,
        changes: &UpdateProfileDto,
    ) -> Result<Profile, AppError> {
        grant.ensure(Action::Update, Resource::UserRole)?;

        if changes.is_empty() {
            return Err(AppError::validation("No changes provided"));
        }

        let profile = store
            .update_profile(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(
            profile_id = %profile.id,
            role = profile.role.as_deref().unwrap_or("none"),
            "Profile updated"
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curricula_auth::{Principal, Role, authorize};
    use curricula_core::ErrorKind;

    use crate::store::memory::MemoryStore;

    fn admin_grant(action: Action) -> Grant {
        let admin = Principal::Authenticated {
            user_id: Uuid::new_v4(),
            role: Some(Role::Administrator),
        };
        authorize(&admin, action, Resource::UserRole).unwrap()
    }

    #[test]
    fn test_me_distinguishes_anonymous_and_missing_profile() {
        let anonymous = Caller {
            principal: Principal::Anonymous,
            profile: None,
            claims: None,
        };
        assert_eq!(
            UserService::me(&anonymous).unwrap_err().kind,
            ErrorKind::AuthenticationRequired
        );

        let no_profile = Caller {
            principal: Principal::Authenticated {
                user_id: Uuid::new_v4(),
                role: None,
            },
            profile: None,
            claims: None,
        };
        assert_eq!(UserService::me(&no_profile).unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_and_missing() {
        let store = MemoryStore::new();
        let grant = admin_grant(Action::Update);

        let err = UserService::update(&store, &grant, Uuid::new_v4(), &UpdateProfileDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);

        let changes = UpdateProfileDto {
            role: Some(Role::Editor),
            ..Default::default()
        };
        let err = UserService::update(&store, &grant, Uuid::new_v4(), &changes)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_changes_role() {
        let store = MemoryStore::new();
        let profile = store.add_profile("teacher@district.org", Some("viewer")).await;

        let changes = UpdateProfileDto {
            role: Some(Role::Owner),
            district: Some(Some("North".to_string())),
            ..Default::default()
        };
        let updated = UserService::update(&store, &admin_grant(Action::Update), profile.id, &changes)
            .await
            .unwrap();

        assert_eq!(updated.role(), Some(Role::Owner));
        assert_eq!(updated.district.as_deref(), Some("North"));
    }
}
