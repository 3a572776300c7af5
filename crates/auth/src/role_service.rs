use crate::error::Result;
use sso_database::{Database, DatabaseError, RoleHolder, RoleMappingRepository, RoleRepository};
use sso_models::{NewRole, Role, UpdateRole};
use uuid::Uuid;
use validator::Validate;

/// Changes needed to turn one role set into another
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RoleDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RoleDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute the additions and removals from `current` to `desired`.
/// Duplicates are ignored and `desired` order is kept for additions.
pub fn diff_roles(current: &[String], desired: &[String]) -> RoleDiff {
    let mut diff = RoleDiff::default();

    for role in desired {
        if !current.contains(role) && !diff.added.contains(role) {
            diff.added.push(role.clone());
        }
    }

    for role in current {
        if !desired.contains(role) && !diff.removed.contains(role) {
            diff.removed.push(role.clone());
        }
    }

    diff
}

#[derive(Clone)]
pub struct RoleService {
    roles: RoleRepository,
    mappings: RoleMappingRepository,
}

impl RoleService {
    pub fn new(db: &Database) -> Self {
        Self {
            roles: RoleRepository::new(db.pool().clone()),
            mappings: RoleMappingRepository::new(db.pool().clone()),
        }
    }

    pub async fn create(&self, role: NewRole) -> Result<Role> {
        role.validate()?;
        let role = self.roles.create(&role).await?;
        tracing::info!("Role created: id={}, name={}", role.id, role.name);
        Ok(role)
    }

    pub async fn get(&self, id: i64) -> Result<Role> {
        Ok(self.roles.find_by_id(id).await?)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Role>> {
        Ok(self.roles.list(limit, offset).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.roles.count().await?)
    }

    pub async fn update(&self, id: i64, update: UpdateRole) -> Result<Role> {
        update.validate()?;
        Ok(self.roles.update(id, &update).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.roles.delete(id).await? {
            return Err(DatabaseError::not_found("Role", &id.to_string()).into());
        }
        tracing::info!("Role deleted: id={}", id);
        Ok(())
    }

    /// Grant a global role, no-op when already held
    pub async fn add_role_to_user(&self, user_id: Uuid, role: &str) -> Result<()> {
        self.mappings.add(RoleHolder::User(user_id), role).await?;
        Ok(())
    }

    pub async fn roles_of(&self, holder: RoleHolder) -> Result<Vec<String>> {
        Ok(self.mappings.roles(holder).await?)
    }

    /// Replace the role set of `holder` with `desired`
    pub async fn set_roles(&self, holder: RoleHolder, desired: &[String]) -> Result<RoleDiff> {
        let current = self.mappings.roles(holder).await?;
        let diff = diff_roles(&current, desired);

        if !diff.is_empty() {
            self.mappings.apply(holder, &diff.added, &diff.removed).await?;
            tracing::info!(
                "Roles updated for {:?}: added={:?}, removed={:?}",
                holder,
                diff.added,
                diff.removed
            );
        }

        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_diff_adds_and_removes() {
        let diff = diff_roles(&names(&["ADMIN", "USER"]), &names(&["USER", "ORG_USER_MANAGER"]));

        assert_eq!(diff.added, names(&["ORG_USER_MANAGER"]));
        assert_eq!(diff.removed, names(&["ADMIN"]));
    }

    #[test]
    fn test_diff_identical_sets() {
        let diff = diff_roles(&names(&["A", "B"]), &names(&["B", "A"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_ignores_duplicates() {
        let diff = diff_roles(&names(&["A", "A"]), &names(&["B", "B", "C"]));

        assert_eq!(diff.added, names(&["B", "C"]));
        assert_eq!(diff.removed, names(&["A"]));
    }

    #[test]
    fn test_diff_to_empty_removes_everything() {
        let diff = diff_roles(&names(&["A", "B"]), &[]);

        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, names(&["A", "B"]));
    }
}
