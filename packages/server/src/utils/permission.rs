//! Role to permission mapping.
//!
//! Permissions are embedded in the login token, so a role change takes effect
//! on the next login.

pub const CATALOG_CREATE: &str = "catalog:create";
pub const CATALOG_EDIT: &str = "catalog:edit";
pub const CATALOG_DELETE: &str = "catalog:delete";

pub const ADMIN_ROLE: &str = "admin";

const ROLE_PERMISSIONS: &[(&str, &[&str])] = &[
    (ADMIN_ROLE, &[CATALOG_CREATE, CATALOG_EDIT, CATALOG_DELETE]),
    (crate::entity::user::DEFAULT_ROLE, &[]),
];

/// Permissions granted to a role. Unknown roles get none.
pub fn permissions_for_role(role: &str) -> Vec<String> {
    ROLE_PERMISSIONS
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, perms)| perms.iter().map(|p| p.to_string()).collect())
        .unwrap_or_default()
}
