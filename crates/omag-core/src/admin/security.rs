use crate::error::OmagError;
use crate::validation::validate_user_id;

/// Platform-level authorization for administration and operational requests.
#[derive(Debug, Clone, Default)]
pub struct PlatformSecurity {
    admin_users: Vec<String>,
}

impl PlatformSecurity {
    /// An empty list lets any user administer the platform.
    pub fn new(admin_users: Vec<String>) -> Self {
        Self { admin_users }
    }

    pub fn check_admin(&self, user_id: &str) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        if self.admin_users.is_empty() || self.admin_users.iter().any(|u| u == user_id) {
            return Ok(());
        }
        tracing::warn!(%user_id, "Rejected platform administration request");
        Err(OmagError::not_authorized(
            user_id,
            "the user is not a platform administrator",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_platform() {
        assert!(PlatformSecurity::default().check_admin("anyone").is_ok());
        assert!(PlatformSecurity::default().check_admin("").is_err());
    }

    #[test]
    fn test_admin_allow_list() {
        let security = PlatformSecurity::new(vec!["garygeeke".into()]);
        assert!(security.check_admin("garygeeke").is_ok());
        let err = security.check_admin("erinoverview").unwrap_err();
        assert_eq!(err.http_status(), 403);
    }
}
