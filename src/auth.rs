use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{User, UserLevel};

/// Fields a profile update may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub level: Option<UserLevel>,
    pub streak: Option<u32>,
    pub total_words_learned: Option<u32>,
    pub total_points: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    user: Option<User>,
    is_authenticated: bool,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn sign_in(&mut self, user: User) {
        info!(user_id = %user.id, "signed in");
        self.user = Some(user);
        self.is_authenticated = true;
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "signed out");
        }
        self.is_authenticated = false;
    }

    /// Applies `patch` to the signed-in user. Returns false when nobody is signed in.
    pub fn update_profile(&mut self, patch: ProfilePatch) -> bool {
        let Some(user) = self.user.as_mut() else {
            return false;
        };

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(level) = patch.level {
            user.level = level;
        }
        if let Some(streak) = patch.streak {
            user.streak = streak;
        }
        if let Some(total) = patch.total_words_learned {
            user.total_words_learned = total;
        }
        if let Some(total) = patch.total_points {
            user.total_points = total;
        }
        true
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    pub fn restore(&mut self, snapshot: AuthSnapshot) {
        self.is_authenticated = snapshot.is_authenticated && snapshot.user.is_some();
        self.user = snapshot.user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: "42".to_string(),
            email: "learner@example.com".to_string(),
            name: "Learner".to_string(),
            avatar: None,
            level: UserLevel::Intermediate,
            streak: 5,
            total_words_learned: 150,
            total_points: 0,
            created_at: Utc::now(),
            last_active_at: None,
        }
    }

    #[test]
    fn test_sign_in_and_logout() {
        let mut auth = AuthState::default();
        assert!(!auth.is_authenticated());

        auth.sign_in(user());
        assert_eq!(auth.user_id(), Some("42"));
        assert!(auth.is_authenticated());

        auth.logout();
        assert!(auth.user().is_none());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_update_profile_requires_user() {
        let mut auth = AuthState::default();
        assert!(!auth.update_profile(ProfilePatch::default()));

        auth.sign_in(user());
        assert!(auth.update_profile(ProfilePatch {
            name: Some("Renamed".to_string()),
            level: Some(UserLevel::Advanced),
            ..Default::default()
        }));
        let u = auth.user().unwrap();
        assert_eq!(u.name, "Renamed");
        assert_eq!(u.level, UserLevel::Advanced);
        assert_eq!(u.email, "learner@example.com");
    }

    #[test]
    fn test_restore_without_user_is_signed_out() {
        let mut auth = AuthState::default();
        auth.restore(AuthSnapshot {
            user: None,
            is_authenticated: true,
        });
        assert!(!auth.is_authenticated());
    }
}
