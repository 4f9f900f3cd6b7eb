/// Identity used when nobody is signed in.
pub const DEMO_USER_ID: &str = "demo_user";

/// Source of the authenticated user, owned by whatever handles sign-in.
pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<String>;
}

/// Identity handed over on the command line or in the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    pub user_id: Option<String>,
}

impl IdentityProvider for ConfiguredIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Authenticated,
    Demo,
}

/// The user every read and write is scoped to. Resolved once and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    mode: SessionMode,
}

impl Session {
    /// Resolve the active user. Demo mode always uses the sentinel identity;
    /// otherwise the provider's user is used, falling back to the sentinel
    /// when the provider has nobody signed in.
    pub fn resolve(demo: bool, provider: &dyn IdentityProvider, demo_user_id: &str) -> Self {
        let demo_user_id = if demo_user_id.trim().is_empty() {
            DEMO_USER_ID
        } else {
            demo_user_id.trim()
        };

        if demo {
            return Self::demo(demo_user_id);
        }

        match provider.current_user_id() {
            Some(user_id) => Self { user_id, mode: SessionMode::Authenticated },
            None => {
                log::info!("No signed-in user, falling back to demo identity");
                Self::demo(demo_user_id)
            }
        }
    }

    fn demo(user_id: &str) -> Self {
        Self { user_id: user_id.to_string(), mode: SessionMode::Demo }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_demo(&self) -> bool {
        self.mode == SessionMode::Demo
    }

    /// Name shown in the dashboard greeting
    pub fn display_name(&self) -> &str {
        match self.mode {
            SessionMode::Demo => "Demo User",
            SessionMode::Authenticated => &self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(id: &str) -> ConfiguredIdentity {
        ConfiguredIdentity { user_id: Some(id.to_string()) }
    }

    #[test]
    fn demo_flag_wins_over_identity() {
        let session = Session::resolve(true, &signed_in("user_2abc"), DEMO_USER_ID);
        assert_eq!(session.user_id(), "demo_user");
        assert!(session.is_demo());
        assert_eq!(session.display_name(), "Demo User");
    }

    #[test]
    fn authenticated_user_is_used() {
        let session = Session::resolve(false, &signed_in("user_2abc"), DEMO_USER_ID);
        assert_eq!(session.user_id(), "user_2abc");
        assert_eq!(session.mode(), SessionMode::Authenticated);
    }

    #[test]
    fn missing_identity_falls_back_to_demo() {
        let session = Session::resolve(false, &ConfiguredIdentity { user_id: Some("  ".into()) }, DEMO_USER_ID);
        assert_eq!(session.user_id(), "demo_user");
        assert!(session.is_demo());
    }

    #[test]
    fn blank_demo_id_uses_sentinel() {
        let session = Session::resolve(true, &ConfiguredIdentity::default(), "");
        assert_eq!(session.user_id(), DEMO_USER_ID);
    }
}
