//! Login credentials.

use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Account handle or DID.
    #[serde(default)]
    pub handle: String,

    /// App password. Master passwords are rejected at login.
    #[serde(default)]
    pub app_password: String,
}

impl SessionConfig {
    /// Check if both login fields are present.
    pub fn is_configured(&self) -> bool {
        !self.handle.is_empty() && !self.app_password.is_empty()
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("handle", &self.handle)
            .field(
                "app_password",
                &if self.app_password.is_empty() { "" } else { "<redacted>" },
            )
            .finish()
    }
}
