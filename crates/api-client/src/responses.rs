use core_types::User;
use serde::Deserialize;

/// The parts of an identity API response we rely on. Sign-up and password
/// sign-in both nest the account under `user`; everything else (provider
/// tokens, metadata) is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEnvelope {
    pub user: Option<IdentityUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
}

impl From<IdentityUser> for User {
    fn from(user: IdentityUser) -> Self {
        User {
            id: user.id,
            email: user.email,
        }
    }
}
