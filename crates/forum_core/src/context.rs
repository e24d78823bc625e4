//! Request-scoped context passed explicitly into workflow calls.

use crate::config::{ForumConfig, RewardConfig};
use crate::model::user::User;

/// Authenticated user plus the settings a single request needs.
///
/// Built by the request-dispatch layer from the session and the loaded
/// configuration; services never read either ambiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user: User,
    pub reward: RewardConfig,
}

impl RequestContext {
    pub fn new(user: User, reward: RewardConfig) -> Self {
        Self { user, reward }
    }

    /// Context for `user` with the reward settings of a loaded config.
    pub fn from_config(user: User, config: &ForumConfig) -> Self {
        Self::new(user, config.reward)
    }
}

#[cfg(test)]
mod tests {
    use super::RequestContext;
    use crate::config::ForumConfig;
    use crate::model::user::User;

    #[test]
    fn from_config_copies_reward_settings() {
        let config = ForumConfig::from_toml_str("[reward]\nnew_reply = 12").unwrap();
        let user = User::new("alice");

        let ctx = RequestContext::from_config(user.clone(), &config);

        assert_eq!(ctx.user, user);
        assert_eq!(ctx.reward.new_reply, 12);
    }
}
