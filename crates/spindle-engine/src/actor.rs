//! Actor resolution for privileged calls.
//!
//! Authorization is owned by middleware outside the engine; what crosses
//! the boundary is an explicit [`Actor`] resolved from a token. There is
//! no ambient "current token" state anywhere in the engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spindle_types::TenantId;

use crate::{EngineError, Result};

/// Role attached to a resolved token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Manager,
    EndUser,
}

impl ActorRole {
    /// Whether the role may perform manager actions (approvals, grants,
    /// voiding, audit reads).
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// The resolved identity behind a privileged call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub tenant_id: TenantId,
    pub role: ActorRole,
}

/// Token-to-actor resolution, implemented by the auth collaborator.
pub trait ActorResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Actor>;
}

/// Fixed token table, for tests and local tooling.
#[derive(Default)]
pub struct StaticResolver {
    actors: HashMap<String, Actor>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: &str, actor: Actor) -> Self {
        self.actors.insert(token.to_string(), actor);
        self
    }
}

impl ActorResolver for StaticResolver {
    fn resolve(&self, token: &str) -> Result<Actor> {
        self.actors.get(token).copied().ok_or(EngineError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new().with(
            "tok-1",
            Actor { tenant_id: 7, role: ActorRole::Manager },
        );
        let actor = resolver.resolve("tok-1").expect("resolve");
        assert_eq!(actor.tenant_id, 7);
        assert!(actor.role.can_manage());

        assert!(matches!(resolver.resolve("unknown"), Err(EngineError::AccessDenied)));
    }

    #[test]
    fn test_end_user_cannot_manage() {
        assert!(!ActorRole::EndUser.can_manage());
        assert!(ActorRole::Admin.can_manage());
    }
}
