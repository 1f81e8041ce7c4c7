//! Token-to-actor resolution for the RPC surface.
//!
//! Two token forms are accepted on the local socket:
//!
//! - `admin:<tenant_id>` — tenant admin, trusted because the socket is
//!   filesystem-permissioned
//! - `mgr:<manager_id>:<pin>` — manager, verified against the stored
//!   Argon2id PIN hash

use rusqlite::Connection;
use spindle_engine::actor::{Actor, ActorRole};
use spindle_engine::{managers, EngineError};
use spindle_types::ManagerId;

use crate::rpc::RpcError;

/// Resolve a token into an actor, or the manager id it names.
pub fn resolve(conn: &Connection, token: &str) -> Result<(Actor, Option<ManagerId>), RpcError> {
    let mut parts = token.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("admin"), Some(tenant), None) => {
            let tenant_id = tenant
                .parse()
                .map_err(|_| RpcError::invalid_params("bad tenant id in token"))?;
            Ok((Actor { tenant_id, role: ActorRole::Admin }, None))
        }
        (Some("mgr"), Some(manager), Some(pin)) => {
            let manager_id: ManagerId = manager
                .parse()
                .map_err(|_| RpcError::invalid_params("bad manager id in token"))?;
            let ok = managers::authenticate_manager(conn, manager_id, pin)
                .map_err(|e| RpcError::from_engine(&e))?;
            if !ok {
                return Err(RpcError::from_engine(&EngineError::AccessDenied));
            }
            let manager = spindle_db::queries::managers::get(conn, manager_id)
                .map_err(|e| RpcError::from_engine(&EngineError::from(e)))?;
            Ok((
                Actor { tenant_id: manager.tenant_id, role: ActorRole::Manager },
                Some(manager_id),
            ))
        }
        _ => Err(RpcError::invalid_params("unrecognized token format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_db::queries::tenants;

    #[test]
    fn test_admin_token() {
        let conn = spindle_db::open_memory().expect("open");
        let (actor, manager) = resolve(&conn, "admin:7").expect("resolve");
        assert_eq!(actor.tenant_id, 7);
        assert_eq!(actor.role, ActorRole::Admin);
        assert_eq!(manager, None);
    }

    #[test]
    fn test_manager_token_round_trip() {
        let conn = spindle_db::open_memory().expect("open");
        let tenant = tenants::insert(&conn, "acme", None, None, 0).expect("tenant");
        let manager =
            managers::create_manager(&conn, tenant, "alice", "4321", 5, 20, 0).expect("manager");

        let token = format!("mgr:{}:4321", manager.id);
        let (actor, resolved) = resolve(&conn, &token).expect("resolve");
        assert_eq!(actor.tenant_id, tenant);
        assert_eq!(actor.role, ActorRole::Manager);
        assert_eq!(resolved, Some(manager.id));

        let bad = format!("mgr:{}:0000", manager.id);
        assert!(resolve(&conn, &bad).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let conn = spindle_db::open_memory().expect("open");
        assert!(resolve(&conn, "what-is-this").is_err());
        assert!(resolve(&conn, "admin:not-a-number").is_err());
    }
}
