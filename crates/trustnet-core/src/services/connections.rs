//! Connection graph service

use crate::AppCore;
use crate::error::{CoreError, Result};
use crate::graph::ConnectionGraph;
use crate::models::{Degree, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Connect two users. Returns `true` when a new edge was written.
pub async fn connect(core: &Arc<AppCore>, from: &UserId, to: &UserId) -> Result<bool> {
    if from == to {
        return Err(CoreError::validation("cannot connect a user to themselves"));
    }
    for id in [from, to] {
        if !core.storage.users.exists(id)? {
            return Err(CoreError::not_found(format!("user {id}")));
        }
    }

    let created = core.storage.connections.connect(from, to)?;
    if created {
        info!(%from, %to, "Connected users");
    }
    Ok(created)
}

pub async fn is_connected(core: &Arc<AppCore>, a: &UserId, b: &UserId) -> Result<bool> {
    core.storage.connections.is_connected(a, b)
}

/// First- and second-degree users around `user`.
pub async fn network(core: &Arc<AppCore>, user: &UserId) -> Result<BTreeMap<UserId, Degree>> {
    if !core.storage.users.exists(user)? {
        return Err(CoreError::not_found(format!("user {user}")));
    }
    ConnectionGraph::new(&core.storage.connections).network(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{create_test_core, create_user};

    #[tokio::test]
    async fn test_connect_validates_users() {
        let (core, _tmp) = create_test_core().await;
        let a = create_user(&core, "a", None).await;

        assert!(matches!(
            connect(&core, &a, &a).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            connect(&core, &a, &UserId::from("ghost")).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_network_reports_degrees() {
        let (core, _tmp) = create_test_core().await;
        let a = create_user(&core, "a", None).await;
        let b = create_user(&core, "b", None).await;
        let c = create_user(&core, "c", None).await;

        assert!(connect(&core, &a, &b).await.unwrap());
        assert!(!connect(&core, &b, &a).await.unwrap());
        connect(&core, &c, &b).await.unwrap();

        let network = network(&core, &a).await.unwrap();
        assert_eq!(network.get(&b), Some(&Degree::First));
        assert_eq!(network.get(&c), Some(&Degree::Second));
        assert_eq!(network.len(), 2);
        assert!(is_connected(&core, &b, &c).await.unwrap());
    }
}
