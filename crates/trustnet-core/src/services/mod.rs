//! Service layer: the operations the server exposes, over a shared
//! [`AppCore`](crate::AppCore).

pub mod asks;
pub mod communities;
pub mod connections;
pub mod recommendations;
pub mod recommenders;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::AppCore;
    use crate::models::{UserId, UserProfile};
    use std::sync::Arc;
    use tempfile::TempDir;

    pub async fn create_test_core() -> (Arc<AppCore>, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let core = AppCore::new(db_path.to_str().unwrap()).await.unwrap();
        (Arc::new(core), temp_dir)
    }

    pub async fn create_user(core: &Arc<AppCore>, name: &str, state: Option<&str>) -> UserId {
        let profile = UserProfile {
            display_name: name.to_string(),
            state: state.map(str::to_string),
            ..Default::default()
        };
        super::users::resolve_user(core, &format!("auth|{name}"), profile)
            .await
            .unwrap()
            .id
    }
}
