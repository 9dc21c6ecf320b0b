//! End-to-end scenarios over a real redb file.

use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::TempDir;
use trustnet_core::graph::ConnectionGraph;
use trustnet_core::services::{asks, communities, connections, recommendations, users};
use trustnet_core::{
    AppCore, CoreError, EffectiveAskStatus, ProviderDetails, ReviewDetails, UserId, UserProfile,
    Visibility,
};

async fn setup() -> (Arc<AppCore>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("trustnet.db");
    let core = AppCore::new(db_path.to_str().unwrap()).await.unwrap();
    (Arc::new(core), temp_dir)
}

async fn user(core: &Arc<AppCore>, name: &str) -> UserId {
    let profile = UserProfile {
        display_name: name.to_string(),
        ..Default::default()
    };
    users::resolve_user(core, &format!("auth|{name}"), profile)
        .await
        .unwrap()
        .id
}

fn provider(name: &str) -> ProviderDetails {
    ProviderDetails {
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn approval_connects_new_member_to_every_member() {
    let (core, _tmp) = setup().await;
    let x = user(&core, "x").await;
    let y = user(&core, "y").await;
    let z = user(&core, "z").await;

    let club = communities::create_community(&core, &x, "Club").await.unwrap();
    communities::request_join(&core, &club.id, &y).await.unwrap();
    communities::approve_member(&core, &club.id, &y, &x).await.unwrap();

    assert_eq!(
        core.storage.connections.neighbors_of(&x).unwrap(),
        BTreeSet::from([y.clone()])
    );

    communities::request_join(&core, &club.id, &z).await.unwrap();
    let outcome = communities::approve_member(&core, &club.id, &z, &x).await.unwrap();
    assert_eq!(outcome.new_connections.len(), 2);

    assert!(connections::is_connected(&core, &z, &x).await.unwrap());
    assert!(connections::is_connected(&core, &z, &y).await.unwrap());
    // X-Y came from the first approval and was not rewritten.
    assert_eq!(
        core.storage.connections.neighbors_of(&x).unwrap(),
        BTreeSet::from([y.clone(), z.clone()])
    );

    let edges_before = edge_snapshot(&core, &[&x, &y, &z]);
    let again = communities::approve_member(&core, &club.id, &z, &x).await;
    assert!(matches!(again, Err(CoreError::NoPendingRequest)));
    assert_eq!(edge_snapshot(&core, &[&x, &y, &z]), edges_before);
}

fn edge_snapshot(core: &Arc<AppCore>, members: &[&UserId]) -> Vec<BTreeSet<UserId>> {
    members
        .iter()
        .map(|member| core.storage.connections.neighbors_of(member).unwrap())
        .collect()
}

#[tokio::test]
async fn approval_by_non_owner_changes_nothing() {
    let (core, _tmp) = setup().await;
    let owner = user(&core, "owner").await;
    let member = user(&core, "member").await;
    let joiner = user(&core, "joiner").await;

    let club = communities::create_community(&core, &owner, "Club").await.unwrap();
    communities::request_join(&core, &club.id, &member).await.unwrap();
    communities::approve_member(&core, &club.id, &member, &owner).await.unwrap();
    communities::request_join(&core, &club.id, &joiner).await.unwrap();

    let result = communities::approve_member(&core, &club.id, &joiner, &member).await;
    assert!(matches!(result, Err(CoreError::NotAuthorized)));
    assert!(core.storage.connections.neighbors_of(&joiner).unwrap().is_empty());
    assert_eq!(
        communities::list_pending(&core, &club.id, &owner).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn declined_ask_disappears_for_decliner_only() {
    let (core, _tmp) = setup().await;
    let asker = user(&core, "asker").await;
    let r1 = user(&core, "r1").await;
    let r2 = user(&core, "r2").await;
    let outsider = user(&core, "outsider").await;

    let ask = asks::create_ask(
        &core,
        asks::NewAsk {
            asker: asker.clone(),
            recipients: vec![r1.clone(), r2.clone()],
            title: "Need a plumber".to_string(),
            description: String::new(),
            query: Some("plumber".to_string()),
        },
    )
    .await
    .unwrap();

    asks::decline_ask(&core, &ask.id, &r1).await.unwrap();

    assert!(asks::list_inbound(&core, &r1).await.unwrap().is_empty());
    let inbound = asks::list_inbound(&core, &r2).await.unwrap();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].status, EffectiveAskStatus::Pending);

    // Non-recipients are rejected whatever the ask's state.
    assert!(matches!(
        asks::decline_ask(&core, &ask.id, &outsider).await,
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        asks::respond(&core, &ask.id, &outsider, "hi").await,
        Err(CoreError::Forbidden(_))
    ));

    asks::fulfill_ask(&core, &ask.id, &r2, provider("Joe"), ReviewDetails::default())
        .await
        .unwrap();
    for non_recipient in [&outsider, &asker] {
        assert!(matches!(
            asks::decline_ask(&core, &ask.id, non_recipient).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            asks::respond(&core, &ask.id, non_recipient, "hi").await,
            Err(CoreError::Forbidden(_))
        ));
    }
    assert!(
        asks::list_responses(&core, &ask.id, &asker)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn fulfillment_is_visible_to_connected_asker() {
    let (core, _tmp) = setup().await;
    let asker = user(&core, "asker").await;
    let friend = user(&core, "friend").await;
    connections::connect(&core, &asker, &friend).await.unwrap();

    let ask = asks::bump_network(&core, &asker, "Electrician", "Wiring", "")
        .await
        .unwrap();
    let done = asks::fulfill_ask(
        &core,
        &ask.id,
        &friend,
        ProviderDetails {
            name: "Sparky".to_string(),
            email: Some("sparky@example.com".to_string()),
            ..Default::default()
        },
        ReviewDetails {
            rating: Some(5),
            text: "Fast and tidy".to_string(),
        },
    )
    .await
    .unwrap();

    let rec_id = done.ask.recommendation_id.clone().unwrap();
    let rec = recommendations::get_recommendation(&core, &rec_id, &asker)
        .await
        .unwrap();
    assert!(rec.has_tag("electrician"));
    assert_eq!(
        recommendations::list_reviews(&core, &rec_id, &asker).await.unwrap().len(),
        1
    );

    let second = asks::fulfill_ask(
        &core,
        &ask.id,
        &friend,
        provider("Other"),
        ReviewDetails::default(),
    )
    .await;
    assert!(matches!(second, Err(CoreError::AlreadyFulfilled)));
}

#[tokio::test]
async fn visibility_follows_scope() {
    let (core, _tmp) = setup().await;
    let owner = user(&core, "owner").await;
    let friend = user(&core, "friend").await;
    let neighbor = user(&core, "neighbor").await;
    let stranger = user(&core, "stranger").await;
    connections::connect(&core, &owner, &friend).await.unwrap();

    // Joining neighbor's board connects owner and neighbor.
    let club = communities::create_community(&core, &owner, "Club").await.unwrap();
    let board = communities::create_community(&core, &neighbor, "Board").await.unwrap();
    communities::request_join(&core, &board.id, &owner).await.unwrap();
    communities::approve_member(&core, &board.id, &owner, &neighbor).await.unwrap();

    let mut ids = Vec::new();
    for visibility in [
        Visibility::Private,
        Visibility::Connections,
        Visibility::Communities,
        Visibility::Public,
    ] {
        let rec = recommendations::create_recommendation(
            &core,
            recommendations::NewRecommendation {
                owner: owner.clone(),
                provider: provider("Provider"),
                tags: Vec::new(),
                visibility,
                communities: vec![board.id.clone(), club.id.clone()],
            },
        )
        .await
        .unwrap();
        ids.push((visibility, rec.id));
    }

    let count = |viewer: UserId| {
        let core = core.clone();
        async move {
            recommendations::list_visible(&core, &viewer)
                .await
                .unwrap()
                .len()
        }
    };

    assert!(connections::is_connected(&core, &owner, &neighbor).await.unwrap());
    assert_eq!(count(owner.clone()).await, 4);
    assert_eq!(count(neighbor.clone()).await, 3);
    // Connected but in none of the shared communities.
    assert_eq!(count(friend.clone()).await, 2);
    assert_eq!(count(stranger.clone()).await, 1);

    // The single-record path agrees with the batch path.
    for (visibility, id) in &ids {
        for viewer in [&owner, &friend, &neighbor, &stranger] {
            let single = recommendations::get_recommendation(&core, id, viewer).await.is_ok();
            let batch = recommendations::list_visible(&core, viewer)
                .await
                .unwrap()
                .iter()
                .any(|rec| &rec.id == id);
            assert_eq!(single, batch, "{visibility:?} for {viewer}");
        }
    }
}

#[tokio::test]
async fn degrees_partition_the_network() {
    let (core, _tmp) = setup().await;
    let names = ["a", "b", "c", "d", "e", "f"];
    let mut ids = Vec::new();
    for name in names {
        ids.push(user(&core, name).await);
    }
    for (i, j) in [(0, 1), (1, 2), (2, 3), (0, 4), (4, 2), (5, 5)] {
        let _ = connections::connect(&core, &ids[i], &ids[j]).await;
    }

    let graph = ConnectionGraph::new(&core.storage.connections);
    for id in &ids {
        let first = graph.first_degree(id).unwrap();
        let second = graph.second_degree(id).unwrap();
        assert!(first.is_disjoint(&second));
        assert!(!first.contains(id) && !second.contains(id));
        for other in &ids {
            assert_eq!(
                graph.is_connected(id, other).unwrap(),
                graph.is_connected(other, id).unwrap()
            );
        }
    }
    assert_eq!(graph.second_degree(&ids[0]).unwrap(), BTreeSet::from([ids[2].clone()]));
}
