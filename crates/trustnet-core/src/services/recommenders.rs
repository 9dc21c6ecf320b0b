//! Recommender suggestion service

use crate::AppCore;
use crate::error::Result;
use crate::models::UserId;
use crate::scoring::{RecommenderScorer, Suggestion};
use std::sync::Arc;
use tracing::debug;

fn scorer(core: &Arc<AppCore>) -> RecommenderScorer<'_> {
    RecommenderScorer::new(
        &core.storage.users,
        &core.storage.recommendations,
        &core.storage.connections,
        &core.scoring,
    )
}

/// Best recommenders in the asker's network for `query`.
pub async fn suggest(core: &Arc<AppCore>, asker: &UserId, query: &str) -> Result<Vec<Suggestion>> {
    let suggestions = scorer(core).suggest(asker, query)?;
    debug!(%asker, query, count = suggestions.len(), "Suggested recommenders");
    Ok(suggestions)
}

pub async fn score(
    core: &Arc<AppCore>,
    asker: &UserId,
    candidate: &UserId,
    query: &str,
) -> Result<u8> {
    scorer(core).score(asker, candidate, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Degree, ProviderDetails, Review, ReviewDetails, UserSignals, Visibility,
    };
    use crate::services::connections::connect;
    use crate::services::recommendations::{NewRecommendation, create_recommendation};
    use crate::services::test_support::{create_test_core, create_user};
    use crate::services::users::{record_activity, update_signals};

    #[tokio::test]
    async fn test_plumber_scenario_through_storage() {
        let (core, _tmp) = create_test_core().await;
        let a = create_user(&core, "a", Some("NY")).await;
        let b = create_user(&core, "b", Some("NY")).await;
        connect(&core, &a, &b).await.unwrap();
        record_activity(&core, &b).await.unwrap();
        update_signals(
            &core,
            &b,
            UserSignals {
                trust_score: Some(50.0),
                response_rate: Some(0.9),
            },
        )
        .await
        .unwrap();

        let owner = create_user(&core, "owner", None).await;
        let rec = create_recommendation(
            &core,
            NewRecommendation {
                owner,
                provider: ProviderDetails {
                    name: "Joe's Plumbing".to_string(),
                    ..Default::default()
                },
                tags: vec!["plumber".to_string()],
                visibility: Visibility::Public,
                communities: Vec::new(),
            },
        )
        .await
        .unwrap();
        core.storage
            .recommendations
            .add_review(&Review::new(rec.id, b.clone(), ReviewDetails::default(), None))
            .unwrap();

        assert_eq!(score(&core, &a, &b, "plumber").await.unwrap(), 83);

        let suggestions = suggest(&core, &a, "plumber").await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].user.id, b);
        assert_eq!(suggestions[0].score, 83);
    }

    #[tokio::test]
    async fn test_query_with_colon_matches_reviewed_tag() {
        let (core, _tmp) = create_test_core().await;
        let a = create_user(&core, "a", Some("NY")).await;
        let b = create_user(&core, "b", Some("NY")).await;
        connect(&core, &a, &b).await.unwrap();

        let rec = create_recommendation(
            &core,
            NewRecommendation {
                owner: b.clone(),
                provider: ProviderDetails {
                    name: "Cool Air".to_string(),
                    ..Default::default()
                },
                tags: vec!["HVAC: Repair".to_string()],
                visibility: Visibility::Public,
                communities: Vec::new(),
            },
        )
        .await
        .unwrap();
        core.storage
            .recommendations
            .add_review(&Review::new(rec.id, b.clone(), ReviewDetails::default(), None))
            .unwrap();

        let relevant = score(&core, &a, &b, "hvac: repair").await.unwrap();
        let unrelated = score(&core, &a, &b, "plumber").await.unwrap();
        assert!(relevant > unrelated);

        let suggestions = suggest(&core, &a, "HVAC: repair").await.unwrap();
        assert_eq!(suggestions[0].user.id, b);
        assert_eq!(suggestions[0].score, relevant);
    }

    #[tokio::test]
    async fn test_score_matches_suggest_at_second_degree() {
        let (core, _tmp) = create_test_core().await;
        let a = create_user(&core, "a", Some("NY")).await;
        let b = create_user(&core, "b", None).await;
        let c = create_user(&core, "c", Some("NY")).await;
        connect(&core, &a, &b).await.unwrap();
        connect(&core, &b, &c).await.unwrap();
        update_signals(
            &core,
            &c,
            UserSignals {
                trust_score: Some(20.0),
                response_rate: Some(0.95),
            },
        )
        .await
        .unwrap();

        let direct = score(&core, &a, &c, "plumber").await.unwrap();
        let suggestions = suggest(&core, &a, "plumber").await.unwrap();
        let entry = suggestions
            .iter()
            .find(|suggestion| suggestion.user.id == c)
            .unwrap();
        assert_eq!(entry.degree, Degree::Second);
        assert_eq!(entry.score, direct);
    }
}
