//! Recommender scoring: ranks a user's network by how likely each member is
//! to give a useful recommendation for a query.
//!
//! The score is a fixed weighted sum of independent signals. `score` and
//! `suggest` share [`RecommenderScorer::evaluate`], so a candidate gets the
//! same number from either path.

use crate::error::{CoreError, Result};
use crate::graph::{ConnectionGraph, Neighbors};
use crate::models::{Degree, User, UserId, normalize_tag};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_SCORE: u8 = 100;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

const RECENT_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;
const RECENT_POINTS: f64 = 25.0;
const MONTH_POINTS: f64 = 10.0;
const RELEVANCE_POINTS: f64 = 25.0;
const TRUST_WEIGHT: f64 = 0.20;
const STATE_POINTS: f64 = 10.0;
const LOCATION_POINTS: f64 = 5.0;
const FIRST_DEGREE_POINTS: f64 = 10.0;
const EXTENDED_POINTS: f64 = 3.0;
const RESPONSIVE_THRESHOLD: f64 = 0.8;
const RESPONSIVE_WEIGHT: f64 = 25.0;

/// Read access to user records.
pub trait UserDirectory {
    fn get_user(&self, id: &UserId) -> Result<Option<User>>;
}

/// Whether a reviewer has reviewed a recommendation carrying a tag.
pub trait ReviewLookup {
    fn has_reviewed_tag(&self, reviewer: &UserId, tag: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// How many candidates `suggest` returns.
    pub suggestion_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub points: f64,
    pub reason: String,
}

impl Signal {
    fn new(points: f64, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub reason: Option<String>,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub user: User,
    pub degree: Degree,
    pub score: u8,
    pub reason: String,
}

pub fn recency_signal(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Signal> {
    let elapsed = now - last_active_at?;
    if elapsed <= Duration::days(RECENT_DAYS) {
        Some(Signal::new(RECENT_POINTS, "recently active"))
    } else if elapsed <= Duration::days(MONTH_DAYS) {
        Some(Signal::new(MONTH_POINTS, "active in the last month"))
    } else {
        None
    }
}

pub fn relevance_signal(has_reviewed: bool, query: &str) -> Option<Signal> {
    has_reviewed.then(|| {
        Signal::new(
            RELEVANCE_POINTS,
            format!("has recommended {query} providers"),
        )
    })
}

pub fn trust_signal(trust_score: f64) -> Option<Signal> {
    let points = trust_score * TRUST_WEIGHT;
    (points > 0.0).then(|| Signal::new(points, "highly trusted"))
}

/// One signal worth the state points, plus the location bonus when the
/// location also matches. Location never counts without a state match.
pub fn geographic_signal(asker: &User, candidate: &User) -> Option<Signal> {
    let same_state = matches!(
        (&asker.state, &candidate.state),
        (Some(a), Some(b)) if a == b
    );
    if !same_state {
        return None;
    }
    let same_location = matches!(
        (&asker.location, &candidate.location),
        (Some(a), Some(b)) if a == b
    );
    if same_location {
        Some(Signal::new(STATE_POINTS + LOCATION_POINTS, "lives in your area"))
    } else {
        Some(Signal::new(STATE_POINTS, "lives in your state"))
    }
}

pub fn proximity_signal(degree: Option<Degree>) -> Signal {
    match degree {
        Some(Degree::First) => Signal::new(FIRST_DEGREE_POINTS, "direct connection"),
        Some(Degree::Second) | None => Signal::new(EXTENDED_POINTS, "friend of a friend"),
    }
}

pub fn responsiveness_signal(response_rate: Option<f64>) -> Option<Signal> {
    let rate = response_rate?;
    (rate > RESPONSIVE_THRESHOLD).then(|| {
        Signal::new(
            (rate - RESPONSIVE_THRESHOLD) * RESPONSIVE_WEIGHT,
            "responds quickly",
        )
    })
}

/// Sum, trim float noise, round up and cap.
pub fn final_score(signals: &[Signal]) -> u8 {
    let sum: f64 = signals.iter().map(|signal| signal.points).sum();
    let trimmed = (sum * 1e6).round() / 1e6;
    trimmed.ceil().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Reason of the highest-weighted signal; the earlier one wins a tie.
pub fn top_reason(signals: &[Signal]) -> Option<String> {
    let mut best: Option<&Signal> = None;
    for signal in signals {
        if best.is_none_or(|current| signal.points > current.points) {
            best = Some(signal);
        }
    }
    best.map(|signal| signal.reason.clone())
}

pub struct RecommenderScorer<'a> {
    users: &'a dyn UserDirectory,
    reviews: &'a dyn ReviewLookup,
    graph: ConnectionGraph<'a, dyn Neighbors + 'a>,
    config: &'a ScoringConfig,
    now: DateTime<Utc>,
}

impl<'a> RecommenderScorer<'a> {
    pub fn new(
        users: &'a dyn UserDirectory,
        reviews: &'a dyn ReviewLookup,
        neighbors: &'a (dyn Neighbors + 'a),
        config: &'a ScoringConfig,
    ) -> Self {
        Self {
            users,
            reviews,
            graph: ConnectionGraph::new(neighbors),
            config,
            now: Utc::now(),
        }
    }

    /// Evaluate recency against a fixed clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Compute every signal for one candidate, in a fixed order.
    pub fn evaluate(
        &self,
        asker: &User,
        candidate: &User,
        degree: Option<Degree>,
        query: Option<&str>,
    ) -> Result<ScoreBreakdown> {
        let mut signals = Vec::new();
        signals.extend(recency_signal(candidate.last_active_at, self.now));
        if let Some(query) = query {
            let reviewed = self.reviews.has_reviewed_tag(&candidate.id, query)?;
            signals.extend(relevance_signal(reviewed, query));
        }
        signals.extend(trust_signal(candidate.trust_score));
        signals.extend(geographic_signal(asker, candidate));
        signals.push(proximity_signal(degree));
        signals.extend(responsiveness_signal(candidate.response_rate));

        let score = final_score(&signals);
        let reason = top_reason(&signals);
        debug!(
            asker = %asker.id,
            candidate = %candidate.id,
            score,
            signals = signals.len(),
            "Scored recommender candidate"
        );
        Ok(ScoreBreakdown {
            score,
            reason,
            signals,
        })
    }

    pub fn score(&self, asker: &UserId, candidate: &UserId, query: &str) -> Result<u8> {
        if asker == candidate {
            return Err(CoreError::validation("cannot score a user against themselves"));
        }
        let asker = self.require_user(asker)?;
        let candidate = self.require_user(candidate)?;
        let query = normalize_tag(query)?;
        let degree = self.graph.degree_of(&asker.id, &candidate.id)?;

        Ok(self
            .evaluate(&asker, &candidate, degree, query.as_deref())?
            .score)
    }

    /// Rank the asker's first- and second-degree network for `query`.
    pub fn suggest(&self, asker: &UserId, query: &str) -> Result<Vec<Suggestion>> {
        let asker = self.require_user(asker)?;
        let query = normalize_tag(query)?;

        let mut suggestions = Vec::new();
        for (candidate_id, degree) in self.graph.network(&asker.id)? {
            let Some(candidate) = self.users.get_user(&candidate_id)? else {
                debug!(candidate = %candidate_id, "Skipping edge to unknown user");
                continue;
            };
            let breakdown = self.evaluate(&asker, &candidate, Some(degree), query.as_deref())?;
            suggestions.push(Suggestion {
                user: candidate,
                degree,
                score: breakdown.score,
                reason: breakdown.reason.unwrap_or_default(),
            });
        }

        suggestions.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.degree.cmp(&b.degree))
                .then_with(|| a.user.id.cmp(&b.user.id))
        });
        suggestions.truncate(self.config.suggestion_limit);
        Ok(suggestions)
    }

    fn require_user(&self, id: &UserId) -> Result<User> {
        self.users
            .get_user(id)?
            .ok_or_else(|| CoreError::not_found(format!("user {id}")))
    }
}
