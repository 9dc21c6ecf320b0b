pub mod ask;
pub mod community;
pub mod connection;
pub mod ids;
pub mod recommendation;
pub mod tags;
pub mod user;

pub use ask::{Ask, AskResponse, AskStatus, EffectiveAskStatus, InboundAsk};
pub use community::{Community, CommunityMembership, MembershipStatus};
pub use connection::{Connection, ConnectionStatus, Degree};
pub use ids::{AskId, AskResponseId, CommunityId, RecommendationId, ReviewId, UserId};
pub use recommendation::{ProviderDetails, Recommendation, Review, ReviewDetails, Visibility};
pub use tags::{TagError, normalize_tag, normalize_tags};
pub use user::{User, UserProfile, UserSignals};
