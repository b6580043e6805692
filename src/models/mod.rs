// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    FeatureVector, ScoredCandidate, SimilarUser, UserCluster, UserProfile, FEATURE_COUNT, FEATURE_NAMES,
};
pub use requests::{ClusterRequest, RankRequest, ScoreRequest, SimilarRequest};
pub use responses::{ClusterResponse, ErrorResponse, RankResponse, ScoreResponse, SimilarResponse};
