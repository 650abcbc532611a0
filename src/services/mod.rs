pub mod enrollment;
pub mod features;
pub mod recommendations;
pub mod refresher;
pub mod scorer;
pub mod similarity;
pub mod store;
pub mod tfidf;

pub use enrollment::build_user_item_matrix;
pub use features::{build_session_features, build_user_features, LevelPolicy};
pub use refresher::{build_snapshot, SnapshotRefresher};
pub use scorer::{FusionWeights, HybridScorer, ScoredSession, ScoringConfig};
pub use similarity::cosine_pairwise;
pub use store::{snapshot_channel, SnapshotPublisher, SnapshotReader};
