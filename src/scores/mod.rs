pub mod filter;
pub mod live;
pub mod models;
pub mod normalize;
pub mod projection;

pub use filter::{filter_matches, FilterTag};
pub use live::parse_live_score;
pub use models::{LiveScore, Match};
pub use normalize::normalize_matches;
