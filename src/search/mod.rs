pub mod line_matcher;
pub mod matcher;
pub mod search_progress;

pub use line_matcher::{LineMatcher, MatchRecord};
pub use matcher::Matcher;
pub use search_progress::SearchProgress;
