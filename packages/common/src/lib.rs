pub mod content_type;
pub mod list;
pub mod pagination;
pub mod rating;
pub mod vote;

pub use content_type::ContentType;
pub use list::{ListRole, ReorderError, SharePermission, ViewMode, is_contiguous, plan_reorder};
pub use pagination::PageWindow;
pub use rating::{Rating, RatingError, RatingSummary};
pub use vote::{VoteChange, VotePolarity, VoteState, VoteTally};
