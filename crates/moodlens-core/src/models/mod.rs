pub mod diary;
pub mod mood;
pub mod range;
pub mod user;

pub use diary::DiaryRecord;
pub use mood::MoodFilter;
pub use range::RangeMode;
pub use user::{Role, UserProfile};
