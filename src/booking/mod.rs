pub mod committer;
pub mod lifecycle;
pub mod matcher;

pub use committer::BookingCommitter;
pub use matcher::match_credit;
