//! Pattern matching support shared by every evaluation pass
//!
//! - [`RegexCache`]: compiled patterns, bounded and expiring
//! - [`MatchWorkerPool`]: bounded pool running matches under a deadline

mod cache;
mod pool;

pub use cache::RegexCache;
pub use pool::MatchWorkerPool;
