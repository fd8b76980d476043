//! Pure draw-subsystem core: no I/O, exercised by the services and unit
//! tests. The database procedures remain the authoritative validators; these
//! modules implement the client-side half of the contract (prechecks,
//! normalization, the spectator feed machine).

pub mod feed;
pub mod number;
pub mod pool;
pub mod precheck;
pub mod registry;
pub mod runner;
pub mod warning;

pub use feed::{FeedEvent, FeedPhase, FeedTiming, LiveFeed};
pub use number::normalize_draw_number;
pub use pool::NormalizedPool;
pub use precheck::{enforce_warnings, ensure_quota_available, resolve_target};
pub use registry::{ItemWithComputed, normalize_items, winners_of_other_items};
pub use runner::{DrawStep, MultiDrawOutcome, StepOutcome, run_steps};
pub use warning::{DrawAction, Warning, WarningClass, classify, partition_blocking};
