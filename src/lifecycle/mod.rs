mod engine;
pub mod policy;
mod record;
mod stats;
mod status;

pub use engine::{LifecycleEngine, TransitionOutcome};
pub use policy::direct_conclusion_text;
pub use record::{
    Action, NewOccurrence, Occurrence, OccurrenceDetail, OccurrenceFilter, Profile, RosterEntity,
    SchoolClass, StatusChange, Student,
};
pub use stats::AuthorStats;
pub use status::{ActionType, OccurrenceStatus, Role};
