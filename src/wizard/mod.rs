//! Step engine of the syllabus wizard
//!
//! - `controller`: integer step pointer with bounds
//! - `gate`: render guard and back/advance controls for one step
//! - `identity`: which syllabus record is being edited, and where that is remembered
//! - `draft`: local copy of a section and where it came from
//! - `load` / `save`: the fetch-on-mount and save-then-advance routines
//! - `allocator`: hour budget editing for the programming step

mod allocator;
mod controller;
mod draft;
mod gate;
mod identity;
mod load;
mod save;

pub use allocator::{ActivityIdGenerator, AllocationError, WeeklyAllocator};
pub use controller::StepsController;
pub use draft::{DraftState, SectionDraft};
pub use gate::{Control, ControlOutcome, ControlsState, StepGate};
pub use identity::{IdentityError, LocationStore, MemoryLocation, SessionFile, SyllabusIdentity};
pub use load::load_section;
pub use save::{
    persist, record_identity, AdvanceOutcome, SaveReceipt, SaveRequest, SaveTarget, SectionStep,
    StepError,
};
