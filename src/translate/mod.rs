pub mod batch;
pub mod note;
pub mod policy;
pub mod single;

pub use batch::{
    errors_message,
    run_batch,
    BatchHost,
    BatchOutcome,
    BatchSummary,
    NoteError,
};
pub use note::translate_note;
pub use policy::should_skip;
pub use single::{
    translate_single,
    SingleOutcome,
};
