//! Video parsing pipeline
//!
//! [`VideoParser::parse`] is the single entry point used by every trigger
//! surface. It returns a closed [`ParseOutcome`] and never an error.
//!
//! ## Flow
//!
//! 1. Extract (video id, page) from the page URL
//! 2. Serve today's history entry if it was parsed within the reuse window
//! 3. Ask the [`ParsingStateMachine`] for permission (busy / cooldown)
//! 4. Fetch metadata and the media URL concurrently
//! 5. Record history, write the clipboard, notify
//! 6. Release the parsing status
//!
//! Only one network parse runs at a time; a concurrent request is rejected
//! rather than queued. The status is held through a [`ParseLease`], so a
//! cancelled or panicking parse still releases it.

mod outcome;
mod parser;
pub mod state;
mod trigger;

pub use outcome::ParseOutcome;
pub use parser::{DEFAULT_REUSE_WINDOW_MS, PipelineError, VideoParser};
pub use state::{
    BeginParse, DEFAULT_COOLDOWN_MS, DEFAULT_LEASE_MS, ParseLease, ParsingStateMachine,
    ParsingStatus, Rejection,
};
pub use trigger::{TriggerSource, TriggerStatus, trigger_parse, trigger_reparse};
