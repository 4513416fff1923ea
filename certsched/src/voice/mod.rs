//! Voice command surface: spoken-name resolution and the action router.

pub mod aliases;
pub mod dispatcher;

pub use aliases::{resolve_field, resolve_value};
pub use dispatcher::{dispatch, VoiceSession};
