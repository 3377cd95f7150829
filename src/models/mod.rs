//! Typed domain entities for the reminder engine.
//!
//! Fixed structs rather than a generic reflective property framework: the
//! pipeline only ever reads the fields modelled here.

pub mod enums;
pub mod event;
pub mod party;
pub mod reminder;
pub mod reminder_type;

pub use enums::*;
pub use event::*;
pub use party::*;
pub use reminder::*;
pub use reminder_type::*;
