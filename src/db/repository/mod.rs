//! Per-entity persistence functions over a `rusqlite::Connection`.

pub mod party;
pub mod reminder;
pub mod reminder_type;

pub use party::*;
pub use reminder::*;
pub use reminder_type::*;
