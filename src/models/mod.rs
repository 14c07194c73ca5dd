//! Shared data models for email rendering
//!
//! These values live only for the duration of one render call. They are
//! immutable once built: operations that change a value (such as promoting a
//! variant) return a new one, so the same instance can be shared between
//! locales and workers without coordination.

mod email;
mod placeholder;
mod template;

pub use email::{Email, RenderedEmail, Subjects};
pub use placeholder::{Placeholder, PlaceholderType, Placeholders};
pub use template::{EmailType, MetaPlaceholder, Template};
