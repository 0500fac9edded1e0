pub mod error;
pub mod id;
pub mod service;

pub use error::PasteError;
pub use id::PasteId;
pub use service::{CollisionScope, LookupOrder, Paste, PasteContent, PasteLimits, PasteService};
