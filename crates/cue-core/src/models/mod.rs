//! Entity models.
//!
//! Every model implements [`Entity`](crate::record::Entity): its record keys
//! are exactly the column names of its table.

mod interaction;
mod profile;
mod profile_file;
mod research;
mod session;

pub use interaction::{InteractionType, SessionInteraction};
pub use profile::{Profile, ProfileType, DEFAULT_ACCENT_COLOR};
pub use profile_file::ProfileFile;
pub use research::ResearchRecord;
pub use session::Session;
