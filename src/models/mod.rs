//! Core data models for ladder statistics.

mod documents;
mod ids;
mod player;
mod profile;
mod race;
mod record;
mod season;
mod stats;

pub use documents::*;
pub use ids::*;
pub use player::*;
pub use profile::*;
pub use race::*;
pub use record::*;
pub use season::*;
pub use stats::*;
