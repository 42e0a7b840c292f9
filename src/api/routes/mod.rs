pub mod players;
pub mod stats;
