//! Game implementations used as training workloads.

pub mod kuhn13;
pub mod liars_dice;

pub use kuhn13::Kuhn13;
pub use liars_dice::LiarsDice;
