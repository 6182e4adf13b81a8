// Scoring — the weighted total aggression formula and its weight table.

pub mod weights;

pub use weights::{total_aggression, WeightTable};
