pub mod beta_binomial;
pub mod dice_roll;
pub mod negative_binomial;
pub mod pmf;
pub mod rv;

pub use dice_roll::DiceRoll;
pub use pmf::{combine_pmf, combine_pmf_with, check_pmf, Outcome, Pmf};
pub use rv::DiscreteRV;
