//! Statistical machinery behind value consensus.

mod minimize;
mod mle;
mod normal;

pub use minimize::minimize_scalar;
pub use mle::{Measurement, fit_group_mean};
pub use normal::{erf, log_cdf, log_pdf, log_sf, norm_cdf};
