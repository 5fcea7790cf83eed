//! Portfolio and builder types.

mod builder;
#[allow(clippy::module_inception)]
mod portfolio;

pub use builder::{PortfolioBuilder, DEFAULT_BASE_CURRENCY};
pub use portfolio::Portfolio;
