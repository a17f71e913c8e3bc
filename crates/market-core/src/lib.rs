pub mod error;
pub mod traits;
pub mod types;

pub use error::MarketError;
pub use traits::SeriesSource;
pub use types::*;
