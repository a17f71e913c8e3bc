pub mod datago;
pub mod fetch;
pub mod listing;
pub mod nxt;
pub mod yahoo;

pub use datago::DataGoClient;
pub use fetch::fetch_with_fallback;
pub use listing::StockListing;
pub use nxt::NxtClient;
pub use yahoo::YahooClient;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0";
