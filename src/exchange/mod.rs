use async_trait::async_trait;

use crate::models::Amount;

pub mod batch_exchange;
pub mod memory;

pub use batch_exchange::{BatchExchangeContract, Network};
pub use memory::InMemoryExchange;

/// Zero address, the starting cursor of the paginated order query.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Read access to a batch auction exchange.
///
/// Only the views needed to rebuild the current order book are exposed:
/// batch id, the paginated encoded orders, token addresses and balances.
#[async_trait]
pub trait BatchExchange: Send + Sync {
    fn identifier(&self) -> &str;

    async fn current_batch_id(&self) -> Result<u32, anyhow::Error>;

    /// Raw 112-byte records following `previous_user`'s first
    /// `previous_user_offset` orders, at most `page_size` of them.
    async fn encoded_orders_page(
        &self,
        previous_user: &str,
        previous_user_offset: u16,
        page_size: u16,
    ) -> Result<Vec<u8>, anyhow::Error>;

    async fn token_address(&self, token_index: u16) -> Result<String, anyhow::Error>;

    async fn balance(&self, account_id: &str, token_address: &str) -> Result<Amount, anyhow::Error>;
}
