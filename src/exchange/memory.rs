//! An exchange held entirely in memory.
//!
//! Serves the same paginated views as the contract, from records kept in
//! user order. Used to replay a captured order book and in tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use super::{BatchExchange, ZERO_ADDRESS};
use crate::models::Amount;
use crate::wire::{encode_records, OrderRecord};

#[derive(Debug, Clone, Default)]
pub struct InMemoryExchange {
    batch_id: u32,
    records: Vec<OrderRecord>,
    token_addresses: Vec<String>,
    balances: HashMap<(String, String), Amount>,
}

impl InMemoryExchange {
    pub fn new(batch_id: u32) -> Self {
        Self {
            batch_id,
            ..Default::default()
        }
    }

    /// Append a record. Records of one account must be pushed contiguously,
    /// the way the contract stores them per user.
    pub fn push_record(&mut self, record: OrderRecord) {
        self.records.push(record);
    }

    /// Register the next token; its index is the number of tokens so far.
    /// Token ids are 16 bits wide, so at most 65536 tokens fit.
    pub fn add_token(&mut self, address: &str) -> Result<u16> {
        let index = u16::try_from(self.token_addresses.len())
            .map_err(|_| anyhow!("token id space exhausted, cannot register {}", address))?;
        self.token_addresses.push(address.to_lowercase());
        Ok(index)
    }

    pub fn set_balance(&mut self, account_id: &str, token_address: &str, balance: Amount) {
        self.balances.insert(
            (account_id.to_lowercase(), token_address.to_lowercase()),
            balance,
        );
    }

    fn page_start(&self, previous_user: &str, offset: u16) -> Option<usize> {
        if previous_user.eq_ignore_ascii_case(ZERO_ADDRESS) {
            return Some(offset as usize);
        }
        let previous_user = previous_user.to_lowercase();
        self.records
            .iter()
            .position(|r| r.account_hex() == previous_user)
            .map(|first| first + offset as usize)
    }
}

#[async_trait]
impl BatchExchange for InMemoryExchange {
    fn identifier(&self) -> &str {
        "InMemoryExchange"
    }

    async fn current_batch_id(&self) -> Result<u32> {
        Ok(self.batch_id)
    }

    async fn encoded_orders_page(
        &self,
        previous_user: &str,
        previous_user_offset: u16,
        page_size: u16,
    ) -> Result<Vec<u8>> {
        let start = match self.page_start(previous_user, previous_user_offset) {
            Some(start) => start.min(self.records.len()),
            None => return Err(anyhow!("unknown user {}", previous_user)),
        };
        let end = (start + page_size as usize).min(self.records.len());
        Ok(encode_records(&self.records[start..end]))
    }

    async fn token_address(&self, token_index: u16) -> Result<String> {
        self.token_addresses
            .get(token_index as usize)
            .cloned()
            .ok_or_else(|| anyhow!("token index {} is not registered", token_index))
    }

    async fn balance(&self, account_id: &str, token_address: &str) -> Result<Amount> {
        Ok(self
            .balances
            .get(&(account_id.to_lowercase(), token_address.to_lowercase()))
            .copied()
            .unwrap_or(Amount::ZERO))
    }
}
