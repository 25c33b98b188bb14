//! Packed on-chain order records.
//!
//! The exchange contract returns orders as a concatenation of fixed-size
//! 112-byte records, all integers big-endian:
//!
//! ```text
//!   offset  size  field
//!        0    20  account id
//!       20    32  sell token balance of the account
//!       52     2  buy token
//!       54     2  sell token
//!       56     4  valid from (batch id)
//!       60     4  valid until (batch id)
//!       64    16  price numerator
//!       80    16  price denominator
//!       96    16  remaining amount
//! ```

use alloy_primitives::U256;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Amount, Order};
use crate::tokens::token_id;
use crate::utils::mul_div_round_half_even;

pub const RECORD_LEN: usize = 112;

/// One record exactly as stored on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub account_id: [u8; 20],
    pub sell_token_balance: U256,
    pub buy_token: u16,
    pub sell_token: u16,
    pub valid_from: u32,
    pub valid_until: u32,
    pub price_numerator: u128,
    pub price_denominator: u128,
    pub remaining_amount: u128,
}

/// A record with its tradeable amounts derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedOrder {
    pub record: OrderRecord,
    /// `min(remaining_amount, sell_token_balance)`, never zero
    pub sell_amount: Amount,
    pub buy_amount: Amount,
}

impl OrderRecord {
    /// `0x` + lowercase hex of the account id.
    pub fn account_hex(&self) -> String {
        format!("0x{}", hex::encode(self.account_id))
    }

    /// What the account can actually sell: the smaller of the unfilled
    /// remainder and its sell token balance.
    pub fn sell_amount(&self) -> Amount {
        Amount(U256::from(self.remaining_amount).min(self.sell_token_balance))
    }

    /// Buy amount implied by the limit price for `sell_amount`.
    ///
    /// A zero limit price (or a zero denominator) yields the constant 1
    /// instead of a division; otherwise the exact quotient rounded half to
    /// even.
    pub fn buy_amount_for(&self, sell_amount: Amount) -> Result<Amount> {
        if self.price_denominator == 0 || self.price_numerator == 0 {
            return Ok(Amount::from(1u64));
        }
        mul_div_round_half_even(
            sell_amount.as_u256(),
            U256::from(self.price_numerator),
            U256::from(self.price_denominator),
        )
        .map(Amount)
        .ok_or(Error::Overflow("decoded buy amount"))
    }

    /// Derive the tradeable amounts. `None` when nothing can be sold.
    pub fn normalize(self) -> Result<Option<DecodedOrder>> {
        let sell_amount = self.sell_amount();
        if sell_amount.is_zero() {
            return Ok(None);
        }
        let buy_amount = self.buy_amount_for(sell_amount)?;
        Ok(Some(DecodedOrder {
            record: self,
            sell_amount,
            buy_amount,
        }))
    }
}

impl DecodedOrder {
    /// Logical form used by capping and reports.
    pub fn to_order(&self) -> Order {
        Order::new(
            &self.record.account_hex(),
            &token_id(self.record.sell_token),
            &token_id(self.record.buy_token),
            self.sell_amount,
            self.buy_amount,
        )
        .with_validity(self.record.valid_from, self.record.valid_until)
    }
}

impl From<DecodedOrder> for Order {
    fn from(decoded: DecodedOrder) -> Self {
        decoded.to_order()
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

fn check_len(buffer: &[u8]) -> Result<()> {
    if buffer.len() % RECORD_LEN != 0 {
        return Err(Error::MalformedBuffer {
            len: buffer.len(),
            record_len: RECORD_LEN,
        });
    }
    Ok(())
}

fn be_u16(b: &[u8]) -> u16 {
    let mut out = [0u8; 2];
    out.copy_from_slice(b);
    u16::from_be_bytes(out)
}

fn be_u32(b: &[u8]) -> u32 {
    let mut out = [0u8; 4];
    out.copy_from_slice(b);
    u32::from_be_bytes(out)
}

fn be_u128(b: &[u8]) -> u128 {
    let mut out = [0u8; 16];
    out.copy_from_slice(b);
    u128::from_be_bytes(out)
}

/// Parse one record. `bytes` must be exactly [`RECORD_LEN`] long.
fn read_record(bytes: &[u8]) -> OrderRecord {
    let mut account_id = [0u8; 20];
    account_id.copy_from_slice(&bytes[0..20]);
    OrderRecord {
        account_id,
        sell_token_balance: U256::from_be_slice(&bytes[20..52]),
        buy_token: be_u16(&bytes[52..54]),
        sell_token: be_u16(&bytes[54..56]),
        valid_from: be_u32(&bytes[56..60]),
        valid_until: be_u32(&bytes[60..64]),
        price_numerator: be_u128(&bytes[64..80]),
        price_denominator: be_u128(&bytes[80..96]),
        remaining_amount: be_u128(&bytes[96..112]),
    }
}

/// Every record of `buffer`, without dropping unfunded ones.
pub fn decode_records(buffer: &[u8]) -> Result<Vec<OrderRecord>> {
    check_len(buffer)?;
    Ok(buffer.chunks_exact(RECORD_LEN).map(read_record).collect())
}

/// Decode `buffer` into orders, dropping records with nothing to sell.
pub fn decode_orders(buffer: &[u8]) -> Result<Vec<DecodedOrder>> {
    let records = decode_records(buffer)?;
    let mut orders = Vec::with_capacity(records.len());
    for record in records {
        let Some(order) = record.normalize()? else {
            continue;
        };
        debug!(
            "Read order: sellAmount {:>40} {:>7} -- buyAmount {:>40} {:>7} -- accountID {}",
            order.sell_amount.to_string(),
            token_id(order.record.sell_token),
            order.buy_amount.to_string(),
            token_id(order.record.buy_token),
            order.record.account_hex()
        );
        orders.push(order);
    }
    Ok(orders)
}

// ── Encoding ──────────────────────────────────────────────────────────────────

pub fn encode_record(record: &OrderRecord) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..20].copy_from_slice(&record.account_id);
    out[20..52].copy_from_slice(&record.sell_token_balance.to_be_bytes::<32>());
    out[52..54].copy_from_slice(&record.buy_token.to_be_bytes());
    out[54..56].copy_from_slice(&record.sell_token.to_be_bytes());
    out[56..60].copy_from_slice(&record.valid_from.to_be_bytes());
    out[60..64].copy_from_slice(&record.valid_until.to_be_bytes());
    out[64..80].copy_from_slice(&record.price_numerator.to_be_bytes());
    out[80..96].copy_from_slice(&record.price_denominator.to_be_bytes());
    out[96..112].copy_from_slice(&record.remaining_amount.to_be_bytes());
    out
}

pub fn encode_records(records: &[OrderRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * RECORD_LEN);
    for record in records {
        out.extend_from_slice(&encode_record(record));
    }
    out
}
