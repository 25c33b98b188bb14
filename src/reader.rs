//! Rebuilds the current order book of a batch exchange.
//!
//! Orders come from `getEncodedUsersPaginated`, which walks the exchange's
//! users in storage order. A page is requested by naming the last user seen
//! and how many of that user's orders have been consumed already; the walk
//! ends with the first page shorter than `page_size`. An unfunded record
//! still occupies a slot and counts towards that offset even though it is
//! dropped from the result.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use tokio::try_join;
use tracing::{debug, info, warn};

use crate::capping::cap_orders;
use crate::exchange::{BatchExchange, ZERO_ADDRESS};
use crate::models::{AccountBalances, Instance, Order};
use crate::tokens::token_index;
use crate::wire::{decode_records, OrderRecord};

pub const DEFAULT_PAGE_SIZE: u16 = 100;

/// Every order with something to sell, regardless of its validity window.
pub async fn fetch_orderbook(exchange: &dyn BatchExchange, page_size: u16) -> Result<Vec<Order>> {
    if page_size == 0 {
        return Err(anyhow!("page size must be positive"));
    }

    let mut records: Vec<OrderRecord> = Vec::new();
    let mut current_user = ZERO_ADDRESS.to_string();
    let mut current_offset: u16 = 0;

    loop {
        let page = exchange
            .encoded_orders_page(&current_user, current_offset, page_size)
            .await
            .with_context(|| {
                format!("fetching orders after {} (+{})", current_user, current_offset)
            })?;
        let page = decode_records(&page)?;
        let page_len = page.len();
        debug!(
            user = %current_user,
            offset = current_offset,
            records = page_len,
            "fetched order page"
        );
        records.extend(page);

        if page_len < page_size as usize {
            break;
        }
        if let Some(last) = records.last() {
            current_user = last.account_hex();
            let seen = records.iter().filter(|r| r.account_id == last.account_id).count();
            current_offset = u16::try_from(seen)
                .map_err(|_| anyhow!("user {} has more than {} orders", current_user, u16::MAX))?;
        }
    }

    let total = records.len();
    let mut orders = Vec::with_capacity(total);
    for record in records {
        if let Some(decoded) = record.normalize()? {
            orders.push(decoded.to_order());
        }
    }
    info!(
        exchange = exchange.identifier(),
        records = total,
        orders = orders.len(),
        "read order book"
    );
    Ok(orders)
}

/// Orders valid in the current batch, together with that batch id.
pub async fn fetch_current_orderbook(
    exchange: &dyn BatchExchange,
    page_size: u16,
) -> Result<(u32, Vec<Order>)> {
    let (batch_id, orders) = try_join!(
        exchange.current_batch_id(),
        fetch_orderbook(exchange, page_size),
    )?;

    let (live, expired): (Vec<Order>, Vec<Order>) =
        orders.into_iter().partition(|o| o.is_live(batch_id));
    if !expired.is_empty() {
        warn!(batch_id, skipped = expired.len(), "skipping orders outside the batch window");
    }
    for order in &expired {
        debug!(
            "Skipping order {} valid {:?}..{:?}",
            order.label(),
            order.valid_from,
            order.valid_until
        );
    }
    Ok((batch_id, live))
}

/// Exchange balance of every (account, sell token) that appears in `orders`.
///
/// Lookups run one at a time in order-list order; token addresses are
/// resolved once per token.
pub async fn fetch_account_balances(
    exchange: &dyn BatchExchange,
    orders: &[Order],
) -> Result<AccountBalances> {
    let mut token_addresses: HashMap<&str, String> = HashMap::new();
    let mut balances = AccountBalances::new();

    for order in orders {
        if balances.contains(&order.account_id, &order.sell_token) {
            continue;
        }
        let address = match token_addresses.get(order.sell_token.as_str()) {
            Some(address) => address.clone(),
            None => {
                let index = token_index(&order.sell_token)?;
                let address = exchange
                    .token_address(index)
                    .await
                    .with_context(|| format!("resolving address of {}", order.sell_token))?;
                token_addresses.insert(&order.sell_token, address.clone());
                address
            }
        };
        let balance = exchange
            .balance(&order.account_id, &address)
            .await
            .with_context(|| format!("balance of {} in {}", order.account_id, order.sell_token))?;
        balances.insert(&order.account_id, &order.sell_token, balance);
    }
    Ok(balances)
}

/// Current order book and balances as a capped instance.
pub async fn read_instance_from_chain(
    exchange: &dyn BatchExchange,
    page_size: u16,
) -> Result<(u32, Instance)> {
    let (batch_id, orders) = fetch_current_orderbook(exchange, page_size).await?;
    let accounts = fetch_account_balances(exchange, &orders).await?;
    let total = orders.len();
    let orders = cap_orders(orders, &accounts).context("capping orders by balance")?;
    info!(
        batch_id,
        orders = orders.len(),
        dropped = total - orders.len(),
        accounts = accounts.accounts().count(),
        "assembled instance"
    );
    Ok((batch_id, Instance::from_orders(orders, accounts)))
}
