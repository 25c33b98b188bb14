//! Traded volume per token and per token pair of a settled batch.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{Amount, Order, TokenQuantity};
use crate::tokens::TokenRegistry;

/// Executed volume of one `(sell token, buy token)` orientation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairAmounts {
    pub sold: TokenQuantity,
    pub bought: TokenQuantity,
    pub executed_orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRow {
    pub sell_token: String,
    pub buy_token: String,
    #[serde(flatten)]
    pub amounts: PairAmounts,
}

/// Sums of executed amounts, keyed by token name, in exact human units.
///
/// Pair buckets are directional: `(A, B)` and `(B, A)` are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub token_amounts_sold: BTreeMap<String, TokenQuantity>,
    pub token_amounts_bought: BTreeMap<String, TokenQuantity>,
    pub pairs: BTreeMap<(String, String), PairAmounts>,
}

/// Convert a base-unit amount to a human amount: `amount / 10^decimals`.
pub fn scale_amount(amount: Amount, decimals: u32) -> TokenQuantity {
    TokenQuantity::new(amount, decimals)
}

fn add(acc: &mut TokenQuantity, value: TokenQuantity) -> Result<()> {
    *acc = acc
        .checked_add(value)
        .ok_or(Error::Overflow("aggregated amount"))?;
    Ok(())
}

impl Aggregates {
    fn record(
        &mut self,
        sell: &str,
        buy: &str,
        sold: TokenQuantity,
        bought: TokenQuantity,
        count: u64,
    ) -> Result<()> {
        add(self.token_amounts_sold.entry(sell.to_string()).or_default(), sold)?;
        add(self.token_amounts_bought.entry(buy.to_string()).or_default(), bought)?;
        let pair = self
            .pairs
            .entry((sell.to_string(), buy.to_string()))
            .or_default();
        add(&mut pair.sold, sold)?;
        add(&mut pair.bought, bought)?;
        pair.executed_orders += count;
        Ok(())
    }

    /// Combine with partial sums built from another slice of orders.
    pub fn merge(mut self, other: Aggregates) -> Result<Aggregates> {
        for (token, amount) in other.token_amounts_sold {
            add(self.token_amounts_sold.entry(token).or_default(), amount)?;
        }
        for (token, amount) in other.token_amounts_bought {
            add(self.token_amounts_bought.entry(token).or_default(), amount)?;
        }
        for (key, amounts) in other.pairs {
            let pair = self.pairs.entry(key).or_default();
            add(&mut pair.sold, amounts.sold)?;
            add(&mut pair.bought, amounts.bought)?;
            pair.executed_orders += amounts.executed_orders;
        }
        Ok(self)
    }

    pub fn pair(&self, sell: &str, buy: &str) -> Option<&PairAmounts> {
        self.pairs.get(&(sell.to_string(), buy.to_string()))
    }

    pub fn executed_orders(&self) -> u64 {
        self.pairs.values().map(|p| p.executed_orders).sum()
    }

    /// Flat rows for JSON output.
    pub fn pair_rows(&self) -> Vec<PairRow> {
        self.pairs
            .iter()
            .map(|((sell, buy), amounts)| PairRow {
                sell_token: sell.clone(),
                buy_token: buy.clone(),
                amounts: amounts.clone(),
            })
            .collect()
    }
}

/// Fold the executed amounts of `orders` into per-token and per-pair sums.
///
/// Every order must carry both executed amounts. Orders that did not trade
/// (both zero) are skipped; an order where only one side is zero is
/// rejected.
pub fn aggregate(orders: &[Order], registry: &TokenRegistry) -> Result<Aggregates> {
    let mut aggregates = Aggregates::default();
    for order in orders {
        let (exec_sell, exec_buy) = order.executed_amounts()?;
        if exec_sell.is_zero() != exec_buy.is_zero() {
            return Err(Error::InconsistentExecution {
                order: order.label(),
            });
        }
        if exec_sell.is_zero() {
            continue;
        }

        let sold = scale_amount(exec_sell, registry.decimals_of(&order.sell_token));
        let bought = scale_amount(exec_buy, registry.decimals_of(&order.buy_token));
        aggregates.record(
            &registry.name_of(&order.sell_token),
            &registry.name_of(&order.buy_token),
            sold,
            bought,
            1,
        )?;
    }
    Ok(aggregates)
}
