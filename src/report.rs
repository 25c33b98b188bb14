//! Human readable summaries of an order set.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::aggregate::scale_amount;
use crate::models::Order;
use crate::tokens::TokenRegistry;

const DISPLAY_DP: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCount {
    pub token_a: String,
    pub token_b: String,
    pub orders: usize,
}

/// Number of orders per unordered token pair, most traded first.
///
/// Unlike the executed-volume aggregates, `A -> B` and `B -> A` orders land
/// in the same bucket, named in the orientation first seen.
pub fn count_orders_per_pair(orders: &[Order], registry: &TokenRegistry) -> Vec<PairCount> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut first_seen: Vec<(String, String)> = Vec::new();

    for order in orders {
        let sell = registry.name_of(&order.sell_token);
        let buy = registry.name_of(&order.buy_token);
        let reverse = (buy.clone(), sell.clone());
        if let Some(n) = counts.get_mut(&reverse) {
            *n += 1;
            continue;
        }
        let key = (sell, buy);
        let n = counts.entry(key.clone()).or_insert(0);
        if *n == 0 {
            first_seen.push(key);
        }
        *n += 1;
    }

    let mut rows: Vec<PairCount> = first_seen
        .into_iter()
        .map(|(a, b)| {
            let orders = counts[&(a.clone(), b.clone())];
            PairCount {
                token_a: a,
                token_b: b,
                orders,
            }
        })
        .collect();
    rows.sort_by(|x, y| y.orders.cmp(&x.orders));

    for row in &rows {
        debug!(
            "Number of orders on token pair {:>5} <> {:<5} : {:>3}",
            row.token_a, row.token_b, row.orders
        );
    }
    rows
}

/// One line per order, sorted by sell token:
/// `<0x1234ab>  Sell  1.500000  [WETH]  for at least  300.000000  [USDC]`.
pub fn format_order(order: &Order, registry: &TokenRegistry) -> String {
    let sell = scale_amount(order.sell_amount, registry.decimals_of(&order.sell_token));
    let buy = scale_amount(order.buy_amount, registry.decimals_of(&order.buy_token));
    let short_account: String = order.account_id.chars().take(8).collect();
    format!(
        "<{}>  Sell  {:>42}  {:<8}  for at least  {:>42}  {:<8}",
        short_account,
        sell.to_fixed(DISPLAY_DP),
        format!("[{}]", registry.name_of(&order.sell_token)),
        buy.to_fixed(DISPLAY_DP),
        format!("[{}]", registry.name_of(&order.buy_token)),
    )
}

/// Log every order at info level, sorted by sell token.
pub fn log_orders(orders: &[Order], registry: &TokenRegistry) {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| a.sell_token.cmp(&b.sell_token));
    for order in sorted {
        info!("{}", format_order(order, registry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;
    use crate::wire::{decode_orders, encode_records, OrderRecord};
    use alloy_primitives::U256;

    fn order(sell: &str, buy: &str) -> Order {
        Order::new(
            "0x1234abcdef000000000000000000000000000000",
            sell,
            buy,
            Amount::from(1u64),
            Amount::from(1u64),
        )
    }

    #[test]
    fn test_count_orders_merges_reverse_pairs() {
        let registry = TokenRegistry::with_defaults();
        let orders = vec![
            order("T0001", "T0007"),
            order("T0007", "T0001"),
            order("T0002", "T0004"),
            order("T0001", "T0007"),
        ];
        let rows = count_orders_per_pair(&orders, &registry);
        assert_eq!(
            rows,
            vec![
                PairCount {
                    token_a: "WETH".into(),
                    token_b: "DAI".into(),
                    orders: 3
                },
                PairCount {
                    token_a: "USDT".into(),
                    token_b: "USDC".into(),
                    orders: 1
                },
            ]
        );
    }

    #[test]
    fn test_format_order() {
        let registry = TokenRegistry::with_defaults();
        let o = Order::new(
            "0x1234abcdef000000000000000000000000000000",
            "T0001",
            "T0004",
            Amount::from(1_500_000_000_000_000_000u64),
            Amount::from(300_000_000u64),
        );
        let line = format_order(&o, &registry);
        assert!(line.starts_with("<0x1234ab>  Sell"));
        assert!(line.contains("1.500000  [WETH]"));
        assert!(line.contains("300.000000  [USDC]"));
    }

    #[test]
    fn test_format_order_with_unlimited_price() {
        // 1 WETH asking for u128::MAX base units of USDC, as decoded from chain
        let buf = encode_records(&[OrderRecord {
            account_id: [0xab; 20],
            sell_token_balance: U256::MAX,
            buy_token: 4,
            sell_token: 1,
            valid_from: 0,
            valid_until: u32::MAX,
            price_numerator: u128::MAX,
            price_denominator: 1_000_000_000_000_000_000,
            remaining_amount: 1_000_000_000_000_000_000,
        }]);
        let order = decode_orders(&buf).unwrap().remove(0).to_order();
        assert_eq!(order.buy_amount, Amount::from_u128(u128::MAX));

        let registry = TokenRegistry::with_defaults();
        let line = format_order(&order, &registry);
        assert!(line.contains("1.000000  [WETH]"));
        assert!(line.contains("340282366920938463463374607431768.211455  [USDC]"));
        log_orders(&[order], &registry);
    }
}
