//! Restrict order sell amounts to what the owning accounts can cover.
//!
//! Orders are visited from the best to the worst limit price (highest
//! `sell_amount / buy_amount` first) and take balance greedily. A larger
//! order with a slightly worse price can therefore lose its balance to a
//! smaller better-priced one; the allocation is strictly price first.
//!
//! The remaining balance is tracked per `(account, sell token, buy token)`:
//! orders of one account selling the same token against different buy
//! tokens each see the full balance of the sell token.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AccountBalances, Amount, Order};
use crate::utils::{cmp_ratio, mul_div_ceil};

type BalanceKey = (String, String, String);

fn balance_key(order: &Order) -> BalanceKey {
    (
        order.account_id.clone(),
        order.sell_token.clone(),
        order.buy_token.clone(),
    )
}

/// Sort orders by limit price, best first. Equal prices keep their input order.
pub fn sort_by_limit_price(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        cmp_ratio(
            b.sell_amount.as_u256(),
            b.buy_amount.as_u256(),
            a.sell_amount.as_u256(),
            a.buy_amount.as_u256(),
        )
    });
}

/// Buy amount matching a reduced sell amount at the original limit price,
/// rounded up so the price never improves for the seller.
fn scaled_buy_amount(order: &Order, new_sell_amount: Amount) -> Result<Amount> {
    mul_div_ceil(
        order.buy_amount.as_u256(),
        new_sell_amount.as_u256(),
        order.sell_amount.as_u256(),
    )
    .map(Amount)
    .ok_or(Error::Overflow("capped buy amount"))
}

/// Cap the sell amounts of `orders` by the balances of their accounts.
///
/// Returns the surviving orders in limit price order (best first); orders
/// left with nothing to sell are dropped. `balances` is never modified.
pub fn cap_orders(orders: Vec<Order>, balances: &AccountBalances) -> Result<Vec<Order>> {
    let mut orders = orders;
    sort_by_limit_price(&mut orders);

    let mut remaining: HashMap<BalanceKey, Amount> = HashMap::new();
    let mut capped = Vec::with_capacity(orders.len());

    for mut order in orders {
        let key = balance_key(&order);
        let available = *remaining
            .entry(key.clone())
            .or_insert_with(|| balances.balance_of(&order.account_id, &order.sell_token));

        let old_sell = order.sell_amount;
        let new_sell = old_sell.min(available);
        let left = available
            .checked_sub(new_sell)
            .ok_or_else(|| Error::NegativeRemainingBalance {
                account: order.account_id.clone(),
                token: order.sell_token.clone(),
            })?;
        remaining.insert(key, left);

        debug!(
            "Capping sell amount of <{}> by account balance [{}] : {:>40} --> {:>25}",
            order.label(),
            order.sell_token,
            old_sell.to_string(),
            new_sell.to_string()
        );

        if new_sell.is_zero() {
            debug!(
                "Removing order <{}> : zero sell amount or available balance!",
                order.label()
            );
            continue;
        }

        let old_buy = order.buy_amount;
        let new_buy = scaled_buy_amount(&order, new_sell)?;
        debug!(
            "Updated buy amount of <{}> : {:>40} --> {:>25}  [{}]",
            order.label(),
            old_buy.to_string(),
            new_buy.to_string(),
            order.buy_token
        );

        order.sell_amount = new_sell;
        order.buy_amount = new_buy;
        capped.push(order);
    }

    Ok(capped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::widen;

    const ALICE: &str = "0x00000000000000000000000000000000000000a1";
    const BOB: &str = "0x00000000000000000000000000000000000000b0";

    fn order(account: &str, sell: &str, buy: &str, sell_amount: u64, buy_amount: u64) -> Order {
        Order::new(account, sell, buy, Amount::from(sell_amount), Amount::from(buy_amount))
    }

    fn balances(entries: &[(&str, &str, u64)]) -> AccountBalances {
        entries
            .iter()
            .map(|(a, t, v)| (a.to_string(), t.to_string(), Amount::from(*v)))
            .collect()
    }

    fn sells(orders: &[Order]) -> Vec<u64> {
        orders
            .iter()
            .map(|o| o.sell_amount.to_u128().unwrap() as u64)
            .collect()
    }

    fn buys(orders: &[Order]) -> Vec<u64> {
        orders
            .iter()
            .map(|o| o.buy_amount.to_u128().unwrap() as u64)
            .collect()
    }

    #[test]
    fn test_three_orders_share_one_balance() {
        // limit prices 1.0, 2.0 and 50/33 (about 1.52), given worst first
        let orders = vec![
            order(ALICE, "T0001", "T0002", 30, 30),
            order(ALICE, "T0001", "T0002", 100, 50),
            order(ALICE, "T0001", "T0002", 50, 33),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 120)])).unwrap();
        assert_eq!(sells(&capped), vec![100, 20]);
        // 50 untouched, ceil(33 * 20 / 50) = ceil(13.2) = 14
        assert_eq!(buys(&capped), vec![50, 14]);
    }

    #[test]
    fn test_exact_prices_split_one_balance() {
        // limit prices 1.0, 2.0, 1.5
        let orders = vec![
            order(ALICE, "T0001", "T0002", 90, 90),
            order(ALICE, "T0001", "T0002", 300, 150),
            order(ALICE, "T0001", "T0002", 150, 100),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 360)])).unwrap();
        assert_eq!(sells(&capped), vec![300, 60]);
        // 100 * 60 / 150 = 40 exactly
        assert_eq!(buys(&capped), vec![150, 40]);
    }

    #[test]
    fn test_uncapped_orders_pass_through() {
        let orders = vec![order(ALICE, "T0001", "T0002", 10, 7)];
        let capped = cap_orders(orders.clone(), &balances(&[(ALICE, "T0001", 1000)])).unwrap();
        assert_eq!(capped, orders);
    }

    #[test]
    fn test_missing_balance_drops_everything() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 10, 7),
            order(BOB, "T0002", "T0001", 5, 5),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0002", 100)])).unwrap();
        assert!(capped.is_empty());
    }

    #[test]
    fn test_balance_is_per_token_triple() {
        // same account and sell token, two different buy tokens: each order
        // sees the full balance, so together they sell 160 out of 100
        let orders = vec![
            order(ALICE, "T0001", "T0002", 80, 40),
            order(ALICE, "T0001", "T0003", 80, 40),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 100)])).unwrap();
        assert_eq!(sells(&capped), vec![80, 80]);
        let total: u64 = sells(&capped).iter().sum();
        assert!(total > 100);
    }

    #[test]
    fn test_accounts_are_independent() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 100, 100),
            order(BOB, "T0001", "T0002", 100, 100),
        ];
        let capped = cap_orders(
            orders,
            &balances(&[(ALICE, "T0001", 60), (BOB, "T0001", 70)]),
        )
        .unwrap();
        let mut sold: Vec<(String, u64)> = capped
            .iter()
            .map(|o| (o.account_id.clone(), o.sell_amount.to_u128().unwrap() as u64))
            .collect();
        sold.sort();
        assert_eq!(sold, vec![(ALICE.to_string(), 60), (BOB.to_string(), 70)]);
    }

    #[test]
    fn test_output_sorted_best_price_first() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 10, 10),
            order(BOB, "T0003", "T0002", 30, 10),
            order(BOB, "T0004", "T0002", 20, 10),
        ];
        let b = balances(&[
            (ALICE, "T0001", 100),
            (BOB, "T0003", 100),
            (BOB, "T0004", 100),
        ]);
        let capped = cap_orders(orders, &b).unwrap();
        assert_eq!(sells(&capped), vec![30, 20, 10]);
    }

    #[test]
    fn test_equal_prices_keep_input_order() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 20, 10),
            order(ALICE, "T0001", "T0002", 10, 5),
            order(ALICE, "T0001", "T0002", 40, 20),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 25)])).unwrap();
        assert_eq!(sells(&capped), vec![20, 5]);
        assert_eq!(buys(&capped), vec![10, 3]);
    }

    #[test]
    fn test_zero_buy_amount_sorts_first() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 1000, 1),
            order(ALICE, "T0001", "T0002", 5, 0),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 5)])).unwrap();
        assert_eq!(sells(&capped), vec![5]);
        assert_eq!(buys(&capped), vec![0]);
    }

    #[test]
    fn test_balances_conserved_and_prices_never_worse_for_buyer() {
        let mut orders = Vec::new();
        let mut entries = Vec::new();
        for (i, account) in [ALICE, BOB].iter().enumerate() {
            for j in 0..6u64 {
                let sell = 17 + 13 * j + i as u64;
                let buy = 5 + 7 * ((j * 3) % 5);
                let mut o = order(account, "T0001", "T0002", sell, buy);
                o.order_id = Some(format!("{i}-{j}"));
                orders.push(o);
            }
            entries.push((*account, "T0001", 55 + 10 * i as u64));
        }
        let b = balances(&entries);
        let capped = cap_orders(orders.clone(), &b).unwrap();

        for account in [ALICE, BOB] {
            let total: u64 = capped
                .iter()
                .filter(|o| o.account_id == account)
                .map(|o| o.sell_amount.to_u128().unwrap() as u64)
                .sum();
            let demand: u64 = orders
                .iter()
                .filter(|o| o.account_id == account)
                .map(|o| o.sell_amount.to_u128().unwrap() as u64)
                .sum();
            let balance = b.balance_of(account, "T0001").to_u128().unwrap() as u64;
            assert!(total <= balance);
            if demand > balance {
                assert_eq!(total, balance);
            }
        }

        // new_buy / new_sell >= old_buy / old_sell for every capped order
        for capped_order in &capped {
            let original = orders
                .iter()
                .find(|o| o.order_id == capped_order.order_id)
                .unwrap();
            let lhs = widen(capped_order.buy_amount.as_u256())
                * widen(original.sell_amount.as_u256());
            let rhs = widen(original.buy_amount.as_u256())
                * widen(capped_order.sell_amount.as_u256());
            assert!(lhs >= rhs, "price got worse for {:?}", capped_order.order_id);
        }
    }

    #[test]
    fn test_rerun_on_spent_balances_is_empty() {
        let orders = vec![
            order(ALICE, "T0001", "T0002", 100, 50),
            order(ALICE, "T0001", "T0002", 50, 33),
        ];
        let capped = cap_orders(orders, &balances(&[(ALICE, "T0001", 120)])).unwrap();
        assert!(!capped.is_empty());
        let spent = balances(&[(ALICE, "T0001", 0)]);
        assert!(cap_orders(capped, &spent).unwrap().is_empty());
    }

    #[test]
    fn test_input_balances_untouched() {
        let b = balances(&[(ALICE, "T0001", 10)]);
        let before = b.clone();
        cap_orders(vec![order(ALICE, "T0001", "T0002", 100, 1)], &b).unwrap();
        assert_eq!(b, before);
    }
}
