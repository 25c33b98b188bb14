use crate::models::{AccountBalances, Order};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEE_RATIO: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub token: String,
    pub ratio: f64,
}

/// One batch auction instance: the tokens, balances and orders of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_token: Option<String>,
    pub accounts: AccountBalances,
    pub orders: Vec<Order>,
    pub fee: Fee,
}

impl Instance {
    /// Build an instance whose token list is the sorted set of tokens traded
    /// by `orders`. The first of them is the reference and fee token.
    pub fn from_orders(orders: Vec<Order>, accounts: AccountBalances) -> Self {
        let tokens = tokens_of(&orders);
        let ref_token = tokens.first().cloned();
        let fee = Fee {
            token: ref_token.clone().unwrap_or_default(),
            ratio: DEFAULT_FEE_RATIO,
        };
        Self {
            tokens,
            ref_token,
            accounts,
            orders,
            fee,
        }
    }

    /// Whether any order carries executed amounts (a solved instance).
    pub fn has_executions(&self) -> bool {
        self.orders
            .iter()
            .any(|o| o.exec_sell_amount.is_some() || o.exec_buy_amount.is_some())
    }
}

/// Sorted, deduplicated sell and buy tokens of `orders`.
pub fn tokens_of(orders: &[Order]) -> Vec<String> {
    let mut tokens: Vec<String> = orders
        .iter()
        .flat_map(|o| [o.sell_token.clone(), o.buy_token.clone()])
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}
