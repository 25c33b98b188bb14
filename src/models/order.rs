use crate::error::{Error, Result};
use crate::models::Amount;
use serde::{Deserialize, Serialize};

/// A sell order in its logical (instance file) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Owner, `0x` followed by 40 lowercase hex digits
    #[serde(rename = "accountID")]
    pub account_id: String,
    pub sell_token: String,
    pub buy_token: String,
    /// Amount of `sell_token` offered
    pub sell_amount: Amount,
    /// Minimum amount of `buy_token` asked for `sell_amount`
    pub buy_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<u32>,
    /// Executed amounts of a settled batch, scaled in token base units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_sell_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_buy_amount: Option<Amount>,
    #[serde(default, rename = "orderID", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Order {
    pub fn new(
        account_id: &str,
        sell_token: &str,
        buy_token: &str,
        sell_amount: Amount,
        buy_amount: Amount,
    ) -> Self {
        Self {
            account_id: account_id.to_lowercase(),
            sell_token: sell_token.to_string(),
            buy_token: buy_token.to_string(),
            sell_amount,
            buy_amount,
            valid_from: None,
            valid_until: None,
            exec_sell_amount: None,
            exec_buy_amount: None,
            order_id: None,
        }
    }

    pub fn with_validity(mut self, valid_from: u32, valid_until: u32) -> Self {
        self.valid_from = Some(valid_from);
        self.valid_until = Some(valid_until);
        self
    }

    pub fn with_execution(mut self, exec_sell_amount: Amount, exec_buy_amount: Amount) -> Self {
        self.exec_sell_amount = Some(exec_sell_amount);
        self.exec_buy_amount = Some(exec_buy_amount);
        self
    }

    /// Label used in log lines: `<account>|<orderID>`.
    pub fn label(&self) -> String {
        match &self.order_id {
            Some(id) => format!("{}|{}", self.account_id, id),
            None => format!("{}|-", self.account_id),
        }
    }

    /// Whether the order may take part in `batch_id`. Missing bounds are open.
    pub fn is_live(&self, batch_id: u32) -> bool {
        self.valid_from.map_or(true, |from| from <= batch_id)
            && self.valid_until.map_or(true, |until| batch_id <= until)
    }

    /// Both executed amounts, or the name of the first one that is missing.
    pub fn executed_amounts(&self) -> Result<(Amount, Amount)> {
        let sell = self.exec_sell_amount.ok_or_else(|| Error::MissingField {
            field: "execSellAmount",
            order: self.label(),
        })?;
        let buy = self.exec_buy_amount.ok_or_else(|| Error::MissingField {
            field: "execBuyAmount",
            order: self.label(),
        })?;
        Ok((sell, buy))
    }
}
