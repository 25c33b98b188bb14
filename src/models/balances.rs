use crate::models::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of account balances: `account -> token -> amount`.
///
/// Read-only input to capping. Accounts are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountBalances(BTreeMap<String, BTreeMap<String, Amount>>);

impl AccountBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, account_id: &str, token: &str, balance: Amount) {
        self.0
            .entry(account_id.to_lowercase())
            .or_default()
            .insert(token.to_string(), balance);
    }

    pub fn contains(&self, account_id: &str, token: &str) -> bool {
        self.0
            .get(&account_id.to_lowercase())
            .is_some_and(|tokens| tokens.contains_key(token))
    }

    /// Balance of `token` held by `account_id`; zero when no entry exists.
    pub fn balance_of(&self, account_id: &str, token: &str) -> Amount {
        self.0
            .get(account_id)
            .or_else(|| self.0.get(&account_id.to_lowercase()))
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String, Amount)> for AccountBalances {
    fn from_iter<I: IntoIterator<Item = (String, String, Amount)>>(iter: I) -> Self {
        let mut balances = AccountBalances::new();
        for (account, token, amount) in iter {
            balances.insert(&account, &token, amount);
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_reads_zero() {
        let balances = AccountBalances::new();
        assert_eq!(balances.balance_of("0xabc", "T0001"), Amount::ZERO);
    }

    #[test]
    fn test_lookup_is_case_insensitive_on_account() {
        let mut balances = AccountBalances::new();
        balances.insert("0xABCDEF", "T0001", Amount::from(5u64));
        assert_eq!(balances.balance_of("0xabcdef", "T0001"), Amount::from(5u64));
        assert_eq!(balances.balance_of("0xABCDEF", "T0001"), Amount::from(5u64));
        assert!(balances.contains("0xAbCdEf", "T0001"));
        assert!(!balances.contains("0xabcdef", "T0002"));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{ "0x01": { "T0001": "300", "T0002": 4 } }"#;
        let balances: AccountBalances = serde_json::from_str(json).unwrap();
        assert_eq!(balances.balance_of("0x01", "T0001"), Amount::from(300u64));
        assert_eq!(balances.balance_of("0x01", "T0002"), Amount::from(4u64));
        let out = serde_json::to_value(&balances).unwrap();
        assert_eq!(out["0x01"]["T0002"], "4");
    }
}
