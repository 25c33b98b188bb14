//! Token metadata: aliases and decimals of the tokens listed on the exchange.
//!
//! Tokens are identified on chain by a 16-bit index and in instance files by
//! `T` + four-digit index (`T0007`). The registry maps those ids to a human
//! alias and to the number of decimals used for scaling amounts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl TokenInfo {
    pub fn new(alias: &str, decimals: u32) -> Self {
        Self {
            alias: Some(alias.to_string()),
            decimals: Some(decimals),
        }
    }
}

/// Read-only token lookup, built once per run and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<String, TokenInfo>,
}

impl TokenRegistry {
    /// An empty registry: every lookup falls back to the id and 18 decimals.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the tokens listed on the exchange mainnet deployment.
    pub fn with_defaults() -> Self {
        let tokens = KNOWN_TOKENS
            .iter()
            .map(|(id, alias, decimals)| (token_id(*id), TokenInfo::new(alias, *decimals)))
            .collect();
        Self { tokens }
    }

    /// Apply overrides on top of this registry. A `None` entry registers the
    /// token without touching existing metadata; set fields replace old ones.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, Option<TokenInfo>>) -> Self {
        for (id, info) in overrides {
            let entry = self.tokens.entry(id).or_default();
            if let Some(info) = info {
                if info.alias.is_some() {
                    entry.alias = info.alias;
                }
                if info.decimals.is_some() {
                    entry.decimals = info.decimals;
                }
            }
        }
        self
    }

    /// Alias of a token, falling back to the id itself.
    pub fn name_of(&self, token: &str) -> String {
        self.tokens
            .get(token)
            .and_then(|info| info.alias.clone())
            .unwrap_or_else(|| token.to_string())
    }

    /// Decimals of a token, falling back to 18.
    pub fn decimals_of(&self, token: &str) -> u32 {
        self.tokens
            .get(token)
            .and_then(|info| info.decimals)
            .unwrap_or(DEFAULT_DECIMALS)
    }

    /// Id of the token with alias `name`. Unknown or ambiguous aliases fall
    /// back to `name` itself.
    pub fn id_of(&self, name: &str) -> String {
        let ids: Vec<&String> = self
            .tokens
            .iter()
            .filter(|(_, info)| info.alias.as_deref() == Some(name))
            .map(|(id, _)| id)
            .collect();
        match ids.as_slice() {
            [id] => (*id).clone(),
            [] => name.to_string(),
            _ => {
                warn!(
                    alias = name,
                    ids = ?ids,
                    "multiple tokens share an alias, returning it unchanged"
                );
                name.to_string()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Logical id of on-chain token index `index`: `T0007`.
pub fn token_id(index: u16) -> String {
    format!("T{:04}", index)
}

/// On-chain index of a logical token id.
pub fn token_index(token: &str) -> Result<u16> {
    token
        .strip_prefix('T')
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| Error::InvalidToken(token.to_string()))
}

const KNOWN_TOKENS: &[(u16, &str, u32)] = &[
    (0, "OWL", 18),
    (1, "WETH", 18),
    (2, "USDT", 6),
    (3, "TUSD", 18),
    (4, "USDC", 6),
    (5, "PAX", 18),
    (6, "GUSD", 2),
    (7, "DAI", 18),
    (8, "sETH", 18),
    (9, "sUSD", 18),
    (10, "sBTC", 18),
    (11, "WBTC", 8),
    (12, "SAI", 18),
    (13, "cDAI", 8),
    (14, "aDAI", 18),
    (15, "SNX", 18),
    (16, "CHAI", 18),
    (17, "PAXG", 18),
    (18, "GNO", 18),
    (19, "PAN", 18),
    (20, "GEN", 18),
    (21, "oETH", 8),
    (22, "GRID", 12),
    (23, "MKR", 18),
    (24, "LINK", 18),
    (25, "TAU", 18),
    (26, "SNGLS", 0),
    (27, "DZAR", 6),
    (28, "BiLira", 6),
    (29, "RPL", 18),
    (30, "PARETO", 18),
    (31, "aUSDC", 6),
    (32, "aSUSD", 18),
    (33, "aTUSD", 18),
    (34, "aUSDT", 6),
    (35, "aETH", 18),
    (36, "aBAT", 18),
    (37, "aKNC", 18),
    (38, "aLEND", 18),
    (39, "aLINK", 18),
    (40, "aMANA", 18),
    (41, "aMKR", 18),
    (42, "aSNX", 18),
    (43, "BAT", 18),
    (44, "BTU", 18),
    (45, "bDAI", 18),
    (46, "ANT", 18),
    (47, "SPL", 18),
    (48, "UMA", 18),
    (49, "sEUR", 18),
    (50, "XRT", 9),
    (51, "DXD", 18),
    (52, "oETH $200 Put 05/29/20", 7),
    (53, "ocDAI", 8),
    (54, "ocUSDC", 8),
    (55, "oETH", 7),
    (56, "NOIA", 18),
    (57, "TLN", 18),
    (58, "UAX", 2),
    (59, "DMG", 18),
    (60, "STA", 18),
    (61, "thrm", 18),
    (62, "PNK", 18),
    (63, "BITS", 8),
    (72, "MTA", 18),
    (73, "mUSD", 18),
    (79, "DIA", 18),
];
