//! # dfusion-orderbook
//!
//! Order ingestion and reporting for the dFusion batch auction exchange.
//! Reads the packed on-chain order book, caps every order by what its owner
//! can actually pay, and summarises the executed amounts of a solved batch.
//!
//! ## Pipeline
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Decode | `wire` | 112-byte records | `DecodedOrder` |
//! | Cap | `capping` | orders + `AccountBalances` | feasible orders |
//! | Aggregate | `aggregate` | executed orders + registry | `Aggregates` in human units |
//! | Report | `report` | orders | log lines, order counts per pair |
//!
//! Instances (tokens, balances, orders, fee) are exchanged as JSON files
//! with every amount written as a decimal string.
//!
//! ## Quick Start
//!
//! ```rust
//! use dfusion_orderbook::{aggregate, cap_orders, AccountBalances, Amount, Order, TokenRegistry};
//!
//! let owner = "0x00000000000000000000000000000000000000a1";
//! let mut balances = AccountBalances::new();
//! balances.insert(owner, "T0001", Amount::from(120u64));
//!
//! let orders = vec![
//!     Order::new(owner, "T0001", "T0004", Amount::from(100u64), Amount::from(50u64)),
//!     Order::new(owner, "T0001", "T0004", Amount::from(50u64), Amount::from(33u64)),
//! ];
//! let capped = cap_orders(orders, &balances).unwrap();
//! assert_eq!(capped[1].sell_amount, Amount::from(20u64));
//!
//! let solved: Vec<Order> = capped
//!     .into_iter()
//!     .map(|o| {
//!         let (sell, buy) = (o.sell_amount, o.buy_amount);
//!         o.with_execution(sell, buy)
//!     })
//!     .collect();
//! let totals = aggregate(&solved, &TokenRegistry::with_defaults()).unwrap();
//! assert_eq!(totals.executed_orders(), 2);
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Read the current order book from mainnet and write instance-<batch>.json
//! cargo run --release -- --node-url https://mainnet.example/rpc fetch
//!
//! # Cap and summarise an instance file
//! cargo run --release -- inspect instance-5263342.json
//! ```

pub mod aggregate;
pub mod capping;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod models;
pub mod reader;
pub mod report;
pub mod rpc;
pub mod store;
pub mod tokens;
pub mod utils;
pub mod wire;

pub use aggregate::{aggregate, Aggregates, PairAmounts};
pub use capping::cap_orders;
pub use error::{Error, Result};
pub use exchange::{BatchExchange, BatchExchangeContract, InMemoryExchange, Network};
pub use models::{AccountBalances, Amount, Fee, Instance, Order, TokenQuantity};
pub use reader::read_instance_from_chain;
pub use report::{count_orders_per_pair, log_orders, PairCount};
pub use rpc::RpcClient;
pub use store::{load_from_file, read_instance, save_to_file, write_instance};
pub use tokens::{TokenInfo, TokenRegistry};
pub use wire::{decode_orders, DecodedOrder, OrderRecord};
