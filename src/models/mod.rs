pub mod amount;
pub mod balances;
pub mod instance;
pub mod order;
pub mod quantity;

pub use amount::Amount;
pub use balances::AccountBalances;
pub use instance::{tokens_of, Fee, Instance};
pub use order::Order;
pub use quantity::TokenQuantity;
