//! The batch exchange smart contract, read through JSON-RPC `eth_call`.
//!
//! Calldata and return values go through the `sol!` bindings below; the
//! RPC client only moves bytes.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use super::BatchExchange;
use crate::models::Amount;
use crate::rpc::RpcClient;

const IDENTIFIER: &str = "BatchExchange";
const MAINNET_ADDRESS: &str = "0x6F400810b62df8E13fded51bE75fF5393eaa841F";
const RINKEBY_ADDRESS: &str = "0xC576eA7bd102F7E476368a5E98FA455d1Ea34dE2";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    contract IBatchExchange {
        function getCurrentBatchId() external view returns (uint32);
        function getEncodedUsersPaginated(
            address previousPageUser,
            uint16 previousPageUserOffset,
            uint16 pageSize
        ) external view returns (bytes memory elements);
        function tokenIdToAddressMap(uint16 id) external view returns (address);
        function getBalance(address user, address token) external view returns (uint256);
    }
}

use IBatchExchange::{
    getBalanceCall, getCurrentBatchIdCall, getEncodedUsersPaginatedCall, tokenIdToAddressMapCall,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Rinkeby,
}

impl Network {
    pub fn contract_address(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_ADDRESS,
            Network::Rinkeby => RINKEBY_ADDRESS,
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "rinkeby" => Ok(Network::Rinkeby),
            other => Err(anyhow!("unknown network '{}' (expected mainnet or rinkeby)", other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Rinkeby => write!(f, "rinkeby"),
        }
    }
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).map_err(|e| anyhow!("invalid address {}: {}", address, e))
}

/// `0x` + lowercase hex, the form accounts take everywhere else in the crate.
fn address_hex(address: Address) -> String {
    format!("0x{}", hex::encode(address))
}

fn decode_return<C: SolCall>(data: &[u8]) -> Result<C::Return> {
    C::abi_decode_returns(data)
        .map_err(|e| anyhow!("{} returned malformed data: {}", C::SIGNATURE, e))
}

pub struct BatchExchangeContract {
    rpc: RpcClient,
    address: String,
}

impl BatchExchangeContract {
    pub fn new(rpc: RpcClient, address: &str) -> Self {
        Self {
            rpc,
            address: address.to_lowercase(),
        }
    }

    pub fn for_network(rpc: RpcClient, network: Network) -> Self {
        Self::new(rpc, network.contract_address())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        self.rpc.eth_call(&self.address, &data).await
    }
}

#[async_trait]
impl BatchExchange for BatchExchangeContract {
    fn identifier(&self) -> &str {
        IDENTIFIER
    }

    async fn current_batch_id(&self) -> Result<u32> {
        let out = self.call(getCurrentBatchIdCall {}.abi_encode()).await?;
        decode_return::<getCurrentBatchIdCall>(&out)
    }

    async fn encoded_orders_page(
        &self,
        previous_user: &str,
        previous_user_offset: u16,
        page_size: u16,
    ) -> Result<Vec<u8>> {
        let call = getEncodedUsersPaginatedCall {
            previousPageUser: parse_address(previous_user)?,
            previousPageUserOffset: previous_user_offset,
            pageSize: page_size,
        };
        let out = self.call(call.abi_encode()).await?;
        Ok(decode_return::<getEncodedUsersPaginatedCall>(&out)?.to_vec())
    }

    async fn token_address(&self, token_index: u16) -> Result<String> {
        let out = self
            .call(tokenIdToAddressMapCall { id: token_index }.abi_encode())
            .await?;
        decode_return::<tokenIdToAddressMapCall>(&out).map(address_hex)
    }

    async fn balance(&self, account_id: &str, token_address: &str) -> Result<Amount> {
        let call = getBalanceCall {
            user: parse_address(account_id)?,
            token: parse_address(token_address)?,
        };
        let out = self.call(call.abi_encode()).await?;
        decode_return::<getBalanceCall>(&out).map(Amount)
    }
}
