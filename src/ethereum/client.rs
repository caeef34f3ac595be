// src/ethereum/client.rs
use super::EthereumVenue;
use crate::arbitrage::math;
use crate::error::ArbError;
use async_trait::async_trait;
use ethers::abi::{decode, encode, ParamType, Token};
use ethers::core::types::{Address, TransactionRequest, U256, U64};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::id;
use log::info;
use num_bigint::BigUint;
use std::time::{SystemTime, UNIX_EPOCH};

const SWAP_DEADLINE_SECS: u64 = 600;

fn u256_to_biguint(value: U256) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}

fn biguint_to_u256(value: &BigUint) -> Result<U256, ArbError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ArbError::ParseError("amount exceeds 256 bits".to_string()));
    }
    Ok(U256::from_big_endian(&bytes))
}

/// Uniswap V2 access through a JSON-RPC provider. Reads work without a key;
/// swaps need the signing middleware.
pub struct EthereumClient {
    provider: Provider<Http>,
    signer: Option<SignerMiddleware<Provider<Http>, LocalWallet>>,
    owner: Address,
    token: Address,
    weth: Address,
    pair: Address,
    router: Address,
}

impl EthereumClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        wallet_address: &str,
        chain_id: u64,
        token: &str,
        weth: &str,
        pair: &str,
        router: &str,
    ) -> Result<Self, ArbError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ArbError::ConfigError(format!("invalid ETH_RPC_ENDPOINT: {}", e)))?;
        let parse_addr = |name: &str, value: &str| -> Result<Address, ArbError> {
            value
                .parse::<Address>()
                .map_err(|e| ArbError::ConfigError(format!("invalid {}: {}", name, e)))
        };

        let (signer, owner) = if private_key.is_empty() {
            (None, parse_addr("ETH_WALLET_ADDRESS", wallet_address)?)
        } else {
            let wallet: LocalWallet = private_key
                .parse()
                .map_err(|e| ArbError::ConfigError(format!("invalid ETH_PRIVATE_KEY: {}", e)))?;
            let wallet = wallet.with_chain_id(chain_id);
            let owner = wallet.address();
            (Some(SignerMiddleware::new(provider.clone(), wallet)), owner)
        };

        Ok(Self {
            provider,
            signer,
            owner,
            token: parse_addr("TOKEN_ADDRESS_ETH", token)?,
            weth: parse_addr("WETH_ADDRESS_ETH", weth)?,
            pair: parse_addr("PAIR_ADDRESS_ETH", pair)?,
            router: parse_addr("ROUTER_ADDRESS_ETH", router)?,
        })
    }

    fn signer(&self) -> Result<&SignerMiddleware<Provider<Http>, LocalWallet>, ArbError> {
        self.signer.as_ref().ok_or_else(|| {
            ArbError::ExecutionDisabled("no ETH private key configured".to_string())
        })
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ArbError> {
        let tx = TransactionRequest::new().to(to).data(data);
        let out = self
            .provider
            .call(&tx.into(), None)
            .await
            .map_err(|e| ArbError::RpcError(format!("eth_call: {}", e)))?;
        Ok(out.to_vec())
    }

    async fn call_uint(&self, to: Address, data: Vec<u8>, context: &str) -> Result<U256, ArbError> {
        let out = self.call(to, data).await?;
        let tokens = decode(&[ParamType::Uint(256)], &out)
            .map_err(|e| ArbError::ParseError(format!("{}: {}", context, e)))?;
        tokens
            .into_iter()
            .next()
            .and_then(|t| t.into_uint())
            .ok_or_else(|| ArbError::ParseError(format!("{}: empty return", context)))
    }

    async fn allowance(&self) -> Result<U256, ArbError> {
        let data = [
            id("allowance(address,address)").to_vec(),
            encode(&[Token::Address(self.owner), Token::Address(self.router)]),
        ]
        .concat();
        self.call_uint(self.token, data, "allowance").await
    }

    async fn approve_if_needed(&self, amount: U256) -> Result<(), ArbError> {
        if self.allowance().await? >= amount {
            return Ok(());
        }
        info!("Approving router for {} token wei", amount);
        let data = [
            id("approve(address,uint256)").to_vec(),
            encode(&[Token::Address(self.router), Token::Uint(amount)]),
        ]
        .concat();
        let tx = TransactionRequest::new().to(self.token).data(data);
        self.send(tx, "approve").await?;
        Ok(())
    }

    async fn send(&self, tx: TransactionRequest, description: &str) -> Result<String, ArbError> {
        let signer = self.signer()?;
        let pending = signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| ArbError::ExecutionError(format!("{}: {}", description, e)))?;
        let receipt = pending
            .await
            .map_err(|e| ArbError::RpcError(format!("{} receipt: {}", description, e)))?
            .ok_or_else(|| {
                ArbError::ExecutionError(format!("{}: transaction dropped from mempool", description))
            })?;
        if receipt.status != Some(U64::from(1)) {
            return Err(ArbError::TransactionFailed(format!(
                "{} reverted in block {:?}",
                description, receipt.block_number
            )));
        }
        let tx_hash = format!("{:?}", receipt.transaction_hash);
        info!("{} confirmed in block {:?}: {}", description, receipt.block_number, tx_hash);
        Ok(tx_hash)
    }

    fn deadline() -> U256 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        U256::from(now + SWAP_DEADLINE_SECS)
    }

    /// Expected output for `amount_in` against live reserves, with the 1%
    /// slippage tolerance applied.
    async fn min_out_for(
        &self,
        amount_in: &BigUint,
        selling_token: bool,
    ) -> Result<U256, ArbError> {
        let (reserve_weth, reserve_token) = self.get_pair_reserves().await?;
        let expected = if selling_token {
            math::constant_product_out(amount_in, &reserve_token, &reserve_weth)
        } else {
            math::constant_product_out(amount_in, &reserve_weth, &reserve_token)
        };
        let min_out = expected * BigUint::from(99u32) / BigUint::from(100u32);
        biguint_to_u256(&min_out)
    }
}

#[async_trait]
impl EthereumVenue for EthereumClient {
    async fn get_eth_balance(&self) -> Result<f64, ArbError> {
        let balance = self
            .provider
            .get_balance(self.owner, None)
            .await
            .map_err(|e| ArbError::RpcError(format!("get_balance: {}", e)))?;
        Ok(math::wei_to_eth(&u256_to_biguint(balance)))
    }

    async fn get_token_balance(&self) -> Result<f64, ArbError> {
        let data = [
            id("balanceOf(address)").to_vec(),
            encode(&[Token::Address(self.owner)]),
        ]
        .concat();
        let balance = self.call_uint(self.token, data, "balanceOf").await?;
        Ok(math::wei_to_eth(&u256_to_biguint(balance)))
    }

    async fn get_pair_reserves(&self) -> Result<(BigUint, BigUint), ArbError> {
        let out = self.call(self.pair, id("getReserves()").to_vec()).await?;
        let tokens = decode(
            &[
                ParamType::Uint(112),
                ParamType::Uint(112),
                ParamType::Uint(32),
            ],
            &out,
        )
        .map_err(|e| ArbError::ParseError(format!("getReserves: {}", e)))?;
        let reserve0 = tokens
            .first()
            .cloned()
            .and_then(|t| t.into_uint())
            .ok_or_else(|| ArbError::ParseError("getReserves: missing reserve0".to_string()))?;
        let reserve1 = tokens
            .get(1)
            .cloned()
            .and_then(|t| t.into_uint())
            .ok_or_else(|| ArbError::ParseError("getReserves: missing reserve1".to_string()))?;

        let out = self.call(self.pair, id("token0()").to_vec()).await?;
        let token0 = decode(&[ParamType::Address], &out)
            .map_err(|e| ArbError::ParseError(format!("token0: {}", e)))?
            .into_iter()
            .next()
            .and_then(|t| t.into_address())
            .ok_or_else(|| ArbError::ParseError("token0: empty return".to_string()))?;

        let (weth_reserve, token_reserve) = if token0 == self.weth {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        Ok((u256_to_biguint(weth_reserve), u256_to_biguint(token_reserve)))
    }

    async fn swap_token_for_eth(&self, amount_tokens: u64) -> Result<String, ArbError> {
        let amount_in = BigUint::from(amount_tokens) * BigUint::from(10u64).pow(18);
        let amount_in_u256 = biguint_to_u256(&amount_in)?;
        let min_out = self.min_out_for(&amount_in, true).await?;

        info!("ETH leg: selling {} tokens for ETH (min out {} wei)", amount_tokens, min_out);
        self.approve_if_needed(amount_in_u256).await?;

        let data = [
            id("swapExactTokensForETH(uint256,uint256,address[],address,uint256)").to_vec(),
            encode(&[
                Token::Uint(amount_in_u256),
                Token::Uint(min_out),
                Token::Array(vec![Token::Address(self.token), Token::Address(self.weth)]),
                Token::Address(self.owner),
                Token::Uint(Self::deadline()),
            ]),
        ]
        .concat();
        let tx = TransactionRequest::new().to(self.router).data(data);
        self.send(tx, "swapExactTokensForETH").await
    }

    async fn swap_eth_for_token(&self, amount_eth: f64) -> Result<String, ArbError> {
        let value = math::eth_to_wei(amount_eth);
        if value == BigUint::from(0u32) {
            return Err(ArbError::ExecutionError(format!(
                "non-positive ETH amount {}",
                amount_eth
            )));
        }
        let value_u256 = biguint_to_u256(&value)?;
        let min_out = self.min_out_for(&value, false).await?;

        info!("ETH leg: buying tokens with {:.9} ETH (min out {} wei)", amount_eth, min_out);
        let data = [
            id("swapExactETHForTokens(uint256,address[],address,uint256)").to_vec(),
            encode(&[
                Token::Uint(min_out),
                Token::Array(vec![Token::Address(self.weth), Token::Address(self.token)]),
                Token::Address(self.owner),
                Token::Uint(Self::deadline()),
            ]),
        ]
        .concat();
        let tx = TransactionRequest::new()
            .to(self.router)
            .data(data)
            .value(value_u256);
        self.send(tx, "swapExactETHForTokens").await
    }
}
