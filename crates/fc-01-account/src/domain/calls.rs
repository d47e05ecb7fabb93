//! # Bridge Calls
//!
//! Typed contract calls issued by the facilitator.

use crate::abi::{
    sol_address, sol_hash, sol_uint, ICoGateway, IGateway, IRedeemPool, IStakePool,
};
use alloy_primitives::{Bytes, U256 as SolU256};
use alloy_sol_types::SolCall;
use shared_types::{Address, Hash, U256};

/// Arguments of `acceptStakeRequest` / `acceptRedeemRequest`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptRequestArgs {
    /// Requested amount.
    pub amount: U256,
    /// Beneficiary on the target chain.
    pub beneficiary: Address,
    /// Reward gas price.
    pub gas_price: U256,
    /// Reward gas limit.
    pub gas_limit: U256,
    /// Request nonce.
    pub nonce: U256,
    /// Staker or redeemer that opened the request.
    pub sender: Address,
    /// Gateway (stake) or co-gateway (redeem) the request targets.
    pub gateway: Address,
    /// Hash lock chosen by the facilitator.
    pub hash_lock: Hash,
}

/// Arguments of `confirmStakeIntent` / `confirmRedeemIntent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmIntentArgs {
    /// Staker / redeemer proxy that declared the intent.
    pub sender: Address,
    /// Nonce of the declaring proxy.
    pub sender_nonce: U256,
    /// Beneficiary on the target chain.
    pub beneficiary: Address,
    /// Declared amount.
    pub amount: U256,
    /// Reward gas price.
    pub gas_price: U256,
    /// Reward gas limit.
    pub gas_limit: U256,
    /// Hash lock of the message.
    pub hash_lock: Hash,
    /// Height at which the source gateway was proven.
    pub block_height: u64,
    /// Serialized storage proof of the outbox entry.
    pub storage_proof: Vec<u8>,
}

/// Arguments of the four progress calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressArgs {
    /// Message being progressed.
    pub message_hash: Hash,
    /// Secret whose keccak matches the hash lock.
    pub unlock_secret: Hash,
}

/// A bridge contract method call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeCall {
    /// Stake pool: turn a stake request into a declared stake intent.
    AcceptStakeRequest(AcceptRequestArgs),
    /// Redeem pool: turn a redeem request into a declared redeem intent.
    AcceptRedeemRequest(AcceptRequestArgs),
    /// Gateway / co-gateway: prove the remote gateway's storage root.
    ProveGateway {
        /// Anchored height of the remote chain.
        block_height: u64,
        /// RLP-encoded remote gateway account.
        encoded_account: Vec<u8>,
        /// Serialized account proof.
        account_proof: Vec<u8>,
    },
    /// Co-gateway: confirm a stake intent declared on origin.
    ConfirmStakeIntent(ConfirmIntentArgs),
    /// Gateway: confirm a redeem intent declared on auxiliary.
    ConfirmRedeemIntent(ConfirmIntentArgs),
    /// Gateway: progress the source side of a stake.
    ProgressStake(ProgressArgs),
    /// Co-gateway: progress the target side of a stake.
    ProgressMint(ProgressArgs),
    /// Co-gateway: progress the source side of a redeem.
    ProgressRedeem(ProgressArgs),
    /// Gateway: progress the target side of a redeem.
    ProgressUnstake(ProgressArgs),
}

impl BridgeCall {
    /// Contract method name, also used as metric label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AcceptStakeRequest(_) => "acceptStakeRequest",
            Self::AcceptRedeemRequest(_) => "acceptRedeemRequest",
            Self::ProveGateway { .. } => "proveGateway",
            Self::ConfirmStakeIntent(_) => "confirmStakeIntent",
            Self::ConfirmRedeemIntent(_) => "confirmRedeemIntent",
            Self::ProgressStake(_) => "progressStake",
            Self::ProgressMint(_) => "progressMint",
            Self::ProgressRedeem(_) => "progressRedeem",
            Self::ProgressUnstake(_) => "progressUnstake",
        }
    }

    /// Four-byte method selector.
    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::AcceptStakeRequest(_) => IStakePool::acceptStakeRequestCall::SELECTOR,
            Self::AcceptRedeemRequest(_) => IRedeemPool::acceptRedeemRequestCall::SELECTOR,
            Self::ProveGateway { .. } => IGateway::proveGatewayCall::SELECTOR,
            Self::ConfirmStakeIntent(_) => ICoGateway::confirmStakeIntentCall::SELECTOR,
            Self::ConfirmRedeemIntent(_) => IGateway::confirmRedeemIntentCall::SELECTOR,
            Self::ProgressStake(_) => IGateway::progressStakeCall::SELECTOR,
            Self::ProgressMint(_) => ICoGateway::progressMintCall::SELECTOR,
            Self::ProgressRedeem(_) => ICoGateway::progressRedeemCall::SELECTOR,
            Self::ProgressUnstake(_) => IGateway::progressUnstakeCall::SELECTOR,
        }
    }

    /// ABI-encoded calldata (selector followed by arguments).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::AcceptStakeRequest(args) => IStakePool::acceptStakeRequestCall {
                amount: sol_uint(args.amount),
                beneficiary: sol_address(args.beneficiary),
                gasPrice: sol_uint(args.gas_price),
                gasLimit: sol_uint(args.gas_limit),
                nonce: sol_uint(args.nonce),
                staker: sol_address(args.sender),
                gateway: sol_address(args.gateway),
                hashLock: sol_hash(args.hash_lock),
            }
            .abi_encode(),
            Self::AcceptRedeemRequest(args) => IRedeemPool::acceptRedeemRequestCall {
                amount: sol_uint(args.amount),
                beneficiary: sol_address(args.beneficiary),
                gasPrice: sol_uint(args.gas_price),
                gasLimit: sol_uint(args.gas_limit),
                nonce: sol_uint(args.nonce),
                redeemer: sol_address(args.sender),
                cogateway: sol_address(args.gateway),
                hashLock: sol_hash(args.hash_lock),
            }
            .abi_encode(),
            Self::ProveGateway {
                block_height,
                encoded_account,
                account_proof,
            } => IGateway::proveGatewayCall {
                blockHeight: SolU256::from(*block_height),
                rlpAccount: Bytes::from(encoded_account.clone()),
                rlpParentNodes: Bytes::from(account_proof.clone()),
            }
            .abi_encode(),
            Self::ConfirmStakeIntent(args) => ICoGateway::confirmStakeIntentCall {
                staker: sol_address(args.sender),
                stakerNonce: sol_uint(args.sender_nonce),
                beneficiary: sol_address(args.beneficiary),
                amount: sol_uint(args.amount),
                gasPrice: sol_uint(args.gas_price),
                gasLimit: sol_uint(args.gas_limit),
                hashLock: sol_hash(args.hash_lock),
                blockHeight: SolU256::from(args.block_height),
                rlpParentNodes: Bytes::from(args.storage_proof.clone()),
            }
            .abi_encode(),
            // Redeem confirmation takes the height before the hash lock.
            Self::ConfirmRedeemIntent(args) => IGateway::confirmRedeemIntentCall {
                redeemer: sol_address(args.sender),
                redeemerNonce: sol_uint(args.sender_nonce),
                beneficiary: sol_address(args.beneficiary),
                amount: sol_uint(args.amount),
                gasPrice: sol_uint(args.gas_price),
                gasLimit: sol_uint(args.gas_limit),
                blockHeight: SolU256::from(args.block_height),
                hashLock: sol_hash(args.hash_lock),
                rlpParentNodes: Bytes::from(args.storage_proof.clone()),
            }
            .abi_encode(),
            Self::ProgressStake(args) => IGateway::progressStakeCall {
                messageHash: sol_hash(args.message_hash),
                unlockSecret: sol_hash(args.unlock_secret),
            }
            .abi_encode(),
            Self::ProgressMint(args) => ICoGateway::progressMintCall {
                messageHash: sol_hash(args.message_hash),
                unlockSecret: sol_hash(args.unlock_secret),
            }
            .abi_encode(),
            Self::ProgressRedeem(args) => ICoGateway::progressRedeemCall {
                messageHash: sol_hash(args.message_hash),
                unlockSecret: sol_hash(args.unlock_secret),
            }
            .abi_encode(),
            Self::ProgressUnstake(args) => IGateway::progressUnstakeCall {
                messageHash: sol_hash(args.message_hash),
                unlockSecret: sol_hash(args.unlock_secret),
            }
            .abi_encode(),
        }
    }
}

/// A bridge call addressed to a deployed contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract receiving the call.
    pub to: Address,
    /// Method and arguments.
    pub call: BridgeCall,
}

impl ContractCall {
    /// Creates a call to `to`.
    pub fn new(to: Address, call: BridgeCall) -> Self {
        Self { to, call }
    }
}

/// Options attached to every submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOptions {
    /// Sending (facilitator) account.
    pub from: Address,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas: U256,
    /// Account nonce.
    pub nonce: u64,
    /// Value transferred with the call (bounty for accept calls).
    pub value: U256,
}
