//! # Bridge Contract ABI
//!
//! Solidity bindings of the pool, gateway and co-gateway methods the
//! facilitator calls, and of the declared-intent events it reads back from
//! receipts.

#![allow(missing_docs)]
#![allow(clippy::too_many_arguments)]

use alloy_primitives::{Address as SolAddress, B256, U256 as SolU256};
use alloy_sol_types::{sol, SolEvent};
use shared_types::{Address, Hash, U256};

sol! {
    interface IStakePool {
        function acceptStakeRequest(
            uint256 amount,
            address beneficiary,
            uint256 gasPrice,
            uint256 gasLimit,
            uint256 nonce,
            address staker,
            address gateway,
            bytes32 hashLock
        ) external payable;
    }

    interface IRedeemPool {
        function acceptRedeemRequest(
            uint256 amount,
            address beneficiary,
            uint256 gasPrice,
            uint256 gasLimit,
            uint256 nonce,
            address redeemer,
            address cogateway,
            bytes32 hashLock
        ) external payable;
    }

    interface IGateway {
        event StakeIntentDeclared(
            bytes32 indexed messageHash,
            address staker,
            uint256 stakerNonce,
            address beneficiary,
            uint256 amount
        );

        function proveGateway(uint256 blockHeight, bytes rlpAccount, bytes rlpParentNodes) external;

        function confirmRedeemIntent(
            address redeemer,
            uint256 redeemerNonce,
            address beneficiary,
            uint256 amount,
            uint256 gasPrice,
            uint256 gasLimit,
            uint256 blockHeight,
            bytes32 hashLock,
            bytes rlpParentNodes
        ) external;

        function progressStake(bytes32 messageHash, bytes32 unlockSecret) external;

        function progressUnstake(bytes32 messageHash, bytes32 unlockSecret) external;
    }

    interface ICoGateway {
        event RedeemIntentDeclared(
            bytes32 indexed messageHash,
            address redeemer,
            uint256 redeemerNonce,
            address beneficiary,
            uint256 amount
        );

        function confirmStakeIntent(
            address staker,
            uint256 stakerNonce,
            address beneficiary,
            uint256 amount,
            uint256 gasPrice,
            uint256 gasLimit,
            bytes32 hashLock,
            uint256 blockHeight,
            bytes rlpParentNodes
        ) external;

        function progressMint(bytes32 messageHash, bytes32 unlockSecret) external;

        function progressRedeem(bytes32 messageHash, bytes32 unlockSecret) external;
    }
}

pub use ICoGateway::RedeemIntentDeclared;
pub use IGateway::StakeIntentDeclared;

/// Event carrying the hash of a freshly declared message.
pub trait DeclaredIntent: SolEvent {
    /// Hash of the declared message.
    fn message_hash(&self) -> Hash;
}

impl DeclaredIntent for StakeIntentDeclared {
    fn message_hash(&self) -> Hash {
        Hash::from(self.messageHash.0)
    }
}

impl DeclaredIntent for RedeemIntentDeclared {
    fn message_hash(&self) -> Hash {
        Hash::from(self.messageHash.0)
    }
}

pub(crate) fn sol_address(address: Address) -> SolAddress {
    SolAddress::from(address.0)
}

pub(crate) fn sol_hash(hash: Hash) -> B256 {
    B256::from(hash.0)
}

pub(crate) fn sol_uint(value: U256) -> SolU256 {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    SolU256::from_be_bytes(word)
}
