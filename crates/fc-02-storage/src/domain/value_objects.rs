//! # Domain Value Objects
//!
//! Enumerations shared by entities, handlers and services.

use serde::{Deserialize, Serialize};
use shared_types::ChainSide;
use std::fmt;
use std::str::FromStr;

/// Kind of a cross-chain message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageType {
    /// Value token staked on origin, utility token minted on auxiliary.
    Stake,
    /// Utility token redeemed on auxiliary, value token unstaked on origin.
    Redeem,
}

impl MessageType {
    /// Direction every message of this type travels.
    pub fn direction(self) -> MessageDirection {
        match self {
            Self::Stake => MessageDirection::OriginToAuxiliary,
            Self::Redeem => MessageDirection::AuxiliaryToOrigin,
        }
    }
}

/// Direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageDirection {
    /// Declared on origin, confirmed on auxiliary.
    OriginToAuxiliary,
    /// Declared on auxiliary, confirmed on origin.
    AuxiliaryToOrigin,
}

impl MessageDirection {
    /// Chain the message is declared on.
    pub fn source(self) -> ChainSide {
        match self {
            Self::OriginToAuxiliary => ChainSide::Origin,
            Self::AuxiliaryToOrigin => ChainSide::Auxiliary,
        }
    }

    /// Chain the message is confirmed on.
    pub fn target(self) -> ChainSide {
        self.source().opposite()
    }

    /// Message type travelling in this direction.
    pub fn message_type(self) -> MessageType {
        match self {
            Self::OriginToAuxiliary => MessageType::Stake,
            Self::AuxiliaryToOrigin => MessageType::Redeem,
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginToAuxiliary => f.write_str("origin->auxiliary"),
            Self::AuxiliaryToOrigin => f.write_str("auxiliary->origin"),
        }
    }
}

/// Status of one side of a message. Ordered: a status never moves backwards.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MessageStatus {
    /// Not yet seen on this side.
    #[default]
    Undeclared,
    /// Declared (source) or confirmed (target).
    Declared,
    /// Progressed with the secret or a proof.
    Progressed,
}

impl MessageStatus {
    /// Check if transition is valid (forward only).
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        next > *self
    }

    /// The later of `self` and `next`.
    pub fn advance(self, next: MessageStatus) -> MessageStatus {
        self.max(next)
    }
}

/// Which side of the bridge a gateway lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayType {
    /// EIP20 gateway on origin.
    Origin,
    /// Co-gateway on auxiliary.
    Auxiliary,
}

impl GatewayType {
    /// Chain side of this gateway.
    pub fn side(self) -> ChainSide {
        match self {
            Self::Origin => ChainSide::Origin,
            Self::Auxiliary => ChainSide::Auxiliary,
        }
    }
}

/// Role of an anchor contract relative to an auxiliary chain record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorRole {
    /// Anchor on auxiliary that stores origin state roots.
    OriginRoots,
    /// Anchor on origin that stores auxiliary state roots.
    AuxiliaryRoots,
}

/// Indexed event kind. Also the second half of a cursor key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Stake pool: stake requested.
    StakeRequested,
    /// Gateway: stake intent declared.
    StakeIntentDeclared,
    /// Anchor: state root anchored.
    StateRootAvailable,
    /// Gateway or co-gateway: remote gateway proven.
    GatewayProven,
    /// Co-gateway: stake intent confirmed.
    StakeIntentConfirmed,
    /// Gateway: stake progressed.
    StakeProgressed,
    /// Co-gateway: mint progressed.
    MintProgressed,
    /// Redeem pool: redeem requested.
    RedeemRequested,
    /// Co-gateway: redeem intent declared.
    RedeemIntentDeclared,
    /// Gateway: redeem intent confirmed.
    RedeemIntentConfirmed,
    /// Co-gateway: redeem progressed.
    RedeemProgressed,
    /// Gateway: unstake progressed.
    UnstakeProgressed,
}

impl EntityKind {
    /// All kinds in stable order.
    pub const ALL: [EntityKind; 12] = [
        Self::StakeRequested,
        Self::StakeIntentDeclared,
        Self::StateRootAvailable,
        Self::GatewayProven,
        Self::StakeIntentConfirmed,
        Self::StakeProgressed,
        Self::MintProgressed,
        Self::RedeemRequested,
        Self::RedeemIntentDeclared,
        Self::RedeemIntentConfirmed,
        Self::RedeemProgressed,
        Self::UnstakeProgressed,
    ];

    /// Collection name the event index exposes for this kind.
    pub fn index_entity(self) -> &'static str {
        match self {
            Self::StakeRequested => "stakeRequesteds",
            Self::StakeIntentDeclared => "stakeIntentDeclareds",
            Self::StateRootAvailable => "stateRootAvailables",
            Self::GatewayProven => "gatewayProvens",
            Self::StakeIntentConfirmed => "stakeIntentConfirmeds",
            Self::StakeProgressed => "stakeProgresseds",
            Self::MintProgressed => "mintProgresseds",
            Self::RedeemRequested => "redeemRequesteds",
            Self::RedeemIntentDeclared => "redeemIntentDeclareds",
            Self::RedeemIntentConfirmed => "redeemIntentConfirmeds",
            Self::RedeemProgressed => "redeemProgresseds",
            Self::UnstakeProgressed => "unstakeProgresseds",
        }
    }

    /// Stable one-byte code used in storage keys.
    pub fn code(self) -> u8 {
        match self {
            Self::StakeRequested => 1,
            Self::StakeIntentDeclared => 2,
            Self::StateRootAvailable => 3,
            Self::GatewayProven => 4,
            Self::StakeIntentConfirmed => 5,
            Self::StakeProgressed => 6,
            Self::MintProgressed => 7,
            Self::RedeemRequested => 8,
            Self::RedeemIntentDeclared => 9,
            Self::RedeemIntentConfirmed => 10,
            Self::RedeemProgressed => 11,
            Self::UnstakeProgressed => 12,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_entity())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.index_entity() == s)
            .ok_or_else(|| format!("unknown entity kind: {s}"))
    }
}
