//! `HumanBond` contract on Worldchain

mod reader;
mod submitter;

pub use reader::{HumanBondReader, RpcHumanBondReader};
pub use submitter::ProposalSubmitter;

use worldchain::{Address, U256};

/// `accept(address proposer, uint256 root, uint256 nullifierHash, uint256[8] proof)`
pub const ACCEPT_SIGNATURE: &str = "accept(address,uint256,uint256,uint256[8])";

/// `getUserDashboard(address user)`
pub const GET_USER_DASHBOARD_SIGNATURE: &str = "getUserDashboard(address)";

/// `getProposal(address user)`
pub const GET_PROPOSAL_SIGNATURE: &str = "getProposal(address)";

/// Marriage status of a user as reported by `getUserDashboard`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDashboard {
    pub is_married: bool,
    pub has_proposal: bool,
    pub partner: Address,
    pub pending_yield: U256,
    pub time_balance: U256,
}

/// Proposal as reported by `getProposal`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub proposer: Address,
    pub proposed: Address,
    pub proposer_nullifier: U256,
    pub accepted: bool,
    pub timestamp: U256,
}
