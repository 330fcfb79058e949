use async_trait::async_trait;
use worldchain::{
    abi::{decode_words, encode_call, word_to_address, word_to_bool, word_to_uint, Token},
    rpc::JsonRpcClient,
    Address,
};

use super::{Proposal, UserDashboard, GET_PROPOSAL_SIGNATURE, GET_USER_DASHBOARD_SIGNATURE};
use crate::error::SessionError;

/// Static words returned by `getUserDashboard`
const DASHBOARD_WORDS: usize = 5;

/// Static words returned by `getProposal`
const PROPOSAL_WORDS: usize = 5;

/// Read-only views of the `HumanBond` contract
#[async_trait]
pub trait HumanBondReader: Send + Sync {
    async fn user_dashboard(&self, user: &Address) -> Result<UserDashboard, SessionError>;

    async fn proposal(&self, user: &Address) -> Result<Proposal, SessionError>;

    /// Dashboard plus the pending proposal, if the dashboard reports one
    async fn dashboard_with_proposal(
        &self,
        user: &Address,
    ) -> Result<(UserDashboard, Option<Proposal>), SessionError> {
        let dashboard = self.user_dashboard(user).await?;
        if !dashboard.has_proposal || dashboard.is_married {
            return Ok((dashboard, None));
        }

        let proposal = self.proposal(user).await?;
        Ok((dashboard, Some(proposal)))
    }
}

/// Reads `HumanBond` through `eth_call`
pub struct RpcHumanBondReader {
    rpc: JsonRpcClient,
    human_bond: Address,
}

impl RpcHumanBondReader {
    #[must_use]
    pub const fn new(rpc: JsonRpcClient, human_bond: Address) -> Self {
        Self { rpc, human_bond }
    }

    async fn call(&self, signature: &str, user: &Address) -> Result<Vec<u8>, SessionError> {
        let data = encode_call(signature, &[Token::Address(*user)]);
        Ok(self.rpc.eth_call(&self.human_bond, &data).await?)
    }
}

#[async_trait]
impl HumanBondReader for RpcHumanBondReader {
    async fn user_dashboard(&self, user: &Address) -> Result<UserDashboard, SessionError> {
        let data = self.call(GET_USER_DASHBOARD_SIGNATURE, user).await?;
        let words = decode_words(&data, DASHBOARD_WORDS)?;

        Ok(UserDashboard {
            is_married: word_to_bool(&words[0])?,
            has_proposal: word_to_bool(&words[1])?,
            partner: word_to_address(&words[2])?,
            pending_yield: word_to_uint(&words[3]),
            time_balance: word_to_uint(&words[4]),
        })
    }

    async fn proposal(&self, user: &Address) -> Result<Proposal, SessionError> {
        let data = self.call(GET_PROPOSAL_SIGNATURE, user).await?;
        let words = decode_words(&data, PROPOSAL_WORDS)?;

        Ok(Proposal {
            proposer: word_to_address(&words[0])?,
            proposed: word_to_address(&words[1])?,
            proposer_nullifier: word_to_uint(&words[2]),
            accepted: word_to_bool(&words[3])?,
            timestamp: word_to_uint(&words[4]),
        })
    }
}
