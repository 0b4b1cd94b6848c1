#![allow(
    clippy::module_name_repetitions,
    reason = "Response suffix is intentional for clarity"
)]

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, TimestampMilliSeconds, serde_as, skip_serializing_none};

/// Paging for [`crate::ledger::Client::chain`].
#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct ChainRequest {
    /// Hash of the block to start from, as returned in [`ChainResponse::next_cursor`]
    pub start_block: Option<String>,
    pub limit: Option<u32>,
}

/// One operation inside a block.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct LedgerOperation {
    /// Operation type as named by the ledger, e.g. `SEND` or `RECEIVE`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Amount in the token's base units
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub amount: Option<u128>,
}

#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct LedgerBlock {
    pub hash: String,
    pub account: String,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    #[builder(default)]
    pub operations: Vec<LedgerOperation>,
}

/// Blocks voted on together.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct VoteStaple {
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, TimestampMilliSeconds<i64>)>>")]
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    #[builder(default)]
    pub blocks: Vec<LedgerBlock>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<VoteStaple>,
}

impl HistoryResponse {
    /// Every operation in the history, newest staple first as returned.
    pub fn operations(&self) -> impl Iterator<Item = &LedgerOperation> {
        self.history
            .iter()
            .flat_map(|staple| &staple.blocks)
            .flat_map(|block| &block.operations)
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    #[serde(default)]
    pub blocks: Vec<LedgerBlock>,
    /// Absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct OperationsResponse {
    #[serde(default)]
    pub operations: Vec<LedgerOperation>,
}

#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct LedgerBalance {
    pub token: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub balance: u128,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct BalanceResponse {
    #[serde(default)]
    pub balances: Vec<LedgerBalance>,
}

impl BalanceResponse {
    /// Balance of `token`, zero when the account holds none.
    #[must_use]
    pub fn balance_of(&self, token: &str) -> u128 {
        self.balances
            .iter()
            .filter(|balance| balance.token == token)
            .map(|balance| balance.balance)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chain_request_query_should_succeed() {
        use crate::ToQueryParams as _;

        let request = ChainRequest::builder().start_block("B9").limit(20).build();
        assert_eq!(request.query_params(None), "?startBlock=B9&limit=20");
    }

    #[test]
    fn empty_shapes_should_succeed() {
        let history: HistoryResponse = serde_json::from_value(json!({})).unwrap();
        let chain: ChainResponse = serde_json::from_value(json!({ "blocks": [] })).unwrap();
        let balance: BalanceResponse = serde_json::from_value(json!({ "balances": [] })).unwrap();

        assert!(history.history.is_empty(), "history defaults to empty");
        assert_eq!(chain.next_cursor, None);
        assert_eq!(balance.balance_of("keeta_anytoken"), 0);
    }

    #[test]
    fn operations_flatten_history() {
        let history: HistoryResponse = serde_json::from_value(json!({
            "history": [{
                "id": "staple-1",
                "timestamp": 1_792_400_000_000_i64,
                "blocks": [{
                    "hash": "B1",
                    "account": "keeta_aqmaker",
                    "date": "2026-10-19T12:00:00Z",
                    "operations": [
                        { "type": "SEND", "to": "keeta_aqtaker", "token": "keeta_aqtoken", "amount": "1500" },
                        { "type": "SET_INFO" }
                    ]
                }]
            }]
        }))
        .unwrap();

        let kinds: Vec<_> = history.operations().map(|op| op.kind.as_str()).collect();
        assert_eq!(kinds, vec!["SEND", "SET_INFO"]);
        assert_eq!(history.operations().next().unwrap().amount, Some(1500));
    }

    #[test]
    fn balance_accepts_numeric_strings() {
        let balance: BalanceResponse = serde_json::from_value(json!({
            "balances": [
                { "token": "keeta_aqtoken", "balance": "340282366920938463463374607431768211455" },
                { "token": "keeta_aqother", "balance": 7 }
            ]
        }))
        .unwrap();

        assert_eq!(balance.balance_of("keeta_aqtoken"), u128::MAX);
        assert_eq!(balance.balance_of("keeta_aqother"), 7);
    }
}
