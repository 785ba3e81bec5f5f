use chrono::{DateTime, Utc};
use domain::Address;
use ports::{ParsedTransaction, TokenBalance};
use serde_json::Value;
use std::str::FromStr;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Builds a [`ParsedTransaction`] from a `getTransaction` (jsonParsed
/// encoding) result. Fields this node doesn't carry, or that fail to parse
/// as a valid [`Address`], are dropped rather than failing the whole
/// transaction — callers only need a best-effort projection (§4.5-style
/// graceful degradation applies here too).
pub fn parsed_transaction(signature: &str, value: &Value) -> ParsedTransaction {
    let slot = value.get("slot").and_then(Value::as_u64).unwrap_or(0);
    let block_time = value
        .get("blockTime")
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let program_ids = value
        .pointer("/transaction/message/instructions")
        .and_then(Value::as_array)
        .map(|instructions| {
            instructions
                .iter()
                .filter_map(|ix| ix.get("programId").and_then(Value::as_str))
                .filter_map(|s| Address::from_str(s).ok())
                .collect()
        })
        .unwrap_or_default();

    let pre_token_balances = token_balances(value.pointer("/meta/preTokenBalances"));
    let post_token_balances = token_balances(value.pointer("/meta/postTokenBalances"));

    let sol_balance_change = match (
        value.pointer("/meta/preBalances/0").and_then(Value::as_i64),
        value.pointer("/meta/postBalances/0").and_then(Value::as_i64),
    ) {
        (Some(pre), Some(post)) => (post - pre) as f64 / LAMPORTS_PER_SOL,
        _ => 0.0,
    };

    ParsedTransaction {
        signature: signature.to_string(),
        slot,
        block_time,
        program_ids,
        pre_token_balances,
        post_token_balances,
        sol_balance_change,
    }
}

fn token_balances(value: Option<&Value>) -> Vec<TokenBalance> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let owner = Address::from_str(entry.get("owner")?.as_str()?).ok()?;
            let mint = Address::from_str(entry.get("mint")?.as_str()?).ok()?;
            let amount = entry
                .pointer("/uiTokenAmount/uiAmount")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            Some(TokenBalance { owner, mint, amount })
        })
        .collect()
}

/// Projects a `getAccountInfo` (jsonParsed) result for an SPL mint account
/// into the authority-revocation flags [`ports::ContractInfo`] needs.
/// Honeypot detection and transfer-fee extensions require simulating a sell
/// or decoding Token-2022 extension TLVs, neither of which this node call
/// exposes; both are left at their safe default (§4.5).
pub fn contract_info(value: &Value) -> ports::ContractInfo {
    let info = value.pointer("/value/data/parsed/info");
    let mint_authority_revoked = info
        .and_then(|i| i.get("mintAuthority"))
        .map(Value::is_null)
        .unwrap_or(false);
    let freeze_authority_revoked = info
        .and_then(|i| i.get("freezeAuthority"))
        .map(Value::is_null)
        .unwrap_or(false);

    ports::ContractInfo {
        mint_authority_revoked,
        freeze_authority_revoked,
        is_honeypot: false,
        has_transfer_fee: false,
        transfer_fee_percent: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_token_balances_and_program_ids() {
        let owner = Address([1; 32]).to_string();
        let mint = Address([2; 32]).to_string();
        let program = Address([3; 32]).to_string();
        let value = json!({
            "slot": 42,
            "blockTime": 1_700_000_000,
            "transaction": {"message": {"instructions": [{"programId": program}]}},
            "meta": {
                "preBalances": [2_000_000_000i64],
                "postBalances": [1_000_000_000i64],
                "preTokenBalances": [{"owner": owner, "mint": mint, "uiTokenAmount": {"uiAmount": 0.0}}],
                "postTokenBalances": [{"owner": owner, "mint": mint, "uiTokenAmount": {"uiAmount": 10.0}}],
            }
        });

        let tx = parsed_transaction("sig1", &value);
        assert_eq!(tx.slot, 42);
        assert!(tx.block_time.is_some());
        assert_eq!(tx.program_ids, vec![Address([3; 32])]);
        assert_eq!(tx.pre_token_balances[0].amount, 0.0);
        assert_eq!(tx.post_token_balances[0].amount, 10.0);
        assert_eq!(tx.sol_balance_change, -1.0);
    }

    #[test]
    fn missing_fields_degrade_to_empty_defaults() {
        let tx = parsed_transaction("sig2", &json!({}));
        assert_eq!(tx.slot, 0);
        assert!(tx.block_time.is_none());
        assert!(tx.program_ids.is_empty());
        assert_eq!(tx.sol_balance_change, 0.0);
    }

    #[test]
    fn null_authority_means_revoked() {
        let value = json!({
            "value": {"data": {"parsed": {"info": {"mintAuthority": null, "freezeAuthority": "Addr"}}}}
        });
        let info = contract_info(&value);
        assert!(info.mint_authority_revoked);
        assert!(!info.freeze_authority_revoked);
    }
}
