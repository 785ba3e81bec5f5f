use chrono::Utc;
use domain::{Address, WalletActivity, WalletActivityKind};
use ports::ParsedTransaction;
use std::collections::HashSet;

/// Reconstructs pre/post token-balance deltas owned by `wallet` from a parsed
/// transaction and classifies the activity as `{buy, sell, transfer}` (§4.10).
///
/// Returns `None` when the transaction touches none of the wallet's token
/// balances — nothing to report.
pub fn classify_activity(
    wallet: Address,
    tx: &ParsedTransaction,
    dex_program_ids: &HashSet<Address>,
) -> Option<WalletActivity> {
    let mut deltas: Vec<(Address, f64)> = Vec::new();
    let mints: HashSet<Address> = tx
        .pre_token_balances
        .iter()
        .chain(tx.post_token_balances.iter())
        .filter(|b| b.owner == wallet)
        .map(|b| b.mint)
        .collect();

    for mint in mints {
        let pre: f64 = tx
            .pre_token_balances
            .iter()
            .filter(|b| b.owner == wallet && b.mint == mint)
            .map(|b| b.amount)
            .sum();
        let post: f64 = tx
            .post_token_balances
            .iter()
            .filter(|b| b.owner == wallet && b.mint == mint)
            .map(|b| b.amount)
            .sum();
        let delta = post - pre;
        if delta != 0.0 {
            deltas.push((mint, delta));
        }
    }

    let (token_mint, amount) = deltas
        .into_iter()
        .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap_or(std::cmp::Ordering::Equal))?;

    let touches_dex = tx.program_ids.iter().any(|id| dex_program_ids.contains(id));
    let sol_delta = tx.sol_balance_change;

    let kind = if touches_dex && amount > 0.0 && sol_delta < 0.0 {
        WalletActivityKind::Buy
    } else if touches_dex && amount < 0.0 && sol_delta > 0.0 {
        WalletActivityKind::Sell
    } else {
        WalletActivityKind::Transfer
    };

    Some(WalletActivity {
        wallet,
        signature: tx.signature.clone(),
        kind,
        token_mint,
        amount: amount.abs(),
        sol_amount: sol_delta.abs(),
        timestamp: tx.block_time.unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ports::TokenBalance;
    use std::collections::HashSet as StdHashSet;

    fn wallet() -> Address {
        Address([1; 32])
    }

    fn mint() -> Address {
        Address([2; 32])
    }

    fn dex_program() -> Address {
        Address([3; 32])
    }

    fn base_tx() -> ParsedTransaction {
        ParsedTransaction {
            signature: "sig".to_string(),
            slot: 1,
            block_time: None,
            program_ids: vec![],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            sol_balance_change: 0.0,
        }
    }

    #[test]
    fn buy_detected_when_token_increases_and_sol_decreases_through_dex() {
        let mut tx = base_tx();
        tx.program_ids = vec![dex_program()];
        tx.sol_balance_change = -1.5;
        tx.pre_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 0.0 }];
        tx.post_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 100.0 }];

        let mut dex = StdHashSet::new();
        dex.insert(dex_program());
        let activity = classify_activity(wallet(), &tx, &dex).unwrap();
        assert_eq!(activity.kind, WalletActivityKind::Buy);
        assert_eq!(activity.amount, 100.0);
        assert_eq!(activity.sol_amount, 1.5);
        assert_eq!(activity.token_mint, mint());
    }

    #[test]
    fn sell_detected_when_token_decreases_and_sol_increases_through_dex() {
        let mut tx = base_tx();
        tx.program_ids = vec![dex_program()];
        tx.sol_balance_change = 2.0;
        tx.pre_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 100.0 }];
        tx.post_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 0.0 }];

        let mut dex = StdHashSet::new();
        dex.insert(dex_program());
        let activity = classify_activity(wallet(), &tx, &dex).unwrap();
        assert_eq!(activity.kind, WalletActivityKind::Sell);
    }

    #[test]
    fn non_dex_balance_change_is_a_transfer() {
        let mut tx = base_tx();
        tx.pre_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 0.0 }];
        tx.post_token_balances = vec![TokenBalance { owner: wallet(), mint: mint(), amount: 50.0 }];

        let dex = StdHashSet::new();
        let activity = classify_activity(wallet(), &tx, &dex).unwrap();
        assert_eq!(activity.kind, WalletActivityKind::Transfer);
    }

    #[test]
    fn no_balance_change_for_wallet_yields_none() {
        let tx = base_tx();
        let dex = StdHashSet::new();
        assert!(classify_activity(wallet(), &tx, &dex).is_none());
    }

    #[test]
    fn unrelated_wallet_balances_are_ignored() {
        let mut tx = base_tx();
        let other = Address([9; 32]);
        tx.pre_token_balances = vec![TokenBalance { owner: other, mint: mint(), amount: 0.0 }];
        tx.post_token_balances = vec![TokenBalance { owner: other, mint: mint(), amount: 500.0 }];
        let dex = StdHashSet::new();
        assert!(classify_activity(wallet(), &tx, &dex).is_none());
    }
}
