//! RPC method dispatch.

use super::types::{RpcError, RpcRequest, RpcResponse};
use crate::runner::Broadcast;
use axum::extract::State;
use axum::Json;
use modulax_mempool::TxPool;
use modulax_types::{codec, AccountReader, Address, Transaction};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct RpcState {
    /// Read-only account lookup.
    pub accounts: Arc<dyn AccountReader>,
    /// The pending-transaction pool.
    pub pool: Arc<TxPool>,
    /// Outbound gossip channel; accepted transactions are broadcast once.
    pub broadcast: mpsc::Sender<Broadcast>,
}

/// Handler for `POST /rpc`.
pub async fn handle_rpc(
    State(ctx): State<RpcState>,
    Json(req): Json<RpcRequest>,
) -> Json<RpcResponse> {
    debug!(method = %req.method, "rpc request");
    let id = req.id.clone();
    let outcome = match req.method.as_str() {
        "getAccount" => get_account(&ctx, &req.params),
        "sendTransaction" => send_transaction(&ctx, &req.params).await,
        _ => Err(RpcError::new(
            RpcError::METHOD_NOT_FOUND,
            "Method not found",
        )),
    };

    Json(match outcome {
        Ok(result) => RpcResponse::result(id, result),
        Err(error) => RpcResponse::error(id, error),
    })
}

fn get_account(ctx: &RpcState, params: &[Value]) -> Result<Value, RpcError> {
    let addr_hex = params.first().and_then(Value::as_str).ok_or_else(|| {
        RpcError::new(RpcError::INVALID_PARAMS, "Invalid params: requires address")
    })?;
    let address = Address::from_hex(addr_hex)
        .map_err(|_| RpcError::new(RpcError::INVALID_PARAMS, "Invalid address format"))?;

    let account = ctx.accounts.account(&address);
    serde_json::to_value(account)
        .map_err(|e| RpcError::new(RpcError::SERVER_ERROR, e.to_string()))
}

async fn send_transaction(ctx: &RpcState, params: &[Value]) -> Result<Value, RpcError> {
    let tx_hex = params.first().and_then(Value::as_str).ok_or_else(|| {
        RpcError::new(RpcError::INVALID_PARAMS, "Invalid params: requires raw tx hex")
    })?;
    let tx_bytes = hex::decode(tx_hex)
        .map_err(|_| RpcError::new(RpcError::INVALID_PARAMS, "Invalid transaction hex"))?;

    let tx: Transaction = codec::from_bytes(&tx_bytes)
        .map_err(|_| RpcError::new(RpcError::SERVER_ERROR, "Failed to decode transaction"))?;
    if !tx.verify() {
        return Err(RpcError::new(
            RpcError::SERVER_ERROR,
            "Invalid transaction signature",
        ));
    }

    let hash = ctx.pool.add(tx).map_err(|e| {
        RpcError::new(
            RpcError::POOL_REJECTED,
            format!("Failed to add transaction to pool: {e}"),
        )
    })?;

    // The origin node broadcasts once; gossip receivers never re-broadcast.
    if ctx
        .broadcast
        .send(Broadcast::Transaction(tx_bytes))
        .await
        .is_err()
    {
        warn!("broadcast channel closed, transaction not gossiped");
    }

    Ok(Value::String(format!(
        "Transaction accepted: {}",
        hash.to_hex()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modulax_types::{Account, Wallet};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FixedAccounts {
        accounts: Mutex<HashMap<Address, Account>>,
    }

    impl AccountReader for FixedAccounts {
        fn account(&self, addr: &Address) -> Account {
            self.accounts.lock().get(addr).copied().unwrap_or_default()
        }
    }

    fn test_state(funded: &[(Address, u64)]) -> (RpcState, mpsc::Receiver<Broadcast>) {
        let accounts: Arc<FixedAccounts> = Arc::new(FixedAccounts::default());
        {
            let mut table = accounts.accounts.lock();
            for &(addr, balance) in funded {
                table.insert(addr, Account { balance, nonce: 0 });
            }
        }
        let accounts: Arc<dyn AccountReader> = accounts;
        let pool = Arc::new(TxPool::new(accounts.clone()));
        let (broadcast, broadcast_rx) = mpsc::channel(8);
        (
            RpcState {
                accounts,
                pool,
                broadcast,
            },
            broadcast_rx,
        )
    }

    async fn call(ctx: &RpcState, method: &str, params: Vec<Value>) -> RpcResponse {
        let Json(resp) = handle_rpc(
            State(ctx.clone()),
            Json(RpcRequest::new(method, params)),
        )
        .await;
        resp
    }

    #[tokio::test]
    async fn get_account_returns_zero_for_unknown_address() {
        let (ctx, _rx) = test_state(&[]);
        let addr = Address::from_bytes([5u8; 20]);

        let resp = call(&ctx, "getAccount", vec![Value::from(addr.to_hex())]).await;
        let result = resp.result.unwrap();
        assert_eq!(result["Balance"], 0);
        assert_eq!(result["Nonce"], 0);
    }

    #[tokio::test]
    async fn get_account_rejects_malformed_address() {
        let (ctx, _rx) = test_state(&[]);

        let resp = call(&ctx, "getAccount", vec![Value::from("nothex")]).await;
        assert_eq!(resp.error.unwrap().code, RpcError::INVALID_PARAMS);

        let resp = call(&ctx, "getAccount", vec![]).await;
        assert_eq!(resp.error.unwrap().code, RpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn send_transaction_accepts_and_broadcasts() {
        let wallet = Wallet::generate();
        let (ctx, mut rx) = test_state(&[(wallet.address(), 100)]);

        let tx =
            Transaction::new_signed(&wallet, Address::from_bytes([2u8; 20]), 25, 0).unwrap();
        let tx_bytes = codec::to_bytes(&tx);

        let resp = call(
            &ctx,
            "sendTransaction",
            vec![Value::from(hex::encode(&tx_bytes))],
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(
            result.as_str().unwrap(),
            format!("Transaction accepted: {}", tx.hash.to_hex())
        );
        assert!(ctx.pool.contains(&tx.hash));

        match rx.try_recv().unwrap() {
            Broadcast::Transaction(bytes) => assert_eq!(bytes, tx_bytes),
            other => panic!("expected transaction broadcast, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_transaction_rejects_bad_hex() {
        let (ctx, _rx) = test_state(&[]);
        let resp = call(&ctx, "sendTransaction", vec![Value::from("zzzz")]).await;
        assert_eq!(resp.error.unwrap().code, RpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn send_transaction_rejects_undecodable_bytes() {
        let (ctx, _rx) = test_state(&[]);
        let resp = call(
            &ctx,
            "sendTransaction",
            vec![Value::from(hex::encode(b"garbage"))],
        )
        .await;
        assert_eq!(resp.error.unwrap().code, RpcError::SERVER_ERROR);
    }

    #[tokio::test]
    async fn send_transaction_surfaces_pool_rejection() {
        let wallet = Wallet::generate();
        let (ctx, mut rx) = test_state(&[(wallet.address(), 100)]);

        // Nonce 3 disagrees with the account's nonce 0.
        let tx =
            Transaction::new_signed(&wallet, Address::from_bytes([2u8; 20]), 25, 3).unwrap();
        let resp = call(
            &ctx,
            "sendTransaction",
            vec![Value::from(hex::encode(codec::to_bytes(&tx)))],
        )
        .await;

        assert_eq!(resp.error.unwrap().code, RpcError::POOL_REJECTED);
        assert!(rx.try_recv().is_err(), "rejected tx must not be gossiped");
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let (ctx, _rx) = test_state(&[]);
        let resp = call(&ctx, "mineBlock", vec![]).await;
        assert_eq!(resp.error.unwrap().code, RpcError::METHOD_NOT_FOUND);
    }
}
