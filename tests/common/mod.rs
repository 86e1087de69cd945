//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use algo_pay::blockchain::client::{ChainClient, ChainConnector, ChainGateway};
use algo_pay::blockchain::types::{
    Account, EndpointConfig, NodeTransactionParams, PendingTransactionInfo, SignedBlob,
};
use algo_pay::blockchain::wallet::{
    ExtensionError, SendRequest, SendResponse, WalletExtension, WalletGateway, WalletTransaction,
    USER_REJECTED_CODE,
};
use algo_pay::{CoreError, CoreResult, TransactionOrchestrator};

pub const SENDER: &str = "MALVCNPYFAS5MN7R6DAO3BRORKMRYOWAVZWDPQ6XBEBXQ2GDFFA75E6S5M";
pub const RECEIVER: &str = "EX3L3OW2EOCHDJCUX3XDGDIQQZFVNOSSRVCG4ZK73VLZNZ2EO4ZBT2HE6U";
pub const GENESIS_HASH: &str = "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=";
pub const GENESIS_ID: &str = "testnet-v1.0";

/// Canonical bytes of a 1.5 unit payment SENDER → RECEIVER at round
/// 30000000 with the placeholder note, base64.
pub const EXPECTED_TXN: &str = "iqNhbXTOABbjYKNmZWXNA+iiZnbOAcnDgKNnZW6sdGVzdG5ldC12MS4womdoxCBIY7UYpLPITsgQ8i1PEIHLD3HwWaesIN7GL39w5Qk6IqJsds4BycdopG5vdGXEBHRlc3SjcmN2xCAl9r262iOEcaRUvu4zDRCGS1a6Uo1EbmVf3VeW50R3MqNzbmTEIGAXUTX4KCXWN/HwwO2GLoqZHDrArmw3w9cJA3howylBpHR5cGWjcGF5";
pub const EXPECTED_TX_ID: &str = "CQZVF4E77GDORQFUENPKFQLVP2MFLOREV7KSBS5POV3JTKRHQLCA";

pub fn node_params(last_round: u64) -> NodeTransactionParams {
    serde_json::from_value(json!({
        "consensus-version": "https://github.com/algorandfoundation/specs/tree/abc",
        "fee": 0,
        "genesis-hash": GENESIS_HASH,
        "genesis-id": GENESIS_ID,
        "last-round": last_round,
        "min-fee": 1000
    }))
    .unwrap()
}

pub fn pending_info(reply: serde_json::Value) -> PendingTransactionInfo {
    serde_json::from_value(reply).unwrap()
}

pub fn user_rejection() -> ExtensionError {
    ExtensionError::Request {
        code: USER_REJECTED_CODE,
        message: "[RequestError.UserRejected] The extension user does not authorize the request.".into(),
    }
}

/// Scripted wallet extension.
///
/// Successful sends return ids from `send_ids` in order, then the
/// signed transaction's id.
#[derive(Default)]
pub struct MockWallet {
    pub connect_error: Mutex<Option<ExtensionError>>,
    pub sign_error: Mutex<Option<ExtensionError>>,
    pub send_error: Mutex<Option<ExtensionError>>,
    pub send_ids: Mutex<VecDeque<String>>,
    pub sign_requests: Mutex<Vec<Vec<WalletTransaction>>>,
    pub send_requests: Mutex<Vec<SendRequest>>,
}

impl MockWallet {
    pub fn fail_sign(&self, err: ExtensionError) {
        *self.sign_error.lock().unwrap() = Some(err);
    }

    pub fn fail_send(&self, err: ExtensionError) {
        *self.send_error.lock().unwrap() = Some(err);
    }

    pub fn heal(&self) {
        *self.sign_error.lock().unwrap() = None;
        *self.send_error.lock().unwrap() = None;
    }

    pub fn queue_send_id(&self, id: &str) {
        self.send_ids.lock().unwrap().push_back(id.to_string());
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletExtension for MockWallet {
    async fn connect(&self) -> Result<(), ExtensionError> {
        self.connect_error.lock().unwrap().clone().map_or(Ok(()), Err)
    }

    async fn accounts(&self, _ledger: &str) -> Result<Vec<Account>, ExtensionError> {
        Ok(vec![
            Account { address: SENDER.into() },
            Account { address: RECEIVER.into() },
        ])
    }

    async fn sign_txn(&self, txns: Vec<WalletTransaction>) -> Result<Vec<SignedBlob>, ExtensionError> {
        self.sign_requests.lock().unwrap().push(txns);
        if let Some(err) = self.sign_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(vec![SignedBlob {
            tx_id: EXPECTED_TX_ID.into(),
            blob: "c2lnbmVkLWJsb2I=".into(),
        }])
    }

    async fn send(&self, request: SendRequest) -> Result<SendResponse, ExtensionError> {
        self.send_requests.lock().unwrap().push(request);
        if let Some(err) = self.send_error.lock().unwrap().clone() {
            return Err(err);
        }
        let tx_id = self
            .send_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| EXPECTED_TX_ID.to_string());
        Ok(SendResponse { tx_id })
    }
}

/// Scripted node.
///
/// `pending` replies are consumed in order; once drained every poll
/// reports the transaction as still pending.
pub struct MockChain {
    pub health_error: Mutex<Option<CoreError>>,
    pub params: Mutex<CoreResult<NodeTransactionParams>>,
    pub pending: Mutex<VecDeque<CoreResult<PendingTransactionInfo>>>,
    pub params_calls: AtomicUsize,
    pub pending_calls: AtomicUsize,
    pub polled_ids: Mutex<Vec<String>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            health_error: Mutex::new(None),
            params: Mutex::new(Ok(node_params(30_000_000))),
            pending: Mutex::new(VecDeque::new()),
            params_calls: AtomicUsize::new(0),
            pending_calls: AtomicUsize::new(0),
            polled_ids: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    pub fn queue_pending(&self, reply: CoreResult<PendingTransactionInfo>) {
        self.pending.lock().unwrap().push_back(reply);
    }

    pub fn pending_calls(&self) -> usize {
        self.pending_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn health_check(&self) -> CoreResult<()> {
        self.health_error.lock().unwrap().clone().map_or(Ok(()), Err)
    }

    async fn transaction_params(&self) -> CoreResult<NodeTransactionParams> {
        self.params_calls.fetch_add(1, Ordering::SeqCst);
        self.params.lock().unwrap().clone()
    }

    async fn pending_transaction(&self, tx_id: &str) -> CoreResult<PendingTransactionInfo> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        self.polled_ids.lock().unwrap().push(tx_id.to_string());
        self.pending
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(pending_info(json!({ "pool-error": "", "txn": {} }))))
    }
}

/// Hands out the shared [`MockChain`] as the client.
pub struct MockConnector(pub Arc<MockChain>);

impl ChainConnector for MockConnector {
    fn connect(&self, _config: &EndpointConfig) -> CoreResult<Arc<dyn ChainClient>> {
        Ok(self.0.clone())
    }
}

pub fn orchestrator(wallet: &Arc<MockWallet>, chain: &Arc<MockChain>) -> TransactionOrchestrator {
    TransactionOrchestrator::new(
        WalletGateway::new(wallet.clone()),
        ChainGateway::new(Arc::new(MockConnector(chain.clone()))),
        "TestNet",
    )
}

/// Orchestrator that has connected, set up its client and cached parameters.
pub async fn ready_orchestrator(
    wallet: &Arc<MockWallet>,
    chain: &Arc<MockChain>,
) -> TransactionOrchestrator {
    let mut orch = orchestrator(wallet, chain);
    assert!(orch.connect().await.is_ok());
    assert!(orch.setup_client(&EndpointConfig::default()).await.is_ok());
    assert!(orch.refresh_parameters().await.is_ok());
    orch
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}
