#![allow(dead_code)]

use arcane_dca::api::{self, AppState};
use arcane_dca::config::Config;
use arcane_dca::datasource::{AnsService, BridgeService};
use arcane_dca::db::init_db;
use arcane_dca::{
    MockBridge, MockCustody, MockLedger, MockNameService, PositionManager, Repository,
    TransactionBuilder, WorkerHandle,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;
use tower::util::ServiceExt;

pub const OWNER: &str = "aleo1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq";

pub struct TestApp {
    pub router: Router,
    pub ledger: MockLedger,
    pub custody: MockCustody,
    pub _temp: TempDir,
}

pub struct Collaborators {
    pub custody: MockCustody,
    pub names: MockNameService,
    pub bridge: MockBridge,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            custody: MockCustody::new(),
            names: MockNameService::new(),
            bridge: MockBridge::new(),
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_with(Collaborators::default()).await
}

pub async fn setup_with(collaborators: Collaborators) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let mut env = HashMap::new();
    env.insert("DATABASE_PATH".to_string(), db_path);
    let config = Config::from_env_map(env).unwrap();

    let ledger = MockLedger::new(1000);
    let custody = collaborators.custody;
    let (worker, _task) = WorkerHandle::spawn(Arc::new(ledger.clone()), Arc::new(custody.clone()));
    // Without a poller every height read goes through the worker.
    let (_height_tx, height_rx) = watch::channel(None);

    let manager = Arc::new(PositionManager::new(
        TransactionBuilder::from_config(&config),
        worker,
        height_rx,
        repo.clone(),
    ));

    let state = AppState {
        manager,
        ans: AnsService::new(Arc::new(collaborators.names)),
        bridge: BridgeService::new(Arc::new(collaborators.bridge)),
        repo,
    };

    TestApp {
        router: api::create_router(state),
        ledger,
        custody,
        _temp: temp_dir,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn create_body(executions: u32) -> serde_json::Value {
    serde_json::json!({
        "owner": OWNER,
        "inputTokenId": 1,
        "inputAmount": 1000,
        "outputTokenId": 2,
        "interval": 10,
        "executionsRemaining": executions,
        "minOutputAmount": 5
    })
}
