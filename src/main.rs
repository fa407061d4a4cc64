use anyhow::Context;
use arcane_dca::datasource::{
    AnsClient, AnsService, BridgeClient, BridgeService, CustodySigner, DisconnectedCustody,
    ExplorerLedgerClient, LedgerClient, RelayCustody,
};
use arcane_dca::{
    api, config::Config, db::init_db, BlockHeightPoller, PositionManager, Repository,
    TransactionBuilder, WorkerHandle,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));

    let ledger: Arc<dyn LedgerClient> = Arc::new(ExplorerLedgerClient::new(
        config.ledger_api_url.clone(),
        config.ledger_network.clone(),
    ));
    let custody: Arc<dyn CustodySigner> = match &config.custody_url {
        Some(url) => {
            tracing::info!("Custody relay at {}", url);
            Arc::new(RelayCustody::new(url.clone()))
        }
        None => {
            tracing::warn!("CUSTODY_URL not set; submissions will fail with NotConnected");
            Arc::new(DisconnectedCustody)
        }
    };

    let (worker, _worker_task) = WorkerHandle::spawn(ledger.clone(), custody);
    let (poller, height_rx) = BlockHeightPoller::new(ledger, config.block_poll_interval);
    let _poller_task = poller.spawn();

    let manager = Arc::new(PositionManager::new(
        TransactionBuilder::from_config(&config),
        worker,
        height_rx,
        repo.clone(),
    ));
    let ans = AnsService::new(Arc::new(AnsClient::new(config.ans_api_url.clone())));
    let bridge = BridgeService::new(Arc::new(BridgeClient::new(config.bridge_api_url.clone())));

    let app = api::create_router(api::AppState {
        manager,
        ans,
        bridge,
        repo,
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
