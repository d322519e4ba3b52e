//! Membership upgrade service binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use membership_upgrade::adapters::http::{
    api_router, with_middleware, HealthState, MembershipAppState,
};
use membership_upgrade::adapters::memory::{
    InMemoryMembershipStore, InMemoryPlanCatalog, InMemoryTransactionStore, MemorySeed,
};
use membership_upgrade::adapters::postgres::{
    self, PostgresMembershipStore, PostgresPlanCatalog, PostgresTransactionStore,
};
use membership_upgrade::adapters::xendit::{MockPaymentGateway, XenditConfig, XenditGateway};
use membership_upgrade::config::AppConfig;
use membership_upgrade::domain::foundation::Timestamp;
use membership_upgrade::ports::PaymentGateway;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_filter));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn payment_gateway(config: &AppConfig) -> Arc<dyn PaymentGateway> {
    if config.payment.is_configured() {
        tracing::info!(
            live = config.payment.is_live_mode(),
            "Using Xendit payment gateway"
        );
        Arc::new(XenditGateway::new(XenditConfig::from_payment_config(
            &config.payment,
        )))
    } else {
        tracing::warn!("No Xendit credentials configured; invoices are simulated offline");
        Arc::new(MockPaymentGateway::new(
            config.payment.xendit_callback_token.clone(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let gateway = payment_gateway(&config);

    let (state, health) = match &config.database {
        Some(database) => {
            if config.memory.seed_file.is_some() {
                tracing::warn!("Ignoring memory seed file; a database is configured");
            }
            let pool = postgres::connect(database).await?;
            let store = Arc::new(PostgresMembershipStore::new(pool.clone()));
            tracing::info!("Using PostgreSQL storage");
            (
                MembershipAppState {
                    plan_catalog: Arc::new(PostgresPlanCatalog::new(pool.clone())),
                    membership_reader: store.clone(),
                    membership_repository: store,
                    transaction_repository: Arc::new(PostgresTransactionStore::new(pool.clone())),
                    payment_gateway: gateway,
                },
                HealthState { pool: Some(pool) },
            )
        }
        None => {
            let (catalog, store) = match &config.memory.seed_file {
                Some(path) => {
                    tracing::info!(path = %path.display(), "Seeding in-memory storage");
                    MemorySeed::load(path).await?.into_stores(Timestamp::now())?
                }
                None => {
                    tracing::warn!(
                        "No database or seed file configured; starting with an empty catalog"
                    );
                    (InMemoryPlanCatalog::new(), InMemoryMembershipStore::new())
                }
            };
            let store = Arc::new(store);
            tracing::warn!("No database configured; state is kept in memory and lost on restart");
            (
                MembershipAppState {
                    plan_catalog: Arc::new(catalog),
                    membership_reader: store.clone(),
                    membership_repository: store,
                    transaction_repository: Arc::new(InMemoryTransactionStore::new()),
                    payment_gateway: gateway,
                },
                HealthState::default(),
            )
        }
    };

    let app = with_middleware(api_router(state, health), &config.server);

    let addr = config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        "Membership upgrade service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
