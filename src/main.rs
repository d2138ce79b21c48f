use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use foodorder_rs::{
    create_app, init_observability,
    observability::{BusinessTracingMiddleware, DatabaseTracingMiddleware, Metrics},
    repositories::{DynamoDbFoodRepository, DynamoDbOrderRepository, TableManager},
    services::{FoodService, OrderService},
    shutdown_observability, Config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration comes first so the log level is known
    let config = Config::from_environment()?;

    init_observability(&config.observability)?;

    info!("Starting foodorder-rs service");
    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!("Region: {}", config.database.region);
    info!(
        "DynamoDB Tables: foods={}, orders={}",
        config.database.foods_table_name, config.database.orders_table_name
    );

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let dynamodb_client = Arc::new(config.database.build_client().await);
    info!("DynamoDB client initialized successfully");

    if config.database.auto_create_tables {
        TableManager::new(dynamodb_client.clone())
            .create_all_tables(
                &config.database.foods_table_name,
                &config.database.orders_table_name,
            )
            .await?;
    }

    let food_repository = Arc::new(DynamoDbFoodRepository::new(
        dynamodb_client.clone(),
        config.database.foods_table_name.clone(),
        config.database.region.clone(),
        DatabaseTracingMiddleware::new(metrics.clone()),
    ));
    let order_repository = Arc::new(DynamoDbOrderRepository::new(
        dynamodb_client,
        config.database.orders_table_name.clone(),
        config.database.region.clone(),
        DatabaseTracingMiddleware::new(metrics.clone()),
    ));
    info!("Repositories initialized successfully");

    let business_tracing = Arc::new(BusinessTracingMiddleware::new(metrics.clone()));
    let food_service = Arc::new(FoodService::new_with_tracing(
        food_repository,
        business_tracing.clone(),
    ));
    let order_service = Arc::new(OrderService::new_with_tracing(
        order_repository,
        business_tracing,
    ));
    info!("Services initialized successfully");

    let app = create_app(
        metrics,
        food_service,
        order_service,
        config.server.max_request_size,
    );

    let addr: SocketAddr = config.server.bind_address().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_observability().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
