use std::sync::Arc;

use anyhow::Context;
use poem::listener::TcpListener;

use service_orders::api::build_app;
use service_orders::business::{OrderService, OrderValidator};
use service_orders::config::Config;
use service_orders::domain::UserDirectory;
use service_orders::logging::init;
use service_orders::notify::{LogNotifier, NotificationDispatcher, Notifier, WebhookNotifier};
use service_orders::resilience::RetryConfig;
use service_orders::store::MemoryOrderStore;

fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    match config.notify_webhook_url {
        Some(ref url) => {
            tracing::info!("Delivering notifications to {}", url);
            let notifier =
                WebhookNotifier::new(url.as_str()).context("Failed to create webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::info!("NOTIFY_WEBHOOK_URL not set, notifications are only logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env();

    let notifications = NotificationDispatcher::new(
        build_notifier(&config)?,
        RetryConfig::new(config.notify_max_attempts),
        config.company_email.clone(),
    );

    let order_service = Arc::new(OrderService::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(UserDirectory::new()),
        OrderValidator::from_config(&config),
        notifications,
    ));

    let app = build_app(
        order_service,
        &format!("http://localhost:{}/api", config.port),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting service-orders on {}", addr);

    poem::Server::new(TcpListener::bind(&addr))
        .run(app)
        .await
        .context("Server terminated")?;

    Ok(())
}
