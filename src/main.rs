//! EventTix server
//!
//! Loads configuration from the environment, connects to PostgreSQL, wires
//! adapters into the application handlers and serves the HTTP API.
//!
//! ```bash
//! EVENTTIX__DATABASE__URL=postgres://localhost/eventtix \
//! EVENTTIX__AUTH__JWT_SECRET=dev-secret \
//! EVENTTIX__GATEWAY__API_KEY=key EVENTTIX__GATEWAY__API_SECRET=secret \
//! EVENTTIX__FEATURES__ENABLE_SMS=false \
//! cargo run --bin eventtix
//! ```

use std::error::Error;
use std::sync::Arc;

use eventtix::adapters::auth::{JwtConfig, JwtSessionValidator};
use eventtix::adapters::http::{self, AuthState, HttpSettings, TicketingAppState};
use eventtix::adapters::momo::{MomoConfig, MomoEnvironment, MomoGateway};
use eventtix::adapters::postgres::{
    self, PoolSettings, PostgresEventRepository, PostgresPaymentRepository,
    PostgresTicketRepository, PostgresUserDirectory,
};
use eventtix::adapters::qr::{HttpQrRenderer, QrConfig};
use eventtix::adapters::sms::{LogNotificationDispatcher, SmsConfig, SmsDispatcher};
use eventtix::application::handlers::{
    CancelTicketHandler, GetTicketPassHandler, HandleUssdRequestHandler, PurchaseTicketsHandler,
    ReconcilePaymentHandler, SyncPaymentStatusHandler, UssdSettings, VerifyTicketHandler,
};
use eventtix::application::{InventoryLedger, Notifier, PaymentSettler};
use eventtix::config::{AppConfig, GatewayConfig, SmsSettings};
use eventtix::domain::payment::WebhookSignatureVerifier;
use eventtix::domain::ussd::MenuCopy;
use eventtix::ports::{
    EventRepository, NotificationDispatcher, PaymentGateway, PaymentRepository, TicketRepository,
    UserDirectory,
};
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        ussd = config.features.enable_ussd,
        sms = config.features.enable_sms,
        qr = config.features.enable_qr,
        "Configuration loaded"
    );

    let pool = postgres::connect(
        &config.database.url,
        &PoolSettings {
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
            connect_timeout: config.database.connect_timeout(),
            idle_timeout: config.database.idle_timeout(),
        },
    )
    .await?;
    if config.database.run_migrations {
        postgres::migrate(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let events: Arc<dyn EventRepository> = Arc::new(PostgresEventRepository::new(pool.clone()));
    let tickets: Arc<dyn TicketRepository> = Arc::new(PostgresTicketRepository::new(pool.clone()));
    let payments: Arc<dyn PaymentRepository> =
        Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));

    let gateway: Arc<dyn PaymentGateway> = Arc::new(MomoGateway::new(momo_config(&config.gateway)?)?);
    let dispatcher = notification_dispatcher(&config.sms, config.features.enable_sms)?;
    let renderer = Arc::new(HttpQrRenderer::new(QrConfig {
        base_url: config.qr.base_url.clone(),
        size: config.qr.size,
        ..QrConfig::default()
    })?);
    let validator: AuthState = Arc::new(JwtSessionValidator::new(
        JwtConfig::new(
            config.auth.jwt_secret.expose_secret().clone(),
            config.auth.issuer.clone(),
        )
        .with_leeway(config.auth.leeway_secs),
    ));

    let notifier = Notifier::new(dispatcher, config.ussd.brand.clone());
    let ledger = Arc::new(InventoryLedger::new(events.clone()));
    let settler = Arc::new(PaymentSettler::new(
        events.clone(),
        tickets.clone(),
        payments.clone(),
        notifier.clone(),
    ));

    let purchase = Arc::new(PurchaseTicketsHandler::new(
        events.clone(),
        tickets.clone(),
        payments.clone(),
        ledger.clone(),
        gateway.clone(),
        settler.clone(),
    ));
    let mut reconcile = ReconcilePaymentHandler::new(payments.clone(), settler.clone());
    if let Some(secret) = config.gateway.webhook_secret() {
        reconcile = reconcile.with_verifier(WebhookSignatureVerifier::new(secret));
    } else {
        tracing::warn!("No webhook secret configured; gateway callbacks are not authenticated");
    }

    let state = TicketingAppState {
        purchase: purchase.clone(),
        cancel: Arc::new(CancelTicketHandler::new(
            tickets.clone(),
            payments.clone(),
            ledger,
        )),
        verify: Arc::new(VerifyTicketHandler::new(
            events.clone(),
            tickets.clone(),
            payments.clone(),
            notifier,
        )),
        pass: Arc::new(
            GetTicketPassHandler::new(tickets.clone(), renderer)
                .with_enabled(config.features.enable_qr),
        ),
        reconcile: Arc::new(reconcile),
        sync: Arc::new(SyncPaymentStatusHandler::new(payments, gateway, settler)),
        ussd: Arc::new(HandleUssdRequestHandler::new(
            events,
            tickets,
            users.clone(),
            purchase,
            UssdSettings {
                enabled: config.features.enable_ussd,
                page_size: config.ussd.page_size,
                copy: MenuCopy {
                    brand: config.ussd.brand.clone(),
                    support_phone: config.ussd.support_phone.clone(),
                    support_email: config.ussd.support_email.clone(),
                },
            },
        )),
        users,
    };

    let app = http::app(
        state,
        validator,
        &HttpSettings {
            request_timeout: config.server.request_timeout(),
            cors_origins: config.server.cors_origins_list(),
            verbose_errors: config.features.verbose_errors,
        },
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, service_code = %config.ussd.service_code, "EventTix listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` overrides
/// `server.log_level`.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

fn momo_config(gateway: &GatewayConfig) -> Result<MomoConfig, Box<dyn Error>> {
    let environment: MomoEnvironment = gateway.environment.parse()?;
    let mut momo = MomoConfig::new(
        gateway.api_key.expose_secret().clone(),
        gateway.api_secret.expose_secret().clone(),
    )
    .with_environment(environment)
    .with_currency(gateway.currency.clone())
    .with_timeout(gateway.timeout());
    if let Some(url) = &gateway.base_url {
        momo = momo.with_base_url(url.clone());
    }
    if let Some(url) = &gateway.callback_url {
        momo = momo.with_callback_url(url.clone());
    }
    Ok(momo)
}

fn notification_dispatcher(
    sms: &SmsSettings,
    enabled: bool,
) -> Result<Arc<dyn NotificationDispatcher>, Box<dyn Error>> {
    match sms.credentials() {
        Some((key, secret)) if enabled => {
            let mut config = SmsConfig::new(key, secret);
            if let Some(sender) = &sms.sender_id {
                config = config.with_sender_id(sender.clone());
            }
            if let Some(url) = &sms.base_url {
                config = config.with_base_url(url.clone());
            }
            Ok(Arc::new(SmsDispatcher::new(config)?))
        }
        _ => {
            tracing::info!("SMS disabled; notifications will be logged");
            Ok(Arc::new(LogNotificationDispatcher))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
