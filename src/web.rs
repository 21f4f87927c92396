use std::net::SocketAddr;
use std::sync::Arc;

use miette::IntoDiagnostic;

use crate::authz::authorizer::Authorizer;
use crate::authz::loader;
use crate::authz::provider::PolicyProvider;
use crate::errors::GateError;
use crate::settings::Settings;

/// Load static policies and wrap them with the configured dynamic grammar.
pub fn build_authorizer(settings: &Settings) -> Result<Authorizer, GateError> {
    let registry = loader::load_policies(&settings.authz.policies_dir)?;
    let provider = PolicyProvider::new(registry, settings.authz.dynamic_options())?;
    tracing::info!(
        prefix = %settings.authz.dynamic_prefix,
        claim_type = %settings.authz.security_level_claim_type,
        "Dynamic policies enabled"
    );
    Ok(Authorizer::new(Arc::new(provider)))
}

pub async fn serve(settings: Settings) -> miette::Result<()> {
    let authorizer = build_authorizer(&settings)?;

    let addr: SocketAddr = settings
        .listen_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;
    let router = crate::authz::web::router(authorizer);

    tracing::info!(%addr, "Authorization API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
