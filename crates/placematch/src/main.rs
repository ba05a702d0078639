mod api;
mod trace;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;

use libplacematch::prelude::*;
use rustls::crypto::aws_lc_rs;
use tokio::signal;

use crate::api::{ServiceClassifier, config::Config};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  aws_lc_rs::default_provider().install_default().expect("could not install default cryptography provider");

  let config = Config::from_env()?;
  let provider = GooglePlacesProvider::new(config.places())?;

  let classifier = match &config.classifier_url {
    Some(url) => Some(OllamaClassifier::new(url, &config.classifier_model, config.classifier_timeout)?),
    None => None,
  };

  run(config, provider, classifier).await
}

async fn run<P: PlacesProvider>(config: Config, provider: P, classifier: ServiceClassifier) -> anyhow::Result<()> {
  let _guards = trace::init_tracing(&config, std::io::stdout());

  if classifier.is_none() {
    tracing::info!("no classifier configured, inconclusive places will not be matched");
  }

  let app = api::routes(&config, provider, classifier)?;
  let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

  tracing::info!(placematch = env!("CARGO_PKG_VERSION"), "listening on {}", listener.local_addr()?.to_string());

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).with_graceful_shutdown(shutdown()).await?;

  Ok(())
}

async fn shutdown() {
  let ctrl_c = async {
    signal::ctrl_c().await.expect("failed to install ^C handler");
  };

  let terminate = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .expect("failed to install terminate signal handler")
      .recv()
      .await;
  };

  tokio::select! {
      () = ctrl_c => tracing::info!("received ^C, initiating shutdown"),
      () = terminate => tracing::info!("received terminate signal, initiating shutdown"),
  }
}
