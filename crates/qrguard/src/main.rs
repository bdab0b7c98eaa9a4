use std::sync::Arc;

use qrguard_core::{config::Config, handler::Handler};

#[tokio::main]
async fn main() -> Result<(), qrguard_core::Error> {
    qrguard_core::logging::init("qrguard")?;

    let cfg = Arc::new(Config::load()?);

    let handler = Arc::new(Handler::from_config(&cfg));
    if cfg.qr_scanning_enabled && !handler.capabilities().qr_available {
        tracing::warn!("QR scanning requested but this build has no QR decoder (feature `qr`)");
    }

    qrguard_telegram::router::run_polling(cfg, handler)
        .await
        .map_err(|e| qrguard_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
