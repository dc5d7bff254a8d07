// Amorçage: journalisation et socket d'écoute partagé.

pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}

pub async fn init_listener() -> crate::error::Result<std::sync::Arc<tokio::net::UdpSocket>> {
    crate::net_utils::bind_listener().await
}
