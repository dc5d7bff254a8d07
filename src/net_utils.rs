// Fonctions utilitaires réseau: création de socket et envoi générique.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::UDP_PORT;
use crate::error::{AppError, Result};

/// Binds the single shared UDP listening socket with broadcast enabled
/// (spec.md §4.6, §5).
pub async fn bind_listener() -> Result<Arc<tokio::net::UdpSocket>> {
    let socket = tokio::net::UdpSocket::bind(("0.0.0.0", UDP_PORT)).await?;
    socket.set_broadcast(true)?;
    Ok(Arc::new(socket))
}

/// Each sender owns an ephemeral socket; only the receiver socket is shared
/// (spec.md §5, "Shared-resource policy").
pub async fn bind_sender() -> Result<tokio::net::UdpSocket> {
    let socket = tokio::net::UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Serializes and sends any control packet. Send failures are logged by the
/// caller and never fatal (spec.md §7).
pub async fn send_message<T: serde::Serialize>(
    socket: &tokio::net::UdpSocket,
    addr: SocketAddr,
    message: &T,
) -> Result<()> {
    let serialized = serde_json::to_vec(message).map_err(AppError::SerializationError)?;
    socket
        .send_to(&serialized, addr)
        .await
        .map_err(|e| AppError::NetworkError(format!("send to {addr} failed: {e}")))?;
    Ok(())
}

/// Sends a plain-text response, used by the `lsrctl` control channel
/// (spec.md §6.5, ambient tooling).
pub async fn send_text(socket: &tokio::net::UdpSocket, addr: SocketAddr, text: &str) -> Result<()> {
    socket
        .send_to(text.as_bytes(), addr)
        .await
        .map_err(|e| AppError::NetworkError(format!("send to {addr} failed: {e}")))?;
    Ok(())
}
