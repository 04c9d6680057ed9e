use super::boat_messages::{AuthHello, BoatCommand};
use crate::{event, warn};
use std::io::ErrorKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Lifecycle of the operator connection.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub enum LinkEvent {
    Disconnected,
    Command(BoatCommand),
}

/// The persistent bidirectional connection to the operator service:
/// length-prefixed JSON frames over TCP. Reader and writer run as their
/// own tasks; inbound commands surface as [`LinkEvent`]s, outbound frames
/// go through [`RemoteLink::send_frame`].
pub struct RemoteLink {
    downstream_sender: mpsc::Sender<Vec<u8>>,
    state_receiver: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl RemoteLink {
    const DOWNSTREAM_BUFFER: usize = 32;
    const EVENT_BUFFER: usize = 16;

    async fn handle_connection_rx(
        socket: &mut OwnedReadHalf,
        event_sender: &broadcast::Sender<LinkEvent>,
    ) -> Result<(), std::io::Error> {
        loop {
            let length = socket.read_u32().await?;

            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;

            match serde_json::from_slice::<BoatCommand>(&buffer) {
                Ok(command) => {
                    event!("Operator command: {command:?}");
                    let _ = event_sender.send(LinkEvent::Command(command));
                }
                Err(e) => {
                    warn!("Rejecting malformed operator frame: {e}");
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn handle_connection_tx(
        socket: &mut OwnedWriteHalf,
        downstream_receiver: &mut mpsc::Receiver<Vec<u8>>,
    ) -> Result<(), std::io::Error> {
        while let Some(frame) = downstream_receiver.recv().await {
            socket.write_u32(frame.len() as u32).await?;
            socket.write_all(&frame).await?;
        }
        Ok(())
    }

    /// Opens the connection, authenticates, and spawns the reader/writer
    /// pair. The returned receiver carries inbound commands and the
    /// disconnect notification.
    pub async fn connect(
        addr: &str,
        token: &str,
        boat_emblem: &str,
        cancel: CancellationToken,
    ) -> Result<(Self, broadcast::Receiver<LinkEvent>), std::io::Error> {
        let (state_sender, state_receiver) = watch::channel(ConnectionState::Connecting);

        let mut stream = TcpStream::connect(addr).await?;

        let hello = AuthHello {
            token: String::from(token),
            boat_emblem: String::from(boat_emblem),
        };
        let hello_frame = serde_json::to_vec(&hello).map_err(std::io::Error::other)?;
        stream.write_u32(hello_frame.len() as u32).await?;
        stream.write_all(&hello_frame).await?;

        let _ = state_sender.send(ConnectionState::Connected);

        let (downstream_sender, mut downstream_receiver) =
            mpsc::channel::<Vec<u8>>(Self::DOWNSTREAM_BUFFER);
        let event_sender = broadcast::Sender::new(Self::EVENT_BUFFER);
        let event_receiver = event_sender.subscribe();

        let (mut rx_socket, mut tx_socket) = stream.into_split();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                res = RemoteLink::handle_connection_rx(&mut rx_socket, &event_sender) => res,
                res = RemoteLink::handle_connection_tx(&mut tx_socket, &mut downstream_receiver) => res,
                () = task_cancel.cancelled() => Ok(()),
            };

            let _ = state_sender.send(ConnectionState::Disconnected);
            let _ = event_sender.send(LinkEvent::Disconnected);
            match result {
                Err(e)
                    if e.kind() == ErrorKind::UnexpectedEof
                        || e.kind() == ErrorKind::ConnectionReset
                        || e.kind() == ErrorKind::ConnectionAborted => {}
                Err(e) => {
                    warn!("Closing operator link due to {e:?}");
                }
                _ => {}
            };
            let mut socket = rx_socket.reunite(tx_socket).ok();
            if let Some(stream) = socket.as_mut() {
                let _ = stream.shutdown().await;
            }
        });

        Ok((Self { downstream_sender, state_receiver, cancel }, event_receiver))
    }

    /// Serializes and enqueues one outbound frame. Silently dropped when
    /// the link is already down; the scheduler reacts to the disconnect
    /// event, not to individual send failures.
    pub async fn send_frame<T: serde::Serialize>(&self, frame: &T) {
        let Ok(encoded) = serde_json::to_vec(frame) else { return };
        let _ = self.downstream_sender.send(encoded).await;
    }

    pub fn state(&self) -> ConnectionState { *self.state_receiver.borrow() }

    /// Tears the connection down, draining the in-flight halves.
    pub fn shutdown(&self) { self.cancel.cancel(); }
}
