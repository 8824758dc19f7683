use goldpot_types::{InboundMessage, NumericInput, Snapshot};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Messages sent to the table actor.
pub enum Message {
    Connect {
        connection: u64,
    },
    Disconnect {
        connection: u64,
    },
    SetIdentity {
        connection: u64,
        name: String,
    },
    PlaceStake {
        connection: u64,
        amount: NumericInput,
    },
    UpdateConfig {
        connection: u64,
        duration_seconds: Option<NumericInput>,
        minimum_stake: Option<NumericInput>,
    },
    Tick {
        generation: u64,
    },
    Snapshot {
        response: oneshot::Sender<Snapshot>,
    },
}

/// Mailbox for the table actor.
#[derive(Clone)]
pub struct Mailbox {
    sender: mpsc::Sender<Message>,
}

impl Mailbox {
    pub(super) fn new(sender: mpsc::Sender<Message>) -> Self {
        Self { sender }
    }

    async fn send(&self, message: Message, label: &'static str) {
        if self.sender.send(message).await.is_err() {
            warn!(label, "table mailbox closed; message dropped");
        }
    }

    pub async fn connect(&self, connection: u64) {
        self.send(Message::Connect { connection }, "connect").await;
    }

    pub async fn disconnect(&self, connection: u64) {
        self.send(Message::Disconnect { connection }, "disconnect")
            .await;
    }

    /// Forward a client command on behalf of `connection`.
    pub async fn dispatch(&self, connection: u64, inbound: InboundMessage) {
        let (message, label) = match inbound {
            InboundMessage::SetIdentity { name } => {
                (Message::SetIdentity { connection, name }, "set_identity")
            }
            InboundMessage::PlaceStake { amount } => {
                (Message::PlaceStake { connection, amount }, "place_stake")
            }
            InboundMessage::UpdateConfig {
                duration_seconds,
                minimum_stake,
            } => (
                Message::UpdateConfig {
                    connection,
                    duration_seconds,
                    minimum_stake,
                },
                "update_config",
            ),
        };
        self.send(message, label).await;
    }

    pub async fn snapshot(&self) -> Option<Snapshot> {
        let (response, receiver) = oneshot::channel();
        self.send(Message::Snapshot { response }, "snapshot").await;
        receiver.await.ok()
    }
}
