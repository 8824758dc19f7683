use super::{
    ingress::{Mailbox, Message},
    Clock, Config,
};
use goldpot_execution::{HistorySink, Rejection, RoundEngine};
use goldpot_types::OutboundEvent;
use rand::Rng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic driver of one round's countdown. Aborted when dropped.
struct CountdownDriver {
    generation: u64,
    handle: JoinHandle<()>,
}

impl CountdownDriver {
    fn spawn(generation: u64, period: Duration, sender: mpsc::WeakSender<Message>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(sender) = sender.upgrade() else {
                    return;
                };
                if sender.send(Message::Tick { generation }).await.is_err() {
                    return;
                }
            }
        });
        Self { generation, handle }
    }
}

impl Drop for CountdownDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Single owner of the round engine. Every command, including countdown
/// ticks, is applied in mailbox order.
pub struct Actor<H: HistorySink, R: Rng, C: Clock> {
    engine: RoundEngine<H, R>,
    clock: C,
    receiver: mpsc::Receiver<Message>,
    sender: mpsc::WeakSender<Message>,
    broadcaster: broadcast::Sender<OutboundEvent>,
    tick_interval: Duration,
    countdown: Option<CountdownDriver>,
}

impl<H, R, C> Actor<H, R, C>
where
    H: HistorySink + Send + 'static,
    R: Rng + Send + 'static,
    C: Clock,
{
    pub fn new(
        config: Config,
        engine: RoundEngine<H, R>,
        clock: C,
        broadcaster: broadcast::Sender<OutboundEvent>,
    ) -> (Self, Mailbox) {
        let (sender, receiver) = mpsc::channel(config.mailbox_size.max(1));
        let actor = Self {
            engine,
            clock,
            receiver,
            sender: sender.downgrade(),
            broadcaster,
            tick_interval: config.tick_interval,
            countdown: None,
        };
        (actor, Mailbox::new(sender))
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            let now = self.clock.now();
            let events = match message {
                Message::Connect { connection } => self.engine.connect(connection),
                Message::Disconnect { connection } => {
                    self.engine.disconnect(connection);
                    Vec::new()
                }
                Message::SetIdentity { connection, name } => {
                    accepted(connection, self.engine.set_identity(connection, &name))
                }
                Message::PlaceStake { connection, amount } => accepted(
                    connection,
                    self.engine.place_stake(connection, &amount, now),
                ),
                Message::UpdateConfig {
                    connection,
                    duration_seconds,
                    minimum_stake,
                } => accepted(
                    connection,
                    self.engine.update_config(
                        connection,
                        duration_seconds.as_ref(),
                        minimum_stake.as_ref(),
                        now,
                    ),
                ),
                Message::Tick { generation } => self.engine.tick(generation, now),
                Message::Snapshot { response } => {
                    let _ = response.send(self.engine.snapshot());
                    Vec::new()
                }
            };

            self.sync_countdown();
            for event in events {
                // No subscribers just means nobody is connected.
                let _ = self.broadcaster.send(event);
            }
        }
        info!("table mailbox closed; actor stopped");
    }

    /// Make the running driver match the engine's countdown, disarming the old
    /// driver before a new one is armed.
    fn sync_countdown(&mut self) {
        let wanted = self.engine.countdown().map(|countdown| countdown.generation);
        let armed = self.countdown.as_ref().map(|driver| driver.generation);
        if wanted == armed {
            return;
        }
        if let Some(driver) = self.countdown.take() {
            debug!(generation = driver.generation, "countdown disarmed");
        }
        if let Some(generation) = wanted {
            debug!(generation, "countdown armed");
            self.countdown = Some(CountdownDriver::spawn(
                generation,
                self.tick_interval,
                self.sender.clone(),
            ));
        }
    }
}

fn accepted(
    connection: u64,
    result: Result<Vec<OutboundEvent>, Rejection>,
) -> Vec<OutboundEvent> {
    result.unwrap_or_else(|rejection| {
        debug!(connection, %rejection, "command ignored");
        Vec::new()
    })
}
