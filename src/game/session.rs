use super::core::messages::{ClientMessage, ServerMessage};
use super::core::Identity;
use super::engine::{GameMachine, InputCommand, View};
use super::stroke::Surface;
use super::ws::{CloseReason, Transport, TransportError, TransportEvent};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, warn};
use url::Url;

/// Receives the view and the drawing surface after every reaction.
pub trait Presenter<S> {
    fn render(&mut self, view: &View, surface: &S);
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server_url: Url,
    /// Consecutive failed attempts tolerated before giving up. An attempt fails
    /// when the channel cannot be opened or closes before the first snapshot.
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("channel lost: {0}")]
    ChannelLost(CloseReason),
}

enum Flow {
    Quit,
    Restart,
    /// `synced` is set once the server sent at least one snapshot on this channel
    Lost { reason: CloseReason, synced: bool },
}

/// Owns the identity, the game machine and the presenter for one participant,
/// and keeps a channel to the server open for as long as input keeps coming.
pub struct Session<S, P> {
    config: SessionConfig,
    machine: GameMachine<S>,
    presenter: P,
}

impl<S: Surface, P: Presenter<S>> Session<S, P> {
    pub fn new(config: SessionConfig, identity: Identity, surface: S, presenter: P) -> Self {
        Self {
            config,
            machine: GameMachine::new(identity, surface),
            presenter,
        }
    }

    /// Run until `input` closes (`Ok`) or the channel cannot be re-established (`Err`).
    ///
    /// A lost channel is re-opened with the same identity; the server's next
    /// snapshot brings the machine back in sync. A channel that closes before
    /// any snapshot arrived counts as a failed attempt.
    pub async fn run(mut self, mut input: mpsc::UnboundedReceiver<InputCommand>) -> Result<(), SessionError> {
        let mut failures = 0u32;

        loop {
            self.machine.begin_joining();
            self.render();

            let identity = self.machine.identity().clone();
            let opened = until_input_closed(
                &mut input,
                Transport::open(&self.config.server_url, &identity),
            )
            .await;
            let (transport, mut events) = match opened {
                None => return self.leave(),
                Some(Ok(opened)) => opened,
                Some(Err(err)) => {
                    failures += 1;
                    warn!(error = %err, attempt = failures, "Could not open channel");
                    self.machine.disconnected(err.to_string());
                    self.render();
                    if failures > self.config.reconnect_attempts {
                        return Err(err.into());
                    }
                    if self.back_off(&mut input).await.is_none() {
                        return self.leave();
                    }
                    continue;
                }
            };

            transport.send(ClientMessage::Join);

            match self.drive(&transport, &mut events, &mut input).await {
                Flow::Quit => return self.leave(),
                Flow::Restart => {
                    failures = 0;
                    drop(transport);
                }
                Flow::Lost { reason, synced } => {
                    if synced {
                        failures = 0;
                    }
                    failures += 1;
                    warn!(%reason, attempt = failures, "Channel lost");
                    self.machine.disconnected(reason.to_string());
                    self.render();
                    if failures > self.config.reconnect_attempts {
                        return Err(SessionError::ChannelLost(reason));
                    }
                    if self.back_off(&mut input).await.is_none() {
                        return self.leave();
                    }
                }
            }
        }
    }

    async fn drive(
        &mut self,
        transport: &Transport,
        events: &mut mpsc::UnboundedReceiver<TransportEvent>,
        input: &mut mpsc::UnboundedReceiver<InputCommand>,
    ) -> Flow {
        let mut synced = false;

        loop {
            let next_tick = self.machine.clock().next_tick_at();

            tokio::select! {
                event = events.recv() => match event {
                    Some(TransportEvent::Message(msg)) => {
                        synced |= matches!(msg, ServerMessage::GameState(_));
                        self.machine.handle_server(msg);
                    }
                    Some(TransportEvent::Closed(reason)) => return Flow::Lost { reason, synced },
                    None => {
                        let reason = CloseReason::Failed("event stream ended".to_string());
                        return Flow::Lost { reason, synced };
                    }
                },
                command = input.recv() => match command {
                    Some(command) => {
                        if let Some(msg) = self.machine.handle_input(command) {
                            transport.send(msg);
                        }
                        if self.machine.wants_restart() {
                            return Flow::Restart;
                        }
                    }
                    None => return Flow::Quit,
                },
                _ = clock_tick(next_tick) => self.machine.tick_clock(),
            }

            self.render();
        }
    }

    /// Wait out the reconnect delay. `None` if input closed meanwhile.
    async fn back_off(&self, input: &mut mpsc::UnboundedReceiver<InputCommand>) -> Option<()> {
        until_input_closed(input, sleep(self.config.reconnect_delay)).await
    }

    fn leave(&self) -> Result<(), SessionError> {
        info!("Input closed, leaving session");
        Ok(())
    }

    fn render(&mut self) {
        let view = self.machine.view();
        self.presenter.render(&view, self.machine.surface());
    }
}

/// Drive `task` to completion unless `input` closes first. Commands that
/// arrive while no channel is open are dropped.
async fn until_input_closed<F: Future>(
    input: &mut mpsc::UnboundedReceiver<InputCommand>,
    task: F,
) -> Option<F::Output> {
    tokio::pin!(task);
    loop {
        tokio::select! {
            output = &mut task => return Some(output),
            command = input.recv() => match command {
                Some(command) => debug!(?command, "No channel open, dropping input"),
                None => return None,
            },
        }
    }
}

async fn clock_tick(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
