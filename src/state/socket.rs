use futures_util::{SinkExt, StreamExt};
use log::warn;
use official_api::protocol::{Frame, Intent};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum SocketCommand {
    Send(Intent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Connected,
    Disconnected,
    /// One inbound frame, in delivery order.
    Push { kind: String, payload: Value },
    Error(String),
}

/// Keeps one websocket to the tournament open, reconnecting until the
/// command channel closes.
#[derive(Debug)]
pub struct SocketWorker {
    pub url: String,
    pub commands: mpsc::UnboundedReceiver<SocketCommand>,
    pub events: mpsc::Sender<SocketEvent>,
}

impl SocketWorker {
    pub async fn run(mut self) {
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    // Intents from while we were offline may no longer apply.
                    if !self.drop_stale_commands() {
                        return;
                    }
                    let _ = self.events.send(SocketEvent::Connected).await;
                    let (mut write, mut read) = stream.split();

                    loop {
                        tokio::select! {
                            maybe_cmd = self.commands.recv() => {
                                let Some(cmd) = maybe_cmd else {
                                    return;
                                };
                                if let Err(e) = send_command(&mut write, cmd).await {
                                    let _ = self.events.send(SocketEvent::Error(format!("socket send failed: {e}"))).await;
                                    break;
                                }
                            }
                            inbound = read.next() => {
                                match inbound {
                                    Some(Ok(Message::Text(text))) => match Frame::parse(&text) {
                                        Ok(frame) => {
                                            let event = SocketEvent::Push { kind: frame.t, payload: frame.d };
                                            if self.events.send(event).await.is_err() {
                                                return;
                                            }
                                        }
                                        Err(e) => {
                                            let _ = self.events.send(SocketEvent::Error(e.to_string())).await;
                                        }
                                    },
                                    Some(Ok(Message::Close(_))) | None => break,
                                    Some(Ok(_)) => {}
                                    Some(Err(e)) => {
                                        let _ = self.events.send(SocketEvent::Error(format!("socket read failed: {e}"))).await;
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    let _ = self.events.send(SocketEvent::Disconnected).await;
                }
                Err(e) => {
                    let _ = self
                        .events
                        .send(SocketEvent::Error(format!("socket connect failed: {e}")))
                        .await;
                    let _ = self.events.send(SocketEvent::Disconnected).await;
                }
            }

            sleep(RECONNECT_DELAY).await;
        }
    }

    /// Discard commands queued while disconnected. `false` once the command
    /// channel has closed.
    fn drop_stale_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(SocketCommand::Send(intent)) => warn!("dropping {} sent while disconnected", intent.kind()),
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }
}

async fn send_command<S>(write: &mut S, cmd: SocketCommand) -> Result<(), String>
where
    S: futures_util::sink::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    match cmd {
        SocketCommand::Send(intent) => write
            .send(Message::Text(intent.to_frame().encode().into()))
            .await
            .map_err(|e| e.to_string()),
    }
}
