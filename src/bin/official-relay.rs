use futures_util::{SinkExt, StreamExt};
use official_api::Snapshot;
use official_api::protocol::{Frame, Intent};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Development stand-in for the tournament server's socket: serves reloads
/// built from a snapshot file, which can be edited while clients watch.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::var("OFFICIAL_RELAY_BIND").unwrap_or_else(|_| "0.0.0.0:8788".to_string());
    let snapshot_path: Arc<PathBuf> = Arc::new(
        env::var("OFFICIAL_SNAPSHOT_JSON")
            .map_err(|_| anyhow::anyhow!("OFFICIAL_SNAPSHOT_JSON must point at a snapshot file"))?
            .into(),
    );
    // Refuse to start on a file clients would reject.
    reload_frame(&snapshot_path)?;

    let listener = TcpListener::bind(&addr).await?;
    let (tx, _rx) = broadcast::channel::<String>(512);

    eprintln!("official relay listening on {addr}, serving {}", snapshot_path.display());

    loop {
        let (stream, peer) = listener.accept().await?;
        let tx = tx.clone();
        let rx = tx.subscribe();
        let snapshot_path = snapshot_path.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, &snapshot_path, tx, rx).await {
                eprintln!("client {peer} disconnected: {e}");
            }
        });
    }
}

/// Read the snapshot file and wrap it in a `reload` frame.
fn reload_frame(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    Snapshot::from_value(value.clone())?;
    Ok(Frame::new("reload", value).encode())
}

async fn handle_client(
    stream: TcpStream,
    snapshot_path: &Path,
    tx: broadcast::Sender<String>,
    mut rx: broadcast::Receiver<String>,
) -> anyhow::Result<()> {
    let ws = accept_async(stream).await?;
    let (mut write, mut read) = ws.split();

    write.send(Message::Text(reload_frame(snapshot_path)?.into())).await?;

    loop {
        tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match Frame::parse(&text).ok().and_then(|f| Intent::from_kind(&f.t)) {
                            Some(intent) => {
                                eprintln!("intent: {}", intent.kind());
                                match reload_frame(snapshot_path) {
                                    Ok(frame) => {
                                        let _ = tx.send(frame);
                                    }
                                    Err(e) => eprintln!("snapshot unavailable: {e}"),
                                }
                            }
                            None => eprintln!("ignoring frame: {text}"),
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {}
                    Some(Ok(Message::Ping(_))) => {}
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => return Err(e.into()),
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Ok(text) => {
                        write.send(Message::Text(text.into())).await?;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}
