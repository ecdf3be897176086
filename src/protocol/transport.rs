use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{info, warn};

use crate::config::NetConfig;
use crate::error::UnoError;
use crate::game::sequencer::Command;
use crate::protocol::link::PeerLink;

/// Runs one session on `stream` until the peer goes away or the link closes.
pub async fn serve(
    stream: TcpStream,
    link: &PeerLink,
    commands: &flume::Sender<Command>,
    resumed: bool,
) -> Result<(), UnoError> {
    let (r, w) = stream.into_split();
    let mut lines = FramedRead::new(r, LinesCodec::new());
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut writer = tokio::io::BufWriter::new(w);
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    link.attach(tx);
    if commands.send(Command::Connected { resumed }).is_err() {
        link.close();
    }

    while !link.is_closed() {
        let Some(line) = lines.next().await else {
            break;
        };
        match line {
            Ok(line) => {
                if let Some(command) = link.dispatch(&line) {
                    if commands.send(command).is_err() {
                        // the game is gone
                        link.close();
                    }
                }
            }
            Err(e) => {
                warn!("read failed: {}", e);
                break;
            }
        }
    }

    if !link.is_closed() {
        warn!("connection lost");
        link.detach();
        let _ = commands.send(Command::Disconnected);
    }
    // lets queued lines such as `close` reach the peer
    let _ = writer.await;
    Ok(())
}

pub async fn listen(port: u16) -> Result<TcpListener, UnoError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("waiting for an opponent on port {}", port);
    Ok(listener)
}

/// Hosts the game. Only one peer at a time; a peer that drops may come back.
pub async fn run_server(
    listener: TcpListener,
    link: PeerLink,
    commands: flume::Sender<Command>,
) -> Result<(), UnoError> {
    let mut resumed = false;
    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, resumed, "opponent connected");
        let session = serve(stream, &link, &commands, resumed);
        tokio::pin!(session);
        loop {
            tokio::select! {
                result = &mut session => {
                    result?;
                    break;
                }
                extra = listener.accept() => {
                    if let Ok((mut stream, peer)) = extra {
                        warn!(%peer, "game is full, turning connection away");
                        let _ = stream.write_all(b"close\n").await;
                    }
                }
            }
        }
        if link.is_closed() {
            return Ok(());
        }
        resumed = true;
    }
}

pub async fn connect(addr: &str, net: &NetConfig) -> Result<TcpStream, UnoError> {
    for attempt in 0..net.connect_attempts {
        if attempt > 0 {
            tokio::time::sleep(net.backoff(attempt)).await;
        }
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => warn!(attempt, "cannot reach {}: {}", addr, e),
        }
    }
    Err(UnoError::ConnectFailed {
        addr: addr.to_string(),
        attempts: net.connect_attempts,
    })
}

/// Joins a hosted game, reconnecting until the link is closed.
pub async fn run_client(
    addr: String,
    link: PeerLink,
    commands: flume::Sender<Command>,
) -> Result<(), UnoError> {
    let net = link.net().clone();
    let mut resumed = false;
    loop {
        let stream = connect(&addr, &net).await?;
        info!(%addr, resumed, "connected to host");
        serve(stream, &link, &commands, resumed).await?;
        if link.is_closed() {
            return Ok(());
        }
        resumed = true;
    }
}
