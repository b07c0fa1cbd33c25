//! # Generator → processor pipeline next to a TCP server
//!
//! Demonstrates:
//! - one node per job, labelled with `with_annotation`
//! - ordered shutdown with `depends_on` (producer stops before its consumer)
//! - readiness and an error group reported by the server
//! - a value node exposing the server's fatal-error channel
//! - `Supervisor` + `LogWriter` driving the root until Ctrl-C
//!
//! Run with `cargo run --example pipeline --features logging`.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use jobtree::{
    merge, with_annotation, with_error_group, with_readiness, with_shutdown, with_value, Config,
    LogWriter, Node, Subscribe, Supervisor,
};

/// Key of the server's fatal-error channel.
#[derive(PartialEq)]
struct FatalKey;

type FatalRx = Mutex<mpsc::Receiver<std::io::Error>>;

/// Emits a timestamp every second.
fn generator() -> (mpsc::Receiver<SystemTime>, Node) {
    let (node, tail) = with_shutdown(vec![]);
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let end = tail.end();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = end.wait() => break,
                _ = ticker.tick() => {
                    if tx.send(SystemTime::now()).await.is_err() {
                        break;
                    }
                }
            }
        }
        println!("🔢 generator shutdown");
        tail.done();
    });

    (rx, with_annotation("generator", vec![node]))
}

/// Prints what the generator produced.
fn processor(mut rx: mpsc::Receiver<SystemTime>) -> Node {
    let (node, tail) = with_shutdown(vec![]);

    tokio::spawn(async move {
        let end = tail.end();
        loop {
            tokio::select! {
                _ = end.wait() => break,
                t = rx.recv() => match t {
                    Some(t) => println!("⚙️  processor: {t:?}"),
                    None => break,
                },
            }
        }
        println!("⚙️  processor shutdown");
        tail.done();
    });

    with_annotation("processor", vec![node])
}

/// Accepts TCP connections until shut down.
async fn server() -> anyhow::Result<Node> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    println!("🌐 server listening on {}", listener.local_addr()?);

    let (shutdown, tail) = with_shutdown(vec![]);
    let (errs, err_tail) = with_error_group(vec![]);
    let (ready, ready_tail) = with_readiness(vec![]);
    let (fatal_tx, fatal_rx) = mpsc::channel::<std::io::Error>(1);
    let fatal: FatalRx = Mutex::new(fatal_rx);

    tokio::spawn(async move {
        let end = tail.end();
        ready_tail.ok();
        loop {
            tokio::select! {
                _ = end.wait() => break,
                res = listener.accept() => match res {
                    Ok((_stream, peer)) => println!("🌐 server: connection from {peer}"),
                    Err(err) => {
                        err_tail.wrap("accept", std::io::Error::new(err.kind(), err.to_string()));
                        let _ = fatal_tx.send(err).await;
                        break;
                    }
                },
            }
        }
        println!("🌐 server shutdown");
        tail.done();
    });

    let node = merge(vec![shutdown, errs, ready, with_value(FatalKey, fatal, vec![])]);
    Ok(with_annotation("http server", vec![node]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (out, generator) = generator();
    let processor = processor(out);
    let server = server().await?;

    // generator stops first, then processor, then server
    let root = with_annotation(
        "app",
        vec![server.depends_on(vec![processor.depends_on(vec![generator])])],
    );
    if let Some(err) = root.err() {
        anyhow::bail!(err);
    }

    let fatal = root
        .value_of::<_, FatalRx>(&FatalKey)
        .ok_or_else(|| anyhow::anyhow!("server did not expose its fatal channel"))?;

    let mut cfg = Config::default();
    cfg.grace = Duration::from_secs(5);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::new(cfg, subs);

    let trigger = async move {
        let mut fatal = fatal.lock().await;
        tokio::select! {
            _ = jobtree::wait_for_shutdown_signal() => {},
            Some(err) = fatal.recv() => println!("🌐 server fatal error: {err}"),
        }
    };
    let res = sup.run_until(root, trigger).await;
    sup.close().await;
    res?;
    Ok(())
}
