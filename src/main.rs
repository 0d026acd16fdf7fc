use d_translate::Error;
use d_translate::Event;
use d_translate::Result;
use d_translate::TranslateConfig;
use d_translate::TranslateFilter;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    // Initializing Logs
    let _guard = init_observability();

    let config = TranslateConfig::new()?.validate()?;
    let mut filter = TranslateFilter::register(config).await?;

    // Initializing Shutdown Signal
    let (graceful_tx, mut graceful_rx) = watch::channel(());
    tokio::spawn(async move {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to listen for shutdown signal: {:?}", e);
        }
    });

    info!("Translating records from stdin. Waiting for EOF or CTRL+C signal...");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let result: Result<()> = loop {
        tokio::select! {
            biased;

            Ok(()) = graceful_rx.changed() => break Ok(()),

            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(Error::Fatal(format!("failed to read stdin: {e}"))),
                };
                if line.trim().is_empty() {
                    continue;
                }

                let mut event = match Event::from_json(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "skipping line that is not a JSON object");
                        continue;
                    }
                };
                if let Err(e) = filter.filter(&mut event) {
                    break Err(e);
                }

                let mut out = event.to_json();
                out.push('\n');
                if let Err(e) = stdout.write_all(out.as_bytes()).await {
                    break Err(Error::Fatal(format!("failed to write stdout: {e}")));
                }
            }
        }
    };

    if let Err(e) = stdout.flush().await {
        warn!("Failed to flush stdout: {:?}", e);
    }
    filter.close().await?;

    if let Err(e) = &result {
        error!("translation stopped: {}", e);
    }
    info!("Exiting program.");
    result
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    if graceful_tx.send(()).is_err() {
        warn!("Shutdown signal receiver already dropped");
    }
    Ok(())
}

/// Logs go to stderr so stdout stays a clean record stream.
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init_observability() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(filter);
    tracing_subscriber::registry().with(base_subscriber).init();

    guard
}
