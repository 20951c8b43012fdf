use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use strake_control::admin_api::AdminServer;
use strake_control::runtime::{Runtime, RuntimeOptions};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Runtime control plane for the strake relay engine.
#[derive(Parser, Debug)]
#[command(name = "strake", version, about)]
struct Args {
    /// Admin API listen address.
    #[arg(long, default_value = "127.0.0.1")]
    addr: String,

    /// Admin API listen port.
    #[arg(short, long, default_value_t = 8191)]
    port: u16,

    /// Access token; requests must carry "Authorization: Token <value>".
    /// Unset skips the check.
    #[arg(long, env = "STRAKE_TOKEN")]
    token: Option<String>,

    /// Configuration file.
    #[arg(short, long, default_value = "strake.json")]
    config: PathBuf,

    /// Offset appended to the configuration file name; the effective path
    /// is "<config>.<offset>", leaving the original file untouched.
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Ignore the effective config file and fall back to the default path.
    #[arg(long)]
    reset: bool,

    /// Log the decoded configuration on startup.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config_path = PathBuf::from(format!("{}.{}", args.config.display(), args.offset));
    info!(
        "starting engine, config file: {} -> {}",
        args.config.display(),
        config_path.display()
    );

    let runtime = Arc::new(Runtime::new(RuntimeOptions {
        config_path,
        reset: args.reset,
        print: args.print_config,
    }));

    // Initial start runs in the background; a failure is recorded and
    // reported, never fatal.
    {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move {
            if let Err(e) = runtime.start().await {
                error!("initial engine start failed: {}", e);
            }
        });
    }

    let addr: SocketAddr = format!("{}:{}", args.addr, args.port).parse()?;
    let (shutdown_tx, _) = broadcast::channel(1);
    let server = AdminServer::new(addr, Arc::clone(&runtime), args.token);
    let mut server_handle = tokio::spawn(server.run(shutdown_tx.subscribe()));

    tokio::select! {
        _ = wait_for_signal() => {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(());
            let drain = async {
                if let Err(e) = runtime.stop().await {
                    warn!("engine stop during shutdown failed: {}", e);
                }
                let _ = (&mut server_handle).await;
            };
            if tokio::time::timeout(Duration::from_secs(5), drain).await.is_err() {
                warn!("shutdown timed out after 5s");
                server_handle.abort();
            }
            info!("server exiting");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("admin server failed: {}", e);
                    return Err(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
