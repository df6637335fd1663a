use std::{env, fs, path::PathBuf, sync::Arc};

use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use oracle_keys::{
    signer_local::{read_from_keystore, write_to_keystore},
    PublicKey,
};
use price_attestor::{
    config::AttestorConfig,
    logging::init_logging,
    price_source::{
        fixed::FixedPriceSourceBuilder, hermes::HermesPriceSourceBuilder, PriceSourceBuilder,
    },
    rpc::{health_server, server, AttestorService, RpcError, VerifierService},
    signer::{
        local::{LocalSigner, DEFAULT_KEYSTORE_NAME},
        Signer, SignerBuilder,
    },
    verifier::{registry, EventLog, Verifier},
};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::broadcast,
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::cli::{key::KeyCommands, AttestorCli, Commands, SourceType};

mod cli;

/// Default attestor dir
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
fn default_attestor_dir() -> Result<PathBuf, anyhow::Error> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("unable to determine home directory from environment"))?;
    Ok(PathBuf::from(home).join(".price-attestor"))
}

/// Build the price source and signer, bind the trusted key and spawn the API server.
async fn run_server_with_source<B: PriceSourceBuilder>(
    config_path: &str,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<(std::net::SocketAddr, JoinHandle<Result<(), RpcError>>), anyhow::Error>
where
    B::Config: for<'de> serde::Deserialize<'de>,
{
    let config = AttestorConfig::<B::Config, <LocalSigner as SignerBuilder>::Config>::from_file(
        config_path,
    )?;
    let health_addr = config.server.health_addr();

    let source = B::build(config.price_source)?;
    let signer = LocalSigner::build(config.signer)?;

    let trusted_key: PublicKey = config
        .verifier
        .trusted_public_key
        .unwrap_or_else(|| signer.public_key());
    if trusted_key != signer.public_key() {
        warn!(
            trustedKey = %trusted_key,
            signerKey = %signer.public_key(),
            "trusted key differs from the signing key; locally signed prices will not verify"
        );
    }

    let registry = registry::deploy(&signer, trusted_key, config.network).await?;
    info!(
        state = ?registry.state(),
        deployer = %registry.deployer(),
        network = %registry.network(),
        "trusted key registry deployed"
    );
    let verifier = Verifier::new(
        Arc::new(registry),
        Arc::new(EventLog::new(config.verifier.event_capacity)),
    );

    let attestor = AttestorService::new(
        source,
        B::source_name(),
        signer,
        LocalSigner::signer_name(),
        config.network,
    );

    let handle = tokio::spawn(async move {
        server::start(
            config.server.listen_addr,
            attestor,
            VerifierService::new(verifier),
            shutdown_rx,
        )
        .await
    });

    Ok((health_addr, handle))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = AttestorCli::parse();

    match cli.command {
        Commands::Server(args) => {
            init_logging();

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

            let (health_addr, api_handle) = match args.source_type {
                SourceType::Hermes => {
                    run_server_with_source::<HermesPriceSourceBuilder>(&args.config, shutdown_rx)
                        .await?
                }
                SourceType::Fixed => {
                    run_server_with_source::<FixedPriceSourceBuilder>(&args.config, shutdown_rx)
                        .await?
                }
            };

            // Health server starts once the API server is initialized
            let health_shutdown_rx = shutdown_tx.subscribe();
            let health_handle = tokio::spawn(async move {
                health_server::start(health_addr, health_shutdown_rx).await
            });

            wait_for_shutdown_signal().await?;
            info!("shutdown signal received, starting graceful shutdown");
            let _ = shutdown_tx.send(());

            let (api_result, health_result) = tokio::join!(api_handle, health_handle);
            api_result??;
            health_result??;
        }
        Commands::Key(cmd) => match cmd {
            KeyCommands::Generate(args) => {
                let attestor_dir = match args.keystore {
                    Some(path) => path,
                    None => default_attestor_dir()?,
                };
                let keystore_path = attestor_dir.join(DEFAULT_KEYSTORE_NAME);

                if !attestor_dir.exists() {
                    fs::create_dir_all(&attestor_dir)?;
                }

                if keystore_path.exists() {
                    return Err(anyhow::anyhow!(
                        "key pair already found at {keystore_path:?}; aborting"
                    ));
                }

                let signer = PrivateKeySigner::random();
                write_to_keystore(&attestor_dir, DEFAULT_KEYSTORE_NAME, &signer, &args.password)
                    .map_err(|e| anyhow::anyhow!("unable to generate key {e}"))?;
                println!("key successfully saved to {keystore_path:?}");
                println!("public key: {}", LocalSigner::new(signer).public_key());
            }
            KeyCommands::Show(args) => {
                let attestor_dir = match args.keystore {
                    Some(path) => path,
                    None => default_attestor_dir()?,
                };
                let keystore_path = attestor_dir.join(DEFAULT_KEYSTORE_NAME);
                let signer = read_from_keystore(&keystore_path, &args.password)?;

                if args.show_private {
                    println!("{}", hex::encode(signer.credential().to_bytes()));
                }

                if args.show_public {
                    println!("{}", LocalSigner::new(signer).public_key());
                }
            }
        },
    }
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be registered.
async fn wait_for_shutdown_signal() -> Result<(), anyhow::Error> {
    let mut signal_terminate = signal(SignalKind::terminate())?;
    let mut signal_interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = signal_terminate.recv() => info!("received SIGTERM signal"),
        _ = signal_interrupt.recv() => info!("received SIGINT signal (Ctrl+C)"),
    };
    Ok(())
}
