use std::{
    io,
    process::ExitCode,
    sync::OnceLock,
};

use application::{config::Backend, run, Args, Config, Outcome};
use service::{
    infra::{postgres, Journal, Memory, Postgres},
    Service,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    match start().await {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

async fn start() -> Result<Outcome, ExitCode> {
    // Help and version requests are reported by `clap` as errors too.
    let Args { config, action } = Args::parse().unwrap_or_else(|e| e.exit());

    let Config {
        storage,
        postgres,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
        ExitCode::FAILURE
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let outcome = match storage.backend {
        Backend::File => {
            let journal = Journal::new(storage.inventory, storage.contracts);
            let memory = Memory::open(journal).await.map_err(|e| {
                log::error!("failed to open `Journal`: {e}");
                ExitCode::FAILURE
            })?;
            run(&Service::new(service.into(), memory), action).await
        }
        Backend::Postgres => {
            let postgres_config = postgres.into();
            let mut postgres =
                Postgres::new(&postgres_config).map_err(|e| {
                    log::error!("failed to initialize `Postgres` client: {e}");
                    ExitCode::FAILURE
                })?;

            migrations::runner()
                .run_async(&mut postgres)
                .await
                .map_err(|e| {
                    log::error!("failed to run database migrations: {e}");
                    ExitCode::FAILURE
                })?;

            run(&Service::new(service.into(), postgres), action).await
        }
    };

    outcome.map_err(|e| {
        log::error!("{e}");
        e.exit_code()
    })
}
