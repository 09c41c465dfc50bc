use color_eyre::Result;
use pipesh::{
    config::{Config, LOG_FILE},
    state::State,
};
use tracing_subscriber::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &config.log_dir,
        LOG_FILE,
    ));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    tracing::trace!(?config, "starting shell");

    let code = State::new(config).run().await?;

    drop(guard);

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
