use parrot_core::config::Config;
use parrot_core::connect_from_config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // stdout carries the hello; logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Building ClientHello for {} as {}", config.server_name, config.profile);
    let conn = connect_from_config(&config)?;
    let record = conn.marshal_record()?;
    println!("{}", hex::encode(&record));

    tracing::info!("Done: {} byte record, {} key shares held", record.len(), conn.key_share_keys().len());
    Ok(())
}
