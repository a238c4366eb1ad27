use docsum_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under many
// concurrent multipart uploads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration (.env first, then the process environment)
    let config = Config::from_env()?;

    // Initialize the application (telemetry, storage, service clients, routes)
    let (_state, router) = docsum_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    docsum_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
