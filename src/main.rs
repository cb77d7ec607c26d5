use tracing::info;

use guichet::web::WebServer;
use guichet::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = guichet::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        guichet::logging::init_console_only(&config.logging.level);
    }

    info!("guichet - contact submission gateway");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let server = WebServer::new(&config);
    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
