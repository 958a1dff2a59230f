use monugen::{logger, Config};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.server.host(),
        config.server.port(),
    );
    logger::log_config_info(&config);

    if config.gemini.api_key().is_none() {
        log::warn!("⚠️  GEMINI_API_KEY is not set; all stages will answer 500");
    }

    monugen::server::run(config).await?;

    log::info!("👋 Server stopped");
    Ok(())
}
