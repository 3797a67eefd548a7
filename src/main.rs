use tracing::info;

use caseforge::infrastructure::bootstrap;
use caseforge::infrastructure::config::Settings;
use caseforge::interfaces::http::run_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let settings = Settings::load().map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        model = %settings.llm.model,
        "Starting caseforge backend"
    );

    let state = bootstrap::setup(settings.clone());
    run_server(&settings.server, state)?.await
}
