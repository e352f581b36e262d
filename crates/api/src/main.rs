use forgeline_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    forgeline_observability::init();

    let config = ApiConfig::from_env()?;
    let app = forgeline_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
