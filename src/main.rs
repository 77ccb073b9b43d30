//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use gerencia_roi::{
    config::{AppConfig, AppState},
    create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG manda; sem ele, info para o app e o tower-http
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gerencia_roi=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = AppConfig::from_env()?;
    let pool = config.connect_database().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if config.sale_dedup {
        tracing::info!("Deduplicação de vendas por transaction_id ativada");
    }

    let app = create_router(AppState::from_pool(pool, &config));

    // Inicia o servidor
    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
