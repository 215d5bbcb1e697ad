//! Exam hall server entry point

use clap::Parser;
use examhall::config::{get_env_or, ScanRateConfig};
use examhall::{auth, config, db, logging, server, AppState};
use rand::Rng;

/// 試験監督バックエンドサーバー
#[derive(Parser, Debug)]
#[command(name = "examhall", version, about = "Exam invigilation backend server")]
struct Cli {
    /// バインドするホスト
    #[arg(long, env = "EXAMHALL_HOST", default_value = "0.0.0.0")]
    host: String,

    /// バインドするポート
    #[arg(long, env = "EXAMHALL_PORT", default_value_t = 8080)]
    port: u16,
}

/// JWT秘密鍵を解決する
///
/// `EXAMHALL_JWT_SECRET` が未設定の場合はランダム生成する（再起動で
/// 既存トークンは無効になる）。
fn resolve_jwt_secret() -> String {
    match config::get_env("EXAMHALL_JWT_SECRET") {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!(
                "EXAMHALL_JWT_SECRET not set; generating a random secret \
                 (tokens will not survive restarts)"
            );
            let mut rng = rand::thread_rng();
            (0..48)
                .map(|_| {
                    const CHARSET: &[u8] =
                        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
                    CHARSET[rng.gen_range(0..CHARSET.len())] as char
                })
                .collect()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let database_url = get_env_or("EXAMHALL_DATABASE_URL", "sqlite:examhall.db");

    let pool = match db::migrations::initialize_database(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = auth::bootstrap::ensure_admin_exists(&pool).await {
        tracing::error!("Failed to bootstrap admin user: {}", e);
        std::process::exit(1);
    }

    let jwt_secret = resolve_jwt_secret();
    let scan_config = ScanRateConfig::from_env();
    tracing::info!(
        limit = scan_config.limit,
        window_secs = scan_config.window_secs,
        "scan rate limit configured"
    );

    let state = AppState::new(pool, jwt_secret, scan_config);

    let bind_addr = format!("{}:{}", cli.host, cli.port);
    if let Err(e) = server::run(state, &bind_addr).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
