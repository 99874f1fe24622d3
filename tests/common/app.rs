use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use practice_backend::config::Config;
use practice_backend::routes::build_router;
use practice_backend::state::AppState;
use practice_backend::store::Store;
use practice_backend::videos::VideoStore;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("practice-test.sled");
    let video_dir = temp_dir.path().join("videos");

    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        video_dir: video_dir.to_string_lossy().to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        max_upload_bytes: 16 * 1024 * 1024,
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let videos = Arc::new(VideoStore::new(&config.video_dir));
    videos.ensure_dir().await.expect("create video dir");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, videos, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_test_app().await
}
