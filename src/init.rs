use env_logger::{Builder, Env};

/// 初始化日誌系統，預設等級為 info，可透過 RUST_LOG 覆蓋
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}
