//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, state::AppState};

/// 规则管理路由
fn rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(handlers::rules::list_rules).post(handlers::rules::create_rule),
        )
        .route("/rules/reload", post(handlers::rules::reload_rules))
        .route("/rules/test", post(handlers::rules::test_rule))
        .route("/rules/preview", post(handlers::rules::preview_rules))
        .route("/rules/stats", get(handlers::rules::rule_stats))
        .route(
            "/rules/{id}",
            get(handlers::rules::get_rule)
                .put(handlers::rules::update_rule)
                .delete(handlers::rules::delete_rule),
        )
}

/// 发送设置路由
fn config_routes() -> Router<AppState> {
    Router::new().route(
        "/config",
        get(handlers::config::get_config).put(handlers::config::update_config),
    )
}

/// 评论推送、历史与字段目录路由
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(handlers::comments::ingest_comments))
        .route(
            "/history",
            get(handlers::history::list_history).delete(handlers::history::clear_history),
        )
        .route("/fields", get(handlers::fields::list_fields))
}

/// 构建完整的 API 路由（不含 `/api` 前缀）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(rule_routes())
        .merge(config_routes())
        .merge(message_routes())
}

/// 构建应用：`/api` 下挂载控制面接口，另有 `/health`
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
