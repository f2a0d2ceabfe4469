//! 控制面 API 客户端
//!
//! 直接驱动进程内的 axum Router，不经过网络。

use anyhow::{Result, bail};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Clone)]
pub struct ApiClient {
    router: Router,
}

impl ApiClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// 发送请求，返回状态码与 JSON 响应体
    pub async fn request(&self, method: &str, uri: &str, body: Option<&Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    /// 请求并取出成功响应中的 `data`
    async fn data(&self, method: &str, uri: &str, body: Option<&Value>) -> Result<Value> {
        let (status, value) = self.request(method, uri, body).await?;
        if !status.is_success() {
            bail!("{} {} 失败: {} {}", method, uri, status, value);
        }
        Ok(value["data"].clone())
    }

    // ========== 规则 ==========

    pub async fn create_rule(&self, rule: &Value) -> Result<String> {
        let created = self.data("POST", "/api/rules", Some(rule)).await?;
        Ok(created["id"].as_str().unwrap_or_default().to_string())
    }

    pub async fn list_rules(&self) -> Result<Vec<Value>> {
        let rules = self.data("GET", "/api/rules", None).await?;
        Ok(rules.as_array().cloned().unwrap_or_default())
    }

    pub async fn reload_rules(&self) -> Result<usize> {
        let result = self.data("POST", "/api/rules/reload", None).await?;
        Ok(result["rulesCount"].as_u64().unwrap_or_default() as usize)
    }

    // ========== 消息 ==========

    pub async fn push_comments(&self, comments: &[Value]) -> Result<Vec<Value>> {
        let summaries = self
            .data("POST", "/api/comments", Some(&json!({ "comments": comments })))
            .await?;
        Ok(summaries.as_array().cloned().unwrap_or_default())
    }

    pub async fn history(&self, limit: Option<usize>) -> Result<Vec<Value>> {
        let uri = match limit {
            Some(limit) => format!("/api/history?limit={}", limit),
            None => "/api/history".to_string(),
        };
        let entries = self.data("GET", &uri, None).await?;
        Ok(entries.as_array().cloned().unwrap_or_default())
    }

    // ========== 设置 ==========

    pub async fn update_config(&self, patch: &Value) -> Result<Value> {
        self.data("PUT", "/api/config", Some(patch)).await
    }
}
