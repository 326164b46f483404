/// 平台后端 API 客户端
///
/// 封装所有与竞赛平台后端相关的调用逻辑
use crate::config::Config;
use crate::error::{ApiError, AppError};
use crate::models::competition::GeneratedCompetition;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// 竞赛创建接口的响应
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// 平台后端 API 客户端
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BackendClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.backend_api_base_url.clone(),
            token: config.backend_token.clone(),
        }
    }

    /// 创建竞赛
    ///
    /// 把生成的竞赛整体 POST 给后端。`success=false` 与传输错误
    /// 同样视为提交失败，由调用方决定重试。
    ///
    /// # 参数
    /// - `competition`: 生成并审阅完成的竞赛
    pub async fn create_competition(&self, competition: &GeneratedCompetition) -> Result<()> {
        let endpoint = format!("{}/competitions", self.base_url);

        debug!(
            "提交竞赛: {} ({} 道题)",
            competition.competition_name,
            competition.questions.len()
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(competition)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            // 失败响应体里通常带 message，尽量带出来
            let message = response
                .json::<CreateResponse>()
                .await
                .ok()
                .and_then(|r| r.message);
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint,
                status: Some(status.as_u16()),
                message,
            })
            .into());
        }

        let body: CreateResponse = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        if !body.success {
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint,
                status: Some(status.as_u16()),
                message: body.message,
            })
            .into());
        }

        debug!("竞赛提交成功");
        Ok(())
    }
}
