//! 生成服务 - 业务能力层
//!
//! 只负责"LLM 生成竞赛内容"能力，不关心流程
//!
//! ## 职责
//! - 把表单拼装成生成提示词
//! - 调用 generateContent 风格的文本生成接口（密钥走请求头）
//! - 从自由文本响应中提取并解析 JSON（```json 代码块 → 花括号区间 → 原文）
//! - 把解析结果与表单的排期字段叠加成 GeneratedCompetition
//!
//! 表单自己的 描述/时长/起止时间/立即开放 永远以表单为准，
//! LLM 只决定题目内容（以及可选的名称/类型）。

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, LlmError};
use crate::models::competition::{GeneratedCompetition, Question};
use crate::models::form::{CompetitionForm, CompetitionKind};

/// 生成温度（与管理端一致）
const TEMPERATURE: f32 = 0.7;
/// 输出 token 上限
const MAX_OUTPUT_TOKENS: u32 = 8000;
/// API 密钥请求头
const API_KEY_HEADER: &str = "x-goog-api-key";

/// 生成服务
pub struct GenerationService {
    client: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
}

impl GenerationService {
    /// 创建新的生成服务
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 根据表单生成一份竞赛
    ///
    /// 这是向导 step 2 → Review 转移时唯一的外部副作用。
    /// 任何失败（网络、非 2xx、JSON 解析、缺少 questions）都是
    /// 本次尝试的同一种终态，由调用方决定是否重试。
    pub async fn generate(&self, form: &CompetitionForm) -> Result<GeneratedCompetition> {
        let prompt = self.build_prompt(form);
        debug!("生成提示词长度: {} 字符", prompt.len());

        let text = self.send_to_llm(&prompt).await?;
        debug!("LLM 响应长度: {} 字符", text.len());

        let payload = self.parse_generated(&text)?;
        let competition = overlay_on_form(form, payload);

        // 返回数量与请求数量不一致时照单全收，只打警告（可在 Review 阶段手工增删）
        if competition.questions.len() as i64 != form.question_count {
            warn!(
                "LLM 返回了 {} 道题，与请求的 {} 道不一致，按实际返回使用",
                competition.questions.len(),
                form.question_count
            );
        }

        Ok(competition)
    }

    /// 构建生成提示词
    fn build_prompt(&self, form: &CompetitionForm) -> String {
        format!(
            r#"Create a {kind} competition named "{name}"
with the following attributes:

Description: {description}
Target Audience: {audiences}
Subjects: {subjects}
Difficulty Level: {difficulty}
Number of Questions: {count}

Please generate {count} {kind} questions with answers.
If it's MCQ, include 4 options for each question with one correct answer.
For coding questions, include a problem statement and expected input/output examples.
For text questions, provide a clear and concise question with the expected answer.

Format the response as a structured JSON object with the following format:
{{
  "competitionName": "Competition Name",
  "competitionType": "MCQ|TEXT|CODE",
  "duration": 60,
  "questions": [
    {{
      "question": "Question text",
      "answer": "Answer text",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"]
    }}
  ]
}}"#,
            kind = form.kind,
            name = form.name,
            description = form.description,
            audiences = form.audiences.join(", "),
            subjects = form.subjects.join(", "),
            difficulty = form.difficulty,
            count = form.question_count,
        )
    }

    /// 调用文本生成接口，返回首个 candidate 的文本
    async fn send_to_llm(&self, prompt: &str) -> Result<String> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model_name
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                AppError::llm_api_failed(self.model_name.clone(), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "LLM API返回错误状态 (模型: {}): {} {}",
                self.model_name,
                status,
                truncate(&body, 200)
            );
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::llm_api_failed(self.model_name.clone(), e))?;

        let candidate = body.candidates.and_then(|mut c| {
            if c.is_empty() {
                None
            } else {
                Some(c.remove(0))
            }
        });
        let candidate = candidate.ok_or_else(|| {
            AppError::Llm(LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })
        })?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .next()
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::Llm(LlmError::EmptyContent {
                model: self.model_name.clone(),
            })
            .into());
        }

        Ok(text)
    }

    /// 解析 LLM 响应文本为结构化内容
    ///
    /// 提取顺序：```json 代码块 → 第一个 `{` 到最后一个 `}` → 原文
    fn parse_generated(&self, text: &str) -> Result<GeneratedPayload, AppError> {
        let json_content = extract_json_content(text);

        let payload: GeneratedPayload =
            serde_json::from_str(&json_content).map_err(|e| {
                AppError::Llm(LlmError::PayloadParseFailed {
                    preview: truncate(&json_content, 120),
                    source: Box::new(e),
                })
            })?;

        if payload.questions.is_none() {
            return Err(AppError::Llm(LlmError::MissingQuestions));
        }

        Ok(payload)
    }
}

/// 从自由文本中提取 JSON 内容
///
/// LLM 可能把 JSON 包在 markdown 代码块里，也可能混在说明文字中。
fn extract_json_content(text: &str) -> String {
    // 1) ```json 代码块
    // 正则在此处不可能非法，失败直接落到后备分支
    if let Ok(re) = Regex::new(r"(?s)```json\s*(.*?)```") {
        if let Some(caps) = re.captures(text) {
            if let Some(m) = caps.get(1) {
                return m.as_str().to_string();
            }
        }
    }

    // 2) 第一个 { 到最后一个 } 的区间
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    // 3) 原文直接尝试
    text.to_string()
}

/// 把解析结果与表单叠加成最终竞赛
///
/// 名称/类型优先取 LLM 返回值（缺失或非法时退回表单），
/// 描述与全部排期字段始终取表单。
fn overlay_on_form(form: &CompetitionForm, payload: GeneratedPayload) -> GeneratedCompetition {
    let competition_name = payload
        .competition_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| form.name.clone());

    let competition_type = payload
        .competition_type
        .as_deref()
        .and_then(CompetitionKind::find)
        .unwrap_or(form.kind);

    let questions = payload
        .questions
        .unwrap_or_default()
        .into_iter()
        .map(|q| Question {
            question: q.question,
            answer: q.answer,
            options: q.options,
            editing: false,
        })
        .collect();

    GeneratedCompetition {
        competition_name,
        competition_type,
        duration: form.duration_minutes,
        competition_description: form.description.clone(),
        start_timing: form.start_timing.clone(),
        end_timing: form.end_timing.clone(),
        is_live: form.immediate,
        questions,
    }
}

/// 截断长文本用于错误信息
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

// ========== 请求/响应 DTO（generateContent 接口）==========

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

// ========== LLM 返回的竞赛内容 ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedPayload {
    #[serde(default)]
    competition_name: Option<String>,
    /// 保留原始字符串，非法值退回表单类型而不是整体解析失败
    #[serde(default)]
    competition_type: Option<String>,
    #[serde(default)]
    questions: Option<Vec<QuestionPayload>>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
}
