//! 计划处理流程 - 流程层
//!
//! 核心职责：定义"一个竞赛计划"的完整处理流程
//!
//! 流程顺序：
//! 1. 三步表单校验（BasicInfo → AudienceSubjects → DifficultyCount）
//! 2. LLM 生成（失败按配置的次数上限重试）
//! 3. 提交后端
//! 4. warn.txt（兜底）
//!
//! 交互模式下这些事件由用户点击触发；批处理模式下由本流程
//! 按同样的状态边界依次喂给 WizardSession。

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::BackendClient;
use crate::config::Config;
use crate::models::catalog;
use crate::models::form::CompetitionForm;
use crate::services::{GenerationService, WarnWriter};
use crate::workflow::wizard::{NextOutcome, WizardSession, WizardState};
use crate::workflow::wizard_ctx::WizardCtx;

/// 计划处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 竞赛已创建
    Created,
    /// 跳过（校验失败 / 生成失败 / 提交失败，已写入 warn.txt）
    Skipped,
}

/// 计划处理流程
///
/// - 编排完整的计划处理流程
/// - 决定何时校验、何时生成、何时兜底
/// - 只依赖业务能力（services / clients）
pub struct WizardFlow {
    generation: GenerationService,
    backend: BackendClient,
    warn_writer: WarnWriter,
    max_generation_attempts: usize,
    verbose_logging: bool,
}

impl WizardFlow {
    /// 创建新的计划处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            generation: GenerationService::new(config),
            backend: BackendClient::new(config),
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
            max_generation_attempts: config.max_generation_attempts.max(1),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(&self, form: CompetitionForm, ctx: &WizardCtx) -> Result<ProcessResult> {
        self.log_catalog_warnings(ctx, &form);

        let mut session = WizardSession::with_form(form);
        let now = chrono::Local::now().naive_local();

        // ========== 流程 1: 三步表单校验 ==========
        loop {
            match session.next(now)? {
                NextOutcome::Advanced => continue,
                NextOutcome::GenerationStarted => break,
                NextOutcome::Rejected => {
                    let messages: Vec<String> = session
                        .errors()
                        .iter()
                        .map(|(field, msg)| format!("{}: {}", field, msg))
                        .collect();
                    warn!(
                        "[计划 {}] ⚠️ 表单校验失败（{}）: {}",
                        ctx.plan_index,
                        session.state(),
                        messages.join("; ")
                    );
                    self.write_warn(ctx, &format!("表单校验失败: {}", messages.join("; ")))
                        .await?;
                    return Ok(ProcessResult::Skipped);
                }
            }
        }

        // ========== 流程 2: LLM 生成（带重试） ==========
        info!("[计划 {}] 🤖 正在生成竞赛内容...", ctx.plan_index);

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let result = self
                .generation
                .generate(session.form())
                .await
                .map_err(|e| e.to_string());

            match &result {
                Ok(competition) => {
                    info!(
                        "[计划 {}] ✓ 生成成功，共 {} 道题 (第 {} 次尝试)",
                        ctx.plan_index,
                        competition.questions.len(),
                        attempt
                    );
                }
                Err(e) => {
                    error!(
                        "[计划 {}] ⚠️ 生成失败 (第 {}/{} 次尝试): {}",
                        ctx.plan_index, attempt, self.max_generation_attempts, e
                    );
                }
            }

            session.complete_generation(result)?;

            match session.state().clone() {
                WizardState::GenerationSucceeded => break,
                WizardState::GenerationFailed { .. } if attempt < self.max_generation_attempts => {
                    // 重试不回到前面的步骤，表单保持原样
                    session.retry_generation()?;
                }
                WizardState::GenerationFailed { message } => {
                    let reason = format!("生成失败 (已尝试 {} 次): {}", attempt, message);
                    self.write_warn(ctx, &reason).await?;
                    return Ok(ProcessResult::Skipped);
                }
                other => {
                    anyhow::bail!("生成结束后出现意外状态: {}", other);
                }
            }
        }

        if self.verbose_logging {
            self.log_generated_preview(ctx, &session);
        }

        // ========== 流程 3: 提交后端 ==========
        info!("[计划 {}] 📤 正在提交竞赛到平台...", ctx.plan_index);

        let competition = session.begin_submit()?.clone();
        let submit_result = self
            .backend
            .create_competition(&competition)
            .await
            .map_err(|e| e.to_string());

        match submit_result {
            Ok(()) => {
                session.complete_submit(Ok(()))?;
                info!("[计划 {}] ✓ 竞赛创建成功", ctx.plan_index);
                Ok(ProcessResult::Created)
            }
            Err(e) => {
                // 会话回到 GenerationSucceeded；批处理模式不再重试，记入 warn.txt
                session.complete_submit(Err(e.clone()))?;
                warn!("[计划 {}] ⚠️ 竞赛提交失败: {}", ctx.plan_index, e);
                self.write_warn(ctx, &format!("提交失败: {}", e)).await?;
                Ok(ProcessResult::Skipped)
            }
        }
    }

    /// 目录外条目只提示不拦截（后端接受任意字符串）
    fn log_catalog_warnings(&self, ctx: &WizardCtx, form: &CompetitionForm) {
        for subject in &form.subjects {
            if !catalog::is_known_subject(subject) {
                warn!(
                    "[计划 {}] 学科 \"{}\" 不在内置目录中",
                    ctx.plan_index, subject
                );
            }
        }
        for audience in &form.audiences {
            if !catalog::is_known_audience(audience) {
                warn!(
                    "[计划 {}] 目标人群 \"{}\" 不在内置目录中",
                    ctx.plan_index, audience
                );
            }
        }
    }

    /// 写入失败记录
    async fn write_warn(&self, ctx: &WizardCtx, reason: &str) -> Result<()> {
        self.warn_writer
            .write(&ctx.plan_name, ctx.plan_index, reason)
            .await?;

        warn!(
            "[计划 {}] ⚠️ 已写入 warn.txt: {} (原因: {})",
            ctx.plan_index, ctx.plan_name, reason
        );

        Ok(())
    }

    // ========== 日志辅助方法 ==========

    /// 显示生成结果预览
    fn log_generated_preview(&self, ctx: &WizardCtx, session: &WizardSession) {
        if let Some(competition) = session.generated() {
            for (i, q) in competition.questions.iter().take(2).enumerate() {
                info!(
                    "[计划 {}]   {}. {}",
                    ctx.plan_index,
                    i + 1,
                    crate::utils::logging::truncate_text(&q.question, 80)
                );
            }
        }
    }
}
