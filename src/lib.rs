//! # AI Competition Creator
//!
//! 一个用于 AI 辅助批量创建竞赛的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个表单/竞赛
//! - `validator` - 分步表单校验能力（一次性收集全部违规项）
//! - `GenerationService` - LLM 生成能力（提示词 → generateContent → JSON 提取）
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 平台后端 API 封装
//! - `BackendClient` - 竞赛创建接口（Bearer 认证）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个竞赛计划"的完整处理流程
//! - `WizardSession` - 四步向导状态机（纯逻辑，不做 I/O）
//! - `WizardCtx` - 上下文封装（plan_name + plan_index）
//! - `WizardFlow` - 流程编排（校验 → 生成 → 提交 → warn）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量计划处理器，管理资源和并发
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::BackendClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CompetitionForm, CompetitionKind, Difficulty, GeneratedCompetition, Question};
pub use orchestrator::App;
pub use services::{FieldError, FormField, GenerationService, WarnWriter};
pub use workflow::{NextOutcome, ProcessResult, WizardCtx, WizardFlow, WizardSession, WizardState};
