//! 向导状态机 - 流程层
//!
//! 核心职责：驱动"创建竞赛"四步向导的状态与校验
//!
//! 流程顺序：
//! 1. BasicInfo → AudienceSubjects → DifficultyCount（每步前进时校验）
//! 2. DifficultyCount 校验通过 → Generating（由调用方发起生成调用）
//! 3. 生成成功 → GenerationSucceeded（可编辑、可重新生成、可提交）
//! 4. 提交成功 → Completed
//!
//! 状态是单一带标签联合：不存在"正在生成但还停在 step 0"
//! 这类可达的非法布尔组合。状态机本身不做任何 I/O，
//! 生成与提交的副作用由 WizardFlow 在状态边界上执行。

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::competition::GeneratedCompetition;
use crate::models::form::{CompetitionForm, CompetitionKind};
use crate::services::validator::{self, FieldError, FormField};

/// 向导状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    /// step 0：基本信息
    BasicInfo,
    /// step 1：目标人群与学科
    AudienceSubjects,
    /// step 2：难度与题目数量
    DifficultyCount,
    /// Review：生成调用进行中
    Generating,
    /// Review：生成失败（可重试）
    GenerationFailed { message: String },
    /// Review：生成成功（可编辑/重新生成/提交）
    GenerationSucceeded,
    /// 提交调用进行中
    Submitting,
    /// 提交成功，会话结束
    Completed,
}

impl WizardState {
    /// 获取状态名称（用于日志与错误信息）
    pub fn name(&self) -> &'static str {
        match self {
            WizardState::BasicInfo => "BasicInfo",
            WizardState::AudienceSubjects => "AudienceSubjects",
            WizardState::DifficultyCount => "DifficultyCount",
            WizardState::Generating => "Generating",
            WizardState::GenerationFailed { .. } => "GenerationFailed",
            WizardState::GenerationSucceeded => "GenerationSucceeded",
            WizardState::Submitting => "Submitting",
            WizardState::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `next` 操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    /// 校验通过，已进入下一步
    Advanced,
    /// 校验失败，停在原步骤（全部字段错误已记录）
    Rejected,
    /// step 2 校验通过，已进入 Generating，调用方应当发起生成调用
    GenerationStarted,
}

/// 向导会话
///
/// 一次"创建竞赛"对话框的全部可变状态：表单、当前状态、
/// 字段错误、生成结果。单一持有者，事件驱动，无内部可变性。
#[derive(Debug, Clone)]
pub struct WizardSession {
    form: CompetitionForm,
    state: WizardState,
    errors: BTreeMap<FormField, String>,
    generated: Option<GeneratedCompetition>,
}

impl WizardSession {
    /// 打开一个空白向导会话
    pub fn new() -> Self {
        Self::with_form(CompetitionForm::default())
    }

    /// 用预填表单打开会话（批处理模式：表单来自 TOML 计划）
    pub fn with_form(form: CompetitionForm) -> Self {
        Self {
            form,
            state: WizardState::BasicInfo,
            errors: BTreeMap::new(),
            generated: None,
        }
    }

    // ========== 只读访问 ==========

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &CompetitionForm {
        &self.form
    }

    /// 当前记录的字段错误（按字段序）
    pub fn errors(&self) -> &BTreeMap<FormField, String> {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn generated(&self) -> Option<&GeneratedCompetition> {
        self.generated.as_ref()
    }

    /// 生成或提交进行中时禁止取消/关闭
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self.state,
            WizardState::Generating | WizardState::Submitting
        )
    }

    pub fn is_complete(&self) -> bool {
        self.state == WizardState::Completed
    }

    // ========== 字段编辑 ==========
    // 编辑某个字段只清除该字段已记录的错误，不触发任何重新校验。

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.form.name = value.into();
        self.errors.remove(&FormField::Name);
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.form.description = value.into();
        self.errors.remove(&FormField::Description);
    }

    /// 类型字段没有校验规则，不清除任何错误
    pub fn set_kind(&mut self, kind: CompetitionKind) {
        self.form.kind = kind;
    }

    pub fn set_audiences(&mut self, audiences: Vec<String>) {
        self.form.audiences = audiences;
        self.errors.remove(&FormField::Audiences);
    }

    pub fn set_subjects(&mut self, subjects: Vec<String>) {
        self.form.subjects = subjects;
        self.errors.remove(&FormField::Subjects);
    }

    pub fn set_difficulty(&mut self, value: impl Into<String>) {
        self.form.difficulty = value.into();
        self.errors.remove(&FormField::Difficulty);
    }

    pub fn set_question_count(&mut self, count: i64) {
        self.form.question_count = count;
        self.errors.remove(&FormField::QuestionCount);
    }

    pub fn set_start_timing(&mut self, value: impl Into<String>) {
        self.form.start_timing = value.into();
        self.errors.remove(&FormField::StartTiming);
    }

    pub fn set_end_timing(&mut self, value: impl Into<String>) {
        self.form.end_timing = value.into();
        self.errors.remove(&FormField::EndTiming);
    }

    pub fn set_duration_minutes(&mut self, minutes: i64) {
        self.form.duration_minutes = minutes;
        self.errors.remove(&FormField::Duration);
    }

    /// 切换"立即开放"
    ///
    /// 打开时把开始时间强制为当前时间（过去时间检查随之豁免）。
    pub fn set_immediate(&mut self, immediate: bool, now: NaiveDateTime) {
        self.form.immediate = immediate;
        if immediate {
            self.form.start_timing = validator::format_timing(now);
        }
    }

    // ========== 步骤导航 ==========

    /// 前进一步
    ///
    /// 校验当前步骤；失败时停留并一次性记录该步全部字段错误。
    /// 在 DifficultyCount 校验通过后进入 Generating 并要求调用方
    /// 发起生成调用——这是整个向导唯一带外部副作用的转移。
    pub fn next(&mut self, now: NaiveDateTime) -> AppResult<NextOutcome> {
        match self.state {
            WizardState::BasicInfo => {
                let errors = validator::validate_basic_info(&self.form, now);
                if self.record_errors(errors) {
                    return Ok(NextOutcome::Rejected);
                }
                self.state = WizardState::AudienceSubjects;
                Ok(NextOutcome::Advanced)
            }
            WizardState::AudienceSubjects => {
                let errors = validator::validate_audience_subjects(&self.form);
                if self.record_errors(errors) {
                    return Ok(NextOutcome::Rejected);
                }
                self.state = WizardState::DifficultyCount;
                Ok(NextOutcome::Advanced)
            }
            WizardState::DifficultyCount => {
                let errors = validator::validate_difficulty_count(&self.form);
                if self.record_errors(errors) {
                    return Ok(NextOutcome::Rejected);
                }
                self.state = WizardState::Generating;
                Ok(NextOutcome::GenerationStarted)
            }
            _ => Err(AppError::invalid_transition(self.state.name(), "next")),
        }
    }

    /// 后退一步
    ///
    /// 不重新校验，不丢弃任何表单字段。从 Review 阶段后退会丢弃
    /// 生成结果（下次前进会重新生成）。生成/提交进行中不允许后退。
    pub fn back(&mut self) -> AppResult<()> {
        match self.state {
            WizardState::AudienceSubjects => {
                self.state = WizardState::BasicInfo;
                Ok(())
            }
            WizardState::DifficultyCount => {
                self.state = WizardState::AudienceSubjects;
                Ok(())
            }
            WizardState::GenerationFailed { .. } | WizardState::GenerationSucceeded => {
                self.generated = None;
                self.state = WizardState::DifficultyCount;
                Ok(())
            }
            _ => Err(AppError::invalid_transition(self.state.name(), "back")),
        }
    }

    /// 记录一步的校验结果；返回是否存在错误
    ///
    /// 整表替换：与界面行为一致，前进时只展示当前步骤的错误。
    fn record_errors(&mut self, errors: Vec<FieldError>) -> bool {
        self.errors = errors
            .into_iter()
            .map(|e| (e.field, e.message))
            .collect();
        !self.errors.is_empty()
    }

    // ========== 生成生命周期 ==========

    /// 生成调用结束，喂回结果
    ///
    /// 成功进入 GenerationSucceeded，失败进入 GenerationFailed；
    /// 两种情况下表单字段都原封不动。
    pub fn complete_generation(
        &mut self,
        result: Result<GeneratedCompetition, String>,
    ) -> AppResult<()> {
        if self.state != WizardState::Generating {
            return Err(AppError::invalid_transition(
                self.state.name(),
                "complete_generation",
            ));
        }
        match result {
            Ok(competition) => {
                self.generated = Some(competition);
                self.state = WizardState::GenerationSucceeded;
            }
            Err(message) => {
                self.generated = None;
                self.state = WizardState::GenerationFailed { message };
            }
        }
        Ok(())
    }

    /// 生成失败后重试（不回到前面的步骤）
    pub fn retry_generation(&mut self) -> AppResult<()> {
        match self.state {
            WizardState::GenerationFailed { .. } => {
                self.state = WizardState::Generating;
                Ok(())
            }
            _ => Err(AppError::invalid_transition(
                self.state.name(),
                "retry_generation",
            )),
        }
    }

    /// 丢弃生成结果，回到 step 0 重新来过（表单字段全部保留）
    pub fn regenerate(&mut self) -> AppResult<()> {
        if self.state != WizardState::GenerationSucceeded {
            return Err(AppError::invalid_transition(
                self.state.name(),
                "regenerate",
            ));
        }
        self.generated = None;
        self.state = WizardState::BasicInfo;
        Ok(())
    }

    // ========== 提交生命周期 ==========

    /// 发起提交
    pub fn begin_submit(&mut self) -> AppResult<&GeneratedCompetition> {
        if self.state != WizardState::GenerationSucceeded {
            return Err(AppError::invalid_transition(
                self.state.name(),
                "begin_submit",
            ));
        }
        if self.generated.is_some() {
            self.state = WizardState::Submitting;
        }
        self.generated.as_ref().ok_or(AppError::Business(
            BusinessError::MissingGeneratedCompetition,
        ))
    }

    /// 提交调用结束，喂回结果
    ///
    /// 成功后会话结束；失败回到 GenerationSucceeded，
    /// 生成结果保留，调用方可重试或继续编辑。
    pub fn complete_submit(&mut self, result: Result<(), String>) -> AppResult<()> {
        if self.state != WizardState::Submitting {
            return Err(AppError::invalid_transition(
                self.state.name(),
                "complete_submit",
            ));
        }
        match result {
            Ok(()) => {
                self.state = WizardState::Completed;
            }
            Err(_) => {
                self.state = WizardState::GenerationSucceeded;
            }
        }
        Ok(())
    }

    // ========== 生成结果编辑 ==========
    // 只在 GenerationSucceeded 状态下可用。
    // 所有修改都是显式的按下标替换；这一步不做任何内容校验，
    // "选项=答案"的正确标记由 Question::correct_option 渲染时重算。

    /// 切换某题的编辑标记
    pub fn toggle_editing(&mut self, index: usize) -> AppResult<()> {
        let question = self.question_at(index, "toggle_editing")?;
        question.editing = !question.editing;
        Ok(())
    }

    /// 退出编辑（只翻标记，不做校验）
    pub fn save_question(&mut self, index: usize) -> AppResult<()> {
        let question = self.question_at(index, "save_question")?;
        question.editing = false;
        Ok(())
    }

    /// 替换题干
    pub fn edit_question_text(&mut self, index: usize, value: impl Into<String>) -> AppResult<()> {
        let question = self.question_at(index, "edit_question_text")?;
        let mut updated = question.clone();
        updated.question = value.into();
        *question = updated;
        Ok(())
    }

    /// 替换答案
    pub fn edit_answer(&mut self, index: usize, value: impl Into<String>) -> AppResult<()> {
        let question = self.question_at(index, "edit_answer")?;
        let mut updated = question.clone();
        updated.answer = Some(value.into());
        *question = updated;
        Ok(())
    }

    /// 替换某个选项
    pub fn edit_option(
        &mut self,
        index: usize,
        option_index: usize,
        value: impl Into<String>,
    ) -> AppResult<()> {
        let question = self.question_at(index, "edit_option")?;
        let mut updated = question.clone();
        let options = updated.options.get_or_insert_with(Vec::new);
        if option_index >= options.len() {
            return Err(AppError::Business(BusinessError::OptionIndexOutOfRange {
                index: option_index,
                max_index: options.len().saturating_sub(1),
            }));
        }
        options[option_index] = value.into();
        *question = updated;
        Ok(())
    }

    /// 取出可编辑的题目引用（状态与下标双重检查）
    fn question_at(
        &mut self,
        index: usize,
        action: &'static str,
    ) -> AppResult<&mut crate::models::competition::Question> {
        if self.state != WizardState::GenerationSucceeded {
            return Err(AppError::invalid_transition(self.state.name(), action));
        }
        let questions = match self.generated.as_mut() {
            Some(c) => &mut c.questions,
            None => {
                return Err(AppError::Business(
                    BusinessError::MissingGeneratedCompetition,
                ))
            }
        };
        let max_index = questions.len().saturating_sub(1);
        questions
            .get_mut(index)
            .ok_or(AppError::Business(BusinessError::QuestionIndexOutOfRange {
                index,
                max_index,
            }))
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::competition::Question;

    fn now() -> NaiveDateTime {
        validator::parse_timing("2026-08-06T12:00").unwrap()
    }

    fn filled_session() -> WizardSession {
        let mut session = WizardSession::new();
        session.set_name("Algo Cup");
        session.set_description("Introductory algorithms quiz");
        session.set_audiences(vec!["College Freshmen".to_string()]);
        session.set_subjects(vec!["Algorithms".to_string()]);
        session.set_difficulty("medium");
        session.set_question_count(5);
        session.set_start_timing("2026-08-07T10:00");
        session.set_end_timing("2026-08-14T10:00");
        session.set_duration_minutes(60);
        session
    }

    fn sample_competition() -> GeneratedCompetition {
        GeneratedCompetition {
            competition_name: "Algo Cup".to_string(),
            competition_type: CompetitionKind::MCQ,
            duration: 60,
            competition_description: "Introductory algorithms quiz".to_string(),
            start_timing: "2026-08-07T10:00".to_string(),
            end_timing: "2026-08-14T10:00".to_string(),
            is_live: false,
            questions: vec![Question {
                question: "What is the complexity of binary search?".to_string(),
                answer: Some("O(log n)".to_string()),
                options: Some(vec![
                    "O(n)".to_string(),
                    "O(log n)".to_string(),
                    "O(n log n)".to_string(),
                    "O(1)".to_string(),
                ]),
                editing: false,
            }],
        }
    }

    /// 把会话推到 GenerationSucceeded
    fn generated_session() -> WizardSession {
        let mut session = filled_session();
        assert_eq!(session.next(now()).unwrap(), NextOutcome::Advanced);
        assert_eq!(session.next(now()).unwrap(), NextOutcome::Advanced);
        assert_eq!(session.next(now()).unwrap(), NextOutcome::GenerationStarted);
        session.complete_generation(Ok(sample_competition())).unwrap();
        session
    }

    #[test]
    fn test_happy_path_walk() {
        let mut session = generated_session();
        assert_eq!(session.state(), &WizardState::GenerationSucceeded);

        session.begin_submit().unwrap();
        assert_eq!(session.state(), &WizardState::Submitting);
        assert!(!session.can_cancel());

        session.complete_submit(Ok(())).unwrap();
        assert!(session.is_complete());
    }

    #[test]
    fn test_rejected_step_reports_all_errors_and_stays() {
        let mut session = WizardSession::new();
        session.set_start_timing("2026-08-07T10:00");
        session.set_end_timing("2026-08-14T10:00");
        // 名称与描述都为空：必须同时上报，并停在 step 0
        let outcome = session.next(now()).unwrap();
        assert_eq!(outcome, NextOutcome::Rejected);
        assert_eq!(session.state(), &WizardState::BasicInfo);
        assert!(session.error_for(FormField::Name).is_some());
        assert!(session.error_for(FormField::Description).is_some());
    }

    #[test]
    fn test_setter_clears_only_its_own_error() {
        let mut session = WizardSession::new();
        session.next(now()).unwrap();
        assert!(session.error_for(FormField::Name).is_some());
        assert!(session.error_for(FormField::Description).is_some());

        session.set_name("Algo Cup");
        assert!(session.error_for(FormField::Name).is_none());
        // 其他字段的错误原样保留
        assert!(session.error_for(FormField::Description).is_some());
    }

    #[test]
    fn test_back_then_next_keeps_all_fields() {
        let mut session = filled_session();
        session.next(now()).unwrap();
        assert_eq!(session.state(), &WizardState::AudienceSubjects);

        session.back().unwrap();
        assert_eq!(session.state(), &WizardState::BasicInfo);
        assert_eq!(session.form().name, "Algo Cup");
        assert_eq!(session.form().audiences, vec!["College Freshmen"]);

        assert_eq!(session.next(now()).unwrap(), NextOutcome::Advanced);
        assert_eq!(session.state(), &WizardState::AudienceSubjects);
    }

    #[test]
    fn test_back_not_allowed_from_first_step_or_while_generating() {
        let mut session = filled_session();
        assert!(session.back().is_err());

        session.next(now()).unwrap();
        session.next(now()).unwrap();
        session.next(now()).unwrap();
        assert_eq!(session.state(), &WizardState::Generating);
        assert!(session.back().is_err());
        assert!(!session.can_cancel());
    }

    #[test]
    fn test_generation_failure_keeps_form_and_allows_retry() {
        let mut session = filled_session();
        let form_before = session.form().clone();
        session.next(now()).unwrap();
        session.next(now()).unwrap();
        session.next(now()).unwrap();

        session
            .complete_generation(Err("LLM返回内容为空".to_string()))
            .unwrap();
        assert!(matches!(
            session.state(),
            WizardState::GenerationFailed { .. }
        ));
        assert!(session.generated().is_none());
        assert_eq!(session.form().name, form_before.name);
        assert_eq!(session.form().start_timing, form_before.start_timing);

        // 重试不回到前面的步骤
        session.retry_generation().unwrap();
        assert_eq!(session.state(), &WizardState::Generating);
    }

    #[test]
    fn test_regenerate_clears_result_and_returns_to_step0() {
        let mut session = generated_session();
        session.regenerate().unwrap();

        assert_eq!(session.state(), &WizardState::BasicInfo);
        assert!(session.generated().is_none());
        // 表单字段保持用户最后设置的值
        assert_eq!(session.form().name, "Algo Cup");
        assert_eq!(session.form().description, "Introductory algorithms quiz");
        assert_eq!(session.form().question_count, 5);
    }

    #[test]
    fn test_submit_failure_returns_to_succeeded_with_result_kept() {
        let mut session = generated_session();
        session.begin_submit().unwrap();
        session
            .complete_submit(Err("Failed to create AI competition".to_string()))
            .unwrap();

        assert_eq!(session.state(), &WizardState::GenerationSucceeded);
        assert!(session.generated().is_some());
        // 可以直接重试提交
        assert!(session.begin_submit().is_ok());
    }

    #[test]
    fn test_immediate_forces_start_to_now() {
        let mut session = filled_session();
        session.set_start_timing("2020-01-01T00:00");
        session.set_immediate(true, now());
        assert_eq!(session.form().start_timing, "2026-08-06T12:00");
        assert_eq!(session.next(now()).unwrap(), NextOutcome::Advanced);
    }

    #[test]
    fn test_edit_question_and_option() {
        let mut session = generated_session();

        session.toggle_editing(0).unwrap();
        assert!(session.generated().unwrap().questions[0].editing);

        session.edit_question_text(0, "改写后的题干").unwrap();
        session.edit_option(0, 1, "O(log2 n)").unwrap();
        // 选项被改得不再等于答案：正确标记消失，但不报错
        assert_eq!(session.generated().unwrap().questions[0].correct_option(), None);

        session.edit_answer(0, "O(log2 n)").unwrap();
        assert_eq!(
            session.generated().unwrap().questions[0].correct_option(),
            Some(1)
        );

        session.save_question(0).unwrap();
        assert!(!session.generated().unwrap().questions[0].editing);
    }

    #[test]
    fn test_edit_out_of_range_is_error_not_panic() {
        let mut session = generated_session();
        assert!(session.edit_question_text(7, "x").is_err());
        assert!(session.edit_option(0, 9, "x").is_err());
    }

    #[test]
    fn test_editing_outside_review_rejected() {
        let mut session = filled_session();
        assert!(session.toggle_editing(0).is_err());
    }

    #[test]
    fn test_next_invalid_after_generation_started() {
        let mut session = filled_session();
        session.next(now()).unwrap();
        session.next(now()).unwrap();
        session.next(now()).unwrap();
        // Generating 状态下不存在 next 转移
        assert!(session.next(now()).is_err());
    }
}
