//! 表单校验 - 业务能力层
//!
//! 只负责"分步校验"能力，不关心流程
//!
//! ## 规则
//! - 每步一个校验函数，一次性收集该步的全部违规项（不是遇到第一个就停）
//! - "当前时间"由调用方注入，校验本身不读系统时钟
//! - 错误消息与管理端界面保持一致（英文，内联展示）

use chrono::NaiveDateTime;

use crate::models::form::{CompetitionForm, Difficulty};

/// 表单字段标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Description,
    StartTiming,
    EndTiming,
    Duration,
    Audiences,
    Subjects,
    Difficulty,
    QuestionCount,
}

impl FormField {
    /// 获取字段的线上名称
    pub fn name(self) -> &'static str {
        match self {
            FormField::Name => "competitionName",
            FormField::Description => "competitionDescription",
            FormField::StartTiming => "startTiming",
            FormField::EndTiming => "endTiming",
            FormField::Duration => "duration",
            FormField::Audiences => "targetAudience",
            FormField::Subjects => "subjects",
            FormField::Difficulty => "difficultyLevel",
            FormField::QuestionCount => "questionCount",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单条字段错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 解析时间字段
///
/// 接受 `datetime-local` 风格（`2026-09-01T10:00`、带秒的变体）
/// 以及 RFC 3339（丢弃时区偏移后取本地钟面时间）。
pub fn parse_timing(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(t);
    }
    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_local());
    }
    None
}

/// 把时间格式化回 `datetime-local` 风格字符串
pub fn format_timing(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M").to_string()
}

/// 校验 step 0：基本信息
pub fn validate_basic_info(form: &CompetitionForm, now: NaiveDateTime) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push(FieldError::new(
            FormField::Name,
            "Competition name is required",
        ));
    }
    if form.description.trim().is_empty() {
        errors.push(FieldError::new(
            FormField::Description,
            "Description is required",
        ));
    }

    // 开始时间：必须可解析；非立即开放时不能早于当前时间
    let start = parse_timing(&form.start_timing);
    match start {
        None => {
            errors.push(FieldError::new(
                FormField::StartTiming,
                "Valid start time is required",
            ));
        }
        Some(start) if start < now && !form.immediate => {
            errors.push(FieldError::new(
                FormField::StartTiming,
                "Start time must be in the future",
            ));
        }
        Some(_) => {}
    }

    // 结束时间：必须可解析且晚于开始时间
    match parse_timing(&form.end_timing) {
        None => {
            errors.push(FieldError::new(
                FormField::EndTiming,
                "Valid end time is required",
            ));
        }
        Some(end) => {
            if let Some(start) = start {
                if end <= start {
                    errors.push(FieldError::new(
                        FormField::EndTiming,
                        "End time must be after start time",
                    ));
                }
            }
        }
    }

    if form.duration_minutes < 5 {
        errors.push(FieldError::new(
            FormField::Duration,
            "Duration must be at least 5 minutes",
        ));
    }

    errors
}

/// 校验 step 1：目标人群与学科
pub fn validate_audience_subjects(form: &CompetitionForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.audiences.is_empty() {
        errors.push(FieldError::new(
            FormField::Audiences,
            "Please select at least one target audience",
        ));
    }
    if form.subjects.is_empty() {
        errors.push(FieldError::new(
            FormField::Subjects,
            "Please select at least one subject area",
        ));
    }

    errors
}

/// 校验 step 2：难度与题目数量
pub fn validate_difficulty_count(form: &CompetitionForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.difficulty.trim().is_empty() {
        errors.push(FieldError::new(
            FormField::Difficulty,
            "Difficulty level is required",
        ));
    } else if Difficulty::find(&form.difficulty).is_none() {
        errors.push(FieldError::new(
            FormField::Difficulty,
            "Difficulty must be one of: easy, medium, hard",
        ));
    }

    if form.question_count < 1 || form.question_count > 100 {
        errors.push(FieldError::new(
            FormField::QuestionCount,
            "Question count must be between 1 and 100",
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        parse_timing("2026-08-06T12:00").unwrap()
    }

    fn valid_form() -> CompetitionForm {
        CompetitionForm {
            name: "Algo Cup".to_string(),
            description: "Introductory algorithms quiz".to_string(),
            audiences: vec!["College Freshmen".to_string()],
            subjects: vec!["Algorithms".to_string()],
            difficulty: "medium".to_string(),
            question_count: 5,
            start_timing: "2026-08-07T10:00".to_string(),
            end_timing: "2026-08-14T10:00".to_string(),
            duration_minutes: 60,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form_passes_all_steps() {
        let form = valid_form();
        assert!(validate_basic_info(&form, now()).is_empty());
        assert!(validate_audience_subjects(&form).is_empty());
        assert!(validate_difficulty_count(&form).is_empty());
    }

    #[test]
    fn test_basic_info_collects_all_errors_at_once() {
        let mut form = valid_form();
        form.name = "  ".to_string();
        form.description = String::new();
        let errors = validate_basic_info(&form, now());
        // 名称和描述的错误必须同时上报
        let fields: Vec<FormField> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&FormField::Name));
        assert!(fields.contains(&FormField::Description));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_past_start_rejected_unless_immediate() {
        let mut form = valid_form();
        form.start_timing = "2026-08-01T10:00".to_string();

        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().any(|e| e.field == FormField::StartTiming));

        form.immediate = true;
        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().all(|e| e.field != FormField::StartTiming));
    }

    #[test]
    fn test_end_before_start_rejected_even_if_immediate() {
        let mut form = valid_form();
        form.immediate = true;
        form.start_timing = "2026-08-10T10:00".to_string();
        form.end_timing = "2026-08-10T10:00".to_string();

        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().any(|e| e.field == FormField::EndTiming));
    }

    #[test]
    fn test_unparsable_timings_rejected() {
        let mut form = valid_form();
        form.start_timing = "下周三".to_string();
        form.end_timing = String::new();

        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().any(|e| e.field == FormField::StartTiming));
        assert!(errors.iter().any(|e| e.field == FormField::EndTiming));
    }

    #[test]
    fn test_duration_minimum() {
        let mut form = valid_form();
        form.duration_minutes = 4;
        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().any(|e| e.field == FormField::Duration));

        form.duration_minutes = 5;
        let errors = validate_basic_info(&form, now());
        assert!(errors.iter().all(|e| e.field != FormField::Duration));
    }

    #[test]
    fn test_audience_subjects_required() {
        let mut form = valid_form();
        form.audiences.clear();
        form.subjects.clear();
        let errors = validate_audience_subjects(&form);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_question_count_bounds() {
        let mut form = valid_form();
        for bad in [0, 101, -3] {
            form.question_count = bad;
            let errors = validate_difficulty_count(&form);
            assert!(
                errors.iter().any(|e| e.field == FormField::QuestionCount),
                "应拒绝题目数量 {}",
                bad
            );
        }
        for good in [1, 100] {
            form.question_count = good;
            let errors = validate_difficulty_count(&form);
            assert!(
                errors.iter().all(|e| e.field != FormField::QuestionCount),
                "应接受题目数量 {}",
                good
            );
        }
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let mut form = valid_form();
        form.difficulty = "extreme".to_string();
        let errors = validate_difficulty_count(&form);
        assert!(errors.iter().any(|e| e.field == FormField::Difficulty));
    }

    #[test]
    fn test_parse_timing_formats() {
        assert!(parse_timing("2026-09-01T10:00").is_some());
        assert!(parse_timing("2026-09-01T10:00:30").is_some());
        assert!(parse_timing("2026-09-01T10:00:00+08:00").is_some());
        assert!(parse_timing("not a time").is_none());
        assert!(parse_timing("").is_none());
    }
}
