use serde::{Deserialize, Serialize};

/// 竞赛类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionKind {
    /// 选择题
    MCQ,
    /// 文本题
    TEXT,
    /// 编程题
    CODE,
}

impl CompetitionKind {
    /// 获取类型的线上名称
    pub fn name(self) -> &'static str {
        match self {
            CompetitionKind::MCQ => "MCQ",
            CompetitionKind::TEXT => "TEXT",
            CompetitionKind::CODE => "CODE",
        }
    }

    /// 尝试从字符串解析竞赛类型（大小写不敏感）
    pub fn find(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MCQ" => Some(CompetitionKind::MCQ),
            "TEXT" => Some(CompetitionKind::TEXT),
            "CODE" => Some(CompetitionKind::CODE),
            _ => None,
        }
    }
}

impl Default for CompetitionKind {
    fn default() -> Self {
        CompetitionKind::MCQ
    }
}

impl std::fmt::Display for CompetitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 难度等级枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 获取难度的线上名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 获取难度的展示名称
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// 尝试从字符串解析难度（大小写不敏感）
    pub fn find(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 竞赛表单
///
/// 一次向导会话的全部输入。从 TOML 计划文件反序列化，
/// 或由调用方通过 setter 逐字段填写。
///
/// 时间字段保存为 `datetime-local` 风格字符串（`2026-09-01T10:00`），
/// 解析和"不能早于当前时间"检查发生在分步校验中，而不是反序列化时。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionForm {
    /// 竞赛名称
    #[serde(default)]
    pub name: String,
    /// 竞赛描述（喂给 LLM 的主要素材）
    #[serde(default)]
    pub description: String,
    /// 竞赛类型
    #[serde(default)]
    pub kind: CompetitionKind,
    /// 目标人群
    #[serde(default)]
    pub audiences: Vec<String>,
    /// 学科领域
    #[serde(default)]
    pub subjects: Vec<String>,
    /// 难度（保存原始字符串，step 2 校验时解析为 Difficulty）
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// 题目数量（1-100）
    #[serde(default = "default_question_count")]
    pub question_count: i64,
    /// 开始时间
    #[serde(default)]
    pub start_timing: String,
    /// 结束时间
    #[serde(default)]
    pub end_timing: String,
    /// 竞赛时长（分钟，≥5）
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    /// 是否立即开放（开放后豁免"开始时间不能是过去"检查）
    #[serde(default)]
    pub immediate: bool,
    /// 来源文件路径（仅批处理模式使用）
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_difficulty() -> String {
    Difficulty::Medium.name().to_string()
}

fn default_question_count() -> i64 {
    5
}

fn default_duration() -> i64 {
    60
}

impl Default for CompetitionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            kind: CompetitionKind::default(),
            audiences: Vec::new(),
            subjects: Vec::new(),
            difficulty: default_difficulty(),
            question_count: default_question_count(),
            start_timing: String::new(),
            end_timing: String::new(),
            duration_minutes: default_duration(),
            immediate: false,
            file_path: None,
        }
    }
}

impl CompetitionForm {
    /// 获取用于日志显示的计划名称：表单名称优先，否则退回文件名
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        self.file_path
            .as_deref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "<未命名计划>".to_string())
    }
}
