use serde::{Deserialize, Serialize};

use crate::models::form::CompetitionKind;

/// 生成的竞赛
///
/// 生成成功后由 LLM 内容和表单的排期字段叠加而成，
/// 整体序列化后提交给平台后端（字段名与后端接口保持 camelCase）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCompetition {
    pub competition_name: String,
    pub competition_type: CompetitionKind,
    /// 竞赛时长（分钟），始终取表单值
    pub duration: i64,
    pub competition_description: String,
    pub start_timing: String,
    pub end_timing: String,
    pub is_live: bool,
    pub questions: Vec<Question>,
}

/// 单个题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 题干
    pub question: String,
    /// 答案（MCQ/TEXT 有意义，CODE 类型忽略）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// 选项（仅 MCQ，4 个）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 编辑中标记（纯 UI 状态，不参与序列化）
    #[serde(skip)]
    pub editing: bool,
}

impl Question {
    /// 判断第 `index` 个选项是否是正确答案（渲染时按需重算）
    pub fn is_correct_option(&self, index: usize) -> bool {
        match (&self.options, &self.answer) {
            (Some(options), Some(answer)) => options.get(index).map(String::as_str) == Some(answer.as_str()),
            _ => false,
        }
    }

    /// 找到与答案相等的选项下标
    ///
    /// 编辑把答案或选项改得不再匹配时返回 None，不报错。
    pub fn correct_option(&self) -> Option<usize> {
        let answer = self.answer.as_deref()?;
        let options = self.options.as_deref()?;
        options.iter().position(|o| o == answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_question() -> Question {
        Question {
            question: "2 的 10 次方是多少？".to_string(),
            answer: Some("1024".to_string()),
            options: Some(vec![
                "512".to_string(),
                "1024".to_string(),
                "2048".to_string(),
                "4096".to_string(),
            ]),
            editing: false,
        }
    }

    #[test]
    fn test_correct_option() {
        let q = mcq_question();
        assert_eq!(q.correct_option(), Some(1));
        assert!(q.is_correct_option(1));
        assert!(!q.is_correct_option(0));
    }

    #[test]
    fn test_correct_option_cleared_after_edit() {
        let mut q = mcq_question();
        // 把答案改到不再匹配任何选项：标记消失，但不报错
        q.answer = Some("1000".to_string());
        assert_eq!(q.correct_option(), None);
        assert!(!q.is_correct_option(1));
    }

    #[test]
    fn test_correct_option_without_options() {
        let q = Question {
            question: "简述快速排序".to_string(),
            answer: Some("分治".to_string()),
            options: None,
            editing: false,
        };
        assert_eq!(q.correct_option(), None);
    }

    #[test]
    fn test_editing_flag_not_serialized() {
        let mut q = mcq_question();
        q.editing = true;
        let json = serde_json::to_string(&q).expect("序列化失败");
        assert!(!json.contains("editing"));
    }

    #[test]
    fn test_competition_wire_field_names() {
        let c = GeneratedCompetition {
            competition_name: "Algo Cup".to_string(),
            competition_type: CompetitionKind::MCQ,
            duration: 60,
            competition_description: "desc".to_string(),
            start_timing: "2026-09-01T10:00".to_string(),
            end_timing: "2026-09-08T10:00".to_string(),
            is_live: false,
            questions: vec![mcq_question()],
        };
        let json = serde_json::to_value(&c).expect("序列化失败");
        assert!(json.get("competitionName").is_some());
        assert!(json.get("competitionType").is_some());
        assert!(json.get("startTiming").is_some());
        assert!(json.get("isLive").is_some());
        assert_eq!(json["questions"][0]["question"], "2 的 10 次方是多少？");
    }
}
