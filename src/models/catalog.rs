//! 平台内置目录：学科领域与目标人群
//!
//! 与后台管理端的下拉选项保持一致。计划文件中出现目录外的条目
//! 不算错误（后端接受任意字符串），但批处理时会打一条警告日志。

/// 学科领域
pub const SUBJECT_AREAS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Data Structures",
    "Algorithms",
    "Web Development",
    "Database Systems",
    "Machine Learning",
    "Artificial Intelligence",
    "Operating Systems",
    "Software Engineering",
    "Network Security",
    "Cloud Computing",
];

/// 目标人群
pub const TARGET_AUDIENCES: &[&str] = &[
    "High School Students",
    "College Freshmen",
    "College Sophomores",
    "Computer Science Majors",
    "Engineering Students",
    "Software Developers",
    "Data Science Enthusiasts",
    "Competitive Programmers",
    "Beginner Programmers",
];

/// 判断学科是否在内置目录中（大小写不敏感）
pub fn is_known_subject(s: &str) -> bool {
    let s = s.trim();
    SUBJECT_AREAS.iter().any(|known| known.eq_ignore_ascii_case(s))
}

/// 判断目标人群是否在内置目录中（大小写不敏感）
pub fn is_known_audience(s: &str) -> bool {
    let s = s.trim();
    TARGET_AUDIENCES.iter().any(|known| known.eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_subject() {
        assert!(is_known_subject("Algorithms"));
        assert!(is_known_subject("algorithms"));
        assert!(is_known_subject(" machine learning "));
        assert!(!is_known_subject("Astrology"));
    }

    #[test]
    fn test_known_audience() {
        assert!(is_known_audience("College Freshmen"));
        assert!(!is_known_audience("Toddlers"));
    }
}
