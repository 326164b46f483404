//! 失败记录服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::AppError;

/// 失败记录服务
///
/// 职责：
/// - 把生成/提交失败的竞赛计划追加到 warn.txt
/// - 只处理单个计划的记录
/// - 不关心流程顺序
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的失败记录服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入失败记录
    ///
    /// # 参数
    /// - `plan_name`: 计划名称
    /// - `plan_index`: 计划序号
    /// - `reason`: 失败原因
    pub async fn write(&self, plan_name: &str, plan_index: usize, reason: &str) -> Result<()> {
        debug!(
            "写入失败记录: 计划 {} | 序号 {} | 原因: {}",
            plan_name, plan_index, reason
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .map_err(|e| AppError::file_write_failed(self.warn_file_path.clone(), e))?;

        let warn_msg = format!(
            "[{}] 计划 {} | 序号 {} | 原因: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            plan_name,
            plan_index,
            reason
        );

        file.write_all(warn_msg.as_bytes())
            .map_err(|e| AppError::file_write_failed(self.warn_file_path.clone(), e))?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
