//! 计划处理上下文
//!
//! 封装"我正在处理第几个计划、叫什么名字"这一信息

use std::fmt::Display;

/// 计划处理上下文
///
/// 包含处理单个竞赛计划所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct WizardCtx {
    /// 计划名称（表单名称，缺失时退回文件名）
    pub plan_name: String,

    /// 计划索引（仅用于日志显示，从1开始）
    pub plan_index: usize,
}

impl WizardCtx {
    /// 创建新的计划上下文
    pub fn new(plan_name: String, plan_index: usize) -> Self {
        Self {
            plan_name,
            plan_index,
        }
    }
}

impl Display for WizardCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[计划 #{} 名称#{}]", self.plan_index, self.plan_name)
    }
}
