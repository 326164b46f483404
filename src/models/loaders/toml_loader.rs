use crate::models::form::CompetitionForm;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 CompetitionForm 对象
pub async fn load_plan(toml_file_path: &Path) -> Result<CompetitionForm> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut form: CompetitionForm = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    form.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(form)
}

/// 从文件夹中加载所有 TOML 文件并转换为 CompetitionForm 对象列表
///
/// 单个文件解析失败只记录警告并跳过，不中断整个批次。
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<CompetitionForm>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut plans = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_plan(&path).await {
                Ok(form) => {
                    tracing::info!("成功加载计划: {}", form.display_name());
                    plans.push(form);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(plans)
}
