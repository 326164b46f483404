/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的竞赛计划数量
    pub max_concurrent_plans: usize,
    /// 竞赛计划 TOML 文件存放目录
    pub plan_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败记录文件
    pub warn_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单个计划的生成尝试次数上限
    pub max_generation_attempts: usize,
    // --- 平台后端 API 配置 ---
    pub backend_api_base_url: String,
    pub backend_token: String,
    /// 出站 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_plans: 4,
            plan_folder: "plans".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model_name: "gemini-2.0-flash".to_string(),
            max_generation_attempts: 3,
            backend_api_base_url: "http://localhost:5000/api/admin/dashboard".to_string(),
            backend_token: String::new(),
            http_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_plans: std::env::var("MAX_CONCURRENT_PLANS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_plans),
            plan_folder: std::env::var("PLAN_FOLDER").unwrap_or(default.plan_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            max_generation_attempts: std::env::var("MAX_GENERATION_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_generation_attempts),
            backend_api_base_url: std::env::var("BACKEND_API_BASE_URL").unwrap_or(default.backend_api_base_url),
            backend_token: std::env::var("BACKEND_TOKEN").unwrap_or(default.backend_token),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
        }
    }

    /// 校验必需的配置项（启动时调用一次）
    pub fn require_llm_api_key(&self) -> crate::error::AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                crate::error::ConfigError::MissingRequired {
                    var_name: "LLM_API_KEY".to_string(),
                },
            ));
        }
        Ok(())
    }
}
