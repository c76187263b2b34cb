use crate::config::AppConfig;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::path::Path;

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，缺少的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content, |name| std::env::var(name).ok());
        let config: AppConfig = toml::from_str(&processed_content)?;
        Ok(config)
    }
}

/// 替換環境變數 (例如 ${PGPASSWORD})；未定義的變數保持原樣
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .to_string()
}
