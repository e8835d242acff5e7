use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、地区白名单
/// - store: 键值存储后端
/// - backends: AList / GitHub 上游地址与凭据
/// - codes: 短码长度与重试上限
/// - links: 访问计数策略与配额上限
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub codes: CodeConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：FL，分隔符：__
    /// 示例：FL__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FL")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 允许访问的地区代码（cf-ipcountry），为空表示不限制
    #[serde(default)]
    pub allowed_regions: Vec<String>,
}

/// 键值存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// memory / file / redis
    #[serde(rename = "type")]
    #[serde(default = "default_store_type")]
    pub store_type: String,
    #[serde(default = "default_store_file")]
    pub file_path: String,
    #[serde(default)]
    pub redis: RedisConfig,
    /// 全量扫描时每页读取的键数量
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 上游后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub alist: AListConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    /// 上游请求超时（秒），0 表示交给传输层默认值
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

/// AList 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AListConfig {
    /// 为空时不注册 AList 适配器
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub token: String,
    /// 单次列目录请求的 per_page，0 表示全部
    #[serde(default)]
    pub page_size: u32,
}

/// GitHub 配置（仓库内容与 Release 资源共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    #[serde(default = "default_github_raw_url")]
    pub raw_url: String,
    #[serde(default = "default_github_web_url")]
    pub web_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 短码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_folder_code_length")]
    pub folder_length: usize,
    #[serde(default = "default_file_code_length")]
    pub file_length: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// 链接行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// 未设置访问上限的链接是否也计数
    #[serde(default = "default_count_unlimited_visits")]
    pub count_unlimited_visits: bool,
    /// 创建时 max_visits 的上限
    #[serde(default = "default_max_visits_limit")]
    pub max_visits_limit: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_store_type() -> String {
    "file".to_string()
}

fn default_store_file() -> String {
    "links.json".to_string()
}

fn default_scan_page_size() -> usize {
    1000
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "filelinker:".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_github_web_url() -> String {
    "https://github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("filelinker/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_folder_code_length() -> usize {
    5
}

fn default_file_code_length() -> usize {
    6
}

fn default_max_attempts() -> u32 {
    5
}

fn default_count_unlimited_visits() -> bool {
    true
}

fn default_max_visits_limit() -> u32 {
    9999
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            allowed_regions: Vec::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: default_store_type(),
            file_path: default_store_file(),
            redis: RedisConfig::default(),
            scan_page_size: default_scan_page_size(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            alist: AListConfig::default(),
            github: GitHubConfig::default(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            raw_url: default_github_raw_url(),
            web_url: default_github_web_url(),
            token: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            folder_length: default_folder_code_length(),
            file_length: default_file_code_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            count_unlimited_visits: default_count_unlimited_visits(),
            max_visits_limit: default_max_visits_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
