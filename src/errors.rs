use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilelinkerError {
    NotFound(String),
    Gone(String),
    BackendUnavailable(String),
    UnsupportedSourceType(String),
    CodeGenerationExhausted(String),
    InvalidConfiguration(String),
    Validation(String),
    StoreOperation(String),
    Serialization(String),
    DateParse(String),
    FileOperation(String),
}

impl FilelinkerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            FilelinkerError::NotFound(_) => "E001",
            FilelinkerError::Gone(_) => "E002",
            FilelinkerError::BackendUnavailable(_) => "E003",
            FilelinkerError::UnsupportedSourceType(_) => "E004",
            FilelinkerError::CodeGenerationExhausted(_) => "E005",
            FilelinkerError::InvalidConfiguration(_) => "E006",
            FilelinkerError::Validation(_) => "E007",
            FilelinkerError::StoreOperation(_) => "E008",
            FilelinkerError::Serialization(_) => "E009",
            FilelinkerError::DateParse(_) => "E010",
            FilelinkerError::FileOperation(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            FilelinkerError::NotFound(_) => "Resource Not Found",
            FilelinkerError::Gone(_) => "Link Gone",
            FilelinkerError::BackendUnavailable(_) => "Backend Unavailable",
            FilelinkerError::UnsupportedSourceType(_) => "Unsupported Source Type",
            FilelinkerError::CodeGenerationExhausted(_) => "Code Generation Exhausted",
            FilelinkerError::InvalidConfiguration(_) => "Invalid Configuration",
            FilelinkerError::Validation(_) => "Validation Error",
            FilelinkerError::StoreOperation(_) => "Store Operation Error",
            FilelinkerError::Serialization(_) => "Serialization Error",
            FilelinkerError::DateParse(_) => "Date Parse Error",
            FilelinkerError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            FilelinkerError::NotFound(msg)
            | FilelinkerError::Gone(msg)
            | FilelinkerError::BackendUnavailable(msg)
            | FilelinkerError::UnsupportedSourceType(msg)
            | FilelinkerError::CodeGenerationExhausted(msg)
            | FilelinkerError::InvalidConfiguration(msg)
            | FilelinkerError::Validation(msg)
            | FilelinkerError::StoreOperation(msg)
            | FilelinkerError::Serialization(msg)
            | FilelinkerError::DateParse(msg)
            | FilelinkerError::FileOperation(msg) => msg,
        }
    }

    /// HTTP status used by the access surface
    ///
    /// Anything that is not a lookup miss, an exhausted link or bad input is
    /// reported as a 500 carrying the message.
    pub fn status_code(&self) -> u16 {
        match self {
            FilelinkerError::NotFound(_) => 404,
            FilelinkerError::Gone(_) => 410,
            FilelinkerError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for FilelinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FilelinkerError {}

// 便捷的构造函数
impl FilelinkerError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::NotFound(msg.into())
    }

    pub fn gone<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::Gone(msg.into())
    }

    pub fn backend_unavailable<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::BackendUnavailable(msg.into())
    }

    pub fn unsupported_source_type<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::UnsupportedSourceType(msg.into())
    }

    pub fn code_generation_exhausted<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::CodeGenerationExhausted(msg.into())
    }

    pub fn invalid_configuration<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::InvalidConfiguration(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::Validation(msg.into())
    }

    pub fn store_operation<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::StoreOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::DateParse(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        FilelinkerError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for FilelinkerError {
    fn from(err: std::io::Error) -> Self {
        FilelinkerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for FilelinkerError {
    fn from(err: serde_json::Error) -> Self {
        FilelinkerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for FilelinkerError {
    fn from(err: chrono::ParseError) -> Self {
        FilelinkerError::DateParse(err.to_string())
    }
}

impl From<redis::RedisError> for FilelinkerError {
    fn from(err: redis::RedisError) -> Self {
        FilelinkerError::StoreOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilelinkerError>;
