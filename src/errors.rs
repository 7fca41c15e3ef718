use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretLinksError {
    Validation(String),
    NotFound(String),
    Gone(String),
    KeyspaceExhausted(String),
    Crypto(String),
    Serialization(String),
    Transport(String),
    Config(String),
    FileOperation(String),
}

impl SecretLinksError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SecretLinksError::Validation(_) => "E001",
            SecretLinksError::NotFound(_) => "E002",
            SecretLinksError::Gone(_) => "E003",
            SecretLinksError::KeyspaceExhausted(_) => "E004",
            SecretLinksError::Crypto(_) => "E005",
            SecretLinksError::Serialization(_) => "E006",
            SecretLinksError::Transport(_) => "E007",
            SecretLinksError::Config(_) => "E008",
            SecretLinksError::FileOperation(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SecretLinksError::Validation(_) => "Validation Error",
            SecretLinksError::NotFound(_) => "Resource Not Found",
            SecretLinksError::Gone(_) => "Resource Gone",
            SecretLinksError::KeyspaceExhausted(_) => "Keyspace Exhausted",
            SecretLinksError::Crypto(_) => "Cryptographic Error",
            SecretLinksError::Serialization(_) => "Serialization Error",
            SecretLinksError::Transport(_) => "Transport Error",
            SecretLinksError::Config(_) => "Configuration Error",
            SecretLinksError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SecretLinksError::Validation(msg) => msg,
            SecretLinksError::NotFound(msg) => msg,
            SecretLinksError::Gone(msg) => msg,
            SecretLinksError::KeyspaceExhausted(msg) => msg,
            SecretLinksError::Crypto(msg) => msg,
            SecretLinksError::Serialization(msg) => msg,
            SecretLinksError::Transport(msg) => msg,
            SecretLinksError::Config(msg) => msg,
            SecretLinksError::FileOperation(msg) => msg,
        }
    }

    /// Errors a caller can fix by changing its request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SecretLinksError::Validation(_)
                | SecretLinksError::NotFound(_)
                | SecretLinksError::Gone(_)
        )
    }

    /// 格式化为彩色输出（用于终端）
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

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SecretLinksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SecretLinksError {}

// 便捷的构造函数
impl SecretLinksError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::NotFound(msg.into())
    }

    pub fn gone<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Gone(msg.into())
    }

    pub fn keyspace_exhausted<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::KeyspaceExhausted(msg.into())
    }

    pub fn crypto<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Crypto(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Serialization(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Transport(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SecretLinksError::FileOperation(msg.into())
    }
}

impl From<std::io::Error> for SecretLinksError {
    fn from(err: std::io::Error) -> Self {
        SecretLinksError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SecretLinksError {
    fn from(err: serde_json::Error) -> Self {
        SecretLinksError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SecretLinksError {
    fn from(err: config::ConfigError) -> Self {
        SecretLinksError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SecretLinksError>;
