use thiserror::Error;
use std::path::{Path, PathBuf};

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum ResxError {
    #[error("Cannot read resource family at {path:?}: {source}")]
    FamilyDiscovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid key: {0}")]
    Validation(String),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ResxError {
    /// 构造解析错误
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        ResxError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResxError>;

/// 校验引用已有条目的键：不能为空或仅包含空白
///
/// 文件中读入的键可能带有制表符等控制字符，仍然允许删除、重命名和修改。
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ResxError::Validation("key must not be empty".to_string()));
    }
    Ok(())
}

/// 校验将要新建的键：在 `validate_key` 之外还不能包含控制字符
pub fn validate_new_key(key: &str) -> Result<()> {
    validate_key(key)?;
    if key.chars().any(|c| c.is_control()) {
        return Err(ResxError::Validation(format!(
            "key {:?} contains control characters",
            key
        )));
    }
    Ok(())
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<PathBuf> {
    if !file_path.exists() {
        return Err(ResxError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("resx");
    let backup_path = file_path.with_extension(format!("{}.{}.bak", extension, timestamp));

    std::fs::copy(file_path, &backup_path)
        .map_err(ResxError::IoError)?;

    Ok(backup_path)
}
