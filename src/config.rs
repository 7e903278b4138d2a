/// 同步配置
///
/// 所有字段都有默认值，配置文件中缺失的字段按默认值处理。
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::Result;

/// 重命名冲突策略（新键已存在于某个语言文件中时）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameConflictPolicy {
    /// 拒绝重命名，返回校验错误
    #[default]
    Reject,
    /// 用旧键的条目覆盖新键的条目
    Overwrite,
}

/// 输出换行符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 覆盖写入前创建带时间戳的备份
    pub backup: bool,
    pub rename_conflict: RenameConflictPolicy,
    /// 强制使用的换行符；为空时每个文件沿用读取时检测到的换行符
    pub line_ending: Option<LineEnding>,
}

impl SyncConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
