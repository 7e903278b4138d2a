mod parser;
mod writer;

#[cfg(test)]
mod tests;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::LineEnding;
use crate::utils::Result;

pub use writer::RESX_HEADER_LINES;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 资源条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// 资源键（与所属表中的键一致）
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 非字符串资源的 `type` 属性（如 `System.Resources.ResXFileRef`），原样保留
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// 二进制资源的 `mimetype` 属性（如 base64 序列化的位图）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: None,
            type_name: None,
            mime_type: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// `<assembly>` 声明：为 `type` 属性中的类型名提供程序集别名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyRef {
    pub alias: Option<String>,
    pub name: Option<String>,
}

/// 单个 .resx 文件的键值表
///
/// 键在表内唯一，迭代顺序即文件中的出现顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTable {
    /// 条目映射（键 -> ResourceEntry）
    pub entries: IndexMap<String, ResourceEntry>,
    /// 源文件中的 `<assembly>` 声明，写回时紧跟文件头输出
    pub assemblies: Vec<AssemblyRef>,
    /// 源文件是否带 BOM
    pub has_bom: bool,
    /// 源文件使用的换行符（含 `\r\n` 即视为 CRLF）
    pub line_ending: LineEnding,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从文件字节解析
    ///
    /// `path` 仅用于错误信息。
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        let (content, has_bom) = parser::decode(bytes, path)?;
        let document = parser::parse_document(&content, path)?;
        let line_ending = if content.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        };

        Ok(Self {
            entries: document.entries,
            assemblies: document.assemblies,
            has_bom,
            line_ending,
        })
    }

    /// 序列化为 .resx 文本
    pub fn to_resx_string(&self, line_ending: LineEnding) -> String {
        writer::write_document(self, line_ending)
    }

    /// 按源文件的换行符序列化为文件字节；`configured` 不为空时以配置为准
    pub fn to_file_bytes(&self, configured: Option<LineEnding>) -> Vec<u8> {
        self.to_bytes(configured.unwrap_or(self.line_ending))
    }

    /// 序列化为文件字节（按源文件补回 BOM）
    pub fn to_bytes(&self, line_ending: LineEnding) -> Vec<u8> {
        let document = self.to_resx_string(line_ending);
        let mut bytes = Vec::with_capacity(document.len() + UTF8_BOM.len());
        if self.has_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(document.as_bytes());
        bytes
    }

    pub fn get(&self, key: &str) -> Option<&ResourceEntry> {
        self.entries.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 插入或替换条目，已存在的键保持原位置
    pub fn insert(&mut self, entry: ResourceEntry) -> Option<ResourceEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    /// 设置值：已存在则原地修改，不存在则新建条目
    ///
    /// 返回旧值
    pub fn set_value(&mut self, key: &str, value: &str) -> Option<String> {
        match self.entries.get_mut(key) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value.to_string())),
            None => {
                self.entries.insert(key.to_string(), ResourceEntry::new(key, value));
                None
            }
        }
    }

    /// 添加空值键；已存在时不做任何修改并返回 false
    pub fn add_key(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), ResourceEntry::new(key, ""));
        true
    }

    /// 把 `keys` 恢复为 `snapshot` 中的状态，其余条目不动
    ///
    /// 快照中存在的键按快照中的位置插回（超出当前长度时追加到末尾），
    /// 快照中不存在的键被删除。
    pub fn restore_keys(&mut self, snapshot: &ResourceTable, keys: &[&str]) {
        for key in keys {
            self.entries.shift_remove(*key);
        }

        let mut restored: Vec<(usize, &ResourceEntry)> = keys
            .iter()
            .filter_map(|key| {
                let (index, _, entry) = snapshot.entries.get_full(*key)?;
                Some((index, entry))
            })
            .collect();
        restored.sort_by_key(|(index, _)| *index);
        restored.dedup_by_key(|(index, _)| *index);

        for (index, entry) in restored {
            let index = index.min(self.entries.len());
            self.entries.shift_insert(index, entry.name.clone(), entry.clone());
        }
    }

    /// 删除条目，其余条目保持相对顺序
    pub fn remove(&mut self, key: &str) -> Option<ResourceEntry> {
        self.entries.shift_remove(key)
    }

    /// 重命名键，值和注释随之迁移，条目保持旧键的位置
    ///
    /// 新键已存在时被覆盖。旧键不存在时返回 false。
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> bool {
        let Some(mut index) = self.entries.get_index_of(old_key) else {
            return false;
        };
        let Some((_, mut entry)) = self.entries.shift_remove_index(index) else {
            return false;
        };
        entry.name = new_key.to_string();

        if let Some(existing) = self.entries.get_index_of(new_key) {
            self.entries.shift_remove_index(existing);
            if existing < index {
                index -= 1;
            }
        }

        let index = index.min(self.entries.len());
        self.entries.shift_insert(index, new_key.to_string(), entry);
        true
    }
}
