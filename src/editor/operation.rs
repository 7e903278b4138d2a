/// 宿主消息
///
/// 面板发来的编辑事件是一组封闭的带标签变体，JSON 形如
/// `{"type":"renameKey","oldKey":"A","newKey":"B"}`。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::RenameConflictPolicy;
use crate::family::VariantId;
use crate::merge::MergedView;
use crate::resx::ResourceTable;
use crate::utils::{validate_key, validate_new_key, ResxError, Result};

/// 编辑操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditOperation {
    /// 修改某个语言中某个键的值（不存在则新建）
    SetValue {
        variant: VariantId,
        key: String,
        value: String,
    },
    /// 在所有语言中添加空值键
    AddKey { key: String },
    /// 在所有语言中删除键
    DeleteKey { key: String },
    /// 在所有语言中重命名键
    #[serde(rename_all = "camelCase")]
    RenameKey { old_key: String, new_key: String },
    /// 把内存中的所有表写回磁盘
    RequestSave,
    /// 文件在外部被修改，重新加载
    Reload,
    Undo,
    Redo,
}

impl EditOperation {
    /// 是否会修改表内容
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            EditOperation::SetValue { .. }
                | EditOperation::AddKey { .. }
                | EditOperation::DeleteKey { .. }
                | EditOperation::RenameKey { .. }
        )
    }

    /// 在内存中的表上执行变更
    ///
    /// # 返回
    /// 需要写回的语言列表；为空表示无事发生（例如重命名为相同的键）
    ///
    /// # 错误
    /// - 键为空：`Validation`
    /// - 语言不存在：`UnknownVariant`
    /// - 重命名目标已存在且策略为拒绝：`Validation`
    pub fn apply_to(
        &self,
        tables: &mut IndexMap<VariantId, ResourceTable>,
        rename_conflict: RenameConflictPolicy,
    ) -> Result<Vec<VariantId>> {
        match self {
            EditOperation::SetValue { variant, key, value } => {
                let table = tables
                    .get_mut(variant)
                    .ok_or_else(|| ResxError::UnknownVariant(variant.to_string()))?;
                if table.contains(key) {
                    validate_key(key)?;
                } else {
                    validate_new_key(key)?;
                }
                table.set_value(key, value);
                Ok(vec![variant.clone()])
            }
            EditOperation::AddKey { key } => {
                validate_new_key(key)?;
                for (variant, table) in tables.iter_mut() {
                    if !table.add_key(key) {
                        tracing::debug!("{} 已包含键 {}，跳过", variant, key);
                    }
                }
                Ok(tables.keys().cloned().collect())
            }
            EditOperation::DeleteKey { key } => {
                validate_key(key)?;
                for table in tables.values_mut() {
                    table.remove(key);
                }
                Ok(tables.keys().cloned().collect())
            }
            EditOperation::RenameKey { old_key, new_key } => {
                validate_key(old_key)?;
                if old_key == new_key {
                    tracing::debug!("新旧键相同，忽略重命名: {}", old_key);
                    return Ok(Vec::new());
                }
                validate_new_key(new_key)?;

                if rename_conflict == RenameConflictPolicy::Reject {
                    if let Some(variant) = tables
                        .iter()
                        .find(|(_, table)| table.contains(new_key))
                        .map(|(variant, _)| variant)
                    {
                        return Err(ResxError::Validation(format!(
                            "key {:?} already exists in {}",
                            new_key, variant
                        )));
                    }
                }

                let mut touched = Vec::new();
                for (variant, table) in tables.iter_mut() {
                    if table.rename(old_key, new_key) {
                        touched.push(variant.clone());
                    }
                }
                Ok(touched)
            }
            EditOperation::RequestSave
            | EditOperation::Reload
            | EditOperation::Undo
            | EditOperation::Redo => Ok(Vec::new()),
        }
    }

    /// 操作涉及的键，撤销时只恢复这些键
    pub fn affected_keys(&self) -> Vec<&str> {
        match self {
            EditOperation::SetValue { key, .. }
            | EditOperation::AddKey { key }
            | EditOperation::DeleteKey { key } => vec![key.as_str()],
            EditOperation::RenameKey { old_key, new_key } => vec![old_key.as_str(), new_key.as_str()],
            EditOperation::RequestSave
            | EditOperation::Reload
            | EditOperation::Undo
            | EditOperation::Redo => Vec::new(),
        }
    }

    /// 简短描述（日志、历史记录用）
    pub fn describe(&self) -> String {
        match self {
            EditOperation::SetValue { variant, key, .. } => format!("set {}[{}]", key, variant),
            EditOperation::AddKey { key } => format!("add {}", key),
            EditOperation::DeleteKey { key } => format!("delete {}", key),
            EditOperation::RenameKey { old_key, new_key } => {
                format!("rename {} -> {}", old_key, new_key)
            }
            EditOperation::RequestSave => "save".to_string(),
            EditOperation::Reload => "reload".to_string(),
            EditOperation::Undo => "undo".to_string(),
            EditOperation::Redo => "redo".to_string(),
        }
    }
}

/// 返回给宿主的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostResponse {
    /// 刷新后的网格
    View(MergedView),
    /// 统一的错误通知
    Error { message: String },
}

impl HostResponse {
    pub fn from_result(result: Result<MergedView>) -> Self {
        match result {
            Ok(view) => HostResponse::View(view),
            Err(e) => HostResponse::Error {
                message: e.to_string(),
            },
        }
    }
}
