/// 变更追踪模块
///
/// 记录会话中每次生效的变更，支持撤销/重做。
/// 每条记录保存操作本身以及被修改的表在修改前的快照：
/// 撤销时只把操作涉及的键恢复为快照中的状态，重做时重新执行操作。

use chrono::{DateTime, Local};
use indexmap::IndexMap;

use super::operation::EditOperation;
use crate::family::VariantId;
use crate::resx::ResourceTable;

/// 变更追踪器
///
/// # 实现细节
/// - 使用两个栈实现撤销/重做：undo_stack 和 redo_stack
/// - 所有变更按时间顺序存储在 changes 向量中
/// - 栈中存储的是索引而非实际数据，避免数据拷贝
#[derive(Debug, Clone, Default)]
pub struct ResourceDelta {
    /// 所有变更的完整记录
    changes: Vec<ChangeRecord>,
    /// 撤销栈（存储 changes 中的索引）
    undo_stack: Vec<usize>,
    /// 重做栈（存储 changes 中的索引）
    redo_stack: Vec<usize>,
}

/// 单次变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub operation: EditOperation,
    /// 被修改的表在修改前的快照
    pub before: IndexMap<VariantId, ResourceTable>,
    pub applied_at: DateTime<Local>,
}

impl ChangeRecord {
    pub fn new(operation: EditOperation, before: IndexMap<VariantId, ResourceTable>) -> Self {
        Self {
            operation,
            before,
            applied_at: Local::now(),
        }
    }
}

impl ResourceDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个变更
    ///
    /// 新操作会使重做栈失效
    pub fn add_change(&mut self, change: ChangeRecord) {
        let index = self.changes.len();
        self.changes.push(change);
        self.undo_stack.push(index);
        self.redo_stack.clear();
    }

    /// 查看下一个可撤销的变更
    pub fn peek_undo(&self) -> Option<&ChangeRecord> {
        self.undo_stack.last().map(|&idx| &self.changes[idx])
    }

    /// 查看下一个可重做的变更
    pub fn peek_redo(&self) -> Option<&ChangeRecord> {
        self.redo_stack.last().map(|&idx| &self.changes[idx])
    }

    /// 撤销最后一次操作（只移动栈，表的恢复由调用方完成）
    pub fn undo(&mut self) -> Option<&ChangeRecord> {
        let index = self.undo_stack.pop()?;
        self.redo_stack.push(index);
        Some(&self.changes[index])
    }

    /// 重做最后一次撤销的操作
    pub fn redo(&mut self) -> Option<&ChangeRecord> {
        let index = self.redo_stack.pop()?;
        self.undo_stack.push(index);
        Some(&self.changes[index])
    }

    /// 当前有效变更数量（撤销栈大小）
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// 历史摘要（详细日志用）
    pub fn summary(&self) -> String {
        format!(
            "变更总数: {}, 有效变更: {}, 可撤销: {}, 可重做: {}",
            self.changes.len(),
            self.undo_stack.len(),
            self.can_undo(),
            self.can_redo()
        )
    }
}

impl std::fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({} 个文件)",
            self.applied_at.format("%H:%M:%S"),
            self.operation.describe(),
            self.before.len()
        )
    }
}
