/// 资源会话
///
/// 显式持有当前文件族的全部表，所有编辑都通过 `apply` 进入。
/// 遵循“读取-解析-修改-写回”流程：每次变更前从磁盘重新加载，
/// 修改在副本上进行，写入成功后才替换内存中的表。

use std::path::Path;

use indexmap::IndexMap;

use super::delta::{ChangeRecord, ResourceDelta};
use super::operation::EditOperation;
use crate::config::SyncConfig;
use crate::family::{ResourceFamily, VariantId};
use crate::io::{DefaultResxReader, DefaultResxWriter, ResxReader, ResxWriter};
use crate::merge::MergedView;
use crate::resx::ResourceTable;
use crate::utils::{ResxError, Result};

/// 资源会话
///
/// # 核心特性
/// - **显式状态**: 文件族和各语言的表都由会话持有
/// - **同步**: 每个变更立即写回受影响的文件
/// - **可追踪**: 记录所有变更，支持撤销/重做
///
/// # 使用示例
///
/// ```rust,ignore
/// use resx_sync::{EditOperation, ResourceSession, SyncConfig};
///
/// let mut session = ResourceSession::open(Path::new("Messages.resx"), SyncConfig::default())?;
/// session.apply(EditOperation::AddKey { key: "Bye".into() })?;
/// session.apply(EditOperation::Undo)?;
/// ```
pub struct ResourceSession {
    family: ResourceFamily,
    /// 语言 -> 表，顺序与文件族一致
    tables: IndexMap<VariantId, ResourceTable>,
    config: SyncConfig,
    reader: Box<dyn ResxReader>,
    writer: Box<dyn ResxWriter>,
    history: ResourceDelta,
}

impl ResourceSession {
    /// 打开文件族（使用文件系统读写）
    ///
    /// # 参数
    /// * `path` - 基础文件或任一语言变体文件的路径
    /// * `config` - 同步配置
    pub fn open(path: &Path, config: SyncConfig) -> Result<Self> {
        let writer = DefaultResxWriter::from_config(&config);
        Self::open_with(path, config, Box::new(DefaultResxReader), Box::new(writer))
    }

    /// 使用自定义 Reader/Writer 打开文件族
    pub fn open_with(
        path: &Path,
        config: SyncConfig,
        reader: Box<dyn ResxReader>,
        writer: Box<dyn ResxWriter>,
    ) -> Result<Self> {
        let base_path = ResourceFamily::resolve_base(path);
        let (family, tables) = load_family(&base_path, reader.as_ref())?;
        tracing::info!(
            "已加载文件族 {}: {} 个语言",
            family.base_name(),
            family.len()
        );

        Ok(Self {
            family,
            tables,
            config,
            reader,
            writer,
            history: ResourceDelta::new(),
        })
    }

    /// 处理一条宿主消息，返回刷新后的网格
    pub fn apply(&mut self, operation: EditOperation) -> Result<MergedView> {
        tracing::info!("应用操作: {}", operation.describe());

        match operation {
            EditOperation::SetValue { .. }
            | EditOperation::AddKey { .. }
            | EditOperation::DeleteKey { .. }
            | EditOperation::RenameKey { .. } => self.mutate(operation)?,
            EditOperation::RequestSave => self.save()?,
            EditOperation::Reload => self.reload()?,
            EditOperation::Undo => self.undo()?,
            EditOperation::Redo => self.redo()?,
        }

        Ok(self.view())
    }

    /// 重新发现文件族并从磁盘加载所有表
    ///
    /// 任一成员解析失败都会使本次加载失败，内存状态保持不变。
    pub fn reload(&mut self) -> Result<()> {
        let (family, tables) = load_family(&self.family.base_path, self.reader.as_ref())?;
        self.family = family;
        self.tables = tables;
        Ok(())
    }

    /// 将内存中的所有表写回磁盘
    pub fn save(&self) -> Result<()> {
        let all: Vec<VariantId> = self.family.variant_ids().cloned().collect();
        self.persist(&self.tables, &all)
    }

    pub fn set_value(&mut self, variant: &VariantId, key: &str, value: &str) -> Result<()> {
        self.mutate(EditOperation::SetValue {
            variant: variant.clone(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn add_key(&mut self, key: &str) -> Result<()> {
        self.mutate(EditOperation::AddKey {
            key: key.to_string(),
        })
    }

    pub fn delete_key(&mut self, key: &str) -> Result<()> {
        self.mutate(EditOperation::DeleteKey {
            key: key.to_string(),
        })
    }

    pub fn rename_key(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        self.mutate(EditOperation::RenameKey {
            old_key: old_key.to_string(),
            new_key: new_key.to_string(),
        })
    }

    /// 撤销最后一次变更
    ///
    /// 先从磁盘重新加载，再只把操作涉及的键恢复为快照中的状态，
    /// 外部对其他键的修改保留下来。
    pub fn undo(&mut self) -> Result<()> {
        let record = self
            .history
            .peek_undo()
            .cloned()
            .ok_or(ResxError::NothingToUndo)?;
        self.reload()?;

        let keys = record.operation.affected_keys();
        let mut working = self.tables.clone();
        let mut touched = Vec::new();
        for (variant, snapshot) in &record.before {
            let Some(table) = working.get_mut(variant) else {
                tracing::warn!("语言 {} 已不在文件族中，跳过撤销", variant);
                continue;
            };
            table.restore_keys(snapshot, &keys);
            touched.push(variant.clone());
        }

        self.persist(&working, &touched)?;
        self.tables = working;
        self.history.undo();
        Ok(())
    }

    /// 重做最后一次撤销的变更
    pub fn redo(&mut self) -> Result<()> {
        let operation = self
            .history
            .peek_redo()
            .map(|record| record.operation.clone())
            .ok_or(ResxError::NothingToRedo)?;
        self.reload()?;

        let mut working = self.tables.clone();
        let touched = operation.apply_to(&mut working, self.config.rename_conflict)?;
        self.persist(&working, &touched)?;
        self.tables = working;
        self.history.redo();
        Ok(())
    }

    /// 当前网格
    pub fn view(&self) -> MergedView {
        MergedView::build(&self.family, &self.tables)
    }

    pub fn family(&self) -> &ResourceFamily {
        &self.family
    }

    pub fn tables(&self) -> &IndexMap<VariantId, ResourceTable> {
        &self.tables
    }

    pub fn table(&self, variant: &VariantId) -> Option<&ResourceTable> {
        self.tables.get(variant)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn history(&self) -> &ResourceDelta {
        &self.history
    }

    fn mutate(&mut self, operation: EditOperation) -> Result<()> {
        self.reload()?;

        let mut working = self.tables.clone();
        let touched = operation.apply_to(&mut working, self.config.rename_conflict)?;
        if touched.is_empty() {
            return Ok(());
        }

        let before: IndexMap<VariantId, ResourceTable> = touched
            .iter()
            .filter_map(|id| Some((id.clone(), self.tables.get(id)?.clone())))
            .collect();

        self.persist(&working, &touched)?;
        self.tables = working;
        self.history.add_change(ChangeRecord::new(operation, before));
        Ok(())
    }

    fn persist(&self, tables: &IndexMap<VariantId, ResourceTable>, variants: &[VariantId]) -> Result<()> {
        let batch: Vec<(&Path, &ResourceTable)> = variants
            .iter()
            .filter_map(|id| {
                let path = self.family.get(id)?.path.as_path();
                Some((path, tables.get(id)?))
            })
            .collect();

        tracing::debug!("写回 {} 个文件", batch.len());
        self.writer.write_batch(&batch)
    }
}

impl std::fmt::Debug for ResourceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSession")
            .field("family", &self.family)
            .field("tables", &self.tables.len())
            .field("config", &self.config)
            .field("history", &self.history.len())
            .finish()
    }
}

/// 发现文件族并加载所有成员
fn load_family(
    base_path: &Path,
    reader: &dyn ResxReader,
) -> Result<(ResourceFamily, IndexMap<VariantId, ResourceTable>)> {
    let family = ResourceFamily::discover(base_path)?;

    let mut tables = IndexMap::with_capacity(family.len());
    for variant in &family.variants {
        let table = reader.read(&variant.path)?;
        tables.insert(variant.id.clone(), table);
    }

    Ok((family, tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resx::ResourceEntry;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// 总是失败的写入器
    struct FailingWriter;

    impl ResxWriter for FailingWriter {
        fn write(&self, _table: &ResourceTable, path: &Path) -> Result<()> {
            Err(ResxError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn write_table(path: &Path, pairs: &[(&str, &str)]) {
        let mut table = ResourceTable::new();
        for (k, v) in pairs {
            table.insert(ResourceEntry::new(*k, *v));
        }
        fs::write(path, table.to_bytes(Default::default())).unwrap();
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("Messages.resx");
        write_table(&base, &[("Hello", "Hi")]);
        write_table(&temp_dir.path().join("Messages.de.resx"), &[("Hello", "Hallo")]);
        (temp_dir, base)
    }

    #[test]
    fn test_open_from_variant_path() {
        let (temp_dir, base) = setup();
        let session = ResourceSession::open(
            &temp_dir.path().join("Messages.de.resx"),
            SyncConfig::default(),
        )
        .unwrap();

        assert_eq!(session.family().base_path, base);
        assert_eq!(session.tables().len(), 2);
        assert_eq!(session.view().row("Hello").unwrap().value(&VariantId::new("de")), "Hallo");
    }

    #[test]
    fn test_failed_write_keeps_state() {
        let (_temp_dir, base) = setup();
        let mut session = ResourceSession::open_with(
            &base,
            SyncConfig::default(),
            Box::new(DefaultResxReader),
            Box::new(FailingWriter),
        )
        .unwrap();

        let result = session.add_key("Bye");
        assert!(matches!(result, Err(ResxError::Write { .. })));
        assert!(!session.table(&VariantId::base()).unwrap().contains("Bye"));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_mutation_picks_up_external_changes() {
        let (temp_dir, base) = setup();
        let mut session = ResourceSession::open(&base, SyncConfig::default()).unwrap();

        write_table(&temp_dir.path().join("Messages.fr.resx"), &[("Hello", "Salut")]);
        session.add_key("Bye").unwrap();

        assert_eq!(session.family().len(), 3);
        let fr = DefaultResxReader.read(&temp_dir.path().join("Messages.fr.resx")).unwrap();
        assert_eq!(fr.value("Bye"), Some(""));
        assert_eq!(fr.value("Hello"), Some("Salut"));
    }

    #[test]
    fn test_parse_failure_aborts_load() {
        let (temp_dir, base) = setup();
        fs::write(temp_dir.path().join("Messages.ja.resx"), "<root><data name=").unwrap();

        let result = ResourceSession::open(&base, SyncConfig::default());
        assert!(matches!(result, Err(ResxError::Parse { .. })));
    }

    #[test]
    fn test_undo_redo_nothing() {
        let (_temp_dir, base) = setup();
        let mut session = ResourceSession::open(&base, SyncConfig::default()).unwrap();

        assert!(matches!(session.apply(EditOperation::Undo), Err(ResxError::NothingToUndo)));
        assert!(matches!(session.apply(EditOperation::Redo), Err(ResxError::NothingToRedo)));
    }

    #[test]
    fn test_rename_to_same_key_is_ignored() {
        let (_temp_dir, base) = setup();
        let mut session = ResourceSession::open(&base, SyncConfig::default()).unwrap();

        session.rename_key("Hello", "Hello").unwrap();
        assert!(session.history().is_empty());
    }
}
