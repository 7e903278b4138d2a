/// .resx 文件 IO 实现
///
/// 写入分两阶段：先把所有文件写到同目录的临时文件，全部成功后再依次替换原文件。
/// 暂存阶段失败时原文件保持不变；替换阶段失败仍可能留下部分更新的文件族。

use std::fs;
use std::path::{Path, PathBuf};

use super::traits::{ResxReader, ResxWriter};
use crate::config::{LineEnding, SyncConfig};
use crate::resx::ResourceTable;
use crate::utils::{create_backup, ResxError, Result};

/// 默认的 .resx 文件读取器
#[derive(Debug, Clone, Default)]
pub struct DefaultResxReader;

impl ResxReader for DefaultResxReader {
    fn read(&self, path: &Path) -> Result<ResourceTable> {
        let bytes = fs::read(path)?;
        ResourceTable::parse(&bytes, path)
    }
}

/// 默认的 .resx 文件写入器
#[derive(Debug, Clone, Default)]
pub struct DefaultResxWriter {
    /// 为空时沿用每个表自身的换行符
    pub line_ending: Option<LineEnding>,
    /// 覆盖前创建备份
    pub backup: bool,
}

impl DefaultResxWriter {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            line_ending: config.line_ending,
            backup: config.backup,
        }
    }

    fn stage(&self, table: &ResourceTable, path: &Path) -> Result<PathBuf> {
        let staging = staging_path(path);
        fs::write(&staging, table.to_file_bytes(self.line_ending)).map_err(|source| {
            let _ = fs::remove_file(&staging);
            ResxError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(staging)
    }

    fn commit(&self, staging: &Path, path: &Path) -> Result<()> {
        if self.backup && path.exists() {
            let backup_path = create_backup(path)?;
            tracing::info!("已创建备份: {:?}", backup_path);
        }

        fs::rename(staging, path).map_err(|source| ResxError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("已写入: {:?}", path);
        Ok(())
    }
}

impl ResxWriter for DefaultResxWriter {
    fn write(&self, table: &ResourceTable, path: &Path) -> Result<()> {
        self.write_batch(&[(path, table)])
    }

    fn write_batch(&self, batch: &[(&Path, &ResourceTable)]) -> Result<()> {
        let mut staged = Vec::with_capacity(batch.len());
        for (path, table) in batch {
            match self.stage(table, path) {
                Ok(staging) => staged.push((staging, *path)),
                Err(e) => {
                    for (staging, _) in &staged {
                        let _ = fs::remove_file(staging);
                    }
                    return Err(e);
                }
            }
        }

        let mut staged = staged.into_iter();
        while let Some((staging, path)) = staged.next() {
            if let Err(e) = self.commit(&staging, path) {
                let _ = fs::remove_file(&staging);
                for (rest, _) in staged.by_ref() {
                    let _ = fs::remove_file(rest);
                }
                tracing::error!("替换 {:?} 失败，文件族可能只完成了部分更新", path);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// 暂存文件路径：同目录下的隐藏临时文件
fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resource.resx".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}
