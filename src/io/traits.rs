/// IO 抽象层 - trait 定义
///
/// 该模块定义了 .resx 文件读写的抽象接口，支持依赖注入和测试 mock。

use std::path::Path;

use crate::resx::ResourceTable;
use crate::utils::Result;

/// .resx 文件读取 trait
///
/// # 职责
/// - 读取并解析单个 .resx 文件
pub trait ResxReader {
    /// 读取 .resx 文件
    ///
    /// # 参数
    /// * `path` - 文件路径
    ///
    /// # 返回
    /// 返回解析后的 ResourceTable，内容格式错误时返回 `Parse` 错误
    fn read(&self, path: &Path) -> Result<ResourceTable>;
}

/// .resx 文件写入 trait
///
/// # 职责
/// - 将 ResourceTable 序列化并写入存储
pub trait ResxWriter {
    /// 写入单个文件
    fn write(&self, table: &ResourceTable, path: &Path) -> Result<()>;

    /// 写入一组文件
    ///
    /// 默认实现逐个写入，遇到第一个错误即停止。
    fn write_batch(&self, batch: &[(&Path, &ResourceTable)]) -> Result<()> {
        for (path, table) in batch {
            self.write(table, path)?;
        }
        Ok(())
    }
}
