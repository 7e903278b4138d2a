/// IO 抽象层模块
///
/// 该模块提供了 .resx 文件读写的抽象接口，遵循依赖倒置原则。
/// 会话只依赖 trait，测试中可以注入会失败的写入器来验证中止语义。
///
/// # 架构设计
///
/// - **traits**: 定义 Reader/Writer trait 接口
/// - **resx_io**: 基于文件系统的默认实现（暂存后统一替换）
///
/// # 使用示例
///
/// ```rust,ignore
/// use resx_sync::io::{DefaultResxReader, ResxReader};
///
/// let reader = DefaultResxReader;
/// let table = reader.read(Path::new("Messages.resx"))?;
/// ```
pub mod traits;
pub mod resx_io;

// === 导出 trait 定义 ===
pub use traits::{ResxReader, ResxWriter};

// === 导出默认实现 ===
pub use resx_io::{DefaultResxReader, DefaultResxWriter};
