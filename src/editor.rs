/// 编辑器层模块
///
/// 该模块提供有状态的编辑接口，支持变更追踪、撤销/重做。
/// 每次变更都走“读取-解析-修改-写回”流程，会话对象显式持有文件族的全部表，
/// 宿主（IDE 面板、命令行）只通过 `EditOperation` 与之交互。
///
/// # 架构设计
///
/// - **operation**: 宿主与核心之间的消息类型
/// - **session**: 资源会话，管理文件族的表并负责持久化
/// - **delta**: 变更追踪系统，支持撤销/重做
/// - **host**: JSON 行协议，驱动会话
///
/// # 使用示例
///
/// ```rust,ignore
/// use resx_sync::{EditOperation, ResourceSession, SyncConfig};
///
/// let mut session = ResourceSession::open(Path::new("Messages.resx"), SyncConfig::default())?;
/// let view = session.apply(EditOperation::AddKey { key: "Bye".into() })?;
/// println!("共 {} 个键", view.len());
/// ```
pub mod delta;
pub mod host;
pub mod operation;
pub mod session;

// === 导出公共接口 ===
pub use delta::{ChangeRecord, ResourceDelta};
pub use host::serve;
pub use operation::{EditOperation, HostResponse};
pub use session::ResourceSession;
