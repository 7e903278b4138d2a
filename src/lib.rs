pub mod config;
pub mod editor;
pub mod family;
pub mod io;
pub mod merge;
pub mod resx;
pub mod utils;

// 重新导出主要结构
pub use config::{LineEnding, RenameConflictPolicy, SyncConfig};
pub use editor::{ChangeRecord, EditOperation, HostResponse, ResourceDelta, ResourceSession};
pub use family::{ResourceFamily, Variant, VariantId};
pub use merge::{MergedRow, MergedView};
pub use resx::{AssemblyRef, ResourceEntry, ResourceTable};
pub use utils::{validate_key, validate_new_key, ResxError};

// 常量定义
pub const SUPPORTED_EXTENSIONS: &[&str] = &["resx"];
