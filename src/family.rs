/// 资源文件族
///
/// 一个基础文件（`Messages.resx`）加上同目录下按命名约定找到的各语言变体
/// （`Messages.zh-CN.resx`、`Messages.en-US.resx` ...）。
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::utils::{ResxError, Result};

/// 语言变体标识
///
/// 基础文件使用保留标识 `"default"`，其余为文件名中提取的语言标签，保留原始大小写。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub const DEFAULT: &'static str = "default";

    pub fn new(tag: impl Into<String>) -> Self {
        VariantId(tag.into())
    }

    /// 基础文件的标识
    pub fn base() -> Self {
        VariantId(Self::DEFAULT.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(tag: &str) -> Self {
        VariantId::new(tag)
    }
}

/// 文件族中的一个成员
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: VariantId,
    pub path: PathBuf,
}

/// 资源文件族（每次加载时重新发现，不单独持久化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFamily {
    /// 基础文件路径
    pub base_path: PathBuf,
    /// 成员列表：`default` 在前，其余按标签排序
    pub variants: Vec<Variant>,
}

impl ResourceFamily {
    /// 从基础文件出发发现整个文件族
    ///
    /// 只扫描基础文件所在目录，不递归子目录。
    /// 基础文件不可读或目录不可列出时返回 `FamilyDiscovery` 错误。
    pub fn discover(base_path: &Path) -> Result<Self> {
        fs::File::open(base_path).map_err(|source| ResxError::FamilyDiscovery {
            path: base_path.to_path_buf(),
            source,
        })?;

        let (stem, extension) = split_file_name(base_path).ok_or_else(|| {
            ResxError::FamilyDiscovery {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "base file name must have a stem and an extension",
                ),
            }
        })?;

        let directory = parent_directory(base_path);
        let pattern = variant_pattern(&stem, &extension).map_err(|e| ResxError::FamilyDiscovery {
            path: base_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        let read_dir = fs::read_dir(&directory).map_err(|source| ResxError::FamilyDiscovery {
            path: directory.clone(),
            source,
        })?;

        let mut variants = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|source| ResxError::FamilyDiscovery {
                path: directory.clone(),
                source,
            })?;

            if dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }

            let file_name = dir_entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                tracing::warn!("跳过非 UTF-8 文件名: {:?}", dir_entry.path());
                continue;
            };

            if let Some(tag) = extract_variant_tag(&pattern, file_name) {
                tracing::debug!("发现语言变体 {} -> {}", tag, file_name);
                variants.push(Variant {
                    id: VariantId::new(tag),
                    path: directory.join(file_name),
                });
            }
        }

        variants.sort_by(|a, b| {
            a.id.as_str()
                .to_lowercase()
                .cmp(&b.id.as_str().to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        variants.insert(
            0,
            Variant {
                id: VariantId::base(),
                path: base_path.to_path_buf(),
            },
        );

        tracing::debug!("文件族 {:?} 共 {} 个成员", base_path, variants.len());

        Ok(ResourceFamily {
            base_path: base_path.to_path_buf(),
            variants,
        })
    }

    /// 若打开的是某个语言变体文件且同目录存在对应的基础文件，返回基础文件路径；
    /// 否则原样返回
    pub fn resolve_base(path: &Path) -> PathBuf {
        let Some((stem, extension)) = split_file_name(path) else {
            return path.to_path_buf();
        };
        let Some((base_stem, _)) = stem.rsplit_once('.') else {
            return path.to_path_buf();
        };
        if base_stem.is_empty() {
            return path.to_path_buf();
        }

        let Ok(pattern) = variant_pattern(base_stem, &extension) else {
            return path.to_path_buf();
        };
        let file_name = format!("{}.{}", stem, extension);
        if extract_variant_tag(&pattern, &file_name).is_none() {
            return path.to_path_buf();
        }

        let candidate = parent_directory(path).join(format!("{}.{}", base_stem, extension));
        if candidate.is_file() {
            tracing::debug!("{:?} 是语言变体，使用基础文件 {:?}", path, candidate);
            candidate
        } else {
            path.to_path_buf()
        }
    }

    /// 基础文件名（不含扩展名）
    pub fn base_name(&self) -> &str {
        self.base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.get(id).is_some()
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = &VariantId> {
        self.variants.iter().map(|v| &v.id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// 构建 `<base>.<tag>.<ext>` 匹配模式（大小写不敏感）
///
/// 标签：2-8 位字母，后跟零个或多个 `-` 加 2-8 位字母数字
pub(crate) fn variant_pattern(stem: &str, extension: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(
        r"^{}\.([a-z]{{2,8}}(?:-[a-z0-9]{{2,8}})*)\.{}$",
        regex::escape(stem),
        regex::escape(extension)
    ))
    .case_insensitive(true)
    .build()
}

/// 从文件名中提取语言标签，保留原始大小写
pub(crate) fn extract_variant_tag(pattern: &Regex, file_name: &str) -> Option<String> {
    pattern
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn split_file_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some((stem.to_string(), extension.to_string()))
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
