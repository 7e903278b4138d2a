/// 合并视图
///
/// 把文件族中各语言的键值表投影为“每个键一行、每个语言一列”的网格。
/// 视图只用于展示，不持久化，任何表变化后都重新生成。
use std::fmt::Write as _;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::family::{ResourceFamily, VariantId};
use crate::resx::ResourceTable;

/// 合并后的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    pub key: String,
    /// 语言 -> 值，缺失的条目为空字符串
    pub values: IndexMap<VariantId, String>,
}

impl MergedRow {
    pub fn value(&self, variant: &VariantId) -> &str {
        self.values.get(variant).map(|v| v.as_str()).unwrap_or_default()
    }
}

/// 完整网格：列（语言）加上行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedView {
    pub variants: Vec<VariantId>,
    pub rows: Vec<MergedRow>,
}

impl MergedView {
    /// 按文件族顺序合并各表
    ///
    /// 行顺序为键首次出现的顺序（依次扫描各语言的表）。
    pub fn build(family: &ResourceFamily, tables: &IndexMap<VariantId, ResourceTable>) -> Self {
        let variants: Vec<VariantId> = family.variant_ids().cloned().collect();

        let mut keys: IndexSet<&str> = IndexSet::new();
        for variant in &variants {
            if let Some(table) = tables.get(variant) {
                for key in table.keys() {
                    keys.insert(key);
                }
            }
        }

        let rows = keys
            .iter()
            .map(|key| MergedRow {
                key: key.to_string(),
                values: variants
                    .iter()
                    .map(|variant| {
                        let value = tables
                            .get(variant)
                            .and_then(|t| t.value(key))
                            .unwrap_or_default();
                        (variant.clone(), value.to_string())
                    })
                    .collect(),
            })
            .collect();

        MergedView { variants, rows }
    }

    pub fn row(&self, key: &str) -> Option<&MergedRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 渲染为纯文本表格（命令行输出用）
    ///
    /// 单元格超过 `max_width` 个字符时截断并加 `...`
    pub fn render_text(&self, max_width: usize) -> String {
        let mut header = vec!["Key".to_string()];
        header.extend(self.variants.iter().map(|v| v.to_string()));

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![truncate(&row.key, max_width)];
                cells.extend(self.variants.iter().map(|v| truncate(row.value(v), max_width)));
                cells
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for cells in &body {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut output = String::new();
        push_line(&mut output, &header, &widths);
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut output, &separator, &widths);
        for cells in &body {
            push_line(&mut output, cells, &widths);
        }
        output
    }
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(padding))
        })
        .collect();
    let _ = writeln!(output, "{}", line.join(" | ").trim_end());
}

fn truncate(text: &str, max_width: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    if flat.chars().count() > max_width {
        format!("{}...", flat.chars().take(max_width).collect::<String>())
    } else {
        flat
    }
}
