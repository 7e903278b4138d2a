//! .resx 文档解析
//!
//! 只关心根元素下的 `<data>` 元素；schema、resheader、metadata 等结构忽略。

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use super::{AssemblyRef, ResourceEntry};
use crate::utils::{ResxError, Result};

/// 解码文件字节，返回文本和是否带 BOM
pub(crate) fn decode(bytes: &[u8], path: &Path) -> Result<(String, bool)> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, bom_len),
        None => (UTF_8, 0),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return Err(ResxError::parse(
            path,
            format!("invalid {} byte sequence", encoding.name()),
        ));
    }

    if encoding != UTF_8 {
        tracing::warn!("{:?} 使用 {} 编码，保存时将写为 UTF-8", path, encoding.name());
    }

    Ok((text.into_owned(), bom_len > 0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Value,
    Comment,
}

/// 正在解析的 `<data>` 元素
#[derive(Debug, Default)]
struct PendingEntry {
    name: String,
    type_name: Option<String>,
    mime_type: Option<String>,
    value: Option<String>,
    comment: Option<String>,
}

impl PendingEntry {
    fn store(&mut self, field: Field, text: String) {
        match field {
            Field::Value => self.value = Some(text),
            Field::Comment => self.comment = Some(text),
        }
    }

    fn finish(self) -> ResourceEntry {
        ResourceEntry {
            name: self.name,
            value: self.value.unwrap_or_default(),
            comment: self.comment,
            type_name: self.type_name,
            mime_type: self.mime_type,
        }
    }
}

/// 解析结果
#[derive(Debug, Default)]
pub(crate) struct ParsedDocument {
    pub entries: IndexMap<String, ResourceEntry>,
    pub assemblies: Vec<AssemblyRef>,
}

// 元素层级：root = 1，data = 2，value/comment = 3
const ROOT_DEPTH: usize = 1;
const DATA_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// 解析状态
struct DocumentBuilder<'a> {
    path: &'a Path,
    depth: usize,
    saw_root: bool,
    pending: Option<PendingEntry>,
    capture: Option<(Field, String)>,
    document: ParsedDocument,
}

impl<'a> DocumentBuilder<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            depth: 0,
            saw_root: false,
            pending: None,
            capture: None,
            document: ParsedDocument::default(),
        }
    }

    /// 处理开始标签（含自闭合标签）
    fn open(&mut self, e: &BytesStart<'_>, self_closing: bool) -> Result<()> {
        let name = e.name();
        match (self.depth, name.as_ref()) {
            (0, b"root") => self.saw_root = true,
            (0, other) => {
                return Err(ResxError::parse(
                    self.path,
                    format!(
                        "root element must be <root>, found <{}>",
                        String::from_utf8_lossy(other)
                    ),
                ));
            }
            (ROOT_DEPTH, b"data") => {
                let entry = read_data_attributes(e, self.path)?;
                if self_closing {
                    self.push_entry(entry.finish());
                } else {
                    self.pending = Some(entry);
                }
            }
            (ROOT_DEPTH, b"assembly") => {
                let assembly = read_assembly_attributes(e, self.path)?;
                self.document.assemblies.push(assembly);
            }
            (DATA_DEPTH, _) => {
                if let (Some(entry), Some(field)) = (self.pending.as_mut(), field_of(e)) {
                    if self_closing {
                        entry.store(field, String::new());
                    } else {
                        self.capture = Some((field, String::new()));
                    }
                }
            }
            _ => {}
        }

        if !self_closing {
            self.depth += 1;
        }
        Ok(())
    }

    fn close(&mut self, e: &BytesEnd<'_>) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == DATA_DEPTH {
            if let (Some(entry), Some((field, text))) = (self.pending.as_mut(), self.capture.take()) {
                entry.store(field, text);
            }
        } else if self.depth == ROOT_DEPTH && e.name().as_ref() == b"data" {
            if let Some(entry) = self.pending.take() {
                self.push_entry(entry.finish());
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.depth == FIELD_DEPTH {
            if let Some((_, buffer)) = self.capture.as_mut() {
                buffer.push_str(text);
            }
        }
    }

    fn push_entry(&mut self, entry: ResourceEntry) {
        let entries = &mut self.document.entries;
        if entries.contains_key(&entry.name) {
            tracing::warn!("{:?} 中键 {} 重复，保留后出现的值", self.path, entry.name);
        }
        entries.insert(entry.name.clone(), entry);
    }

    fn finish(self) -> Result<ParsedDocument> {
        if !self.saw_root {
            return Err(ResxError::parse(self.path, "missing <root> element"));
        }
        if self.depth != 0 {
            return Err(ResxError::parse(self.path, "unexpected end of document"));
        }
        Ok(self.document)
    }
}

/// 解析文档为有序条目表
pub(crate) fn parse_document(content: &str, path: &Path) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut builder = DocumentBuilder::new(path);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => builder.open(e, false)?,
            Ok(Event::Empty(ref e)) => builder.open(e, true)?,
            Ok(Event::Text(ref t)) => {
                if builder.depth == FIELD_DEPTH {
                    let text = t
                        .unescape()
                        .map_err(|e| ResxError::parse(path, e.to_string()))?;
                    builder.text(&text);
                }
            }
            Ok(Event::CData(t)) => {
                let raw = t.into_inner();
                let text = std::str::from_utf8(&raw).map_err(|e| ResxError::parse(path, e.to_string()))?;
                builder.text(text);
            }
            Ok(Event::End(ref e)) => builder.close(e),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ResxError::parse(
                    path,
                    format!("XML error at position {}: {}", reader.buffer_position(), e),
                ));
            }
            _ => {}
        }
    }

    let document = builder.finish()?;
    tracing::debug!("解析 {:?}: {} 个条目", path, document.entries.len());
    Ok(document)
}

fn field_of(e: &BytesStart<'_>) -> Option<Field> {
    match e.name().as_ref() {
        b"value" => Some(Field::Value),
        b"comment" => Some(Field::Comment),
        _ => None,
    }
}

/// 读取 `<data>` 的属性：`name` 必需，`type`、`mimetype` 可选
fn read_data_attributes(e: &BytesStart<'_>, path: &Path) -> Result<PendingEntry> {
    let mut entry = PendingEntry::default();
    let mut has_name = false;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ResxError::parse(path, e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ResxError::parse(path, e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => {
                entry.name = value.into_owned();
                has_name = true;
            }
            b"type" => entry.type_name = Some(value.into_owned()),
            b"mimetype" => entry.mime_type = Some(value.into_owned()),
            _ => {}
        }
    }

    if !has_name {
        return Err(ResxError::parse(path, "<data> element without a name attribute"));
    }
    Ok(entry)
}

fn read_assembly_attributes(e: &BytesStart<'_>, path: &Path) -> Result<AssemblyRef> {
    let mut assembly = AssemblyRef::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ResxError::parse(path, e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ResxError::parse(path, e.to_string()))?;
        match attr.key.as_ref() {
            b"alias" => assembly.alias = Some(value.into_owned()),
            b"name" => assembly.name = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(assembly)
}
