//! .resx 文档生成
//!
//! 文档头（XML 声明、schema、resheader）是固定常量，与表内容无关，逐字节输出。

use quick_xml::escape::{escape, partial_escape};

use super::{AssemblyRef, ResourceEntry, ResourceTable};
use crate::config::LineEnding;

/// 固定文档头，按行存放，输出时以配置的换行符连接
pub const RESX_HEADER_LINES: &[&str] = &[
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<root>"#,
    r#"  <xsd:schema id="root" xmlns="" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">"#,
    r#"    <xsd:import namespace="http://www.w3.org/XML/1998/namespace" />"#,
    r#"    <xsd:element name="root" msdata:IsDataSet="true">"#,
    r#"      <xsd:complexType>"#,
    r#"        <xsd:choice maxOccurs="unbounded">"#,
    r#"          <xsd:element name="metadata">"#,
    r#"            <xsd:complexType>"#,
    r#"              <xsd:sequence>"#,
    r#"                <xsd:element name="value" type="xsd:string" minOccurs="0" />"#,
    r#"              </xsd:sequence>"#,
    r#"              <xsd:attribute name="name" use="required" type="xsd:string" />"#,
    r#"              <xsd:attribute name="type" type="xsd:string" />"#,
    r#"              <xsd:attribute name="mimetype" type="xsd:string" />"#,
    r#"              <xsd:attribute ref="xml:space" />"#,
    r#"            </xsd:complexType>"#,
    r#"          </xsd:element>"#,
    r#"          <xsd:element name="assembly">"#,
    r#"            <xsd:complexType>"#,
    r#"              <xsd:attribute name="alias" type="xsd:string" />"#,
    r#"              <xsd:attribute name="name" type="xsd:string" />"#,
    r#"            </xsd:complexType>"#,
    r#"          </xsd:element>"#,
    r#"          <xsd:element name="data">"#,
    r#"            <xsd:complexType>"#,
    r#"              <xsd:sequence>"#,
    r#"                <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />"#,
    r#"                <xsd:element name="comment" type="xsd:string" minOccurs="0" msdata:Ordinal="2" />"#,
    r#"              </xsd:sequence>"#,
    r#"              <xsd:attribute name="name" type="xsd:string" use="required" msdata:Ordinal="1" />"#,
    r#"              <xsd:attribute name="type" type="xsd:string" msdata:Ordinal="3" />"#,
    r#"              <xsd:attribute name="mimetype" type="xsd:string" msdata:Ordinal="4" />"#,
    r#"              <xsd:attribute ref="xml:space" />"#,
    r#"            </xsd:complexType>"#,
    r#"          </xsd:element>"#,
    r#"          <xsd:element name="resheader">"#,
    r#"            <xsd:complexType>"#,
    r#"              <xsd:sequence>"#,
    r#"                <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />"#,
    r#"              </xsd:sequence>"#,
    r#"              <xsd:attribute name="name" type="xsd:string" use="required" />"#,
    r#"            </xsd:complexType>"#,
    r#"          </xsd:element>"#,
    r#"        </xsd:choice>"#,
    r#"      </xsd:complexType>"#,
    r#"    </xsd:element>"#,
    r#"  </xsd:schema>"#,
    r#"  <resheader name="resmimetype">"#,
    r#"    <value>text/microsoft-resx</value>"#,
    r#"  </resheader>"#,
    r#"  <resheader name="version">"#,
    r#"    <value>2.0</value>"#,
    r#"  </resheader>"#,
    r#"  <resheader name="reader">"#,
    r#"    <value>System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>"#,
    r#"  </resheader>"#,
    r#"  <resheader name="writer">"#,
    r#"    <value>System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>"#,
    r#"  </resheader>"#,
];

/// 生成完整文档
pub(crate) fn write_document(table: &ResourceTable, line_ending: LineEnding) -> String {
    let newline = line_ending.as_str();
    let mut output = RESX_HEADER_LINES.join(newline);
    output.push_str(newline);

    for assembly in &table.assemblies {
        write_assembly(&mut output, assembly, newline);
    }
    for entry in table.entries.values() {
        write_entry(&mut output, entry, newline);
    }

    output.push_str("</root>");
    output
}

fn write_entry(output: &mut String, entry: &ResourceEntry, newline: &str) {
    output.push_str(&format!(r#"  <data name="{}""#, escape(entry.name.as_str())));
    if let Some(type_name) = &entry.type_name {
        output.push_str(&format!(r#" type="{}""#, escape(type_name.as_str())));
    }
    if let Some(mime_type) = &entry.mime_type {
        output.push_str(&format!(r#" mimetype="{}""#, escape(mime_type.as_str())));
    }
    output.push_str(r#" xml:space="preserve">"#);
    output.push_str(newline);

    output.push_str(&format!("    <value>{}</value>", partial_escape(entry.value.as_str())));
    output.push_str(newline);

    if let Some(comment) = entry.comment.as_deref().filter(|c| !c.is_empty()) {
        output.push_str(&format!("    <comment>{}</comment>", partial_escape(comment)));
        output.push_str(newline);
    }

    output.push_str("  </data>");
    output.push_str(newline);
}

fn write_assembly(output: &mut String, assembly: &AssemblyRef, newline: &str) {
    output.push_str("  <assembly");
    if let Some(alias) = &assembly.alias {
        output.push_str(&format!(r#" alias="{}""#, escape(alias.as_str())));
    }
    if let Some(name) = &assembly.name {
        output.push_str(&format!(r#" name="{}""#, escape(name.as_str())));
    }
    output.push_str(" />");
    output.push_str(newline);
}
