use super::*;
use std::path::PathBuf;

fn test_path() -> PathBuf {
    PathBuf::from("Messages.resx")
}

/// 创建测试用的ResourceTable
fn create_test_table() -> ResourceTable {
    let mut table = ResourceTable::new();
    table.insert(ResourceEntry::new("Hello", "Hi"));
    table.insert(ResourceEntry::new("Bye", "See you").with_comment("farewell"));
    table.insert(ResourceEntry::new("Empty", ""));
    table
}

fn wrap(body: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="utf-8"?><root>{}</root>"#, body)
}

#[test]
fn test_parse_basic_entries() {
    let xml = wrap(
        r#"
        <resheader name="resmimetype"><value>text/microsoft-resx</value></resheader>
        <data name="Hello" xml:space="preserve"><value>Hi</value></data>
        <data name="Bye" xml:space="preserve">
            <value>See you</value>
            <comment>farewell</comment>
        </data>"#,
    );

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.value("Hello"), Some("Hi"));
    assert_eq!(table.get("Hello").unwrap().comment, None);
    assert_eq!(table.get("Bye").unwrap().comment.as_deref(), Some("farewell"));
    assert!(!table.contains("resmimetype"));
    assert!(!table.has_bom);
}

#[test]
fn test_parse_missing_value_defaults_to_empty() {
    let xml = wrap(r#"<data name="A"><comment>note</comment></data><data name="B"/><data name="C"><value/></data>"#);

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.value("A"), Some(""));
    assert_eq!(table.get("A").unwrap().comment.as_deref(), Some("note"));
    assert_eq!(table.value("B"), Some(""));
    assert_eq!(table.value("C"), Some(""));
}

#[test]
fn test_parse_preserves_whitespace_and_entities() {
    let xml = wrap(
        r#"<data name="Spaced"><value>  two  spaces  </value></data><data name="Escaped"><value>a &lt;b&gt; &amp; "c"</value></data><data name="Raw"><value><![CDATA[<raw> & text]]></value></data>"#,
    );

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.value("Spaced"), Some("  two  spaces  "));
    assert_eq!(table.value("Escaped"), Some(r#"a <b> & "c""#));
    assert_eq!(table.value("Raw"), Some("<raw> & text"));
}

#[test]
fn test_parse_and_write_type_attribute() {
    let xml = wrap(
        r#"<data name="Icon" type="System.Resources.ResXFileRef, System.Windows.Forms"><value>icon.ico;System.Drawing.Icon</value></data>"#,
    );

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    let entry = table.get("Icon").unwrap();
    assert_eq!(
        entry.type_name.as_deref(),
        Some("System.Resources.ResXFileRef, System.Windows.Forms")
    );

    let output = table.to_resx_string(LineEnding::Lf);
    assert!(output.contains(
        r#"<data name="Icon" type="System.Resources.ResXFileRef, System.Windows.Forms" xml:space="preserve">"#
    ));
}

#[test]
fn test_binary_resource_roundtrip() {
    let xml = wrap(
        r#"<assembly alias="System.Drawing" name="System.Drawing, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a" /><data name="Logo" type="System.Drawing.Bitmap, System.Drawing" mimetype="application/x-microsoft.net.object.bytearray.base64"><value>AAAA</value></data>"#,
    );

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    assert_eq!(
        table.assemblies,
        vec![AssemblyRef {
            alias: Some("System.Drawing".to_string()),
            name: Some(
                "System.Drawing, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a"
                    .to_string()
            ),
        }]
    );
    let logo = table.get("Logo").unwrap();
    assert_eq!(
        logo.mime_type.as_deref(),
        Some("application/x-microsoft.net.object.bytearray.base64")
    );

    let output = table.to_resx_string(LineEnding::Lf);
    let header = RESX_HEADER_LINES.join("\n");
    assert!(output.starts_with(&format!(
        "{}\n  <assembly alias=\"System.Drawing\" name=\"System.Drawing, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a\" />\n  <data name=\"Logo\"",
        header
    )));
    assert!(output.contains(
        r#"<data name="Logo" type="System.Drawing.Bitmap, System.Drawing" mimetype="application/x-microsoft.net.object.bytearray.base64" xml:space="preserve">"#
    ));

    let reparsed = ResourceTable::parse(output.as_bytes(), &test_path()).unwrap();
    assert_eq!(reparsed, table);
}

#[test]
fn test_detect_line_ending() {
    let crlf = wrap("\r\n<data name=\"A\"><value>1</value></data>\r\n");
    let table = ResourceTable::parse(crlf.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.line_ending, LineEnding::Crlf);
    assert!(String::from_utf8(table.to_file_bytes(None)).unwrap().contains("</data>\r\n</root>"));
    assert!(!String::from_utf8(table.to_file_bytes(Some(LineEnding::Lf))).unwrap().contains('\r'));

    let lf = wrap("\n<data name=\"A\"><value>1</value></data>\n");
    let table = ResourceTable::parse(lf.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.line_ending, LineEnding::Lf);

    let vs_file = create_test_table().to_bytes(LineEnding::Crlf);
    let table = ResourceTable::parse(&vs_file, &test_path()).unwrap();
    assert_eq!(table.to_file_bytes(None), vs_file);
}

#[test]
fn test_parse_keeps_document_order() {
    let xml = wrap(r#"<data name="Zeta"><value>z</value></data><data name="Alpha"><value>a</value></data><data name="Mid"><value>m</value></data>"#);

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_parse_duplicate_key_keeps_last_value() {
    let xml = wrap(r#"<data name="A"><value>1</value></data><data name="B"><value>2</value></data><data name="A"><value>3</value></data>"#);

    let table = ResourceTable::parse(xml.as_bytes(), &test_path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.value("A"), Some("3"));
    assert_eq!(table.keys().next(), Some("A"));
}

#[test]
fn test_parse_errors() {
    let malformed = wrap(r#"<data name="A"><value>1</data>"#);
    assert!(matches!(
        ResourceTable::parse(malformed.as_bytes(), &test_path()),
        Err(crate::utils::ResxError::Parse { .. })
    ));

    let no_name = wrap(r#"<data><value>1</value></data>"#);
    assert!(ResourceTable::parse(no_name.as_bytes(), &test_path()).is_err());

    let wrong_root = r#"<resources><data name="A"><value>1</value></data></resources>"#;
    assert!(ResourceTable::parse(wrong_root.as_bytes(), &test_path()).is_err());

    let unclosed = r#"<root><data name="A"><value>1</value></data>"#;
    assert!(ResourceTable::parse(unclosed.as_bytes(), &test_path()).is_err());

    assert!(ResourceTable::parse(b"", &test_path()).is_err());
    assert!(ResourceTable::parse(b"<root>\xFF\xFE\xFD</root>", &test_path()).is_err());
}

#[test]
fn test_parse_bom() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(wrap(r#"<data name="A"><value>1</value></data>"#).as_bytes());

    let table = ResourceTable::parse(&bytes, &test_path()).unwrap();
    assert!(table.has_bom);
    assert_eq!(table.value("A"), Some("1"));

    let output = table.to_bytes(LineEnding::Lf);
    assert!(output.starts_with(b"\xEF\xBB\xBF<?xml"));
}

#[test]
fn test_serialize_header_is_fixed() {
    let header = RESX_HEADER_LINES.join("\n");

    let empty = ResourceTable::new().to_resx_string(LineEnding::Lf);
    let full = create_test_table().to_resx_string(LineEnding::Lf);

    assert!(empty.starts_with(&header));
    assert!(full.starts_with(&header));
    assert_eq!(empty, format!("{}\n</root>", header));
}

#[test]
fn test_serialize_entries() {
    let output = create_test_table().to_resx_string(LineEnding::Lf);

    assert!(output.contains(
        "  <data name=\"Hello\" xml:space=\"preserve\">\n    <value>Hi</value>\n  </data>\n"
    ));
    assert!(output.contains(
        "  <data name=\"Bye\" xml:space=\"preserve\">\n    <value>See you</value>\n    <comment>farewell</comment>\n  </data>\n"
    ));
    assert!(output.contains("    <value></value>\n"));
    assert!(output.ends_with("  </data>\n</root>"));

    let hello = output.find("name=\"Hello\"").unwrap();
    let bye = output.find("name=\"Bye\"").unwrap();
    assert!(hello < bye);
}

#[test]
fn test_serialize_skips_empty_comment_and_escapes() {
    let mut table = ResourceTable::new();
    table.insert(ResourceEntry::new("Quote\"Key", "a < b & c").with_comment(""));

    let output = table.to_resx_string(LineEnding::Lf);
    assert!(output.contains(r#"<data name="Quote&quot;Key" xml:space="preserve">"#));
    assert!(output.contains("<value>a &lt; b &amp; c</value>"));
    assert!(!output.contains("<comment>"));
}

#[test]
fn test_serialize_crlf() {
    let output = create_test_table().to_resx_string(LineEnding::Crlf);
    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<root>\r\n"));
    assert!(!output.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_serialize_parse_serialize_is_stable() {
    let mut table = create_test_table();
    table.insert(ResourceEntry::new("Multi", "line one\nline two"));
    table.insert(ResourceEntry::new("中文", "你好 <世界>"));

    let first = table.to_resx_string(LineEnding::Lf);
    let reparsed = ResourceTable::parse(first.as_bytes(), &test_path()).unwrap();
    assert_eq!(reparsed, table);

    let second = reparsed.to_resx_string(LineEnding::Lf);
    assert_eq!(first, second);
}

#[test]
fn test_set_value() {
    let mut table = create_test_table();

    assert_eq!(table.set_value("Hello", "Hey"), Some("Hi".to_string()));
    assert_eq!(table.value("Hello"), Some("Hey"));

    assert_eq!(table.set_value("New", "Value"), None);
    assert_eq!(table.get("New"), Some(&ResourceEntry::new("New", "Value")));
    assert_eq!(table.keys().last(), Some("New"));
}

#[test]
fn test_add_key() {
    let mut table = create_test_table();

    assert!(table.add_key("Added"));
    assert_eq!(table.value("Added"), Some(""));
    assert_eq!(table.get("Added").unwrap().comment, None);

    assert!(!table.add_key("Hello"));
    assert_eq!(table.value("Hello"), Some("Hi"));
}

#[test]
fn test_remove_keeps_order() {
    let mut table = create_test_table();

    assert!(table.remove("Hello").is_some());
    assert!(table.remove("Hello").is_none());
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["Bye", "Empty"]);
}

#[test]
fn test_rename() {
    let mut table = create_test_table();

    assert!(table.rename("Bye", "Farewell"));
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["Hello", "Farewell", "Empty"]);

    let entry = table.get("Farewell").unwrap();
    assert_eq!(entry.name, "Farewell");
    assert_eq!(entry.value, "See you");
    assert_eq!(entry.comment.as_deref(), Some("farewell"));

    assert!(!table.rename("Missing", "Other"));
}

#[test]
fn test_rename_over_existing_key() {
    let mut table = create_test_table();

    assert!(table.rename("Empty", "Hello"));
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["Bye", "Hello"]);
    assert_eq!(table.value("Hello"), Some(""));
}

#[test]
fn test_rename_roundtrip_restores_table() {
    let original = create_test_table();
    let mut table = original.clone();

    table.rename("Hello", "Greeting");
    table.rename("Greeting", "Hello");
    assert_eq!(table, original);
}

#[test]
fn test_restore_keys_leaves_other_entries() {
    let snapshot = create_test_table();
    let mut table = snapshot.clone();

    table.remove("Bye");
    table.set_value("Hello", "Hey");
    table.add_key("Added");
    table.insert(ResourceEntry::new("External", "x"));

    table.restore_keys(&snapshot, &["Bye", "Added"]);
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["Hello", "Bye", "Empty", "External"]);
    assert_eq!(table.get("Bye").unwrap().comment.as_deref(), Some("farewell"));
    assert_eq!(table.value("Hello"), Some("Hey"));
}
