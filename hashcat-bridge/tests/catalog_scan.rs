// Catalog generation over a directory of module sources
use hashcat_bridge::catalog::{scan_modules, write_json, HashType};
use std::fs;

fn module_source(category: &str, name: &str, kern_type: u32, example: Option<&str>) -> String {
    let mut source = format!(
        "static const u32   HASH_CATEGORY  = {};\n\
         static const char *HASH_NAME      = \"{}\";\n\
         static const u64   KERN_TYPE      = {};\n",
        category, name, kern_type
    );
    if let Some(example) = example {
        source.push_str(&format!("static const char *ST_HASH        = \"{}\";\n", example));
    }
    source
}

#[test]
fn scans_directory_sorted_by_mode() {
    let dir = tempfile::tempdir().unwrap();
    let modules = dir.path();

    fs::write(
        modules.join("module_01000.c"),
        module_source("HASH_CATEGORY_OS", "NTLM", 1000, Some("b4b9b02e6f09a9bd760f388b67351e2b")),
    )
    .unwrap();
    fs::write(
        modules.join("module_00000.c"),
        module_source("HASH_CATEGORY_RAW_HASH", "MD5", 0, None),
    )
    .unwrap();
    fs::write(modules.join("module_01000.h"), "/* header */").unwrap();
    fs::write(modules.join("Makefile"), "all:").unwrap();
    fs::create_dir(modules.join("module_99999.c")).unwrap();

    let types = scan_modules(modules).unwrap();
    assert_eq!(
        types,
        vec![
            HashType {
                name: "MD5".to_string(),
                mode: 0,
                example: None,
                category: "Raw Hash".to_string(),
            },
            HashType {
                name: "NTLM".to_string(),
                mode: 1000,
                example: Some("b4b9b02e6f09a9bd760f388b67351e2b".to_string()),
                category: "Operating System".to_string(),
            },
        ]
    );

    let mut json = Vec::new();
    write_json(&types, &mut json).unwrap();
    let text = String::from_utf8(json).unwrap();
    assert!(text.contains("\"name\": \"NTLM\""));
    assert!(!text.contains("\"example\": null"));
}

#[test]
fn malformed_module_fails_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("module_00100.c"), "static const u64 KERN_TYPE = 100;").unwrap();

    assert!(scan_modules(dir.path()).is_err());
}

#[test]
fn missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = scan_modules(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, hashcat_bridge::BridgeError::IoError(_)));
}
