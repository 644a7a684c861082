//! Hash-type catalog built from engine module sources
//!
//! Every engine hash mode lives in a `module_NNNNN.c` source file that
//! declares its name, kernel type, category and an example hash as static
//! constants. This module scans a directory of those sources and produces a
//! sorted list of [`HashType`] entries.

use crate::types::{BridgeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

static HASH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"static const char \*HASH_NAME\s+=\s+"(.*?)";"#).expect("HASH_NAME pattern")
});
static KERN_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"static const u64\s+KERN_TYPE\s+=\s+(.*?);").expect("KERN_TYPE pattern")
});
static ST_HASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"static const char\s+\*ST_HASH\s+=\s+"(.*?)";"#).expect("ST_HASH pattern")
});
static HASH_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"static const u32\s+HASH_CATEGORY\s+=\s+(HASH_CATEGORY_[A-Z_]+);")
        .expect("HASH_CATEGORY pattern")
});

/// One hash mode supported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashType {
    /// Human-readable name, e.g. "MD5"
    pub name: String,
    /// Hash mode passed as `--hash-type`
    pub mode: u32,
    /// Example hash from the module's self-test, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Category display name, e.g. "Raw Hash"
    pub category: String,
}

/// Modules that register several hash modes from one source file
const DYNAMIC_MODULES: &[(u32, &[(&str, u32)])] = &[(
    16511,
    &[
        ("JWT (JSON Web Token) HS256", 16511),
        ("JWT (JSON Web Token) HS384", 16512),
        ("JWT (JSON Web Token) HS512", 16513),
    ],
)];

/// Display name for a `HASH_CATEGORY_*` constant
pub fn category_name(constant: &str) -> Option<&'static str> {
    let name = match constant {
        "HASH_CATEGORY_UNDEFINED" => "Undefined",
        "HASH_CATEGORY_RAW_HASH" => "Raw Hash",
        "HASH_CATEGORY_RAW_HASH_SALTED" => "Raw Hash, Salted and/or Iterated",
        "HASH_CATEGORY_RAW_HASH_AUTHENTICATED" => "Raw Hash, Authenticated",
        "HASH_CATEGORY_RAW_CIPHER_KPA" => "Raw Cipher, Known-Plaintext attack",
        "HASH_CATEGORY_GENERIC_KDF" => "Generic KDF",
        "HASH_CATEGORY_NETWORK_PROTOCOL" => "Network Protocols",
        "HASH_CATEGORY_FORUM_SOFTWARE" => "Forums, CMS, E-Commerce",
        "HASH_CATEGORY_DATABASE_SERVER" => "Database Server",
        "HASH_CATEGORY_NETWORK_SERVER" => "FTP, HTTP, SMTP, LDAP Server",
        "HASH_CATEGORY_RAW_CHECKSUM" => "Raw Checksum",
        "HASH_CATEGORY_OS" => "Operating System",
        "HASH_CATEGORY_EAS" => "Enterprise Application Software (EAS)",
        "HASH_CATEGORY_ARCHIVE" => "Archives",
        "HASH_CATEGORY_FDE" => "Full-Disk Encryption (FDE)",
        "HASH_CATEGORY_DOCUMENTS" => "Documents",
        "HASH_CATEGORY_PASSWORD_MANAGER" => "Password Managers",
        "HASH_CATEGORY_OTP" => "One-Time Passwords",
        "HASH_CATEGORY_PLAIN" => "Plaintext",
        "HASH_CATEGORY_FRAMEWORK" => "Framework",
        "HASH_CATEGORY_PRIVATE_KEY" => "Private Key",
        "HASH_CATEGORY_IMS" => "Instant Messaging Service",
        "HASH_CATEGORY_CRYPTOCURRENCY_WALLET" => "Cryptocurrency Wallet",
        "HASH_CATEGORY_FBE" => "File-Based Encryption (FBE)",
        "HASH_CATEGORY_APPLICATION_DATABASE" => "Application Database",
        _ => return None,
    };
    Some(name)
}

/// Hash mode encoded in a module file name such as `module_01000.c`
pub fn mode_from_file_name(file_name: &str) -> Result<u32> {
    let digits = file_name
        .strip_prefix("module_")
        .and_then(|rest| rest.strip_suffix(".c"))
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| {
            BridgeError::Catalog(format!("{} does not look like an engine module", file_name))
        })?;

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|e| BridgeError::Catalog(format!("{}: invalid mode: {}", file_name, e)))
}

fn capture<'a>(pattern: &Regex, source: &'a str) -> Option<&'a str> {
    pattern
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract the hash types declared by one module source
///
/// The mode comes from the file name; a `KERN_TYPE` that disagrees is logged
/// and ignored.
pub fn parse_module(file_name: &str, source: &str) -> Result<Vec<HashType>> {
    let name = capture(&HASH_NAME, source).ok_or_else(|| {
        BridgeError::Catalog(format!("Could not locate hash name in {}", file_name))
    })?;

    let category_constant = capture(&HASH_CATEGORY, source).ok_or_else(|| {
        BridgeError::Catalog(format!("Could not locate hash category in {}", file_name))
    })?;
    let category = category_name(category_constant).ok_or_else(|| {
        BridgeError::Catalog(format!(
            "Unknown hash category {} in {}",
            category_constant, file_name
        ))
    })?;

    let kernel_type: u32 = capture(&KERN_TYPE, source)
        .and_then(|k| k.trim().parse().ok())
        .ok_or_else(|| {
            BridgeError::Catalog(format!("Could not locate kernel type in {}", file_name))
        })?;

    let mode = mode_from_file_name(file_name)?;
    if mode != kernel_type {
        log::warn!(
            "{}: file name gives mode {} but KERN_TYPE is {}",
            file_name,
            mode,
            kernel_type
        );
    }

    let example = capture(&ST_HASH, source).map(str::to_string);

    if let Some((_, variants)) = DYNAMIC_MODULES.iter().find(|(m, _)| *m == mode) {
        return Ok(variants
            .iter()
            .map(|(variant_name, variant_mode)| HashType {
                name: variant_name.to_string(),
                mode: *variant_mode,
                example: example.clone(),
                category: category.to_string(),
            })
            .collect());
    }

    Ok(vec![HashType {
        name: name.to_string(),
        mode,
        example,
        category: category.to_string(),
    }])
}

/// Scan a directory of module sources and return every hash type, sorted by mode
///
/// Entries that are not `module_*.c` files are skipped.
pub fn scan_modules(dir: &Path) -> Result<Vec<HashType>> {
    log::info!("Scanning engine modules in {:?}", dir);

    let mut types = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.starts_with("module_") || !file_name.ends_with(".c") {
            log::debug!("Skipping non-module file {}", file_name);
            continue;
        }

        let source = fs::read_to_string(entry.path())?;
        types.extend(parse_module(&file_name, &source)?);
    }

    types.sort_by(|a, b| a.mode.cmp(&b.mode).then_with(|| a.name.cmp(&b.name)));
    log::info!("Catalog contains {} hash types", types.len());
    Ok(types)
}

/// Write a catalog as pretty-printed JSON
pub fn write_json<W: Write>(types: &[HashType], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, types)
        .map_err(|e| BridgeError::Catalog(format!("Failed to write catalog: {}", e)))
}
