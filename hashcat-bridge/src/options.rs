//! Engine session options
//!
//! [`SessionOptions`] mirrors the engine's command-line options. Every flag is
//! optional; only the ones that are set end up in the argument vector. The
//! same field table drives marshalling ([`SessionOptions::to_args`]),
//! parsing ([`SessionOptions::parse`]) and merging ([`SessionOptions::merge`]).
//!
//! Informational switches the engine offers (help, version, benchmark,
//! keyspace, show/left, stdout, status output, machine-readable) are not
//! modelled: a session always runs a job.

use crate::types::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Value kinds a flag can carry
trait FlagValue: Sized {
    /// Whether `--flag value` consumes the next word
    const TAKES_VALUE: bool;

    fn push_args(&self, flag: &str, args: &mut Vec<String>);

    fn parse_value(flag: &str, value: Option<&str>) -> Result<Self>;
}

impl FlagValue for i64 {
    const TAKES_VALUE: bool = true;

    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        args.push(format!("{}={}", flag, self));
    }

    fn parse_value(flag: &str, value: Option<&str>) -> Result<Self> {
        let value = value.ok_or_else(|| missing_value(flag))?;
        value.parse().map_err(|_| {
            BridgeError::InvalidOption(format!("{} expects an integer, got '{}'", flag, value))
        })
    }
}

impl FlagValue for bool {
    const TAKES_VALUE: bool = false;

    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        if *self {
            args.push(flag.to_string());
        }
    }

    fn parse_value(flag: &str, value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(true),
            Some(v) => v.parse().map_err(|_| {
                BridgeError::InvalidOption(format!("{} expects true or false, got '{}'", flag, v))
            }),
        }
    }
}

impl FlagValue for String {
    const TAKES_VALUE: bool = true;

    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        if !self.is_empty() {
            args.push(format!("{}={}", flag, self));
        }
    }

    fn parse_value(flag: &str, value: Option<&str>) -> Result<Self> {
        value.map(str::to_string).ok_or_else(|| missing_value(flag))
    }
}

fn missing_value(flag: &str) -> BridgeError {
    BridgeError::InvalidOption(format!("{} requires a value", flag))
}

macro_rules! session_options {
    ($( $field:ident : $ty:ty = $flag:literal, )*) => {
        /// Options for one engine job
        ///
        /// Unset fields are left out of the argument vector so the engine's own
        /// defaults apply.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct SessionOptions {
            $(
                #[doc = concat!("`", $flag, "`")]
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*

            /// A single hash, a hashfile, or an hccapx capture
            pub input_file: String,

            /// Dictionary, mask or directory, depending on the attack mode
            #[serde(skip_serializing_if = "Option::is_none")]
            pub dictionary_mask_directory: Option<String>,
        }

        impl SessionOptions {
            /// Every flag name, in marshalling order
            pub const FLAGS: &'static [&'static str] = &[$($flag),*];

            fn push_flags(&self, args: &mut Vec<String>) {
                $(
                    if let Some(value) = &self.$field {
                        value.push_args($flag, args);
                    }
                )*
            }

            fn overlay_flags(&mut self, other: &SessionOptions) {
                $(
                    if let Some(value) = &other.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            }

            fn flag_takes_value(flag: &str) -> Option<bool> {
                match flag {
                    $( $flag => Some(<$ty as FlagValue>::TAKES_VALUE), )*
                    _ => None,
                }
            }

            fn set_flag(&mut self, flag: &str, value: Option<&str>) -> Result<()> {
                match flag {
                    $( $flag => self.$field = Some(<$ty as FlagValue>::parse_value(flag, value)?), )*
                    _ => return Err(unknown_option(flag)),
                }
                Ok(())
            }
        }
    };
}

session_options! {
    hash_type: i64 = "--hash-type",
    attack_mode: i64 = "--attack-mode",
    hex_charset: bool = "--hex-charset",
    hex_salt: bool = "--hex-salt",
    hex_wordlist: bool = "--hex-wordlist",
    keep_guessing: bool = "--keep-guessing",
    loopback: bool = "--loopback",
    weak_hash_threshold: i64 = "--weak-hash-threshold",
    markov_hcstat: String = "--markov-hcstat",
    markov_disable: bool = "--markov-disable",
    markov_classic: bool = "--markov-classic",
    markov_threshold: i64 = "--markov-threshold",
    force: bool = "--force",
    runtime: i64 = "--runtime",
    session: String = "--session",
    restore: bool = "--restore",
    restore_disable: bool = "--restore-disable",
    restore_file_path: String = "--restore-file-path",
    outfile: String = "--outfile",
    outfile_format: i64 = "--outfile-format",
    outfile_autohex_disable: bool = "--outfile-autohex-disable",
    outfile_check_timer: i64 = "--outfile-check-timer",
    separator: String = "--separator",
    username: bool = "--username",
    remove: bool = "--remove",
    remove_timer: i64 = "--remove-timer",
    potfile_disable: bool = "--potfile-disable",
    potfile_path: String = "--potfile-path",
    encoding_from: String = "--encoding-from",
    encoding_to: String = "--encoding-to",
    debug_mode: i64 = "--debug-mode",
    debug_file: String = "--debug-file",
    induction_dir: String = "--induction-dir",
    logfile_disable: bool = "--logfile-disable",
    hccapx_message_pair: String = "--hccapx-message-pair",
    nonce_error_corrections: i64 = "--nonce-error-corrections",
    truecrypt_keyfiles: String = "--truecrypt-keyfiles",
    veracrypt_keyfiles: String = "--veracrypt-keyfiles",
    veracrypt_pim: i64 = "--veracrypt-pim",
    veracrypt_pim_start: i64 = "--veracrypt-pim-start",
    veracrypt_pim_stop: i64 = "--veracrypt-pim-stop",
    segment_size: i64 = "--segment-size",
    bitmap_min: i64 = "--bitmap-min",
    bitmap_max: i64 = "--bitmap-max",
    cpu_affinity: String = "--cpu-affinity",
    hook_threads: i64 = "--hook-threads",
    backend_ignore_cuda: bool = "--backend-ignore-cuda",
    backend_ignore_opencl: bool = "--backend-ignore-opencl",
    backend_devices: String = "--backend-devices",
    opencl_device_types: String = "--opencl-device-types",
    optimized_kernel_enable: bool = "--optimized-kernel-enable",
    workload_profile: i64 = "--workload-profile",
    kernel_accel: i64 = "--kernel-accel",
    kernel_loops: i64 = "--kernel-loops",
    spin_damp: i64 = "--spin-damp",
    hwmon_disable: bool = "--hwmon-disable",
    hwmon_temp_abort: i64 = "--hwmon-temp-abort",
    scrypt_tmto: i64 = "--scrypt-tmto",
    skip: i64 = "--skip",
    limit: i64 = "--limit",
    rule_left: String = "--rule-left",
    rule_right: String = "--rule-right",
    rules_file: String = "--rules-file",
    generate_rules: i64 = "--generate-rules",
    generate_rules_func_min: i64 = "--generate-rules-func-min",
    generate_rules_func_max: i64 = "--generate-rules-func-max",
    generate_rules_seed: i64 = "--generate-rules-seed",
    custom_charset1: String = "--custom-charset1",
    custom_charset2: String = "--custom-charset2",
    custom_charset3: String = "--custom-charset3",
    custom_charset4: String = "--custom-charset4",
    increment: bool = "--increment",
    increment_min: i64 = "--increment-min",
    increment_max: i64 = "--increment-max",
    identify: bool = "--identify",
    deprecated_check_disable: bool = "--deprecated-check-disable",
}

fn unknown_option(flag: &str) -> BridgeError {
    BridgeError::InvalidOption(format!("unknown option {}", flag))
}

impl SessionOptions {
    /// Create empty options for the given input
    pub fn new(input_file: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            ..Self::default()
        }
    }

    /// Builder method: set the dictionary, mask or directory positional
    pub fn with_dictionary(mut self, dictionary: impl Into<String>) -> Self {
        self.dictionary_mask_directory = Some(dictionary.into());
        self
    }

    /// Marshal the options into engine arguments
    ///
    /// Flags come first in table order: integers and strings as
    /// `--flag=value` (empty strings are skipped), booleans as a bare `--flag`
    /// when true. The positionals follow: the input, then the dictionary,
    /// mask or directory when set.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        self.push_flags(&mut args);

        if !self.input_file.is_empty() {
            args.push(self.input_file.clone());
        }
        if let Some(dict) = self.dictionary_mask_directory.as_deref().filter(|d| !d.is_empty()) {
            args.push(dict.to_string());
        }

        args
    }

    /// Parse an option string such as `--attack-mode=0 --force`
    ///
    /// Integer and string flags accept `--flag=value` or `--flag value`;
    /// boolean flags accept `--flag` or `--flag=true|false`. A single leading
    /// dash is accepted too. Positionals are not parsed: any bare word is an
    /// error, as is an unknown flag.
    pub fn parse(options: &str) -> Result<Self> {
        let mut parsed = Self::default();
        let mut words = options.split_whitespace();

        while let Some(word) = words.next() {
            let body = word
                .strip_prefix("--")
                .or_else(|| word.strip_prefix('-'))
                .filter(|b| !b.is_empty())
                .ok_or_else(|| {
                    BridgeError::InvalidOption(format!("unexpected argument '{}'", word))
                })?;

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let flag = format!("--{}", name);

            let takes_value =
                Self::flag_takes_value(&flag).ok_or_else(|| unknown_option(&flag))?;
            let value = match inline {
                Some(v) => Some(v),
                None if takes_value => Some(words.next().ok_or_else(|| missing_value(&flag))?),
                None => None,
            };

            parsed.set_flag(&flag, value)?;
        }

        log::debug!("Parsed session options: {:?}", parsed.to_args());
        Ok(parsed)
    }

    /// Overlay the flags set in `other` on top of `self`
    ///
    /// Every flag set in `other` wins, including an explicit `false`.
    /// Positionals are taken from `other` only when they are set there.
    pub fn merge(mut self, other: &SessionOptions) -> Self {
        self.overlay_flags(other);

        if !other.input_file.is_empty() {
            self.input_file = other.input_file.clone();
        }
        if other.dictionary_mask_directory.is_some() {
            self.dictionary_mask_directory = other.dictionary_mask_directory.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_order_and_format() {
        let options = SessionOptions {
            opencl_device_types: Some("1".to_string()),
            session: Some("test3".to_string()),
            optimized_kernel_enable: Some(true),
            attack_mode: Some(0),
            hash_type: Some(0),
            potfile_disable: Some(true),
            ..SessionOptions::new("9f9d51bc70ef21ca5c14f307980a29d8")
        }
        .with_dictionary("./testdata/test_dictionary.txt");

        assert_eq!(
            options.to_args(),
            vec![
                "--hash-type=0",
                "--attack-mode=0",
                "--session=test3",
                "--potfile-disable",
                "--opencl-device-types=1",
                "--optimized-kernel-enable",
                "9f9d51bc70ef21ca5c14f307980a29d8",
                "./testdata/test_dictionary.txt",
            ]
        );
    }

    #[test]
    fn test_false_bools_and_empty_strings_are_omitted() {
        let options = SessionOptions {
            force: Some(false),
            outfile: Some(String::new()),
            dictionary_mask_directory: Some(String::new()),
            ..SessionOptions::default()
        };
        assert!(options.to_args().is_empty());
    }

    #[test]
    fn test_parse_custom_command_line() {
        let options = SessionOptions::parse(
            "--optimized-kernel-enable=true --custom-charset1=DEADBEEF --attack-mode=0 --hash-type=0 --potfile-disable=true",
        )
        .unwrap();

        assert_eq!(options.optimized_kernel_enable, Some(true));
        assert_eq!(options.custom_charset1.as_deref(), Some("DEADBEEF"));
        assert_eq!(options.attack_mode, Some(0));
        assert_eq!(options.hash_type, Some(0));
        assert_eq!(options.potfile_disable, Some(true));
        assert_eq!(options.force, None);
    }

    #[test]
    fn test_parse_separate_values_and_bare_bools() {
        // Short aliases are not part of the table.
        let err = SessionOptions::parse("-m 1000 --force --session job1").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOption(_)));

        let options = SessionOptions::parse("--hash-type 1000 --force --session job1").unwrap();
        assert_eq!(options.hash_type, Some(1000));
        assert_eq!(options.force, Some(true));
        assert_eq!(options.session.as_deref(), Some("job1"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(SessionOptions::parse("--invalid-option --optimized-kernel-enable=true").is_err());
        assert!(SessionOptions::parse("thisisatest --optimized-kernel-enable=true").is_err());
        assert!(SessionOptions::parse("--hash-type=abc").is_err());
        assert!(SessionOptions::parse("--hash-type").is_err());
        assert!(SessionOptions::parse("--force=maybe").is_err());
    }

    #[test]
    fn test_parse_roundtrips_flags() {
        let text = "--hash-type=2500 --custom-charset4=?l?d --deprecated-check-disable";
        let options = SessionOptions::parse(text).unwrap();
        assert_eq!(options.to_args().join(" "), text);
    }

    #[test]
    fn test_merge_overlays_flags() {
        let base = SessionOptions {
            hash_type: Some(0),
            force: Some(true),
            session: Some("base".to_string()),
            ..SessionOptions::new("hashes.txt")
        };
        let overlay = SessionOptions {
            hash_type: Some(1000),
            force: Some(false),
            ..SessionOptions::default()
        };

        let merged = base.merge(&overlay);
        assert_eq!(merged.hash_type, Some(1000));
        assert_eq!(merged.force, Some(false));
        assert_eq!(merged.session.as_deref(), Some("base"));
        assert_eq!(merged.input_file, "hashes.txt");
    }

    #[test]
    fn test_merge_covers_every_flag() {
        let overlay = SessionOptions::parse(
            "--identify=false --deprecated-check-disable=false --custom-charset4=?d --bitmap-max=24",
        )
        .unwrap();
        let base = SessionOptions {
            identify: Some(true),
            deprecated_check_disable: Some(true),
            bitmap_max: Some(16),
            ..SessionOptions::default()
        };

        let merged = base.merge(&overlay);
        assert_eq!(merged.identify, Some(false));
        assert_eq!(merged.deprecated_check_disable, Some(false));
        assert_eq!(merged.custom_charset4.as_deref(), Some("?d"));
        assert_eq!(merged.bitmap_max, Some(24));
    }

    #[test]
    fn test_flag_table_is_unique() {
        let mut flags = SessionOptions::FLAGS.to_vec();
        flags.sort_unstable();
        flags.dedup();
        assert_eq!(flags.len(), SessionOptions::FLAGS.len());
    }
}
