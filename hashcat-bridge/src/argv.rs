//! Argument vectors handed to the engine
//!
//! [`Argv`] owns its strings and the null-terminated pointer table the engine
//! reads, and releases both exactly once when dropped. Vectors that must
//! outlive a Rust owner can be moved across the boundary with
//! [`Argv::into_raw`] and are then released with [`hashcat_bridge_free_argv`].

use crate::types::{BridgeError, Result};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Owned, C-compatible argument vector
pub struct Argv {
    args: Vec<CString>,
    // Points into `args`; last slot is null.
    ptrs: Vec<*mut c_char>,
}

impl Argv {
    /// Build an argument vector from owned strings
    ///
    /// Fails if any argument contains an interior NUL byte.
    pub fn new<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let args = args
            .into_iter()
            .enumerate()
            .map(|(i, arg)| {
                CString::new(arg).map_err(|e| {
                    BridgeError::InvalidArgument(format!(
                        "argument {} contains a NUL byte at offset {}",
                        i,
                        e.nul_position()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut ptrs: Vec<*mut c_char> = args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
        ptrs.push(ptr::null_mut());

        Ok(Self { args, ptrs })
    }

    /// Number of arguments, excluding the null terminator
    pub fn argc(&self) -> c_int {
        self.args.len() as c_int
    }

    /// Number of arguments as a `usize`
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether the vector holds no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Null-terminated pointer table, valid while `self` is alive
    pub fn as_ptr(&self) -> *const *mut c_char {
        self.ptrs.as_ptr()
    }

    /// Iterate the arguments as C strings
    pub fn iter(&self) -> impl Iterator<Item = &CStr> {
        self.args.iter().map(|a| a.as_c_str())
    }

    /// Arguments as lossily-decoded strings, mainly for logging
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    /// Transfer ownership across the boundary
    ///
    /// Returns `(argc, argv)` where `argv` is a table of `argc + 1` slots with
    /// a null last slot. The caller must release it exactly once with
    /// [`hashcat_bridge_free_argv`] using the same `argc`.
    pub fn into_raw(self) -> (c_int, *mut *mut c_char) {
        let argc = self.argc();
        let mut table: Vec<*mut c_char> = self.args.into_iter().map(CString::into_raw).collect();
        table.push(ptr::null_mut());
        let table = Box::into_raw(table.into_boxed_slice()) as *mut *mut c_char;
        (argc, table)
    }
}

impl std::fmt::Debug for Argv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// The pointer table only aliases the owned strings.
unsafe impl Send for Argv {}
unsafe impl Sync for Argv {}

/// Release an argument vector produced by [`Argv::into_raw`]
///
/// Entries `0..argc` are released first to last, then the table itself. An
/// empty table releases only the table. A null `argv` is ignored.
///
/// The table's true length is found by walking to its null terminator, so an
/// `argc` below the true length still frees the table with its real layout.
/// Entries between `argc` and the terminator are released after the first
/// `argc`, before the table, rather than leaked.
///
/// # Safety
///
/// `argv` must come from [`Argv::into_raw`], `argc` must not exceed its true
/// length, and the table must not be used or released again afterwards.
#[no_mangle]
pub unsafe extern "C" fn hashcat_bridge_free_argv(argc: c_int, argv: *mut *mut c_char) {
    if argv.is_null() {
        return;
    }

    unsafe {
        let mut total = 0;
        while !(*argv.add(total)).is_null() {
            total += 1;
        }
        let count = (argc.max(0) as usize).min(total);
        if count < total {
            log::debug!(
                "Releasing {} entries past argc {} as well",
                total - count,
                count
            );
        }

        for &entry in std::slice::from_raw_parts(argv, total) {
            drop(CString::from_raw(entry));
        }
        // Table length includes the null terminator.
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(argv, total + 1)));
        log::trace!("Released argument vector of {} entries", total);
    }
}
