//! Generic traits for parsing procfs statistics files into structured types.
//!
//! - [`KeyValueStat`]: multi-line `key<separator>value` files such as
//!   `/proc/<pid>/io` or `/proc/<pid>/status`.
//! - [`SingleLineStat`]: files consisting of one record on one line, such as
//!   `/proc/<pid>/stat`.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use unit_monitor::procfs::KeyValueStat;
//!
//! #[derive(Default)]
//! struct Threads {
//!     count: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut Threads, u64)>> =
//!     LazyLock::new(|| {
//!         let mut map = HashMap::new();
//!         map.insert("Threads", (|s: &mut Threads, v: u64| s.count = v) as fn(&mut Threads, u64));
//!         map
//!     });
//!
//! impl KeyValueStat for Threads {
//!     const SEPARATOR: char = ':';
//!     const ALLOW_DUPLICATE_KEYS: bool = false;
//!
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = Threads::from_reader(&mut "Name:\tbash\nThreads:\t4\n".as_bytes()).unwrap();
//! assert_eq!(stat.count, 4);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A trait for parsing `key<SEPARATOR>value` files line by line.
///
/// Implementors define the known keys and how a parsed value is applied.
/// Lines without the separator and unknown keys are ignored by default;
/// values of known keys must parse as `u64`.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// Character between key and value, e.g. `:` for `rchar: 1024`.
    const SEPARATOR: char;

    /// If `false`, seeing a known key twice is an error.
    const ALLOW_DUPLICATE_KEYS: bool;

    /// Known field names and the functions applying their values.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a buffered reader into a populated instance.
    ///
    /// Stops early once every known key has been seen if duplicates are not
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns a [`StatParseError`] if reading fails, a value of a known key
    /// is not a valid `u64`, or a disallowed duplicate key is found.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            if let Some((key, val)) = line.split_once(Self::SEPARATOR) {
                Self::parse_and_set(key.trim(), val.trim(), &mut stat, lineno, &mut seen_keys)?;
            }
            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == handlers.len() {
                break;
            }
            line.clear();
        }

        Ok(stat)
    }

    /// Parses one key-value pair and applies it through the field handler.
    ///
    /// # Errors
    ///
    /// Returns [`StatParseError::InvalidKeyValue`] if the value is not a
    /// `u64`, or [`StatParseError::DuplicateField`] for a disallowed repeat.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        seen_keys: &mut HashSet<&'static str>,
    ) -> Result<(), StatParseError> {
        let Some((k, handler)) = Self::field_handlers().get_key_value(key) else {
            return Self::on_unknown_key(key, val, lineno);
        };

        let parsed = val
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_string(),
                value: val.to_string(),
                line: lineno,
                source,
            })?;
        if !seen_keys.insert(*k) && !Self::ALLOW_DUPLICATE_KEYS {
            return Err(StatParseError::DuplicateField {
                field: key.to_string(),
                line: lineno,
            });
        }
        handler(stat, parsed);
        Ok(())
    }

    /// Called for keys not present in [`KeyValueStat::field_handlers`].
    /// Unknown keys are silently ignored unless overridden.
    #[inline]
    fn on_unknown_key(_key: &str, _val: &str, _lineno: usize) -> Result<(), StatParseError> {
        Ok(())
    }
}

/// A trait for files holding a single record on a single line.
pub trait SingleLineStat: Sized {
    /// Parses the record from the first line of `buf`.
    ///
    /// # Errors
    ///
    /// Returns a [`StatParseError`] if reading or parsing fails.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        Self::parse(line.trim_end())
    }

    /// Parses the record from an already read line.
    fn parse(line: &str) -> Result<Self, StatParseError>;
}
