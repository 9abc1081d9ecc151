//! Paramdb – a small database of numeric and string parameters read from a
//! line-oriented text format.
//!
//! ```text
//! # blank lines and lines beginning with '#' are ignored
//! pi     3.14159265358979312   # anything after a '#' is ignored
//! model  INCL++                # the spaces before the '#' too
//! e      2.71828182845904509e+00  This is 'e' as in exp(1), not the e+ charge.
//! q_e    1.60217646200000007e-19 coulomb
//! flag
//!
//! =geometry= id   x      y      z
//! 10             1.0    0.0    1.0
//! 11            -0.5    0.866  1.0
//! ```
//!
//! Every entry has the shape `key [number] [text]`:
//! * `pi` only has a number,
//! * `model` has text where a number was expected, so its number is zero and
//!   its text is `INCL++`,
//! * `e` and `q_e` have both a number and a text,
//! * `flag` has neither and reads back as an empty string.
//!
//! A line starting with `=` opens a table (see [`table::Table`]); the table
//! name also becomes a key holding the row count and the name itself.
//!
//! ## Modules
//! * [`line`] – Classification of single lines and the decimal grammar.
//! * [`table`] – Column-major tables nested in a file.
//! * [`store`] – The [`store::Store`] itself: loading, queries, updates.
//! * [`format`] – Writing a store back as text.
//! * [`settings`] – Settings for the `paramdb` binary.
//!
//! ## Quick Start
//! ```
//! use std::io::Cursor;
//! use paramdb::{Overwrite, Store};
//! let mut store = Store::new();
//! store.read_stream(Cursor::new("pi 3.14159 some text\nmodel INCL++\n"), None, Overwrite::Keep).unwrap();
//! let store = store.reader();
//! assert_eq!(store.num_value("pi").unwrap(), 3.14159);
//! assert_eq!(store.str_value("model").unwrap(), "INCL++");
//! ```

pub mod error;
pub mod format;
pub mod line;
pub mod settings;
pub mod store;
pub mod table;

pub use error::{ErrorKind, ParamError, Result};
pub use store::{LoadOptions, Mode, Overwrite, Store};
pub use table::Table;
