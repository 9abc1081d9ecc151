//! The parameter store: numeric and string values keyed by name, plus the
//! tables read alongside them.
//!
//! A store is filled while in [`Mode::ReadWrite`] and then usually switched
//! to [`Mode::ReadOnly`] before it is handed to the code that queries it. The
//! mode is a guard against accidental updates, not a lock: the store has no
//! internal synchronization.

use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use seahash::SeaHasher;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ParamError, Result};
use crate::format;
use crate::line::{self, Entry, Line, SourceLines};
use crate::table::Table;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    ReadWrite,
    ReadOnly,
}

/// What a load does with a key that is already defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overwrite {
    /// The first definition wins.
    #[default]
    Keep,
    /// The last definition wins.
    Override,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Environment variable naming the directory relative paths start from.
    pub env_path: Option<String>,
    /// Prepended with a dot to every scalar key of the file.
    pub prefix: Option<String>,
    pub overwrite: Overwrite,
}

/// Directory named by the environment variable `env_path`.
pub fn resolve_path(env_path: &str) -> Result<PathBuf> {
    if env_path.is_empty() {
        return Err(ParamError::Resource {
            message: "empty environment variable name for path lookup".to_string(),
            source: None,
        });
    }
    match std::env::var_os(env_path) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Err(ParamError::Resource {
            message: format!("environment variable {env_path} is not defined"),
            source: None,
        }),
    }
}

fn with_base(path: &Path, env_path: Option<&str>) -> Result<PathBuf> {
    match env_path {
        Some(var) => Ok(resolve_path(var)?.join(path)),
        None => Ok(path.to_path_buf()),
    }
}

#[derive(Debug, Default)]
pub struct Store {
    mode: Mode,
    // first-seen order, each key once
    keys: Vec<String>,
    num_values: HashMap<String, f64, OtherHasher>,
    str_values: HashMap<String, String, OtherHasher>,
    tables: HashMap<String, Table, OtherHasher>,
}

impl Store {
    /// An empty store open for writing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self { mode, ..Self::default() }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == Mode::ReadOnly
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Switches to read-write, for filling the store.
    pub fn input(&mut self) -> &mut Self {
        self.mode = Mode::ReadWrite;
        self
    }

    /// Switches to read-only, for querying the store.
    pub fn reader(&mut self) -> &Self {
        self.mode = Mode::ReadOnly;
        self
    }

    fn check_writable(&self, what: &str) -> Result<()> {
        if self.is_read_only() {
            return Err(ParamError::ReadOnly(what.to_string()));
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.num_values.contains_key(key) || self.str_values.contains_key(key)
    }

    // ------------- Loading -------------

    /// Reads parameters and tables from `reader` until the end of the stream.
    ///
    /// Scalar keys get `prefix.` in front of them, table names do not. A
    /// line without a key is reported and skipped. Returns the number of
    /// entries and tables stored.
    pub fn read_stream<R: BufRead>(
        &mut self,
        reader: R,
        prefix: Option<&str>,
        overwrite: Overwrite,
    ) -> Result<usize> {
        self.check_writable("can not read into a read-only database")?;
        let prefix = match prefix {
            Some(p) if !p.is_empty() => format!("{p}."),
            _ => String::new(),
        };

        let mut lines = SourceLines::new(reader);
        let (mut entries, mut tables) = (0usize, 0usize);
        while let Some(raw) = lines.next() {
            match line::classify(&raw).map_err(|e| e.at_line(lines.number()))? {
                Line::Blank => {}
                Line::Malformed(text) => {
                    warn!(line = lines.number(), %text, "bad format of line, skipping");
                }
                Line::TableHeader { name, columns } => {
                    if self.tables.contains_key(name) {
                        return Err(ParamError::format(
                            format!("attempt to redefine already defined table {name}"),
                            Some(lines.number()),
                        ));
                    }
                    let table = Table::read(name, columns, &mut lines)?;
                    self.keep_table(table);
                    tables += 1;
                }
                Line::Entry(entry) => {
                    if self.keep_entry(&prefix, entry, overwrite) {
                        entries += 1;
                    }
                }
            }
        }
        debug!(entries, tables, "database read");
        Ok(entries + tables)
    }

    /// Opens `path` (relative to `options.env_path` when given) and reads it
    /// with [`Store::read_stream`].
    pub fn read_file(&mut self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<usize> {
        let path = with_base(path.as_ref(), options.env_path.as_deref())?;
        self.check_writable(&format!(
            "can not update a read-only database from {}",
            path.display()
        ))?;
        debug!(path = %path.display(), "reading database");
        let file = File::open(&path)
            .map_err(|e| ParamError::resource(format!("could not open {}", path.display()), e))?;
        self.read_stream(BufReader::new(file), options.prefix.as_deref(), options.overwrite)
    }

    fn keep_entry(&mut self, prefix: &str, entry: Entry<'_>, overwrite: Overwrite) -> bool {
        let key = format!("{prefix}{}", entry.key);
        if self.contains(&key) {
            match overwrite {
                Overwrite::Keep => {
                    warn!(%key, "preserving previous setting");
                    return false;
                }
                Overwrite::Override => {
                    warn!(%key, "overriding previous setting");
                    self.num_values.remove(&key);
                }
            }
        } else {
            self.keys.push(key.clone());
        }

        if let Some(number) = entry.number {
            self.num_values.insert(key.clone(), number);
        }
        // every entry has a string value, empty when none was given
        self.str_values.insert(key, entry.text.unwrap_or_default().to_string());
        true
    }

    fn keep_table(&mut self, table: Table) {
        let name = table.name().to_string();
        if !self.contains(&name) {
            self.keys.push(name.clone());
        }
        self.num_values.insert(name.clone(), table.rows() as f64);
        self.str_values.insert(name.clone(), name.clone());
        self.tables.insert(name, table);
    }

    // ------------- Queries -------------

    pub fn num_value(&self, key: &str) -> Result<f64> {
        self.num_values
            .get(key)
            .copied()
            .ok_or_else(|| ParamError::Lookup(format!("attempt to retrieve undefined key {key}")))
    }

    pub fn str_value(&self, key: &str) -> Result<&str> {
        self.str_values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ParamError::Lookup(format!("attempt to retrieve undefined key {key}")))
    }

    pub fn has_num_value(&self, key: &str) -> bool {
        self.num_values.contains_key(key)
    }

    /// True only for a non-empty string value.
    pub fn has_str_value(&self, key: &str) -> bool {
        self.str_values.get(key).is_some_and(|s| !s.is_empty())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Keys in the order they were first defined, table names included.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| ParamError::Lookup(format!("attempt to access undefined table {name}")))
    }

    /// Tables in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    // ------------- Updates -------------

    /// Mutable numeric value of `key`, created as zero when missing. Unlike a
    /// load, this always allows replacing an existing value.
    pub fn num_mut(&mut self, key: &str) -> Result<&mut f64> {
        self.check_writable(&format!("attempt to modify read-only database: {key}"))?;
        if self.num_values.contains_key(key) {
            warn!(%key, "overriding existing key");
        }
        // the key may already exist with just a string value
        if !self.contains(key) {
            self.keys.push(key.to_string());
        }
        Ok(self.num_values.entry(key.to_string()).or_insert(0.0))
    }

    /// Mutable string value of `key`, created empty when missing.
    pub fn str_mut(&mut self, key: &str) -> Result<&mut String> {
        self.check_writable(&format!("attempt to modify read-only database: {key}"))?;
        if self.str_values.contains_key(key) {
            warn!(%key, "overriding existing key");
        }
        if !self.contains(key) {
            self.keys.push(key.to_string());
        }
        Ok(self.str_values.entry(key.to_string()).or_default())
    }

    pub fn set_num_value(&mut self, key: &str, value: f64) -> Result<()> {
        *self.num_mut(key)? = value;
        Ok(())
    }

    pub fn set_str_value(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        *self.str_mut(key)? = value.into();
        Ok(())
    }

    // ------------- Output -------------

    /// Writes the store in the text format it is read from.
    pub fn write_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        format::write_store(self, writer)
            .map_err(|e| ParamError::resource("could not write database text", e))
    }

    pub fn write_text_file(&self, path: impl AsRef<Path>, env_path: Option<&str>) -> Result<()> {
        let path = with_base(path.as_ref(), env_path)?;
        let file = File::create(&path)
            .map_err(|e| ParamError::resource(format!("could not open {}", path.display()), e))?;
        let mut writer = BufWriter::new(file);
        self.write_text(&mut writer)?;
        writer
            .flush()
            .map_err(|e| ParamError::resource(format!("could not write {}", path.display()), e))?;
        info!(
            path = %path.display(),
            parameters = self.keys.len(),
            tables = self.tables.len(),
            "database written"
        );
        Ok(())
    }

    pub fn print(&self) -> Result<()> {
        let stdout = io::stdout();
        self.write_text(&mut stdout.lock())
    }
}
