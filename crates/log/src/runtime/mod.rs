//! Applying configurations to the running process
//!
//! A [`Runtime`] owns the current routing [`Table`]. Applying a
//! configuration builds a complete new table first and swaps it in
//! atomically, so emitters never see a half-applied configuration and a
//! rejected configuration leaves the previous table running.

mod handler;
mod table;

use std::sync::Arc;

use arc_swap::ArcSwap;

pub use handler::Handler;
pub use table::{ROOT_DEFAULT_LEVEL, Table};

use crate::config::{Configuration, Level};
use crate::core::LogResult;
use crate::record::Record;
use crate::registry::ClassRegistry;

/// Shared handle to the active routing table
#[derive(Debug, Clone)]
pub struct Runtime {
    table: Arc<ArcSwap<Table>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Runtime with an empty table: only the last-resort output is active
    pub fn new() -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(Table::default())),
        }
    }

    /// Build `config` and make it the active table
    pub fn apply(&self, config: &Configuration, registry: &ClassRegistry) -> LogResult<()> {
        let table = Table::build(config, registry)?;
        let previous = self.table.swap(Arc::new(table));
        previous.flush();
        Ok(())
    }

    /// Snapshot of the active table
    pub fn table(&self) -> Arc<Table> {
        self.table.load_full()
    }

    /// Route one record through the active table
    pub fn dispatch(&self, record: &Record) {
        self.table.load().dispatch(record);
    }

    /// Effective level of `name` in the active table
    pub fn effective_level(&self, name: &str) -> Level {
        self.table.load().effective_level(name)
    }

    /// Flush every handler of the active table
    pub fn flush(&self) {
        self.table.load().flush();
    }
}
