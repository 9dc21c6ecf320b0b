use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

/// Shared behaviour for storage modules whose primary table maps an ID to
/// JSON bytes.
///
/// Index tables stay private to each module; this trait only covers the
/// primary table. The `*_in` functions run inside a caller-owned write
/// transaction so several modules can take part in one atomic unit.
pub trait SimpleStorage: Send + Sync {
    /// The primary table for this storage type.
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]>;

    /// Get reference to the database.
    fn db(&self) -> &Arc<Database>;

    /// Get raw bytes by ID.
    fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(Self::TABLE)?;
        Ok(table.get(id)?.map(|value| value.value().to_vec()))
    }

    /// List all entries as (id, data) pairs.
    fn list_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(Self::TABLE)?;

        let mut items = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            items.push((key.value().to_string(), value.value().to_vec()));
        }

        Ok(items)
    }

    /// Check if ID exists.
    fn exists(&self, id: &str) -> Result<bool> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(Self::TABLE)?;
        Ok(table.get(id)?.is_some())
    }

    /// Read raw bytes inside an open write transaction.
    fn get_raw_in(txn: &WriteTransaction, id: &str) -> Result<Option<Vec<u8>>>
    where
        Self: Sized,
    {
        let table = txn.open_table(Self::TABLE)?;
        Ok(table.get(id)?.map(|value| value.value().to_vec()))
    }

    /// Overwrite the primary row inside an open write transaction.
    fn put_raw_in(txn: &WriteTransaction, id: &str, data: &[u8]) -> Result<()>
    where
        Self: Sized,
    {
        let mut table = txn.open_table(Self::TABLE)?;
        table.insert(id, data)?;
        Ok(())
    }

    /// Check existence inside an open write transaction.
    fn exists_in(txn: &WriteTransaction, id: &str) -> Result<bool>
    where
        Self: Sized,
    {
        let table = txn.open_table(Self::TABLE)?;
        Ok(table.get(id)?.is_some())
    }
}

/// Macro to generate a storage struct backed by a single primary table.
#[macro_export]
macro_rules! define_simple_storage {
    ( $(#[$meta:meta])* $vis:vis struct $name:ident { table: $table_name:literal } ) => {
        const TABLE: redb::TableDefinition<'static, &'static str, &'static [u8]> =
            redb::TableDefinition::new($table_name);

        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            db: std::sync::Arc<redb::Database>,
        }

        impl $name {
            pub fn new(db: std::sync::Arc<redb::Database>) -> anyhow::Result<Self> {
                let write_txn = db.begin_write()?;
                write_txn.open_table(TABLE)?;
                write_txn.commit()?;

                Ok(Self { db })
            }

            pub fn put_raw(&self, id: &str, data: &[u8]) -> anyhow::Result<()> {
                let write_txn = self.db.begin_write()?;
                <Self as $crate::SimpleStorage>::put_raw_in(&write_txn, id, data)?;
                write_txn.commit()?;
                Ok(())
            }
        }

        impl $crate::SimpleStorage for $name {
            const TABLE: redb::TableDefinition<'static, &'static str, &'static [u8]> = TABLE;

            fn db(&self) -> &std::sync::Arc<redb::Database> {
                &self.db
            }
        }
    };
}
