use crate::core::errors::Result;
use crate::core::models::key_record::KeyRecord;

/// Port for persisting named key records.
pub trait KeyStore {
    /// Fetch a record. Absence is `Ok(None)`, never an error.
    fn get(&self, name: &str) -> Result<Option<KeyRecord>>;

    /// Store a record under its name, replacing any previous one.
    fn put(&self, record: &KeyRecord) -> Result<()>;

    /// Delete a record by name.
    fn delete(&self, name: &str) -> Result<()>;

    /// Names of all stored records, sorted.
    fn list(&self) -> Result<Vec<String>>;
}
