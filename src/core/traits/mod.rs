pub mod key_store;
pub mod storage;
