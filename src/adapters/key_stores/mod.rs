pub mod storage_key_store;
