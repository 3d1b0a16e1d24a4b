pub mod key_stores;
pub mod openpgp;
pub mod storage;
