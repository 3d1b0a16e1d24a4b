pub mod crypto_service;
pub mod key_service;
