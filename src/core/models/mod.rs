pub mod key_record;
pub mod options;
pub mod requests;
