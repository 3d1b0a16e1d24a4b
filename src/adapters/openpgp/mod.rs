pub mod entity;
pub mod envelope;
pub mod keygen;
pub mod operations;
