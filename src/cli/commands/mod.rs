pub mod decrypt;
pub mod encrypt;
pub mod keys;
pub mod sign;
pub mod verify;

use crate::backend::framework::Request;
use crate::cli::EncodingArgs;

/// Attach the optional algorithm, format and passphrase flags.
fn with_encoding(mut request: Request, encoding: &EncodingArgs) -> Request {
    if let Some(algorithm) = &encoding.algorithm {
        request = request.with("algorithm", algorithm.as_str());
    }
    if let Some(format) = &encoding.format {
        request = request.with("format", format.as_str());
    }
    if let Some(passphrase) = &encoding.unlock.passphrase {
        request = request.with("passphrase", passphrase.as_str());
    }
    request
}
