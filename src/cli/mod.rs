pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Named OpenPGP keys with encrypt, decrypt, sign and verify.
#[derive(Parser, Debug)]
#[command(name = "pgpvault", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.toml and stored keys
    #[arg(long, global = true, env = "PGPVAULT_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Encrypt data to a recipient and sign it with a stored key
    Encrypt {
        /// Stored key that signs the message
        name: String,
        /// File with the recipient's armored public key
        #[arg(long)]
        recipient: PathBuf,
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        encoding: EncodingArgs,
    },

    /// Decrypt a message with a stored key
    Decrypt {
        /// Stored key that decrypts the message
        name: String,
        /// File with the signer's armored public key; the signature must match
        #[arg(long)]
        signer: Option<PathBuf>,
        #[command(flatten)]
        io: IoArgs,
        /// Encoding of the ciphertext: base64 or ascii-armor
        #[arg(long)]
        format: Option<String>,
        #[command(flatten)]
        unlock: PassphraseArgs,
    },

    /// Produce a detached signature with a stored key
    Sign {
        /// Stored key that signs
        name: String,
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        encoding: EncodingArgs,
    },

    /// Check a detached signature
    Verify {
        /// Stored key the signature should belong to
        name: String,
        /// File holding the signature
        #[arg(long)]
        signature: PathBuf,
        /// Verify against this armored public key instead of the stored one
        #[arg(long)]
        public_key: Option<PathBuf>,
        /// Signed data (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Encoding of the signature: base64 or ascii-armor
        #[arg(long)]
        format: Option<String>,
    },
}

/// Input and output locations; `-` or nothing means stdin/stdout.
#[derive(Args, Debug)]
pub struct IoArgs {
    /// Read input from this file (default: stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Write output to this file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EncodingArgs {
    /// Hash algorithm: sha2-224, sha2-256, sha2-384 or sha2-512
    #[arg(long)]
    pub algorithm: Option<String>,
    /// Output encoding: base64 or ascii-armor
    #[arg(long)]
    pub format: Option<String>,
    #[command(flatten)]
    pub unlock: PassphraseArgs,
}

#[derive(Args, Debug)]
pub struct PassphraseArgs {
    /// Passphrase for a protected key
    #[arg(long, env = "PGPVAULT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Generate a new RSA key pair
    Create {
        name: String,
        /// Real name in the user id
        #[arg(long)]
        real_name: String,
        /// Email in the user id
        #[arg(long)]
        email: String,
        /// Comment in the user id
        #[arg(long)]
        comment: Option<String>,
        /// RSA modulus size (default from config.toml)
        #[arg(long)]
        bits: Option<u32>,
        /// Allow the private key to be exported later
        #[arg(long)]
        exportable: bool,
        /// Replace an existing key with the same name
        #[arg(long)]
        overwrite: bool,
    },
    /// Import an armored key from a file (or stdin)
    Import {
        name: String,
        /// Armored key file (default: stdin)
        file: Option<PathBuf>,
        #[command(flatten)]
        unlock: PassphraseArgs,
        /// Allow the private key to be exported later
        #[arg(long)]
        exportable: bool,
        /// Replace an existing key with the same name
        #[arg(long)]
        overwrite: bool,
    },
    /// List stored keys
    List,
    /// Show a stored key's details and public key
    Show { name: String },
    /// Delete a stored key
    Delete { name: String },
    /// Print the armored private key of an exportable key
    Export {
        name: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
