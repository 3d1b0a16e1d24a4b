use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pgpvault::cli::context::CliContext;
use pgpvault::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();

    let default_filter = if args.verbose {
        "pgpvault=debug"
    } else {
        "pgpvault=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = CliContext::open(args.data_dir.as_deref()).and_then(|ctx| match &args.command {
        Commands::Keys { action } => cli::commands::keys::execute(&ctx, action),
        Commands::Encrypt {
            name,
            recipient,
            io,
            encoding,
        } => cli::commands::encrypt::execute(&ctx, name, recipient, io, encoding),
        Commands::Decrypt {
            name,
            signer,
            io,
            format,
            unlock,
        } => cli::commands::decrypt::execute(
            &ctx,
            name,
            signer.as_deref(),
            io,
            format.as_deref(),
            unlock,
        ),
        Commands::Sign { name, io, encoding } => {
            cli::commands::sign::execute(&ctx, name, io, encoding)
        }
        Commands::Verify {
            name,
            signature,
            public_key,
            input,
            format,
        } => cli::commands::verify::execute(
            &ctx,
            name,
            signature,
            public_key.as_deref(),
            input.as_deref(),
            format.as_deref(),
        ),
    });

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
