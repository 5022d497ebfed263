use anyhow::Result;
use clap::{Parser, Subcommand};
use esmkit_cli::{commands, TableKind, Width};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "esmkit")]
#[command(about = "Esmkit - Inspect and check quest records in ESM/ESP files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one quest record and print it as JSON
    Dump {
        /// Input file holding one record, header included
        #[arg(short, long)]
        input: String,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<String>,

        /// String table used for localized text
        #[arg(long)]
        strings: Option<String>,

        /// Treat localized subrecords as string table keys
        #[arg(long)]
        localized: bool,

        /// Subrecord length-prefix width
        #[arg(long, value_enum, default_value = "u16")]
        length_width: Width,
    },

    /// Decode and re-encode a record, reporting any difference
    Verify {
        /// Input file holding one record, header included
        #[arg(short, long)]
        input: String,

        /// String table used for localized text
        #[arg(long)]
        strings: Option<String>,

        /// Treat localized subrecords as string table keys
        #[arg(long)]
        localized: bool,

        /// Subrecord length-prefix width
        #[arg(long, value_enum, default_value = "u16")]
        length_width: Width,
    },

    /// Walk every record in a plugin file
    Scan {
        /// Plugin file to scan
        #[arg(short, long)]
        input: String,

        /// Output JSON file for the record list
        #[arg(short, long)]
        output: Option<String>,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,

        /// String table used for localized text
        #[arg(long)]
        strings: Option<String>,

        /// Treat localized subrecords as string table keys
        #[arg(long)]
        localized: bool,

        /// Subrecord length-prefix width
        #[arg(long, value_enum, default_value = "u16")]
        length_width: Width,
    },

    /// Print the entries of a string table file
    Strings {
        /// String table file
        #[arg(short, long)]
        input: String,

        /// Table layout; guessed from the extension when omitted
        #[arg(long, value_enum)]
        kind: Option<TableKind>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Dump {
            input,
            output,
            strings,
            localized,
            length_width,
        } => commands::dump::execute(
            &input,
            output.as_deref(),
            strings.as_deref(),
            localized,
            length_width.into(),
        ),

        Commands::Verify {
            input,
            strings,
            localized,
            length_width,
        } => commands::verify::execute(&input, strings.as_deref(), localized, length_width.into())
            .map(|_| ()),

        Commands::Scan {
            input,
            output,
            stats_only,
            strings,
            localized,
            length_width,
        } => commands::scan::execute(
            &input,
            output.as_deref(),
            stats_only,
            strings.as_deref(),
            localized,
            length_width.into(),
        ),

        Commands::Strings { input, kind } => {
            commands::strings::execute(&input, kind.map(Into::into))
        }
    }
}
