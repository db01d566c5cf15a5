//! ffdb CLI
//!
//! Build, inspect and query flat-file databases from the command line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use ffdb::{Config, DataFormat, FfdbError, Key, KeyKind, OpenMode, Reader, Writer};
use tracing_subscriber::{fmt, EnvFilter};

/// ffdb CLI
#[derive(Parser, Debug)]
#[command(name = "ffdb")]
#[command(about = "Read-optimized indexed flat-file database")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Location and key type of a file pair
#[derive(ClapArgs, Debug)]
struct Pair {
    /// Data file
    data: PathBuf,

    /// Index file
    index: PathBuf,

    /// Keys are 32-byte tokens instead of integers
    #[arg(short, long)]
    token: bool,
}

/// Reader options
#[derive(ClapArgs, Debug)]
struct Open {
    #[command(flatten)]
    pair: Pair,

    /// Do not read or write the index cache
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a new database from `key<TAB>value` lines
    Build {
        #[command(flatten)]
        pair: Pair,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the record stored under a key
    Get {
        #[command(flatten)]
        open: Open,

        /// The key to look up
        key: String,
    },

    /// Show entry count, data size and cache state
    Info {
        #[command(flatten)]
        open: Open,
    },

    /// Print every index entry in key order
    Dump {
        #[command(flatten)]
        open: Open,
    },

    /// Remove all cache files derived from an index
    ClearCache {
        /// Index file
        index: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ffdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> ffdb::Result<()> {
    match command {
        Commands::Build { pair, input } => build(&pair, input),
        Commands::Get { open, key } => {
            let reader = open_reader(&open, OpenMode::USE_DATA)?;
            let key = parse_key(key.as_bytes(), kind(&open.pair))?;
            let position = reader.lookup_id(&key)?;
            let data = reader.get_data(position)?;
            // Drop the record terminator
            let record = data.strip_suffix(&[0u8]).unwrap_or(data);
            let mut stdout = io::stdout().lock();
            stdout.write_all(record)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
        Commands::Info { open } => {
            let reader = open_reader(&open, OpenMode::USE_DATA)?;
            println!("entries:   {}", reader.size());
            println!("data size: {}", reader.data_size());
            match reader.cache_path() {
                Some(path) => println!("cache:     {} (used: {})", path.display(), reader.is_cached()),
                None => println!("cache:     disabled"),
            }
            Ok(())
        }
        Commands::Dump { open } => {
            let reader = open_reader(&open, OpenMode::INDEX_ONLY)?;
            let mut stdout = io::stdout().lock();
            for entry in reader.entries() {
                writeln!(stdout, "{}\t{}\t{}", entry.key, entry.offset, entry.length)?;
            }
            Ok(())
        }
        Commands::ClearCache { index } => {
            let removed = ffdb::index::remove_caches(&index)?;
            println!("removed {} cache file(s)", removed);
            Ok(())
        }
    }
}

fn kind(pair: &Pair) -> KeyKind {
    if pair.token {
        KeyKind::Token
    } else {
        KeyKind::Int
    }
}

fn open_reader(open: &Open, mode: OpenMode) -> ffdb::Result<Reader> {
    let config = Config::builder()
        .key_kind(kind(&open.pair))
        .mode(mode)
        .cache_enabled(!open.no_cache)
        .build();
    Reader::open_with_config(&open.pair.data, &open.pair.index, &config)
}

fn parse_key(text: &[u8], kind: KeyKind) -> ffdb::Result<Key> {
    let key = match kind {
        KeyKind::Int => Key::parse_text(text, kind),
        KeyKind::Token => Key::token(text),
    };
    key.map_err(|e| FfdbError::Mode(e.to_string()))
}

fn build(pair: &Pair, input: Option<PathBuf>) -> ffdb::Result<()> {
    let source: Box<dyn BufRead> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|e| FfdbError::OpenFailed {
                path: path.clone(),
                source: e,
            })?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let kind = kind(pair);
    let mut writer = Writer::create(&pair.data, &pair.index, DataFormat::Binary)?;

    for (line_no, line) in source.split(b'\n').enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let Some(tab) = line.iter().position(|&b| b == b'\t') else {
            return Err(FfdbError::Format {
                path: input.clone().unwrap_or_else(|| PathBuf::from("<stdin>")),
                line: line_no + 1,
                reason: "expected key<TAB>value".to_string(),
            });
        };
        let key = parse_key(&line[..tab], kind)?;
        writer.write(key, &line[tab + 1..])?;
    }

    writer.close()?;
    tracing::info!("Wrote {} records", writer.entry_count());
    Ok(())
}
