use clap::{Parser, ValueEnum};
use csvprofiler::output::{render_text, ErrorResponse};
use csvprofiler::types::constants::DEFAULT_DB_PORT;
use csvprofiler::{
    Config, CsvProfiler, DbConfig, DecodeErrorType, HeaderMode, HistoryStore, PgHistoryStore,
};
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Default config file location
const DEFAULT_CONFIG_FILE: &str = "/etc/csvprofiler.conf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// CSV Profiler - Summarize every column of a CSV file
#[derive(Parser, Debug)]
#[command(name = "csvprofiler")]
#[command(about = "Profile a CSV file: column types, missing values and numeric statistics")]
#[command(
    version,
    after_help = "Tool will print the dataset summary in JSON format.\nOn failure it prints a JSON object whose \"error\" field holds the error code.\nSet RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr."
)]
struct Args {
    /// Path to CSV file
    #[arg(short = 'f', long = "filename", required_unless_present = "history")]
    filename: Option<String>,

    /// User ID owning the dataset history
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// List the user's dataset history instead of analyzing a file
    #[arg(long = "history", requires = "user")]
    history: bool,

    /// Path to config file (default: /etc/csvprofiler.conf)
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// PostgreSQL host (overrides config file and env vars)
    #[arg(long = "db-host")]
    db_host: Option<String>,

    /// PostgreSQL port (default: 5432)
    #[arg(long = "db-port")]
    db_port: Option<u16>,

    /// PostgreSQL database name
    #[arg(long = "db-name")]
    db_name: Option<String>,

    /// PostgreSQL user
    #[arg(long = "db-user")]
    db_user: Option<String>,

    /// PostgreSQL password (can also use PGPASSWORD env var)
    #[arg(long = "db-password")]
    db_password: Option<String>,

    /// Number of lines sampled for delimiter detection (default: 1000)
    #[arg(long = "scan-lines")]
    scan_lines: Option<usize>,

    /// Number of data rows to include in the preview (default: 10)
    #[arg(long = "preview-rows")]
    preview_rows: Option<usize>,

    /// Maximum file size in bytes (default: 100MB)
    #[arg(long = "max-bytes")]
    max_bytes: Option<u64>,

    /// How to treat the first row
    #[arg(long = "header", value_enum, default_value_t = HeaderMode::FirstRow)]
    header: HeaderMode,

    /// Field delimiter; a single character or "tab" (default: detect)
    #[arg(long = "delimiter", value_parser = parse_separator)]
    delimiter: Option<char>,

    /// Quote character (default: detect)
    #[arg(long = "quote", value_parser = parse_separator)]
    quote: Option<char>,

    /// Count numeric-looking text as the matching number in unique counts
    #[arg(long = "unify-numeric-text")]
    unify_numeric_text: bool,

    /// Number of most frequent values reported per categorical column (default: 5)
    #[arg(long = "top-values")]
    top_values: Option<usize>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn parse_separator(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\\t" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c),
                _ => Err(format!("expected a single ASCII character, got {:?}", value)),
            }
        }
    }
}

fn fail(error: DecodeErrorType, file_name: &str, internal: String) -> ! {
    let response = ErrorResponse::new(error, file_name.to_string()).with_internal_message(internal);
    eprintln!("{}", response.to_json());
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let filename = args.filename.clone().unwrap_or_default();

    // Validate file exists
    if !args.history && !Path::new(&filename).exists() {
        fail(
            DecodeErrorType::Sample,
            &filename,
            format!("File not found: {}", filename),
        );
    }

    let db_config = match build_db_config(&args) {
        Ok(config) => config,
        Err(e) => fail(DecodeErrorType::Process, &filename, e),
    };

    let config = build_config(&args, filename.clone(), db_config);
    let store = connect_history(&config, args.history);
    let mut profiler = CsvProfiler::new(config);
    if let Some(store) = store {
        profiler = profiler.with_history(store);
    }

    if args.history {
        match profiler.history() {
            Ok(response) => println!("{}", response.to_json()),
            Err(e) => fail(e.error_type(), &filename, e.to_string()),
        }
        return;
    }

    match args.format {
        OutputFormat::Json => println!("{}", profiler.analyze()),
        OutputFormat::Text => match profiler.analyze_internal() {
            Ok(response) => print!("{}", render_text(&response.file_name, &response.summary)),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}

/// Apply command-line options on top of the defaults
fn build_config(args: &Args, filename: String, db_config: Option<DbConfig>) -> Config {
    let mut config = Config::new(filename);
    if let Some(ref user) = args.user {
        config = config.with_user(user.clone());
    }
    if let Some(db) = db_config {
        config = config.with_db_config(db);
    }
    config.decode.header_mode = args.header;
    config.decode.delimiter = args.delimiter;
    config.decode.quote = args.quote;
    config.profile.unify_numeric_text = args.unify_numeric_text;
    if let Some(scan_lines) = args.scan_lines {
        config.decode.scan_lines = scan_lines;
    }
    if let Some(preview_rows) = args.preview_rows {
        config.preview_rows = preview_rows;
    }
    if let Some(max_bytes) = args.max_bytes {
        config.max_file_bytes = max_bytes;
    }
    if let Some(top_values) = args.top_values {
        config.profile.top_values = top_values;
    }
    config
}

/// Open the history store when a user and database are configured.
/// Connection problems only disable history, unless history was requested.
fn connect_history(config: &Config, required: bool) -> Option<Box<dyn HistoryStore>> {
    config.user_id.as_ref()?;
    let db = match &config.db {
        Some(db) => db,
        None if required => fail(
            DecodeErrorType::Database,
            &config.filename,
            "Database configuration not found. Please provide configuration via:\n\
             - Config file (--config or /etc/csvprofiler.conf)\n\
             - Environment variables (PGHOST, PGPORT, PGDATABASE, PGUSER, PGPASSWORD)\n\
             - CLI arguments (--db-host, --db-name, --db-user, --db-password)"
                .to_string(),
        ),
        None => return None,
    };

    match PgHistoryStore::connect(db) {
        Ok(store) => Some(Box::new(store)),
        Err(e) if required => fail(e.error_type(), &config.filename, e.to_string()),
        Err(e) => {
            warn!("Dataset history disabled: {}", e);
            None
        }
    }
}

/// Resolve database settings. Priority: CLI args > config file > environment.
/// Returns `Ok(None)` when nothing is configured.
fn build_db_config(args: &Args) -> Result<Option<DbConfig>, String> {
    let mut db_config: Option<DbConfig> = None;

    if let Some(ref config_path) = args.config_file {
        if !Path::new(config_path).exists() {
            return Err(format!("Config file not found: {}", config_path));
        }
        let config = DbConfig::from_file(config_path)
            .map_err(|e| format!("Failed to load config file {}: {}", config_path, e))?;
        db_config = Some(config);
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        db_config = DbConfig::from_file(DEFAULT_CONFIG_FILE).ok();
    }

    if db_config.is_none() {
        db_config = DbConfig::from_env().ok();
    }

    let mut config = match db_config {
        Some(config) => config,
        None => match (&args.db_host, &args.db_name, &args.db_user, &args.db_password) {
            (Some(host), Some(name), Some(user), Some(password)) => DbConfig::new(
                host.clone(),
                args.db_port.unwrap_or(DEFAULT_DB_PORT),
                name.clone(),
                user.clone(),
                password.clone(),
            ),
            _ => return Ok(None),
        },
    };

    // CLI arguments override everything
    if let Some(ref host) = args.db_host {
        config.host = host.clone();
    }
    if let Some(port) = args.db_port {
        config.port = port;
    }
    if let Some(ref name) = args.db_name {
        config.database = name.clone();
    }
    if let Some(ref user) = args.db_user {
        config.user = user.clone();
    }
    if let Some(ref password) = args.db_password {
        config.password = password.clone();
    }

    Ok(Some(config))
}
