//! CLI entry point for `dictlookup`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use dictlookup::config::Config;
use dictlookup::error::SearchError;
use dictlookup::lookup::{
    AsyncSearchEngine, DispatchQueue, LookupStart, ResultHandler, SearchConfiguration,
};
use dictlookup::model::{
    MatchMode, SearchField, SearchFieldSelection, SearchMode, SharedDictionary, SharedEntry,
};
use dictlookup::wordlist::load_word_list;

/// How long a single lookup may run before the CLI gives up.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "dictlookup", version, about = "Look up words in plain-text dictionaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Args)]
struct DictionaryArgs {
    /// Word list file (repeatable; adds to the configured dictionaries)
    #[arg(short, long = "dict", value_name = "FILE")]
    dicts: Vec<PathBuf>,

    /// Character encoding of the word lists (e.g. utf-8, euc-jp, shift_jis)
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an expression
    Lookup {
        /// Expression to look up
        expression: String,
        #[command(flatten)]
        dictionaries: DictionaryArgs,
        /// Search mode: exact, prefix, suffix, any, near
        #[arg(short, long)]
        mode: Option<String>,
        /// Search only the named dictionary
        #[arg(long, value_name = "NAME")]
        only: Option<String>,
        /// Fields to search, comma separated (word, reading, translation)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        /// Match against whole fields or single words: field, word
        #[arg(long = "match", value_name = "MODE")]
        match_mode: Option<String>,
        /// Edit distance for the near mode
        #[arg(long)]
        distance: Option<u32>,
        /// Maximum number of entries (0 = unlimited)
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show search modes and dictionaries with their availability
    Modes {
        #[command(flatten)]
        dictionaries: DictionaryArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file
    InitConfig,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = dictlookup::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Lookup {
            expression,
            dictionaries,
            mode,
            only,
            fields,
            match_mode,
            distance,
            limit,
            json,
        } => {
            let request = LookupRequest {
                expression,
                mode,
                only,
                fields,
                match_mode,
                distance,
                limit,
            };
            cmd_lookup(&config, &dictionaries, &request, json)
        }
        Commands::Modes { dictionaries, json } => cmd_modes(&config, &dictionaries, json),
        Commands::InitConfig => cmd_init_config(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = dictlookup::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "dictlookup.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "dictlookup", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Write the current configuration to the standard location.
fn cmd_init_config(config: &Config) -> anyhow::Result<()> {
    dictlookup::config::save_config(config)?;
    if let Some(path) = dictlookup::config::config_file_path() {
        println!("  Wrote {}", path.display());
    }
    Ok(())
}

/// Load the configured word lists plus those given on the command line.
fn load_dictionaries(config: &Config, args: &DictionaryArgs) -> anyhow::Result<Vec<SharedDictionary>> {
    let paths: Vec<&Path> = config
        .wordlist
        .dictionaries
        .iter()
        .chain(args.dicts.iter())
        .map(PathBuf::as_path)
        .collect();
    if paths.is_empty() {
        anyhow::bail!("No dictionaries given. Use --dict FILE or set [wordlist] dictionaries in the config file");
    }
    let encoding = args.encoding.as_deref().or(config.wordlist.encoding.as_deref());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Loading [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let mut dictionaries: Vec<SharedDictionary> = Vec::with_capacity(paths.len());
    for path in paths {
        pb.set_message(path.display().to_string());
        dictionaries.push(Arc::new(load_word_list(path, encoding)?));
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(dictionaries)
}

fn search_configuration(config: &Config, dictionaries: Vec<SharedDictionary>) -> SearchConfiguration {
    let mut search = SearchConfiguration::new(SearchMode::standard(), dictionaries, Vec::new());
    config.lookup.apply(&mut search);
    search
}

/// Command line overrides of the configured lookup settings.
struct LookupRequest {
    expression: String,
    mode: Option<String>,
    only: Option<String>,
    fields: Vec<String>,
    match_mode: Option<String>,
    distance: Option<u32>,
    limit: Option<usize>,
}

impl LookupRequest {
    fn apply(&self, search: &mut SearchConfiguration) -> anyhow::Result<()> {
        if let Some(name) = &self.only {
            let dictionary = search
                .dictionary_by_name(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown dictionary '{name}'"))?;
            search.with_batch(|s| {
                s.select_all_dictionaries(false);
                s.select_dictionary(&dictionary, true)
            })?;
        }
        if let Some(id) = &self.mode {
            let mode = search
                .search_mode_by_id(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown search mode '{id}'"))?;
            search.select_search_mode(&mode)?;
        }
        if !self.fields.is_empty() {
            let mut selection = *search.search_fields();
            for field in SearchField::ALL {
                selection.select(field, false);
            }
            for name in &self.fields {
                let field = SearchField::from_name(name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown search field '{name}'"))?;
                selection.select(field, true);
            }
            search.set_search_field_selection(selection);
        }
        if let Some(name) = &self.match_mode {
            let mode = MatchMode::from_name(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown match mode '{name}'"))?;
            search.select_match_mode(mode, true)?;
        }
        if let Some(distance) = self.distance {
            search.set_distance(distance);
        }
        search.set_search_expression(self.expression.clone());
        Ok(())
    }
}

/// Run one lookup and print its results.
fn cmd_lookup(
    config: &Config,
    args: &DictionaryArgs,
    request: &LookupRequest,
    json: bool,
) -> anyhow::Result<()> {
    let dictionaries = load_dictionaries(config, args)?;
    let mut search = search_configuration(config, dictionaries);
    request.apply(&mut search)?;

    let queue = DispatchQueue::new();
    let collector = Arc::new(Collector::default());
    let limit = request.limit.or(config.lookup.limit()).filter(|l| *l > 0);
    let engine = match limit {
        Some(limit) => AsyncSearchEngine::with_limit(collector.clone(), queue.dispatcher(), limit)?,
        None => AsyncSearchEngine::new(collector.clone(), queue.dispatcher())?,
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} Searching {msg}")
            .expect("valid template"),
    );
    pb.set_message(format!("\"{}\"", search.expression()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    engine.do_lookup(&search, None)?;
    let finished = queue.run_until(LOOKUP_TIMEOUT, || collector.is_finished());
    pb.finish_and_clear();
    if !finished {
        engine.cancel();
        anyhow::bail!("Lookup did not finish within {} seconds", LOOKUP_TIMEOUT.as_secs());
    }
    let elapsed = start.elapsed();

    let results = collector.take();
    if json {
        print_results_json(&search, &results, elapsed)?;
    } else {
        print_results_table(&results, elapsed);
    }
    Ok(())
}

/// Show which modes and dictionaries the configured settings leave available.
fn cmd_modes(config: &Config, args: &DictionaryArgs, json: bool) -> anyhow::Result<()> {
    let dictionaries = load_dictionaries(config, args)?;
    let search = search_configuration(config, dictionaries);

    if json {
        let modes: Vec<serde_json::Value> = search
            .search_modes()
            .iter()
            .map(|o| {
                serde_json::json!({
                    "id": o.value().id(),
                    "description": o.value().description(),
                    "enabled": o.is_enabled(),
                    "selected": o.is_selected(),
                })
            })
            .collect();
        let dicts: Vec<serde_json::Value> = search
            .dictionaries()
            .iter()
            .map(|o| {
                serde_json::json!({
                    "name": o.value().name(),
                    "enabled": o.is_enabled(),
                    "selected": search.is_dictionary_selected(o.value()),
                })
            })
            .collect();
        let output = serde_json::json!({
            "search_modes": modes,
            "dictionaries": dicts,
            "search_fields": search.enabled_search_fields(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {:<10} {:<20} {:<8}", "Mode", "Description", "State");
    println!("  {}", "-".repeat(40));
    for option in search.search_modes() {
        println!(
            "  {:<10} {:<20} {:<8}",
            option.value().id(),
            option.value().description(),
            state_label(option.is_selected(), option.is_enabled())
        );
    }
    println!();
    println!("  {:<30} {:<8}", "Dictionary", "State");
    println!("  {}", "-".repeat(40));
    for option in search.dictionaries() {
        let name: String = option.value().name().chars().take(29).collect();
        println!(
            "  {:<30} {:<8}",
            name,
            state_label(search.is_dictionary_selected(option.value()), option.is_enabled())
        );
    }
    println!();
    Ok(())
}

fn state_label(selected: bool, enabled: bool) -> &'static str {
    match (selected, enabled) {
        (true, true) => "selected",
        (false, true) => "enabled",
        (_, false) => "disabled",
    }
}

// ── Result collection ───────────────────────────────────────────

#[derive(Default)]
struct Results {
    entries: Vec<SharedEntry>,
    errors: Vec<String>,
    notes: Vec<String>,
    dictionaries: usize,
}

/// Collects the results of one lookup on the dispatch context.
#[derive(Default)]
struct Collector {
    results: Mutex<Results>,
    finished: AtomicBool,
}

impl Collector {
    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn take(&self) -> Results {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Results> {
        self.results
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ResultHandler for Collector {
    fn start(&self, start: &LookupStart) {
        tracing::debug!(lookup = %start.summary(), "Lookup started");
        *self.lock() = Results::default();
    }

    fn dictionary(&self, _dictionary: &SharedDictionary) {
        self.lock().dictionaries += 1;
    }

    fn entry(&self, entry: &SharedEntry) {
        self.lock().entries.push(entry.clone());
    }

    fn exception(&self, error: &SearchError) {
        self.lock().errors.push(error.to_string());
    }

    fn note(&self, note: &str) {
        self.lock().notes.push(note.to_string());
    }

    fn end(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

// ── Output ──────────────────────────────────────────────────────

/// Print lookup results as a human-readable table.
fn print_results_table(results: &Results, elapsed: Duration) {
    println!();
    println!(
        "  {} result(s) from {} dictionary(ies) in {:.1} ms",
        results.entries.len(),
        results.dictionaries,
        elapsed.as_secs_f64() * 1000.0
    );
    println!();

    for error in &results.errors {
        println!("  ! {error}");
    }
    for note in &results.notes {
        println!("  * {note}");
    }

    if results.entries.is_empty() {
        return;
    }

    println!("  {:<4} {:<20} {:<20} {:<40}", "#", "Word", "Reading", "Translations");
    println!("  {}", "-".repeat(86));

    for (i, entry) in results.entries.iter().enumerate() {
        let word: String = entry.word().chars().take(19).collect();
        let reading: String = entry.reading().unwrap_or("").chars().take(19).collect();
        let translations: String = entry.translations().join("; ").chars().take(39).collect();
        println!("  {:<4} {:<20} {:<20} {:<40}", i + 1, word, reading, translations);
    }
    println!();
}

/// Print lookup results as JSON.
fn print_results_json(
    search: &SearchConfiguration,
    results: &Results,
    elapsed: Duration,
) -> anyhow::Result<()> {
    let items: Vec<serde_json::Value> = results
        .entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "dictionary": e.dictionary_name(),
                "word": e.word(),
                "reading": e.reading(),
                "translations": e.translations(),
            })
        })
        .collect();

    let fields: &SearchFieldSelection = search.search_fields();
    let output = serde_json::json!({
        "expression": search.expression(),
        "mode": search.selected_search_mode().map(|m| m.id()),
        "search_fields": fields,
        "elapsed_ms": elapsed.as_millis() as u64,
        "result_count": results.entries.len(),
        "results": items,
        "errors": results.errors,
        "notes": results.notes,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
