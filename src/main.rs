use clap::{Args, Parser, Subcommand};
use log::{debug, warn};
use std::path::PathBuf;
use std::time::Instant;

use shred_score::api::{ApiClient, FetchError, HistoryCache, HistoryEntry};
use shred_score::fetch::{load_dashboard, DataSource};
use shred_score::listing::{process, ListConfig, SortKey};
use shred_score::output;

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_DATA_UNAVAILABLE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Clone, Default)]
struct ListArgs {
    /// Only resorts whose name contains this text (case-insensitive)
    #[arg(short, long)]
    search: Option<String>,

    /// Hide fully closed resorts
    #[arg(long)]
    open_only: bool,

    /// Country code, e.g. AT
    #[arg(long)]
    country: Option<String>,

    /// Region name, e.g. Tirol
    #[arg(long)]
    region: Option<String>,

    /// Sort key: shredScore, snowMountain, newSnow, slopesOpenKm, liftsOpen, name
    #[arg(long)]
    sort: Option<String>,

    /// Number of resorts to show (defaults to page_size from config)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

impl ListArgs {
    fn to_list_config(&self, default_page_size: usize) -> ListConfig {
        let sort_key = match self.sort.as_deref() {
            None => Some(SortKey::ShredScore),
            Some(name) => {
                let key = SortKey::parse(name);
                if key.is_none() {
                    warn!(
                        "Unknown sort key '{}', keeping server order (valid keys: {})",
                        name,
                        SortKey::valid_names()
                    );
                }
                key
            }
        };
        ListConfig {
            search_query: self.search.clone().unwrap_or_default(),
            open_only: self.open_only,
            country: self.country.clone().unwrap_or_default(),
            region: self.region.clone().unwrap_or_default(),
            sort_key,
            page_size: self.limit.unwrap_or(default_page_size),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List resorts ranked by Shred Score (default if no subcommand)
    List {
        #[command(flatten)]
        filters: ListArgs,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show conditions and the score breakdown of one resort
    Show {
        /// Resort id
        id: String,
    },
    /// Dashboard summary over all resorts
    Stats,
    /// Condition history of one or more resorts
    History {
        /// Resort ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Open a resort's report page in the browser by its index number
    Open {
        /// Index number of the resort to open (1-based, as shown in list)
        index: usize,

        #[command(flatten)]
        filters: ListArgs,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "shred-score")]
#[command(about = "Rank ski resorts by live snow conditions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/shred-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Use the bundled sample dataset instead of the API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,shred_score=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Data errors exit with EXIT_DATA_UNAVAILABLE, everything else with EXIT_ERROR
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<FetchError>().is_some() {
        EXIT_DATA_UNAVAILABLE
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let command = cli.command.unwrap_or(Commands::List {
        filters: ListArgs::default(),
        tsv: false,
    });
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = shred_score::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match shred_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = shred_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let source = if cli.mock {
        DataSource::Mock
    } else {
        let client = config
            .request_timeout()
            .and_then(|timeout| ApiClient::new(&config.api_url, timeout));
        match client {
            Ok(c) => DataSource::Api(c),
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    };

    // History needs no collection; fetch it directly
    if let Commands::History { ids } = &command {
        let client = match &source {
            DataSource::Api(client) => client.clone(),
            DataSource::Mock => {
                eprintln!("History is only available from the API (drop --mock).");
                std::process::exit(EXIT_DATA_UNAVAILABLE);
            }
        };
        let cache = HistoryCache::new();
        let results = cache
            .load_many(ids, |id| {
                let client = client.clone();
                async move { client.fetch_history(&id).await }
            })
            .await;

        let use_colors = output::should_use_colors();
        let blocks: Vec<String> = results
            .iter()
            .map(|(id, entry)| output::format_history(&format!("Resort {}", id), entry, use_colors))
            .collect();
        println!("{}", blocks.join("\n\n"));
        debug!("History for {} resorts in {:?}", results.len(), start_time.elapsed());

        let all_failed = results.iter().all(|(_, e)| matches!(e, HistoryEntry::Failed(_)));
        std::process::exit(if all_failed { EXIT_DATA_UNAVAILABLE } else { EXIT_SUCCESS });
    }

    let dashboard = match load_dashboard(&source, &config.scoring).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(exit_code_for(&e));
        }
    };
    debug!(
        "Loaded {} resorts in {:?} ({} server scores, {} computed)",
        dashboard.resorts.len(),
        start_time.elapsed(),
        dashboard.stats.from_server,
        dashboard.stats.computed
    );

    let use_colors = output::should_use_colors();

    // Route based on subcommand
    match command {
        Commands::List { filters, tsv } => {
            let list_config = filters.to_list_config(config.page_size);
            let result = process(&dashboard.resorts, &list_config);

            if tsv {
                if !result.visible.is_empty() {
                    println!("{}", output::format_tsv(&result.visible));
                }
            } else {
                println!("{}", output::format_resort_table(&result.visible, 1, use_colors));
                if result.has_more() {
                    println!();
                    println!(
                        "Showing {} of {} resorts (use --limit to see more)",
                        result.visible.len(),
                        result.total_filtered
                    );
                }
            }
        }
        Commands::Show { id } => {
            let Some(resort) = dashboard.resorts.iter().find(|r| r.id == id) else {
                eprintln!("No resort with id '{}'.", id);
                std::process::exit(EXIT_ERROR);
            };
            let now = chrono::Local::now().naive_local();
            println!("{}", output::format_resort_detail(resort, now, use_colors));
        }
        Commands::Stats => {
            println!("{}", output::format_summary(&dashboard.summary, use_colors));
        }
        Commands::Open { index, filters } => {
            let list_config = filters.to_list_config(config.page_size);
            let result = process(&dashboard.resorts, &list_config);

            // Validate index bounds (1-based)
            if index < 1 || index > result.visible.len() {
                eprintln!(
                    "Invalid index {}. Must be between 1 and {}.",
                    index,
                    result.visible.len()
                );
                std::process::exit(EXIT_ERROR);
            }

            let resort = result.visible[index - 1];
            if let Err(e) = shred_score::browser::open_resort_page(resort) {
                eprintln!("Failed to open browser: {:#}", e);
                std::process::exit(EXIT_ERROR);
            }

            println!("Opening {} in browser: {}", resort.name, resort.url);
        }
        // Handled before the collection is loaded
        Commands::History { .. } | Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
