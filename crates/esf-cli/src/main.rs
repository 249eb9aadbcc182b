//! Extra Search Filters CLI
//!
//! Runs the result filters outside the browser: over saved search pages,
//! over `results_html` responses, or over a page fetched live from the store.

mod fetch;
mod report;

use std::fs;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use esf_core::{Bound, FilterFlags, FilterOptions, OptionsConfig, SearchResponse};
use esf_markup::{parse_fragment, parse_page, ScrapedResult};

use fetch::{fetch_results, FetchOptions};
use report::FilterReport;

#[derive(Parser)]
#[command(name = "esf-cli")]
#[command(about = "Steam store search filters, outside the browser")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a saved search page or results response
    Filter {
        /// HTML page, HTML fragment or JSON results response
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch one page of results from the store and filter it
    Fetch {
        /// Search term
        #[arg(short, long)]
        term: String,

        /// Offset of the first result
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Number of results to request
        #[arg(long, default_value_t = 50)]
        count: u32,

        /// Store country code (prices depend on it)
        #[arg(long)]
        cc: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved filter options
    Options {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Filter options given on the command line.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// JSON options file; flags below override it
    #[arg(short, long)]
    options: Option<String>,

    /// Lowest final price
    #[arg(long)]
    min_price: Option<f64>,

    /// Highest final price
    #[arg(long)]
    max_price: Option<f64>,

    /// Lowest price before discount
    #[arg(long)]
    base_min_price: Option<f64>,

    /// Highest price before discount
    #[arg(long)]
    base_max_price: Option<f64>,

    /// Minimum discount percentage
    #[arg(long)]
    discount: Option<f64>,

    /// Minimum positive review percentage
    #[arg(long)]
    rating: Option<f64>,

    /// Let free and unpriced products through the price filter
    #[arg(long)]
    free: bool,

    /// Hide demos and prologues
    #[arg(long)]
    no_demo: bool,

    /// Leave owned products to the store's own filter
    #[arg(long)]
    pass_owned: bool,

    /// Leave ignored products to the store's own filter
    #[arg(long)]
    pass_ignored: bool,

    /// Leave wishlisted products to the store's own filter
    #[arg(long)]
    pass_wishlist: bool,
}

impl FilterArgs {
    fn resolve(&self) -> Result<FilterOptions, String> {
        let mut options = match &self.options {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
                FilterOptions::from_json(&text)
                    .map_err(|e| format!("Invalid options in '{}': {}", path, e))?
            }
            None => FilterOptions::new(),
        };

        let price_flags = self.min_price.is_some() || self.max_price.is_some() || self.free;
        let discount_flags =
            self.base_min_price.is_some() || self.base_max_price.is_some() || self.discount.is_some();
        if price_flags || discount_flags {
            options.set_flag(FilterFlags::PRICE_FILTERING, true);
        }
        if discount_flags {
            options.set_flag(FilterFlags::WITH_DISCOUNT, true);
        }

        for (flag, on) in [
            (FilterFlags::FILTER_F2P, self.free),
            (FilterFlags::FILTER_DEMO, self.no_demo),
            (FilterFlags::PASS_OWNED, self.pass_owned),
            (FilterFlags::PASS_IGNORED, self.pass_ignored),
            (FilterFlags::PASS_WISHLIST, self.pass_wishlist),
        ] {
            if on {
                options.set_flag(flag, true);
            }
        }

        // Upper bounds first; a lower bound above them pulls them up.
        for (bound, value) in [
            (Bound::MaxPrice, self.max_price),
            (Bound::MinPrice, self.min_price),
            (Bound::BaseMaxPrice, self.base_max_price),
            (Bound::BaseMinPrice, self.base_min_price),
            (Bound::Discount, self.discount),
            (Bound::Rating, self.rating),
        ] {
            if let Some(value) = value {
                if !(0.0..=100.0).contains(&value) && matches!(bound, Bound::Discount | Bound::Rating) {
                    return Err(format!("--{} must be between 0 and 100", bound_flag(bound)));
                }
                options.set_bound(bound, value);
            }
        }

        Ok(options)
    }
}

fn bound_flag(bound: Bound) -> &'static str {
    match bound {
        Bound::MinPrice => "min-price",
        Bound::MaxPrice => "max-price",
        Bound::BaseMinPrice => "base-min-price",
        Bound::BaseMaxPrice => "base-max-price",
        Bound::Discount => "discount",
        Bound::Rating => "rating",
    }
}

// =============================================================================
// Logging
// =============================================================================

/// `--verbose` wins over `RUST_LOG`.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Stderr subscriber. `log` records from the library crates are forwarded to it.
fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

// =============================================================================
// Commands
// =============================================================================

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Filter { input, filters, json } => cmd_filter(&input, &filters, json, cli.verbose),
        Commands::Fetch {
            term,
            start,
            count,
            cc,
            filters,
            json,
        } => cmd_fetch(
            FetchOptions {
                term,
                start,
                count,
                country: cc,
            },
            &filters,
            json,
            cli.verbose,
        ),
        Commands::Options { filters } => cmd_options(&filters),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Rows of a saved page, a bare fragment, or a JSON results response.
fn load_results(content: &str) -> Result<Vec<ScrapedResult>, String> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        let response = SearchResponse::decode(trimmed)
            .map_err(|e| format!("Invalid results response: {}", e))?;
        return Ok(parse_fragment(&response.results_html));
    }
    match parse_page(content) {
        Ok(rows) => Ok(rows),
        Err(e) => {
            log::debug!("{e}; reading input as a results fragment");
            Ok(parse_fragment(content))
        }
    }
}

fn emit(report: &FilterReport, json: bool, verbose: bool) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| format!("Failed to encode report: {}", e))?;
        println!("{text}");
    } else {
        report.print(verbose);
    }
    Ok(())
}

fn cmd_filter(input: &str, filters: &FilterArgs, json: bool, verbose: bool) -> Result<(), String> {
    let options = filters.resolve()?;
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let results = load_results(&content)?;
    if results.is_empty() {
        log::warn!("No search results found in '{input}'");
    }

    emit(&FilterReport::build(input, &results, &options), json, verbose)
}

fn cmd_fetch(opts: FetchOptions, filters: &FilterArgs, json: bool, verbose: bool) -> Result<(), String> {
    let options = filters.resolve()?;
    let response = fetch_results(&opts)?;
    if let Some(total) = response.total_count {
        log::debug!("Store reports {total} results for '{}'", opts.term);
    }
    if let Some(start) = response.start {
        if start != u64::from(opts.start) {
            log::warn!("Requested offset {} but the store answered from {start}", opts.start);
        }
    }

    let results = parse_fragment(&response.results_html);
    let source = source_label(&opts);
    emit(&FilterReport::build(&source, &results, &options), json, verbose)
}

fn source_label(opts: &FetchOptions) -> String {
    format!("{} [{}..{}]", opts.term, opts.start, opts.start.saturating_add(opts.count))
}

fn cmd_options(filters: &FilterArgs) -> Result<(), String> {
    let options = filters.resolve()?;
    let config = OptionsConfig::from(&options);
    let text = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("Failed to encode options: {}", e))?;

    println!("{text}");
    if !options.is_active() {
        eprintln!("No active filters");
    }
    Ok(())
}
