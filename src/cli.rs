// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, Result, WrapErr};

use crate::config::consts::*;
use crate::config::options::{AppOptions, ExportFormat, FetchOptions, InputSource};
use crate::file;
use crate::model::PriceSuggester;
use crate::progress::Progress;
use crate::scrape::Fetcher;
use crate::store::DataSet;

#[derive(Parser, Debug)]
#[command(name = "dynamic_pricing", version, about = "Suggest prices by regression and scrape competitor prices")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit on a sales table and append a suggested_price column.
    Suggest(SuggestArgs),
    /// Scrape competitor prices from product pages.
    Fetch(FetchArgs),
    /// Write the built-in sample table.
    Sample(OutputArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => ExportFormat::Csv,
            Format::Tsv => ExportFormat::Tsv,
        }
    }
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output file, or directory (trailing separator) for a default name. Stdout if omitted.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: Format,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Sales table with demand, time, competitor_price, actual_price.
    /// `.tsv`/`.tab` files are read tab separated, anything else as CSV.
    #[arg(short, long, conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Use the built-in five-row sample table.
    #[arg(long)]
    pub sample: bool,

    /// Decimal places for suggested_price.
    #[arg(long, default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,

    /// Keep full precision in suggested_price.
    #[arg(long, conflicts_with = "decimals")]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Competitor product URLs.
    pub urls: Vec<String>,

    /// File with one URL per line.
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// CSS selector of the price element.
    #[arg(long, default_value = DEFAULT_PRICE_SELECTOR)]
    pub selector: String,

    /// Parallel requests. Output order always follows input order.
    #[arg(long, default_value_t = WORKERS)]
    pub workers: usize,

    /// Read prices from 4xx/5xx pages too.
    #[arg(long)]
    pub parse_error_pages: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Cli {
    /// Fold parsed arguments into option structs.
    pub fn options(&self) -> AppOptions {
        let mut opts = AppOptions::default();
        match &self.command {
            Command::Suggest(a) => {
                opts.suggest.input = match &a.input {
                    Some(p) => InputSource::File(p.clone()),
                    None => InputSource::Sample,
                };
                opts.export.decimals = if a.raw { None } else { Some(a.decimals) };
                apply_output(&mut opts, &a.output);
            }
            Command::Fetch(a) => {
                opts.fetch = FetchOptions {
                    selector: a.selector.clone(),
                    workers: a.workers,
                    parse_error_pages: a.parse_error_pages,
                    ..FetchOptions::default()
                };
                apply_output(&mut opts, &a.output);
            }
            Command::Sample(o) => apply_output(&mut opts, o),
        }
        opts
    }
}

fn apply_output(opts: &mut AppOptions, out: &OutputArgs) {
    opts.export.format = out.format.into();
    if let Some(p) = &out.out {
        opts.export.set_path(&p.to_string_lossy());
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose);
    let opts = cli.options();

    match &cli.command {
        Command::Suggest(a) => {
            if a.input.is_none() && !a.sample {
                logw!("no --input given; using the built-in sample table");
            }
            suggest(&opts)
        }
        Command::Fetch(a) => {
            let mut urls = a.urls.iter().map(|u| u.trim().to_string()).filter(|u| !u.is_empty()).collect::<Vec<_>>();
            if let Some(path) = &a.urls_file {
                let more = file::read_url_list(path)
                    .wrap_err_with(|| format!("reading URL list {}", path.display()))?;
                urls.extend(more);
            }
            if urls.is_empty() {
                bail!("no URLs given (pass them as arguments or with --urls-file)");
            }
            fetch(&opts, &urls)
        }
        Command::Sample(_) => {
            let written = file::export_dataset(&opts.export, DEFAULT_SAMPLE_FILE, &DataSet::sample())?;
            report_written(written);
            Ok(())
        }
    }
}

fn suggest(opts: &AppOptions) -> Result<()> {
    let ds = match &opts.suggest.input {
        InputSource::Sample => DataSet::sample(),
        InputSource::File(p) => DataSet::load(p, ExportFormat::for_path(p).delim())
            .wrap_err_with(|| format!("loading {}", p.display()))?,
    };

    let rows = ds.training_rows().wrap_err(
        "data must include numeric columns: demand, time, competitor_price, actual_price",
    )?;

    let mut model = PriceSuggester::new();
    let prices = model.suggest(&rows).wrap_err("fitting the pricing model")?;

    if let (Some(coef), Some(b)) = (model.model().coefficients(), model.model().intercept()) {
        logf!(
            "price = {b:.4} + {:.6}*demand + {:.6}*time + {:.6}*competitor_price",
            coef[0], coef[1], coef[2]
        );
    }
    if let Ok(r2) = model.r_squared(&rows) {
        logf!("R² on training data: {r2:.4}");
    }

    let out = ds.with_suggested_prices(&prices, opts.export.decimals)?;
    let written = file::export_dataset(&opts.export, DEFAULT_SUGGEST_FILE, &out)?;
    report_written(written);
    Ok(())
}

fn fetch(opts: &AppOptions, urls: &[String]) -> Result<()> {
    let fetcher = Fetcher::from_options(&opts.fetch).wrap_err("invalid fetch options")?;
    logf!("fetching {} URL(s), rule `{}`", urls.len(), fetcher.rule().describe());

    let mut progress = StderrProgress::default();
    let prices = fetcher.fetch_prices(urls, Some(&mut progress));

    let written = file::export_dataset(&opts.export, DEFAULT_PRICES_FILE, &file::prices_to_dataset(&prices))?;
    report_written(written);
    Ok(())
}

fn report_written(path: Option<PathBuf>) {
    if let Some(p) = path {
        eprintln!("Wrote {}", p.display());
    }
}

/// Per-URL status lines on stderr so stdout stays clean CSV.
#[derive(Default)]
struct StderrProgress {
    total: usize,
    seen: usize,
    failed: usize,
}

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, _index: usize, url: &str) {
        self.seen += 1;
        eprintln!("[{}/{}] ok      {url}", self.seen, self.total);
    }

    fn item_failed(&mut self, _index: usize, url: &str, reason: &str) {
        self.seen += 1;
        self.failed += 1;
        eprintln!("[{}/{}] {reason:<7} {url}", self.seen, self.total);
    }

    fn finish(&mut self) {
        let msg = format!("{} of {} URL(s) without a price", self.failed, self.total);
        self.log(&msg);
    }
}
