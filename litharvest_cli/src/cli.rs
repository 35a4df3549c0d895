use clap::Parser;
use litharvest_core::chunk::DEFAULT_WRAP_WIDTH;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "litharvest")]
#[command(about = "Harvest recent literature from arXiv, medRxiv and Europe PMC into per-topic CSVs")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  litharvest --terms-dir terms --out-dir data
  litharvest --terms-dir terms --out-dir data --no-medrxiv
  RUST_LOG=litharvest=debug litharvest --terms-dir terms --out-dir data

\x1b[1;36mTopic Files:\x1b[0m
  Each <topic>.txt in the terms directory defines one topic; the file stem
  becomes the output CSV name. Terms inside are separated by '|' or
  newlines, e.g.:

    gestational diabetes|preeclampsia
    fetal monitoring")]
pub struct Cli {
    /// Directory of <topic>.txt term files
    #[arg(long, default_value = "terms")]
    pub terms_dir: PathBuf,

    /// Directory the per-topic CSV files are written to
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Skip the arXiv source
    #[arg(long)]
    pub no_arxiv: bool,

    /// Skip the medRxiv source
    #[arg(long)]
    pub no_medrxiv: bool,

    /// Skip the Europe PMC source
    #[arg(long)]
    pub no_europepmc: bool,

    /// Maximum articles per topic from arXiv
    #[arg(long, default_value_t = 500)]
    pub arxiv_max: usize,

    /// Maximum articles per topic from medRxiv
    #[arg(long, default_value_t = 500)]
    pub medrxiv_max: usize,

    /// Maximum articles per topic from Europe PMC
    #[arg(long, default_value_t = 500)]
    pub europepmc_max: usize,

    /// Results requested per API page
    #[arg(long, default_value_t = 100)]
    pub page_size: usize,

    /// Maximum characters per text chunk
    #[arg(long, default_value_t = DEFAULT_WRAP_WIDTH)]
    pub wrap_width: usize,

    /// Lookback window in days for medRxiv and Europe PMC
    #[arg(long, default_value_t = 30)]
    pub days_back: i64,

    /// Preprint server for the details API (medrxiv or biorxiv)
    #[arg(long, default_value = "medrxiv")]
    pub medrxiv_server: String,

    /// arXiv API endpoint
    #[arg(long, default_value = "http://export.arxiv.org/api/query")]
    pub arxiv_base_url: String,

    /// medRxiv/bioRxiv API endpoint
    #[arg(long, default_value = "https://api.biorxiv.org")]
    pub medrxiv_base_url: String,

    /// Europe PMC REST endpoint
    #[arg(long, default_value = "https://www.ebi.ac.uk/europepmc/webservices/rest")]
    pub europepmc_base_url: String,

    /// HTTP User-Agent header
    #[arg(long, default_value = concat!("litharvest/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Attempts per HTTP request before giving up
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Base backoff in seconds between retries (grows linearly per attempt)
    #[arg(long, default_value_t = 2.0)]
    pub backoff_secs: f64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}
