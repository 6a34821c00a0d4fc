//! Command-line front end for PubMed / PubMed Central retrieval and cleanup.
//!
//! Diagnostics go to stderr (filter with `RUST_LOG`); results go to stdout.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use pmc_extract::patterns::{
    ABSTRACT_CLEANUP, PAGE_LAYOUT, PAGE_LINKS, PAGE_WRAPPERS, STRUCTURAL_STRIP,
};
use pmc_extract::{
    sanitize, sanitize_with, search_to_file, EntrezClient, HttpSource, Options, RuleTable,
    Ruleset, SearchService,
};

#[derive(Parser, Debug)]
#[command(
    name = "pmc-extract",
    version,
    about = "Fetch and clean PubMed / PubMed Central articles"
)]
struct Cli {
    /// JSON file with `Options` overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search a database and print (or save) the matching ids.
    Search(SearchArgs),
    /// Map a PMC id to its PubMed id.
    Pmid { pmcid: String },
    /// Print the citation of an article.
    Citation(CitationArgs),
    /// Print the title and abstract of a PubMed article.
    Abstract { pmid: String },
    /// Print or save the full-text XML of a PMC article.
    Paper(SaveArgs),
    /// Save the PDF rendition of a PMC article.
    Pdf {
        pmcid: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print the cleaned HTML rendition of a PMC article.
    Page {
        pmcid: String,
        /// Print the page as downloaded, without cleanup.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Print the methods sections of a PMC article.
    Methods {
        pmcid: String,
        /// Strip the section markup down to text.
        #[arg(long, default_value_t = false)]
        text: bool,
    },
    /// Clean a local file (or stdin with `-`) without touching the network.
    Sanitize(SanitizeArgs),
    /// Print a built-in rule table as editable JSON.
    Rules {
        #[arg(value_enum)]
        table: BuiltinTable,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    query: String,
    #[arg(long, default_value = "pmc")]
    db: String,
    #[arg(long, default_value_t = 20)]
    max: usize,
    /// Write ids here, one per line, instead of printing them.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Print only the number of matches.
    #[arg(long, default_value_t = false)]
    count: bool,
}

#[derive(Args, Debug)]
struct CitationArgs {
    id: String,
    #[arg(long, default_value = "pubmed")]
    db: String,
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct SaveArgs {
    pmcid: String,
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SanitizeArgs {
    /// Input file, `-` for stdin.
    input: PathBuf,
    #[arg(long, value_enum, default_value_t = RulesetArg::Structural)]
    ruleset: RulesetArg,
    /// JSON rule table to apply instead of a built-in ruleset.
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum RulesetArg {
    Structural,
    Abstract,
    Page,
}

impl From<RulesetArg> for Ruleset {
    fn from(arg: RulesetArg) -> Self {
        match arg {
            RulesetArg::Structural => Self::StructuralStrip,
            RulesetArg::Abstract => Self::AbstractCleanup,
            RulesetArg::Page => Self::HtmlPageCleanup,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum BuiltinTable {
    Structural,
    Abstract,
    PageLinks,
    PageLayout,
    PageWrappers,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let options = match &cli.config {
        Some(path) => Options::from_json_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => Options::default(),
    };

    let client = || EntrezClient::http(&options);

    match cli.command {
        Commands::Search(args) => {
            let client = client()?;
            if args.count {
                println!("{}", client.count(&args.db, &args.query, args.max)?);
            } else if let Some(path) = &args.output {
                search_to_file(&client, &args.db, &args.query, args.max, path)?;
            } else {
                for id in client.search(&args.db, &args.query, args.max)? {
                    println!("{id}");
                }
            }
        }
        Commands::Pmid { pmcid } => match client()?.pmid_for(&pmcid)? {
            Some(pmid) => println!("{pmid}"),
            None => bail!("no PubMed id found for PMC{pmcid}"),
        },
        Commands::Citation(args) => {
            let citation = client()?.citation(&args.db, &args.id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&citation)?);
            } else {
                println!("{citation}");
            }
        }
        Commands::Abstract { pmid } => println!("{}", client()?.abstract_text(&pmid)?),
        Commands::Paper(args) => run_paper(&client()?, &args)?,
        Commands::Pdf { pmcid, output } => {
            client()?.save_pdf(&pmcid, &output)?;
        }
        Commands::Page { pmcid, raw } => {
            let client = client()?;
            if raw {
                println!("{}", client.page(&pmcid).content());
            } else {
                println!("{}", client.clean_page(&pmcid)?);
            }
        }
        Commands::Methods { pmcid, text } => {
            let methods = client()?.methods_section(&pmcid)?;
            if text {
                println!("{}", sanitize(&methods, Ruleset::StructuralStrip)?);
            } else {
                println!("{methods}");
            }
        }
        Commands::Sanitize(args) => run_sanitize(&args)?,
        Commands::Rules { table } => {
            let table = match table {
                BuiltinTable::Structural => &*STRUCTURAL_STRIP,
                BuiltinTable::Abstract => &*ABSTRACT_CLEANUP,
                BuiltinTable::PageLinks => &*PAGE_LINKS,
                BuiltinTable::PageLayout => &*PAGE_LAYOUT,
                BuiltinTable::PageWrappers => &*PAGE_WRAPPERS,
            };
            println!("{}", table.to_json()?);
        }
    }
    Ok(())
}

fn run_paper(client: &EntrezClient<HttpSource>, args: &SaveArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            if !client.save_paper(&args.pmcid, path)? {
                bail!("PMC{} has no full text", args.pmcid);
            }
        }
        None => match client.paper(&args.pmcid)? {
            Some(xml) => println!("{xml}"),
            None => bail!("PMC{} has no full text", args.pmcid),
        },
    }
    Ok(())
}

fn run_sanitize(args: &SanitizeArgs) -> Result<()> {
    let input = read_input(&args.input)?;
    let output = match &args.rules {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading rule table {}", path.display()))?;
            let name = path
                .file_stem()
                .map_or_else(|| "custom".to_string(), |s| s.to_string_lossy().into_owned());
            let table = RuleTable::from_json(&name, &json)?;
            sanitize_with(&input, &table)
        }
        None => sanitize(&input, args.ruleset.into())?,
    };
    println!("{output}");
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(pmc_extract::encoding::decode_document(&bytes, None))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
