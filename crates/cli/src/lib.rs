use anyhow::{Context as AnyhowContext, Result};
use catalog_loader::{
    merge_local_paths, DirectorySource, FragmentSource, HttpSource, Loader, SkipReason,
};
use catalog_protocol::{
    document_schema, serialize_json, serialize_json_pretty, CatalogDocument, FileNaming, Tag,
    TagList, UNKNOWN_TAG,
};
use catalog_search::CatalogView;
use clap::{Args, Parser, Subcommand};
use config::{clamp_open_depth, CatalogConfig};
use flags::SourceKind;
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod flags;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Browse and search a component catalog built from per-tag JSON fragments", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (JSON or TOML)
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Fragment directory or http(s) base URL
    #[arg(long, global = true, env = "CATALOG_SOURCE")]
    source: Option<String>,

    /// How to interpret --source
    #[arg(long, global = true, value_enum, default_value_t = SourceKind::Auto)]
    source_kind: SourceKind,

    /// Prefix prepended to every fragment file name
    #[arg(long, global = true)]
    file_prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every tag fragment and print the merged catalog
    Load(LoadArgs),

    /// Load the catalog and filter it by a query
    Search(SearchArgs),

    /// Merge local JSON files into one catalog
    Merge(MergeArgs),

    /// List the configured tags and their fragment file names
    Tags(TagsArgs),

    /// Resolve a file name to its tag
    Resolve(ResolveArgs),

    /// Print the JSON schema of the catalog document
    Schema,
}

#[derive(Args)]
struct OutputArgs {
    /// Emit the document as JSON instead of an outline
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Outline expansion depth (0 collapses everything)
    #[arg(long)]
    depth: Option<i64>,
}

#[derive(Args)]
struct LoadArgs {
    #[command(flatten)]
    output: OutputArgs,

    /// Also list fragments that were skipped
    #[arg(long)]
    report: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search text; blank text shows the whole catalog
    query: String,

    /// Restrict the result to one top-level category
    #[arg(long)]
    tag: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct MergeArgs {
    /// JSON files to merge
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Filter the merged catalog
    #[arg(long)]
    query: Option<String>,

    /// Restrict the result to one top-level category
    #[arg(long)]
    tag: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct TagsArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResolveArgs {
    /// File name (or path) to map back to a tag
    file_name: String,

    #[arg(long)]
    json: bool,
}

impl Cli {
    fn wants_json(&self) -> bool {
        match &self.command {
            Commands::Load(args) => args.output.json,
            Commands::Search(args) => args.output.json,
            Commands::Merge(args) => args.output.json,
            Commands::Tags(args) => args.json,
            Commands::Resolve(args) => args.json,
            Commands::Schema => true,
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.wants_json() {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = CatalogConfig::load(cli.config.as_deref())?;
    if let Some(source) = cli.source.as_ref().filter(|s| !s.trim().is_empty()) {
        config.source = source.clone();
    }
    if let Some(prefix) = cli.file_prefix.as_ref() {
        config.naming = FileNaming::with_prefix(prefix.clone());
    }

    match cli.command {
        Commands::Load(args) => run_load(args, &config, cli.source_kind).await?,
        Commands::Search(args) => run_search(args, &config, cli.source_kind).await?,
        Commands::Merge(args) => run_merge(args, &config).await?,
        Commands::Tags(args) => run_tags(&args, &config)?,
        Commands::Resolve(args) => run_resolve(&args, &config)?,
        Commands::Schema => print_stdout(&serialize_json_pretty(&document_schema())?)?,
    }

    Ok(())
}

fn build_source(config: &CatalogConfig, kind: SourceKind) -> Arc<dyn FragmentSource> {
    match kind.resolve(&config.source) {
        SourceKind::Http => {
            Arc::new(HttpSource::new(config.source.clone()).with_naming(config.naming.clone()))
        }
        SourceKind::Dir | SourceKind::Auto => {
            Arc::new(DirectorySource::new(&config.source).with_naming(config.naming.clone()))
        }
    }
}

/// Fetches the catalog. A failure of the source as a whole is reported and
/// the viewer carries on with an empty catalog.
async fn load_catalog(
    config: &CatalogConfig,
    kind: SourceKind,
) -> (CatalogDocument, Vec<(String, SkipReason)>) {
    let loader = Loader::from_shared(build_source(config, kind));
    match loader.load_all_with_report(&config.tags).await {
        Ok(report) => {
            let skipped = report
                .skipped()
                .filter_map(|outcome| {
                    outcome
                        .skip_reason()
                        .map(|reason| (outcome.source().to_string(), reason.clone()))
                })
                .collect();
            (report.document, skipped)
        }
        Err(err) => {
            log::warn!("Data load failed, starting with an empty catalog: {err}");
            (CatalogDocument::empty(), Vec::new())
        }
    }
}

fn print_skipped(skipped: &[(String, SkipReason)]) {
    if skipped.is_empty() {
        return;
    }
    let text = report::render_skipped(
        skipped
            .iter()
            .map(|(source, reason)| (source.as_str(), reason)),
    );
    eprintln!("{text}");
}

fn open_depth(output: &OutputArgs, config: &CatalogConfig) -> usize {
    output.depth.map_or(config.open_depth, clamp_open_depth)
}

fn select(view: CatalogView, tag: Option<&str>, tags: &TagList) -> CatalogView {
    match tag.filter(|t| !t.trim().is_empty()) {
        Some(label) => {
            let tag = tags.find(label).cloned().unwrap_or_else(|| Tag::new(label));
            view.tag_selected(tag)
        }
        None => view,
    }
}

fn emit_document(doc: &CatalogDocument, output: &OutputArgs, config: &CatalogConfig) -> Result<()> {
    if output.json {
        if doc.is_empty() {
            log::warn!("{}", report::EMPTY_STATE_MESSAGE);
        }
        let rendered = if output.pretty {
            serialize_json_pretty(doc)?
        } else {
            serialize_json(doc)?
        };
        return print_stdout(&rendered);
    }
    print_stdout(&report::render_tree(doc, open_depth(output, config)))
}

async fn run_load(args: LoadArgs, config: &CatalogConfig, kind: SourceKind) -> Result<()> {
    let (document, skipped) = load_catalog(config, kind).await;
    log::info!(
        "Loaded {} categories from {} ({} fragments skipped)",
        document.len(),
        config.source,
        skipped.len()
    );
    emit_document(&document, &args.output, config)?;
    if args.report {
        print_skipped(&skipped);
    }
    Ok(())
}

async fn run_search(args: SearchArgs, config: &CatalogConfig, kind: SourceKind) -> Result<()> {
    let (document, _) = load_catalog(config, kind).await;
    let view = CatalogView::new(document).search_text_changed(&args.query);
    let view = select(view, args.tag.as_deref(), &config.tags);
    emit_document(&view.visible(), &args.output, config)
}

async fn run_merge(args: MergeArgs, config: &CatalogConfig) -> Result<()> {
    let merged = merge_local_paths(&args.files, &config.tags, &config.naming).await;
    print_skipped(&merged.skipped);

    let mut view = CatalogView::new(merged.document);
    if let Some(query) = args.query.as_deref() {
        view = view.search_text_changed(query);
    }
    let view = select(view, args.tag.as_deref(), &config.tags);
    emit_document(&view.visible(), &args.output, config)
}

fn run_tags(args: &TagsArgs, config: &CatalogConfig) -> Result<()> {
    if args.json {
        let entries: Vec<_> = config
            .tags
            .iter()
            .map(|tag| {
                let file_name = (!tag.is_all()).then(|| config.naming.file_name_for_tag(tag));
                json!({ "tag": tag, "file_name": file_name })
            })
            .collect();
        return print_stdout(&serialize_json(&entries)?);
    }
    print_stdout(&report::render_tags(&config.tags, &config.naming))
}

fn run_resolve(args: &ResolveArgs, config: &CatalogConfig) -> Result<()> {
    let tag = config
        .naming
        .resolve_tag_from_file_name(&args.file_name, &config.tags);
    if args.json {
        let body = json!({ "file_name": args.file_name, "tag": tag });
        return print_stdout(&serialize_json(&body).context("Failed to encode resolve output")?);
    }
    match tag {
        Some(tag) => print_stdout(tag.as_str()),
        None => print_stdout(UNKNOWN_TAG),
    }
}
