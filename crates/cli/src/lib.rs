use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docqa_chunker::{Chunk, Chunker, ChunkerConfig};
use docqa_session::{
    DocumentSession, ErrorKind, FileDocumentSource, IngestReport, ProviderMode, SessionConfig,
    SessionError, SourceRef,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

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
#[command(name = "docqa")]
#[command(about = "Ask questions about a single text document", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// TOML config file (environment variables still apply on top)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<Mode>,

    /// Override completion backend in this process
    #[arg(long, global = true, value_enum)]
    completion_mode: Option<Mode>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Stub,
    Openai,
}

impl From<Mode> for ProviderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Stub => Self::Stub,
            Mode::Openai => Self::OpenAi,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and chunk a document without embedding it
    Chunk(ChunkArgs),

    /// Index a document and print the top-K chunks for a query
    Search(SearchArgs),

    /// Index a document and answer a question from it
    Ask(AskArgs),
}

#[derive(Args, Default)]
struct ChunkingFlags {
    /// Words per chunk window
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Words shared by consecutive windows
    #[arg(long)]
    overlap: Option<usize>,

    /// Windows with this many words or fewer are dropped
    #[arg(long)]
    min_words: Option<usize>,
}

impl ChunkingFlags {
    fn apply(&self, config: &mut ChunkerConfig) {
        if let Some(size) = self.chunk_size {
            config.chunk_size_words = size;
        }
        if let Some(overlap) = self.overlap {
            config.overlap_words = overlap;
        }
        if let Some(min_words) = self.min_words {
            config.min_words = min_words;
        }
    }
}

#[derive(Args)]
struct ChunkArgs {
    /// Plain-text document
    file: PathBuf,

    #[command(flatten)]
    chunking: ChunkingFlags,
}

#[derive(Args)]
struct SearchArgs {
    /// Plain-text document
    file: PathBuf,

    /// Search query
    query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Fail with an empty_index error when the document produced no chunks
    #[arg(long)]
    require_results: bool,

    #[command(flatten)]
    chunking: ChunkingFlags,
}

#[derive(Args)]
struct AskArgs {
    /// Plain-text document
    file: PathBuf,

    /// Question to answer
    question: String,

    /// Number of chunks used as context
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    #[command(flatten)]
    chunking: ChunkingFlags,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Response<T: Serialize> {
    Ok { data: T },
    Error { error: ErrorEnvelope },
}

#[derive(Serialize)]
struct ErrorEnvelope {
    kind: String,
    message: String,
}

impl ErrorEnvelope {
    fn from_error(err: &anyhow::Error) -> Self {
        let kind = match err.downcast_ref::<SessionError>().map(SessionError::kind) {
            Some(ErrorKind::Configuration) => "configuration",
            Some(ErrorKind::Validation) => "validation",
            Some(ErrorKind::Provider) => "provider",
            Some(ErrorKind::EmptyIndex) => "empty_index",
            Some(ErrorKind::Document) => "document",
            None if err.downcast_ref::<docqa_chunker::ChunkerError>().is_some() => "configuration",
            None => "internal",
        };
        Self {
            kind: kind.to_string(),
            message: format!("{err:#}"),
        }
    }
}

#[derive(Serialize)]
struct ChunkView {
    id: String,
    sequence_index: usize,
    words: usize,
    text: String,
}

impl From<Chunk> for ChunkView {
    fn from(chunk: Chunk) -> Self {
        Self {
            id: chunk.id(),
            sequence_index: chunk.sequence_index,
            words: chunk.word_count(),
            text: chunk.text,
        }
    }
}

#[derive(Serialize)]
struct ChunkOutput {
    document: String,
    config: ChunkerConfig,
    chunks: Vec<ChunkView>,
}

#[derive(Serialize)]
struct SearchHit {
    rank: usize,
    id: usize,
    sequence_index: usize,
    score: f32,
    preview: String,
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    index: IngestReport,
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct AskOutput {
    question: String,
    index: IngestReport,
    answer: String,
    sources: Vec<SourceRef>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper connection chatter is only useful when debugging providers
    if !cli.verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Off);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let pretty = cli.pretty;
    let outcome = match &cli.command {
        Commands::Chunk(args) => run_chunk(&cli, args).and_then(|out| render(&out, pretty)),
        Commands::Search(args) => match run_search(&cli, args).await {
            Ok(out) => render(&out, pretty),
            Err(err) => Err(err),
        },
        Commands::Ask(args) => match run_ask(&cli, args).await {
            Ok(out) => render(&out, pretty),
            Err(err) => Err(err),
        },
    };

    match outcome {
        Ok(output) => print_stdout(&output),
        Err(err) => {
            log::error!("{err:#}");
            let response: Response<()> = Response::Error {
                error: ErrorEnvelope::from_error(&err),
            };
            print_stdout(&to_json(&response, pretty)?)?;
            std::process::exit(1);
        }
    }
}

fn render<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    to_json(&Response::Ok { data }, pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}

fn load_config(cli: &Cli, chunking: &ChunkingFlags) -> Result<SessionConfig> {
    let mut config = SessionConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.embed_mode {
        config.embedding.mode = mode.into();
    }
    if let Some(mode) = cli.completion_mode {
        config.completion.mode = mode.into();
    }
    chunking.apply(&mut config.chunking);
    Ok(config)
}

fn document_label(path: &Path) -> String {
    path.display().to_string()
}

fn run_chunk(cli: &Cli, args: &ChunkArgs) -> Result<ChunkOutput> {
    let config = load_config(cli, &args.chunking)?;
    let chunker = Chunker::new(config.chunking)?;
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let document = document_label(&args.file);
    let chunks = chunker.chunk_document(&document, &raw);
    log::info!("Chunked '{}' into {} chunks", document, chunks.len());

    Ok(ChunkOutput {
        document,
        config: *chunker.config(),
        chunks: chunks.into_iter().map(ChunkView::from).collect(),
    })
}

async fn open_session(
    cli: &Cli,
    file: &Path,
    chunking: &ChunkingFlags,
    top_k: Option<usize>,
) -> Result<(DocumentSession, IngestReport)> {
    let mut config = load_config(cli, chunking)?;
    if let Some(top_k) = top_k {
        config.retrieval.top_k = top_k;
    }

    // FILE may be relative or absolute; joining onto "." keeps both working
    let source = Arc::new(FileDocumentSource::new("."));
    let mut session = DocumentSession::from_config(&config, source)?;
    let report = session.ingest(&document_label(file)).await?;
    Ok((session, report))
}

async fn run_search(cli: &Cli, args: &SearchArgs) -> Result<SearchOutput> {
    let (session, index) = open_session(cli, &args.file, &args.chunking, args.top_k).await?;
    let results = if args.require_results {
        session.retrieve_required(&args.query).await?
    } else {
        session.retrieve(&args.query).await?
    };

    let results = results
        .iter()
        .enumerate()
        .map(|(rank, result)| SearchHit {
            rank: rank + 1,
            id: result.entry.id,
            sequence_index: result.entry.chunk.sequence_index,
            score: result.score,
            preview: result.entry.preview.clone(),
        })
        .collect();

    Ok(SearchOutput {
        query: args.query.clone(),
        index,
        results,
    })
}

async fn run_ask(cli: &Cli, args: &AskArgs) -> Result<AskOutput> {
    let (session, index) = open_session(cli, &args.file, &args.chunking, args.top_k).await?;
    let answer = session.ask(&args.question).await?;

    Ok(AskOutput {
        question: args.question.clone(),
        index,
        answer: answer.answer,
        sources: answer.sources,
    })
}
