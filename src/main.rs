use clap::{Parser, Subcommand};
use lume_affinity::config::{LoggingSettings, Settings};
use lume_affinity::core::{cluster_users, explain_features, MatchError, DEFAULT_CLUSTER_SEED};
use lume_affinity::models::{
    ClusterRequest, ClusterResponse, ErrorResponse, RankRequest, RankResponse, ScoreRequest,
    ScoreResponse, SimilarRequest, SimilarResponse,
};
use lume_affinity::services::{ArtifactError, ModelRegistry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Errors surfaced by the command-line interface
#[derive(Debug, Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Matching error: {0}")]
    Match(#[from] MatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            CliError::Config(_) => "configuration",
            CliError::Artifact(_) => "model_artifact",
            CliError::Match(_) => "matching",
            CliError::Io(_) => "io",
            CliError::Json(_) => "invalid_json",
            CliError::Validation(_) => "validation",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "lume-affinity",
    about = "Score user pairs and rank match candidates",
    version
)]
struct Cli {
    /// Configuration file (defaults to config/default.toml and config/local.toml)
    #[arg(long, value_name = "path", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank a candidate pool for a target user
    Rank(InputArgs),
    /// Score a single user pair and show its features
    Score(InputArgs),
    /// List candidates with the most similar interest embeddings
    Similar(InputArgs),
    /// Group profiles by interest embedding with k-means
    Cluster(InputArgs),
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    /// JSON request file; reads stdin when omitted
    #[arg(long, short, value_name = "path")]
    input: Option<PathBuf>,
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    init_logging(&settings.logging);

    if let Err(e) = run(cli.command, &settings) {
        error!("Command failed: {}", e);
        exit_with(&e);
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match path {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON response, so logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn run(command: Command, settings: &Settings) -> Result<(), CliError> {
    let registry = ModelRegistry::load(&settings.model)?;
    info!(
        "Model registry ready (version: {:?})",
        registry.version()
    );

    match command {
        Command::Rank(args) => {
            let request: RankRequest = read_request(args.input.as_deref())?;
            request.validate()?;
            print_json(&rank(&registry, settings, request)?)
        }
        Command::Score(args) => {
            let request: ScoreRequest = read_request(args.input.as_deref())?;
            request.validate()?;
            print_json(&score(&registry, request)?)
        }
        Command::Similar(args) => {
            let request: SimilarRequest = read_request(args.input.as_deref())?;
            request.validate()?;
            let similar_users = registry
                .matcher()
                .similar_users(&request.target, request.candidates, request.top_n);
            print_json(&SimilarResponse { similar_users })
        }
        Command::Cluster(args) => {
            let request: ClusterRequest = read_request(args.input.as_deref())?;
            request.validate()?;
            print_json(&cluster(request)?)
        }
    }
}

fn rank(
    registry: &ModelRegistry,
    settings: &Settings,
    request: RankRequest,
) -> Result<RankResponse, CliError> {
    let limit = request.resolved_limit(settings.matching.default_limit, settings.matching.max_limit);
    let matcher = registry.matcher();

    info!(
        "Ranking {} candidates for user {}, limit: {}",
        request.candidates.len(),
        request.target.id,
        limit
    );

    let result = match request.seed {
        Some(seed) => matcher.find_matches_with_rng(
            &request.target,
            request.candidates,
            limit,
            request.diversity_factor,
            &mut ChaCha8Rng::seed_from_u64(seed),
        )?,
        None => matcher.find_matches(
            &request.target,
            request.candidates,
            limit,
            request.diversity_factor,
        )?,
    };

    info!(
        "Returning {} matches for user {} (from {} candidates, diversified: {})",
        result.matches.len(),
        request.target.id,
        result.total_candidates,
        result.diversified
    );

    Ok(RankResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        diversified: result.diversified,
        model_version: matcher.scorer().model_version().map(str::to_string),
        generated_at: chrono::Utc::now(),
    })
}

fn score(registry: &ModelRegistry, request: ScoreRequest) -> Result<ScoreResponse, CliError> {
    let scorer = registry.current();
    let score = scorer.predict_match_score(&request.user_i, &request.user_j)?;

    Ok(ScoreResponse {
        score,
        features: explain_features(&request.user_i, &request.user_j)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        model_version: scorer.model_version().map(str::to_string),
    })
}

fn cluster(request: ClusterRequest) -> Result<ClusterResponse, CliError> {
    let seed = request.seed.unwrap_or(DEFAULT_CLUSTER_SEED);
    info!(
        "Clustering {} profiles into {} groups (seed: {})",
        request.profiles.len(),
        request.n_clusters,
        seed
    );

    let result = cluster_users(
        request.profiles,
        request.n_clusters,
        &mut ChaCha8Rng::seed_from_u64(seed),
    )?;

    Ok(ClusterResponse {
        clusters: result.clusters,
        skipped: result.skipped,
        iterations: result.iterations,
    })
}

fn read_request<T: DeserializeOwned>(path: Option<&Path>) -> Result<T, CliError> {
    let body = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };
    Ok(serde_json::from_str(&body)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_with(err: &CliError) -> ! {
    let response = ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
    };
    match serde_json::to_string(&response) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("lume-affinity: {err}"),
    }
    std::process::exit(1);
}
