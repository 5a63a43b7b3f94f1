//! Loading disclosure records from statement files or the J-Quants API.

use crate::config::Credentials;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use kessan_core::DisclosureRecord;
use kessan_data::{
    CompanyDirectory, DataError, IngestStats, JQuantsClient, RawStatement, StatementsQuery, ingest,
    read_listed_info_file, read_statements_file,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default number of concurrent statement requests.
const DEFAULT_CONCURRENCY: usize = 4;

/// Error type for loading operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LoadError {
    /// Reading, fetching or parsing failed.
    #[error(transparent)]
    Data(#[from] DataError),
    /// The API is needed but no credentials were configured.
    #[error("J-Quants credentials are required, set JQUANTS_EMAIL and JQUANTS_PASSWORD")]
    MissingCredentials,
    /// Nothing to load.
    #[error("Give statement files with --statements or fetch dates with --fetch-date/--fetch-code")]
    NoSource,
    /// Progress bar template error.
    #[error("Progress bar template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

/// Where statements come from.
#[derive(Debug, Clone)]
pub(crate) enum StatementSource {
    /// Local `{"statements": [...]}` files
    Files(Vec<PathBuf>),
    /// The J-Quants API, one request per date (or one by code when no date is given)
    Api {
        dates: Vec<NaiveDate>,
        code: Option<String>,
    },
}

impl StatementSource {
    pub(crate) fn from_args(
        files: Vec<PathBuf>,
        dates: Vec<NaiveDate>,
        code: Option<String>,
    ) -> Result<Self, LoadError> {
        if !files.is_empty() {
            Ok(Self::Files(files))
        } else if !dates.is_empty() || code.is_some() {
            Ok(Self::Api { dates, code })
        } else {
            Err(LoadError::NoSource)
        }
    }

    /// Queries to issue for an API source.
    pub(crate) fn queries(&self) -> Vec<StatementsQuery> {
        match self {
            Self::Files(_) => Vec::new(),
            Self::Api { dates, code } if dates.is_empty() => vec![StatementsQuery {
                code: code.clone(),
                date: None,
            }],
            Self::Api { dates, code } => dates
                .iter()
                .map(|date| StatementsQuery {
                    code: code.clone(),
                    date: Some(*date),
                })
                .collect(),
        }
    }
}

/// Records loaded for one run.
#[derive(Debug)]
pub(crate) struct Loaded {
    pub(crate) records: Vec<DisclosureRecord>,
    pub(crate) stats: IngestStats,
}

fn progress_bar(len: usize, message: &'static str) -> Result<ProgressBar, LoadError> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

async fn authenticated_client(
    credentials: Option<&Credentials>,
) -> Result<JQuantsClient, LoadError> {
    let credentials = credentials.ok_or(LoadError::MissingCredentials)?;
    let mut client = JQuantsClient::new()?;
    client
        .authenticate(&credentials.email, &credentials.password)
        .await?;
    Ok(client)
}

fn read_files(paths: &[PathBuf]) -> Result<Vec<RawStatement>, LoadError> {
    let pb = progress_bar(paths.len(), "Reading statement files...")?;
    let mut statements = Vec::new();
    for path in paths {
        match read_statements_file(path) {
            Ok(batch) => statements.extend(batch),
            Err(e) => {
                pb.finish_with_message("Failed!");
                return Err(e.into());
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("Read {} statements", statements.len()));
    Ok(statements)
}

async fn fetch_statements(
    client: &JQuantsClient,
    queries: Vec<StatementsQuery>,
) -> Result<Vec<RawStatement>, LoadError> {
    let pb = progress_bar(queries.len(), "Fetching statements...")?;

    let results: Vec<Result<Vec<RawStatement>, DataError>> = stream::iter(queries)
        .map(|query| async move { client.fetch_statements(&query).await })
        .buffered(DEFAULT_CONCURRENCY)
        .inspect(|_| pb.inc(1))
        .collect()
        .await;

    let mut statements = Vec::new();
    for result in results {
        match result {
            Ok(batch) => statements.extend(batch),
            Err(e) => {
                pb.finish_with_message("Failed!");
                return Err(e.into());
            }
        }
    }
    pb.finish_with_message(format!("Fetched {} statements", statements.len()));
    Ok(statements)
}

/// Load and ingest statements.
///
/// The company directory comes from `companies` when given, otherwise from
/// the API's `listed/info`.
pub(crate) async fn load(
    source: &StatementSource,
    companies: Option<&Path>,
    credentials: Option<&Credentials>,
    timestamp: DateTime<Utc>,
) -> Result<Loaded, LoadError> {
    let needs_api = matches!(source, StatementSource::Api { .. }) || companies.is_none();
    let client = if needs_api {
        Some(authenticated_client(credentials).await?)
    } else {
        None
    };

    let directory = match (companies, &client) {
        (Some(path), _) => read_listed_info_file(path)?,
        (None, Some(client)) => {
            CompanyDirectory::from_listed_info(client.fetch_listed_info().await?)
        }
        (None, None) => return Err(LoadError::MissingCredentials),
    };
    if directory.is_empty() {
        warn!("company directory is empty, every statement will be dropped");
    }
    info!(companies = directory.len(), "loaded company directory");

    let statements = match (source, &client) {
        (StatementSource::Files(paths), _) => read_files(paths)?,
        (StatementSource::Api { .. }, Some(client)) => {
            fetch_statements(client, source.queries()).await?
        }
        (StatementSource::Api { .. }, None) => return Err(LoadError::MissingCredentials),
    };

    let (records, stats) = ingest(statements, &directory, timestamp);
    Ok(Loaded { records, stats })
}
