//! Statements and company directory read from local JSON documents.
//!
//! Files are read from the paths given; directories are not traversed.

use crate::error::{DataError, Result};
use crate::ingest::CompanyDirectory;
use crate::jquants::{ListedInfoResponse, RawStatement, StatementsPage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(DataError::Io)
}

/// Read a `{"statements": [...]}` document.
pub fn read_statements_file(path: impl AsRef<Path>) -> Result<Vec<RawStatement>> {
    let path = path.as_ref();
    let page: StatementsPage = serde_json::from_reader(open(path)?)?;
    debug!(path = %path.display(), count = page.statements.len(), "read statements file");
    Ok(page.statements)
}

/// Read and concatenate several statements documents, in order.
pub fn read_statements_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RawStatement>> {
    let mut statements = Vec::new();
    for path in paths {
        statements.extend(read_statements_file(path)?);
    }
    Ok(statements)
}

/// Read a `{"info": [...]}` document into a company directory.
pub fn read_listed_info_file(path: impl AsRef<Path>) -> Result<CompanyDirectory> {
    let path = path.as_ref();
    let payload: ListedInfoResponse = serde_json::from_reader(open(path)?)?;
    debug!(path = %path.display(), count = payload.info.len(), "read company directory");
    Ok(CompanyDirectory::from_listed_info(payload.info))
}
