// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Fetches raw dataset bytes from a locator and parses them into
// a LabeledTable.
//
// Locators:
//   http://…, https://… → GET with a shared ureq agent
//   file:///path         → read from disk
//   anything else        → treated as a local path
//
// Schema (fixed, no header row):
//   f1,f2,…,fN,label
//
//   - every feature cell must parse as a finite f64
//   - the label is the last cell and may not be empty
//   - every row must have the same column count; N is taken
//     from the first row unless the source was built with an
//     expected feature count
//   - blank lines are skipped (the public iris file ends with
//     two of them)
//
// A fetch failure is SourceUnavailable; anything wrong with
// the bytes themselves is ParseError.
//
// Reference: ureq crate documentation
//            Rust Book §9 (Error Handling)

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::{LabeledTable, Row};
use crate::domain::traits::DatasetSource;

/// Dataset fetched when a training request names none.
pub const DEFAULT_DATA_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/iris/iris.data";

/// Upper bound on a fetched payload.
pub const MAX_DATASET_BYTES: usize = 64 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT:    Duration = Duration::from_secs(60);

/// Shared HTTP agent with consistent timeouts.
fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build()
    })
}

// ─── LocatorSource ────────────────────────────────────────────────────────────
/// DatasetSource that dispatches on the locator's scheme.
#[derive(Debug, Clone, Default)]
pub struct LocatorSource {
    /// When set, every row must have exactly this many feature columns
    expected_features: Option<usize>,
}

impl LocatorSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require exactly `n` feature columns per row.
    pub fn with_expected_features(mut self, n: usize) -> Self {
        self.expected_features = Some(n);
        self
    }

    fn fetch_bytes(&self, locator: &str) -> PipelineResult<Vec<u8>> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            fetch_http(locator)
        } else {
            let path = locator.strip_prefix("file://").unwrap_or(locator);
            read_file(Path::new(path))
        }
    }
}

impl DatasetSource for LocatorSource {
    fn fetch(&self, locator: &str) -> PipelineResult<LabeledTable> {
        tracing::info!("Downloading data from {}", locator);
        let bytes = self.fetch_bytes(locator)?;
        let table = parse_table(&bytes, self.expected_features)?;
        tracing::info!(
            "Loaded dataset with {} rows x {} features ({} classes)",
            table.len(),
            table.feature_count(),
            table.class_counts().len()
        );
        Ok(table)
    }
}

fn fetch_http(url: &str) -> PipelineResult<Vec<u8>> {
    let response = agent().get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => {
            PipelineError::SourceUnavailable(format!("{url} answered HTTP {code}"))
        }
        ureq::Error::Transport(t) => {
            PipelineError::SourceUnavailable(format!("cannot reach {url}: {t}"))
        }
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DATASET_BYTES as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| PipelineError::SourceUnavailable(format!("reading {url}: {e}")))?;

    if bytes.len() > MAX_DATASET_BYTES {
        return Err(PipelineError::SourceUnavailable(format!(
            "{url} is larger than {MAX_DATASET_BYTES} bytes"
        )));
    }
    Ok(bytes)
}

fn read_file(path: &Path) -> PipelineResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| {
        PipelineError::SourceUnavailable(format!("cannot read '{}': {e}", path.display()))
    })?;
    if bytes.len() > MAX_DATASET_BYTES {
        return Err(PipelineError::SourceUnavailable(format!(
            "'{}' is larger than {MAX_DATASET_BYTES} bytes",
            path.display()
        )));
    }
    Ok(bytes)
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse headerless `f1,…,fN,label` CSV bytes into a table.
pub fn parse_table(bytes: &[u8], expected_features: Option<usize>) -> PipelineResult<LabeledTable> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| PipelineError::ParseError(format!("dataset is not valid UTF-8: {e}")))?;

    let mut rows  = Vec::new();
    let mut width = expected_features;

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line    = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() < 2 {
            return Err(PipelineError::ParseError(format!(
                "line {line_no}: expected feature columns followed by a label, found {} column",
                cells.len()
            )));
        }

        let n_features = cells.len() - 1;
        match width {
            None => width = Some(n_features),
            Some(w) if w != n_features => {
                return Err(PipelineError::ParseError(format!(
                    "line {line_no}: expected {} columns, found {}",
                    w + 1,
                    cells.len()
                )));
            }
            Some(_) => {}
        }

        let mut features = Vec::with_capacity(n_features);
        for (col, cell) in cells[..n_features].iter().enumerate() {
            let value: f64 = cell.parse().map_err(|_| {
                PipelineError::ParseError(format!(
                    "line {line_no}, column {}: '{cell}' is not a number",
                    col + 1
                ))
            })?;
            if !value.is_finite() {
                return Err(PipelineError::ParseError(format!(
                    "line {line_no}, column {}: '{cell}' is not a finite number",
                    col + 1
                )));
            }
            features.push(value);
        }

        let label = cells[n_features];
        if label.is_empty() {
            return Err(PipelineError::ParseError(format!("line {line_no}: empty label")));
        }

        rows.push(Row::new(features, label));
    }

    if rows.is_empty() {
        return Err(PipelineError::ParseError("dataset payload is empty".to_string()));
    }

    LabeledTable::new(rows)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    const IRIS_SNIPPET: &str = "5.1,3.5,1.4,0.2,Iris-setosa\n\
                                4.9,3.0,1.4,0.2,Iris-setosa\n\
                                6.3,3.3,6.0,2.5,Iris-virginica\n\n\n";

    /// Serve exactly one canned HTTP response on a random local port.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr     = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/iris.data")
    }

    #[test]
    fn test_parses_iris_rows() {
        let table = parse_table(IRIS_SNIPPET.as_bytes(), None).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.feature_count(), 4);
        assert_eq!(table.rows()[2].label, "Iris-virginica");
        assert_eq!(table.rows()[0].features, vec![5.1, 3.5, 1.4, 0.2]);
    }

    #[test]
    fn test_tolerates_crlf_and_spaces() {
        let table = parse_table(b"1.0, 2.0 ,a\r\n3.0,4.0, b\r\n", None).unwrap();
        assert_eq!(table.labels(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_column_count_mismatch_fails_fast() {
        let err = parse_table(b"1,2,3,a\n1,2,b\n", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        let err = parse_table(b"1,2,3,a\n", Some(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_non_numeric_feature_is_parse_error() {
        let err = parse_table(b"1.0,abc,a\n", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert!(err.detail().contains("column 2"));
    }

    #[test]
    fn test_non_finite_feature_is_parse_error() {
        let err = parse_table(b"NaN,1.0,a\n", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_empty_payload_and_empty_label() {
        assert_eq!(parse_table(b"", None).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(parse_table(b"\n  \n", None).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(parse_table(b"1.0,\n", None).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(parse_table(b"onlylabel\n", None).unwrap_err().kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_file_source_reads_path_and_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(IRIS_SNIPPET.as_bytes()).unwrap();
        file.flush().unwrap();
        let path = file.path().to_string_lossy().to_string();

        let source = LocatorSource::new();
        assert_eq!(source.fetch(&path).unwrap().len(), 3);
        assert_eq!(source.fetch(&format!("file://{path}")).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err  = LocatorSource::new().fetch(&path.to_string_lossy()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_http_source_downloads_and_parses() {
        let body = IRIS_SNIPPET;
        let url  = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        let table = LocatorSource::new().with_expected_features(4).fetch(&url).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_http_error_status_is_source_unavailable() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
        );
        let err = LocatorSource::new().fetch(&url).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_refused_connection_is_source_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr     = listener.local_addr().unwrap();
        drop(listener);

        let err = LocatorSource::new().fetch(&format!("http://{addr}/iris.data")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }
}
