use flate2::read::GzDecoder;
use ndarray::Array2;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::prelude::{WaveformError, WaveformResult};

/// Column separator, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
    Whitespace,
}

impl Delimiter {
    /// `.tsv` is tab separated, `.csv` comma separated, anything else splits
    /// on runs of whitespace. A trailing `.gz` is looked through.
    pub fn for_path(path: &Path) -> Self {
        let inner = if is_gzip(path) {
            path.file_stem().map(Path::new).unwrap_or(path)
        } else {
            path
        };
        match inner
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("tsv") => Delimiter::Tab,
            Some("csv") => Delimiter::Comma,
            _ => Delimiter::Whitespace,
        }
    }

    fn fields(self, line: &str) -> Vec<&str> {
        match self {
            Delimiter::Tab => line.split('\t').collect(),
            Delimiter::Comma => line.split(',').collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}

/// Read a headerless numeric table into an (n_rows, n_columns) matrix.
///
/// A file with a single data row stays one row by n columns; it is not
/// turned into a column.
pub fn read_table(path: &Path) -> WaveformResult<Array2<f64>> {
    let io_error = |source| WaveformError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let delimiter = Delimiter::for_path(path);

    if is_gzip(path) {
        parse_table(BufReader::new(GzDecoder::new(file)), delimiter, path)
    } else {
        parse_table(BufReader::new(file), delimiter, path)
    }
}

/// Parse delimited numeric text. Blank lines and `#` comments are skipped,
/// empty fields read as NaN, rows must all have the same width.
pub fn parse_table<R: BufRead>(
    reader: R,
    delimiter: Delimiter,
    origin: &Path,
) -> WaveformResult<Array2<f64>> {
    let mut width: Option<usize> = None;
    let mut nrows = 0;
    let mut values = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => WaveformError::Type(format!(
                "{}:{} is not valid text: {}",
                origin.display(),
                lineno + 1,
                source
            )),
            _ => WaveformError::Io {
                path: origin.to_path_buf(),
                source,
            },
        })?;
        let content = line.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }

        let fields = delimiter.fields(content);
        match width {
            None => width = Some(fields.len()),
            Some(expected) if expected != fields.len() => {
                return Err(WaveformError::Shape(format!(
                    "{}:{} has {} columns, expected {}",
                    origin.display(),
                    lineno + 1,
                    fields.len(),
                    expected
                )))
            }
            Some(_) => {}
        }

        for field in fields {
            let value = parse_field(field).ok_or_else(|| {
                WaveformError::Type(format!(
                    "{}:{} value {:?} is not numeric",
                    origin.display(),
                    lineno + 1,
                    field.trim()
                ))
            })?;
            values.push(value);
        }
        nrows += 1;
    }

    let width = width.ok_or_else(|| {
        WaveformError::Shape(format!("{} contains no numeric rows", origin.display()))
    })?;
    Array2::from_shape_vec((nrows, width), values)
        .map_err(|err| WaveformError::Shape(err.to_string()))
}

fn parse_field(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Some(f64::NAN)
    } else {
        trimmed.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};
    use tempfile::Builder;

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(Delimiter::for_path(Path::new("a.csv")), Delimiter::Comma);
        assert_eq!(Delimiter::for_path(Path::new("a.tsv")), Delimiter::Tab);
        assert_eq!(Delimiter::for_path(Path::new("a.txt")), Delimiter::Whitespace);
        assert_eq!(Delimiter::for_path(Path::new("a")), Delimiter::Whitespace);
    }

    #[test]
    fn delimiter_looks_through_gzip_suffix() {
        assert_eq!(Delimiter::for_path(Path::new("run.tsv.gz")), Delimiter::Tab);
        assert_eq!(Delimiter::for_path(Path::new("run.csv.GZ")), Delimiter::Comma);
        assert_eq!(Delimiter::for_path(Path::new("run.gz")), Delimiter::Whitespace);
    }

    #[test]
    fn whitespace_table_skips_comments_and_blank_lines() {
        let text = "# header\n1 2\n\n3\t4  # trailing\n";
        let table = parse_table(Cursor::new(text), Delimiter::Whitespace, Path::new("mem")).unwrap();
        assert_eq!(table, ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0]]));
    }

    #[test]
    fn empty_fields_read_as_nan() {
        let table = parse_table(Cursor::new("1,,3\n"), Delimiter::Comma, Path::new("mem")).unwrap();
        assert_eq!(table.dim(), (1, 3));
        assert!(table[[0, 1]].is_nan());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_table(Cursor::new("1,2\n3\n"), Delimiter::Comma, Path::new("mem")).unwrap_err();
        assert!(matches!(err, WaveformError::Shape(_)));
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let err = parse_table(Cursor::new("1\tabc\n"), Delimiter::Tab, Path::new("mem")).unwrap_err();
        assert!(matches!(err, WaveformError::Type(_)));
    }

    #[test]
    fn undecodable_text_is_a_type_error() {
        let bytes = vec![b'1', b'\n', 0xff, 0xfe, b'\n'];
        let err = parse_table(Cursor::new(bytes), Delimiter::Whitespace, Path::new("mem")).unwrap_err();
        assert!(matches!(err, WaveformError::Type(_)), "{:?}", err);
    }

    #[test]
    fn single_row_file_stays_a_row() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"1,2,3\n").unwrap();
        assert_eq!(read_table(file.path()).unwrap().dim(), (1, 3));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_table(Cursor::new("# nothing\n"), Delimiter::Comma, Path::new("mem")).unwrap_err();
        assert!(matches!(err, WaveformError::Shape(_)));
    }

    #[test]
    fn gzip_tsv_is_decompressed_and_tab_split() {
        let mut file = Builder::new().suffix(".tsv.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1\t2\t3\n4\t5\t6\n").unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.dim(), (2, 3));
        assert_eq!(table[[1, 2]], 6.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_table(Path::new("/nonexistent/recording.csv")).unwrap_err();
        assert!(matches!(err, WaveformError::Io { .. }));
    }
}
