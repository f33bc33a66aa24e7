use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chromnoise::{IntensitySignal, NoiseError};
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{}: no data rows", path.display())]
    NoData { path: PathBuf },
    #[error(transparent)]
    Signal(#[from] NoiseError),
}

/// Read a whitespace separated signal file.
///
/// One column holds intensities; two columns hold time (seconds) and
/// intensity. Blank lines and lines starting with `#` are skipped.
pub fn read_signal(path: &Path) -> Result<IntensitySignal, DataFileError> {
    let io_err = |source| DataFileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut columns: Option<usize> = None;
    let mut times = Vec::new();
    let mut intensities = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let parse_err = |message: String| DataFileError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            message,
        };

        let fields = text
            .split_whitespace()
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| parse_err(format!("not a number: {}", field)))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let expected = *columns.get_or_insert(fields.len());
        if fields.len() != expected {
            return Err(parse_err(format!(
                "expected {} columns, found {}",
                expected,
                fields.len()
            )));
        }
        match fields.as_slice() {
            [intensity] => intensities.push(*intensity),
            [time, intensity] => {
                times.push(*time);
                intensities.push(*intensity);
            }
            _ => return Err(parse_err(format!("unsupported column count {}", fields.len()))),
        }
    }

    if intensities.is_empty() {
        return Err(DataFileError::NoData {
            path: path.to_path_buf(),
        });
    }
    let signal = if times.is_empty() {
        IntensitySignal::new(intensities)?
    } else {
        IntensitySignal::with_times(intensities, times)?
    };
    Ok(signal)
}

/// Formatting for `save_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Digits after the decimal point.
    pub precision: usize,
    /// Written at the start of every line.
    pub prepend: String,
    /// Written between values of a row.
    pub sep: String,
    /// Gzip the output and append `.gz` to the file name.
    pub compressed: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            prepend: String::new(),
            sep: " ".to_string(),
            compressed: false,
        }
    }
}

/// Write rows of numbers, one row per line. Returns the path written.
pub fn save_data(
    path: &Path,
    rows: &[Vec<f64>],
    opts: &SaveOptions,
) -> Result<PathBuf, DataFileError> {
    let target = if opts.compressed {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };
    let io_err = |source| DataFileError::Io {
        path: target.clone(),
        source,
    };

    let file = File::create(&target).map_err(io_err)?;
    if opts.compressed {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_rows(&mut encoder, rows, opts).map_err(io_err)?;
        encoder.finish().and_then(|mut w| w.flush()).map_err(io_err)?;
    } else {
        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, rows, opts).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    Ok(target)
}

fn write_rows<W: Write>(out: &mut W, rows: &[Vec<f64>], opts: &SaveOptions) -> std::io::Result<()> {
    for row in rows {
        out.write_all(opts.prepend.as_bytes())?;
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.write_all(opts.sep.as_bytes())?;
            }
            write!(out, "{:.*}", opts.precision, value)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_single_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ic.txt", "# intensities\n1.5\n\n2\n3e2\n");
        let signal = read_signal(&path).unwrap();
        assert_eq!(signal.intensities(), &[1.5, 2.0, 300.0]);
        assert_eq!(signal.times(), None);
    }

    #[test]
    fn reads_time_and_intensity_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ic.txt", "0.0 10\n0.5 11\n1.0\t12\n");
        let signal = read_signal(&path).unwrap();
        assert_eq!(signal.intensities(), &[10.0, 11.0, 12.0]);
        assert_eq!(signal.times(), Some(&[0.0, 0.5, 1.0][..]));
    }

    #[test]
    fn reports_line_of_bad_value() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ic.txt", "1\n2\nthree\n");
        match read_signal(&path) {
            Err(DataFileError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_ragged_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ic.txt", "0 1\n1\n");
        assert!(matches!(
            read_signal(&path),
            Err(DataFileError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn empty_file_has_no_data() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ic.txt", "# nothing\n");
        assert!(matches!(read_signal(&path), Err(DataFileError::NoData { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(matches!(read_signal(&path), Err(DataFileError::Io { .. })));
    }

    #[test]
    fn saves_vector_and_matrix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let written = save_data(&path, &[vec![1.0], vec![2.25]], &SaveOptions::default()).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.000000\n2.250000\n");

        let opts = SaveOptions {
            precision: 2,
            prepend: "> ".to_string(),
            sep: ", ".to_string(),
            compressed: false,
        };
        save_data(&path, &[vec![1.0, 2.0], vec![3.5, 4.126]], &opts).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "> 1.00, 2.00\n> 3.50, 4.13\n"
        );
    }

    #[test]
    fn compressed_output_gets_gz_suffix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.txt");
        let opts = SaveOptions {
            compressed: true,
            ..SaveOptions::default()
        };
        let written = save_data(&path, &[vec![0.5, 3.0]], &opts).unwrap();
        assert_eq!(written, dir.path().join("noise.txt.gz"));
        assert!(!path.exists());

        let mut text = String::new();
        GzDecoder::new(File::open(&written).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "0.500000 3.000000\n");
    }
}
