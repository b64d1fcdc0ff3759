//! Catalog sources: the built-in seed list and CSV word files
//!
//! CSV files have a header row followed by `text,translation,category` rows.
//! Every data row must have exactly three fields.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::NewWord;
use crate::{Error, Result};

/// Number of fields in a catalog CSV row
pub const CSV_FIELDS: usize = 3;

/// Words shipped with the server
pub fn seed_words() -> Vec<NewWord> {
    [
        ("der Supermarkt", "el supermercado"),
        ("das Geld", "el dinero"),
        ("die Karte (Bankkarte)", "la tarjeta bancaria"),
        ("die Tasche", "el bolso"),
        ("der Tampon", "el tampón"),
        ("die Binde", "la compresa"),
        ("das Kondom", "el preservativo"),
        ("die Zahnbürste", "el cepillo de dientes"),
        ("die Hilfe", "la ayuda"),
        ("die Polizei", "la policía"),
    ]
    .into_iter()
    .map(|(text, translation)| NewWord::new(text, translation, "basic, shopping"))
    .collect()
}

/// Parse catalog rows from CSV data
///
/// `origin` names the source in error messages. The first row is always
/// treated as a header.
pub fn parse_csv<R: Read>(reader: R, origin: &str) -> Result<Vec<NewWord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut words = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Data rows start on line 2 (after the header)
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        if record.len() != CSV_FIELDS {
            return Err(Error::MalformedInput {
                origin: origin.to_string(),
                line,
                message: format!(
                    "wrong number of fields, got {}, want {}",
                    record.len(),
                    CSV_FIELDS
                ),
            });
        }

        words.push(NewWord::new(&record[0], &record[1], &record[2]));
    }

    Ok(words)
}

/// Load one CSV word file
pub fn load_csv_file(path: &Path) -> Result<Vec<NewWord>> {
    let file = std::fs::File::open(path)?;
    parse_csv(file, &path.display().to_string())
}

/// Result of importing a directory of CSV files
#[derive(Debug, Default)]
pub struct CsvImport {
    /// Words from every file that parsed cleanly
    pub words: Vec<NewWord>,
    /// Files that were read successfully
    pub files: Vec<PathBuf>,
    /// Files that were skipped, with the reason
    pub failures: Vec<(PathBuf, Error)>,
}

/// Load every `*.csv` file below `dir`, recursively
///
/// A bad file is skipped in full; the others are still imported. Files are
/// visited in path order so repeated imports assign ids the same way.
pub fn load_csv_dir(dir: &Path) -> Result<CsvImport> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "Catalog directory not found: {}",
            dir.display()
        )));
    }

    let mut import = CsvImport::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        let is_csv = path.extension().and_then(|e| e.to_str()) == Some("csv");
        if !entry.file_type().is_file() || !is_csv {
            continue;
        }

        match load_csv_file(path) {
            Ok(words) => {
                debug!("Loaded {} words from {}", words.len(), path.display());
                import.words.extend(words);
                import.files.push(path.to_path_buf());
            }
            Err(e) => {
                warn!("Skipping catalog file {}: {}", path.display(), e);
                import.failures.push((path.to_path_buf(), e));
            }
        }
    }

    Ok(import)
}
