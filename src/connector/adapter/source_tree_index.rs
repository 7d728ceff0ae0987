use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::java_parser::{JavaParser, ParsedUnit};
use crate::domain::{ClassLocations, DomainError};

const SOURCE_EXTENSION: &str = "java";

/// The project's source roots and every file parsed from them so far.
///
/// Parsed files are memoized by canonical path for the whole session.
pub struct SourceTreeIndex {
    roots: Vec<PathBuf>,
    parser: JavaParser,
    units: RefCell<HashMap<PathBuf, Rc<ParsedUnit>>>,
}

impl SourceTreeIndex {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let roots = roots
            .into_iter()
            .map(|root| root.canonicalize().unwrap_or(root))
            .collect();
        Self {
            roots,
            parser: JavaParser::new(),
            units: RefCell::new(HashMap::new()),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Parses `path`, or returns the unit parsed earlier.
    pub fn parse_file(&self, path: &Path) -> Result<Rc<ParsedUnit>, DomainError> {
        let path = path
            .canonicalize()
            .map_err(|_| DomainError::not_found(format!("Source file {}", path.display())))?;

        if let Some(parsed) = self.units.borrow().get(&path) {
            return Ok(Rc::clone(parsed));
        }

        let source = std::fs::read_to_string(&path)?;
        let parsed = Rc::new(self.parser.parse(&path, source)?);
        self.units
            .borrow_mut()
            .insert(path, Rc::clone(&parsed));
        Ok(parsed)
    }

    pub fn parsed_count(&self) -> usize {
        self.units.borrow().len()
    }

    /// Every `.java` file under every root, in root order then path order.
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                warn!("Skipping source root {}: not a directory", root.display());
                continue;
            }
            let mut found: Vec<PathBuf> = WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Failed to read entry under {}: {}", root.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| {
                    path.extension()
                        .map_or(false, |ext| ext == SOURCE_EXTENSION)
                })
                .collect();
            found.sort();
            files.extend(found);
        }
        files
    }

    /// Maps every top-level type declared under the roots to its file.
    ///
    /// Unreadable and unparsable files are logged and skipped. When two files
    /// declare the same type, the first in root order wins.
    pub fn scan(&self) -> ClassLocations {
        let start_time = Instant::now();
        let files = self.source_files();
        info!("Scanning {} source files", files.len());

        let progress_bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }

        let mut locations = ClassLocations::new();
        let mut skipped = 0usize;

        for path in files {
            progress_bar.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Failed to read file {}: {}", path.display(), e);
                    skipped += 1;
                    progress_bar.inc(1);
                    continue;
                }
            };

            let declarations = match self.parser.top_level_declarations(&path, &source) {
                Ok(declarations) => declarations,
                Err(e) => {
                    warn!("Failed to parse file {}: {}", path.display(), e);
                    skipped += 1;
                    progress_bar.inc(1);
                    continue;
                }
            };

            let path = path.canonicalize().unwrap_or(path);
            for qualified_name in declarations.qualified_names() {
                if !locations.insert(qualified_name.clone(), path.clone()) {
                    debug!(
                        "{} already located, ignoring {}",
                        qualified_name,
                        path.display()
                    );
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        info!(
            "Located {} types in {:.2}s ({} files skipped)",
            locations.len(),
            start_time.elapsed().as_secs_f64(),
            skipped
        );

        locations
    }
}
