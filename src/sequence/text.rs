use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

/// Raw text of one tile, ready to be drawn inside its rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileText {
    /// FASTA header (the sequence name).
    pub header: String,
    /// Nucleotide text wrapped at the fold size.
    pub lines: Vec<String>,
}

impl TileText {
    /// Header line followed by the folded sequence lines.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.header.as_str()).chain(self.lines.iter().map(String::as_str))
    }
}

/// Mask everything but no-call bases (`n`) with spaces.
///
/// Returns `None` when the line has no no-call position, so callers can skip
/// the highlight overlay entirely.
pub fn no_call_mask(line: &str) -> Option<String> {
    if !line.bytes().any(|b| b.eq_ignore_ascii_case(&b'n')) {
        return None;
    }
    Some(
        line.chars()
            .map(|c| if c.eq_ignore_ascii_case(&'n') { c } else { ' ' })
            .collect(),
    )
}

/// Sequence name -> tile text cache, filled from FASTA exports of the tile
/// library and consulted at draw time when zoomed in far enough.
#[derive(Debug, Clone)]
pub struct SequenceText {
    texts: HashMap<String, TileText>,
    fold_size: usize,
}

impl SequenceText {
    pub fn new(fold_size: usize) -> Self {
        Self {
            texts: HashMap::new(),
            fold_size: fold_size.max(1),
        }
    }

    /// Load every record from a FASTA file.
    pub fn from_file(path: &Path, fold_size: usize) -> Result<Self> {
        let mut text = Self::new(fold_size);
        text.extend_from_file(path)?;
        Ok(text)
    }

    /// Add the records of another FASTA file. Later records replace earlier
    /// ones with the same name.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize> {
        use std::io::BufReader;

        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open FASTA file: {}", path.display()))?;
        self.extend_from_reader(BufReader::new(file))
            .with_context(|| format!("failed to read FASTA file: {}", path.display()))
    }

    /// Add the records read from any buffered FASTA source.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        use noodles::fasta;

        let mut reader = fasta::io::Reader::new(reader);
        let mut count = 0;
        for result in reader.records() {
            let record = result.context("failed to read FASTA record")?;
            let name = String::from_utf8_lossy(record.name()).into_owned();
            self.insert(name, record.sequence().as_ref());
            count += 1;
        }
        log::debug!("loaded {count} tile sequences");
        Ok(count)
    }

    /// Store a sequence, folding it into display lines.
    pub fn insert(&mut self, name: impl Into<String>, sequence: &[u8]) {
        let header = name.into();
        let lines = sequence
            .chunks(self.fold_size)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect();
        self.texts.insert(header.clone(), TileText { header, lines });
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&TileText> {
        self.texts.get(name)
    }

    pub fn fold_size(&self) -> usize {
        self.fold_size
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
