use crate::error::{TfResult, TypeForgeError};
use crate::geometry::KeyLayout;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One word of the vocabulary. `input` is what gets typed on the keys,
/// `output` is what gets displayed (they differ for transliterating lexicons
/// such as pinyin).
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub input: String,
    pub weight: f64,
    pub output: String,
}

impl LexiconEntry {
    pub fn ln_weight(&self) -> f64 {
        self.weight.ln()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    seen: HashSet<(String, String)>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Returns `Ok(false)` when the same `(input, output)`
    /// pair is already present; the first weight wins.
    pub fn add(&mut self, input: &str, weight: f64, output: Option<&str>) -> TfResult<bool> {
        if input.is_empty() {
            return Err(TypeForgeError::Validation(
                "lexicon entry with empty input form".to_string(),
            ));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(TypeForgeError::InvalidWeight {
                word: input.to_string(),
                weight,
            });
        }
        let output = output.unwrap_or(input);
        if !self.seen.insert((input.to_string(), output.to_string())) {
            debug!("Dropping duplicate lexicon entry '{}' -> '{}'", input, output);
            return Ok(false);
        }
        self.entries.push(LexiconEntry {
            input: input.to_string(),
            weight,
            output: output.to_string(),
        });
        Ok(true)
    }

    pub fn from_entries<'a, I>(items: I) -> TfResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut lexicon = Self::new();
        for (word, weight) in items {
            lexicon.add(word, weight, None)?;
        }
        Ok(lexicon)
    }

    /// Parses `input weight [output]` lines separated by single spaces.
    /// Reading stops after `limit` accepted entries when given.
    pub fn from_reader<R: Read>(reader: R, limit: Option<usize>) -> TfResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut lexicon = Self::new();
        let mut lines_read = 0;

        for result in rdr.records() {
            let rec = result?;
            lines_read += 1;
            let line = rec
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(lines_read);

            let fields: Vec<&str> = rec.iter().map(str::trim).filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 2 || fields.len() > 3 {
                return Err(TypeForgeError::MalformedLexicon {
                    line,
                    reason: format!("expected 2 or 3 fields, found {}", fields.len()),
                });
            }

            let weight: f64 = fields[1]
                .parse()
                .map_err(|_| TypeForgeError::MalformedLexicon {
                    line,
                    reason: format!("weight '{}' is not a number", fields[1]),
                })?;
            if !(weight.is_finite() && weight > 0.0) {
                return Err(TypeForgeError::MalformedLexicon {
                    line,
                    reason: format!("weight {} must be positive", weight),
                });
            }

            lexicon.add(fields[0], weight, fields.get(2).copied())?;

            if let Some(max) = limit {
                if lexicon.len() >= max {
                    break;
                }
            }
        }

        info!(
            "Lexicon: scanned {} lines, loaded {} entries",
            lines_read,
            lexicon.len()
        );
        Ok(lexicon)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, limit: Option<usize>) -> TfResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, limit)
    }

    /// Every input character must have a key to aim at.
    pub fn validate_against(&self, layout: &KeyLayout) -> TfResult<()> {
        for entry in &self.entries {
            if let Some(ch) = entry.input.chars().find(|&c| layout.key_index(c).is_none()) {
                return Err(TypeForgeError::MissingKey {
                    word: entry.input.clone(),
                    ch,
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_input_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.input.chars().count())
            .max()
            .unwrap_or(0)
    }
}
