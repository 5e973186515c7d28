use super::dtw::{banded_dtw, rigid_distance};
use super::resample::resample;
use crate::candidates::CandidateList;
use crate::config::{Config, GestureParams};
use crate::error::{TfResult, TypeForgeError};
use crate::extractor::GestureState;
use crate::geometry::{KeyLayout, Point2};
use crate::lexicon::Lexicon;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Key-path template shared by every lexicon entry with the same input form.
#[derive(Debug, Clone)]
struct Template {
    input: String,
    entries: Vec<usize>,
    fine: Vec<Point2>,
    coarse: Vec<Point2>,
}

/// Ranks words against a finished gesture trace: a rigid coarse pass keeps
/// `coarse_survivors` templates, banded DTW orders them.
///
/// Geometry is compared in key units so the DTW distance does not depend on
/// the physical keyboard size.
#[derive(Debug, Clone)]
pub struct GesturePredictor {
    lexicon: Arc<Lexicon>,
    params: GestureParams,
    scale: f32,
    templates: Vec<Template>,
    trace: Vec<Point2>,
    ranked: CandidateList,
    survivors: Vec<usize>,
    best: String,
}

impl GesturePredictor {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        let scale = 1.0 / layout.key_width();
        let templates = build_templates(&layout, &lexicon, &config.gesture, scale)?;
        Ok(Self {
            lexicon,
            params: config.gesture.clone(),
            scale,
            templates,
            trace: Vec::new(),
            ranked: CandidateList::new(config.decoder.candidates),
            survivors: Vec::new(),
            best: String::new(),
        })
    }

    /// Advances with the extractor state of the driving finger. Returns the
    /// decoded word on `Exit`, the cached word while waiting for confirmation,
    /// and an empty string while the trace is still growing.
    pub fn predict(&mut self, point: Point2, state: GestureState) -> String {
        match state {
            GestureState::Enter => {
                self.clear();
                self.trace.push(point);
                String::new()
            }
            GestureState::Stay => {
                self.trace.push(point);
                String::new()
            }
            GestureState::Exit => {
                self.decode();
                self.best.clone()
            }
            GestureState::WaitForConfirm => self.best.clone(),
            GestureState::None => String::new(),
        }
    }

    /// Appends a point without touching the decode state.
    pub fn push_point(&mut self, point: Point2) {
        self.trace.push(point);
    }

    pub fn decode(&mut self) -> String {
        let start = Instant::now();
        self.ranked.clear();
        self.survivors.clear();
        self.best.clear();
        if self.trace.is_empty() || self.templates.is_empty() {
            return String::new();
        }

        let scaled: Vec<Point2> = self.trace.iter().map(|p| *p * self.scale).collect();
        let fine = resample(&scaled, self.params.fine_points);
        let coarse = resample(&scaled, self.params.coarse_points);

        // Level 1: rigid distance, keep the closest C templates.
        let mut scored: Vec<(usize, f64)> = self
            .templates
            .iter()
            .enumerate()
            .map(|(i, t)| (i, rigid_distance(&coarse, &t.coarse)))
            .collect();
        let keep = self.params.coarse_survivors.min(scored.len());
        if keep > 0 && keep < scored.len() {
            scored.select_nth_unstable_by(keep - 1, |a, b| a.1.total_cmp(&b.1));
        }
        scored.truncate(keep);
        self.survivors = scored.iter().map(|&(i, _)| i).collect();

        // Level 2: DTW on survivors, highest frequency first so the bound can stop the scan.
        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for &t in &self.survivors {
            for &e in &self.templates[t].entries {
                let freq = self.params.frequency_weight * self.lexicon.entries()[e].ln_weight();
                pairs.push((t, e, freq));
            }
        }
        pairs.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut evaluated = 0;
        for (t, e, freq) in pairs {
            let cutoff = match self.ranked.threshold() {
                Some(th) if freq <= th + self.params.prune_margin => break,
                Some(th) => freq - th,
                None => f64::INFINITY,
            };
            evaluated += 1;
            if let Some(dist) = banded_dtw(&fine, &self.templates[t].fine, self.params.dtw_band, cutoff) {
                let entry = &self.lexicon.entries()[e];
                self.ranked.insert(&entry.output, freq - dist);
            }
        }

        if let Some(c) = self.ranked.best() {
            self.best = c.word.clone();
        }
        debug!(
            "Gesture decode: {} points, {} survivors, {} DTW evaluations, {:?}",
            self.trace.len(),
            self.survivors.len(),
            evaluated,
            start.elapsed()
        );
        self.best.clone()
    }

    /// Input forms that passed the coarse filter on the last decode.
    pub fn survivor_words(&self) -> Vec<&str> {
        self.survivors
            .iter()
            .map(|&i| self.templates[i].input.as_str())
            .collect()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn trace(&self) -> &[Point2] {
        &self.trace
    }

    pub fn ranked(&self) -> &CandidateList {
        &self.ranked
    }

    pub fn best_word(&self) -> &str {
        &self.best
    }

    pub fn candidates(&self) -> Vec<String> {
        self.ranked.words()
    }

    pub fn clear(&mut self) {
        self.trace.clear();
        self.ranked.clear();
        self.survivors.clear();
        self.best.clear();
    }
}

fn build_templates(
    layout: &KeyLayout,
    lexicon: &Lexicon,
    params: &GestureParams,
    scale: f32,
) -> TfResult<Vec<Template>> {
    let start = Instant::now();
    let mut by_input: HashMap<&str, usize> = HashMap::new();
    let mut templates: Vec<Template> = Vec::new();

    for (idx, entry) in lexicon.entries().iter().enumerate() {
        if let Some(&t) = by_input.get(entry.input.as_str()) {
            templates[t].entries.push(idx);
            continue;
        }
        let path = layout
            .key_path(&entry.input)
            .map_err(|ch| TypeForgeError::MissingKey {
                word: entry.input.clone(),
                ch,
            })?;
        let scaled: Vec<Point2> = path.into_iter().map(|p| p * scale).collect();
        by_input.insert(&entry.input, templates.len());
        templates.push(Template {
            input: entry.input.clone(),
            entries: vec![idx],
            fine: resample(&scaled, params.fine_points),
            coarse: resample(&scaled, params.coarse_points),
        });
    }

    debug!(
        "Built {} gesture templates for {} entries in {:?}",
        templates.len(),
        lexicon.len(),
        start.elapsed()
    );
    Ok(templates)
}
