use crate::reports::{self, WordOutcome};
use clap::Args;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use typeforge::config::Config;
use typeforge::geometry::KeyLayout;
use typeforge::lexicon::Lexicon;
use typeforge::simulate::{decode_ticks, Recording, Tick, TraceEvent, TraceSynth};
use typeforge::touch::Finger;
use typeforge::{Decoder, InputMethod, TfResult};

/// Words decoded when `--words` is not given.
const DEFAULT_SAMPLE: usize = 20;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Comma-separated words to enter (defaults to the head of the lexicon).
    #[arg(short, long, value_delimiter = ',')]
    pub words: Vec<String>,

    #[arg(short, long, default_value = "tap")]
    pub method: InputMethod,

    /// Positional noise in key widths.
    #[arg(short, long, default_value_t = 0.0)]
    pub jitter: f32,

    #[arg(short = 'S', long, default_value_t = 0)]
    pub seed: u64,

    /// Write the synthesized session to this JSON file.
    #[arg(long)]
    pub record: Option<String>,
}

fn synthesize(
    synth: &mut TraceSynth,
    method: InputMethod,
    index: usize,
    word: &str,
) -> TfResult<(&'static str, Vec<Tick>)> {
    // Mixed input alternates styles so both arbitration paths are exercised.
    let tap = match method {
        InputMethod::Tap => true,
        InputMethod::Gesture => false,
        InputMethod::Mixed => index % 2 == 0,
    };
    if tap {
        Ok(("tap", synth.tap_word(word, Finger::Right)?))
    } else {
        Ok(("gesture", synth.gesture_word(word, Finger::Right)?))
    }
}

pub fn run(
    args: &SimulateArgs,
    layout: Arc<KeyLayout>,
    lexicon: Arc<Lexicon>,
    config: Config,
) -> TfResult<()> {
    let words: Vec<String> = if args.words.is_empty() {
        lexicon
            .entries()
            .iter()
            .take(DEFAULT_SAMPLE)
            .map(|e| e.input.clone())
            .collect()
    } else {
        args.words.clone()
    };

    let zone = config.tap.type_zone_height;
    let decoder = Decoder::new(args.method, layout.clone(), lexicon, config)?;
    let plane = *decoder.plane();

    println!(
        "\n🧪 Simulating {} words ({} input, jitter {:.2} keys, {} threads)",
        words.len(),
        args.method,
        args.jitter,
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let outcomes: Vec<(WordOutcome, Vec<Tick>)> = words
        .par_iter()
        .enumerate()
        .map_init(
            || decoder.clone(),
            |dec, (i, word)| -> TfResult<(WordOutcome, Vec<Tick>)> {
                let mut synth = TraceSynth::new(layout.clone(), plane, zone)
                    .with_jitter(args.jitter, args.seed.wrapping_add(i as u64));
                let (style, ticks) = synthesize(&mut synth, args.method, i, word)?;
                let (best, candidates) = decode_ticks(dec, &ticks);
                let outcome = WordOutcome {
                    word: word.clone(),
                    style,
                    top1: best == *word,
                    in_list: candidates.iter().any(|c| c == word),
                    best,
                    candidates,
                };
                Ok((outcome, ticks))
            },
        )
        .collect::<TfResult<Vec<_>>>()?;

    println!("⏱️  Decoded in {:?}", start.elapsed());
    let results: Vec<WordOutcome> = outcomes.iter().map(|(o, _)| o.clone()).collect();
    reports::print_simulation_report(&results);

    if let Some(path) = &args.record {
        let mut recording = Recording {
            plane: Some(plane),
            events: Vec::new(),
        };
        for (_, ticks) in &outcomes {
            recording.events.extend(Recording::from_ticks(ticks).events);
            recording.events.push(TraceEvent::Confirm);
        }
        recording.save_to_file(path)?;
        println!("💾 Session written to {}", path);
    }
    Ok(())
}
