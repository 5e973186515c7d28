use crate::reports;
use clap::Args;
use std::sync::Arc;
use typeforge::config::Config;
use typeforge::geometry::KeyLayout;
use typeforge::lexicon::Lexicon;
use typeforge::simulate::Recording;
use typeforge::{Decoder, InputMethod, TfResult};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: Config,

    /// Recorded session (JSON).
    #[arg(short, long)]
    pub trace: String,

    #[arg(short, long, default_value = "mixed")]
    pub method: InputMethod,
}

pub fn run(
    args: &ReplayArgs,
    layout: Arc<KeyLayout>,
    lexicon: Arc<Lexicon>,
    config: Config,
) -> TfResult<()> {
    let recording = Recording::load_from_file(&args.trace)?;
    println!(
        "\n▶️  Replaying {} events from {} ({} input)",
        recording.events.len(),
        args.trace,
        args.method
    );

    let mut decoder = Decoder::new(args.method, layout, lexicon, config)?;
    if let Some(plane) = recording.plane {
        decoder = decoder.with_plane(plane);
    }
    let rejected = recording.play(&mut decoder);

    reports::print_replay_report(
        &decoder.render_output(),
        decoder.current_word(),
        &decoder.candidates(),
        rejected,
    );
    Ok(())
}
