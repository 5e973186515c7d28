use crate::error::{TfResult, TypeForgeError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub tap: TapParams,
    #[command(flatten)]
    pub touch: TouchModelParams,
    #[command(flatten)]
    pub gesture: GestureParams,
    #[command(flatten)]
    pub decoder: DecoderParams,
}

/// Depth thresholds of the tap extractor, in keyboard-plane units (metres).
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapParams {
    /// Depth ceiling assigned to a finger that left the type zone.
    #[arg(long, default_value_t = 0.03)]
    pub type_zone_height: f32,
    /// Per-tick depth change that opens (negative) or closes (positive) a tap window.
    #[arg(long, default_value_t = 0.003)]
    pub dd_threshold: f32,
    /// Samples within this margin above the running minimum can become the tap target.
    #[arg(long, default_value_t = 0.005)]
    pub min_depth_noise: f32,
    #[arg(long, default_value_t = -0.01)]
    pub depth_floor: f32,
    #[arg(long, default_value_t = 256)]
    pub buffer_capacity: usize,
}

impl Default for TapParams {
    fn default() -> Self {
        Self {
            type_zone_height: 0.03,
            dd_threshold: 0.003,
            min_depth_noise: 0.005,
            depth_floor: -0.01,
            buffer_capacity: 256,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TouchModelKind {
    /// Offsets are divided by the key pitch before applying the sigmas.
    KeyRelative,
    /// Sigmas are expressed directly in plane units.
    Absolute,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchModelParams {
    #[arg(long, default_value = "key-relative")]
    pub touch_model: TouchModelKind,
    #[arg(long, default_value_t = 0.45)]
    pub sigma_x: f64,
    #[arg(long, default_value_t = 0.45)]
    pub sigma_y: f64,

    // === ELASTIC MATCHING ===
    #[arg(long, default_value_t = 0.01)]
    pub insertion_error_rate: f64,
    #[arg(long, default_value_t = 0.01)]
    pub omission_error_rate: f64,
    #[arg(long, default_value_t = 0.005)]
    pub swap_error_rate: f64,
    /// Maximum |word length - taps| evaluated by the banded DP.
    #[arg(long, default_value_t = 2)]
    pub bandwidth: usize,
    #[arg(long, default_value_t = 25)]
    pub max_input_length: usize,
}

impl Default for TouchModelParams {
    fn default() -> Self {
        Self {
            touch_model: TouchModelKind::KeyRelative,
            sigma_x: 0.45,
            sigma_y: 0.45,
            insertion_error_rate: 0.01,
            omission_error_rate: 0.01,
            swap_error_rate: 0.005,
            bandwidth: 2,
            max_input_length: 25,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureParams {
    #[arg(long, default_value_t = 50)]
    pub fine_points: usize,
    #[arg(long, default_value_t = 12)]
    pub coarse_points: usize,
    #[arg(long, default_value_t = 100)]
    pub coarse_survivors: usize,
    #[arg(long, default_value_t = 8)]
    pub dtw_band: usize,
    /// Multiplier of ln(weight) in the final gesture score.
    #[arg(long, default_value_t = 1.0)]
    pub frequency_weight: f64,
    /// Extra headroom a candidate's frequency term must have over the list minimum.
    #[arg(long, default_value_t = 0.0)]
    pub prune_margin: f64,
}

impl Default for GestureParams {
    fn default() -> Self {
        Self {
            fine_points: 50,
            coarse_points: 12,
            coarse_survivors: 100,
            dtw_band: 8,
            frequency_weight: 1.0,
            prune_margin: 0.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderParams {
    #[arg(long, default_value_t = 5)]
    pub candidates: usize,

    // === MIXED MODE ARBITRATION ===
    /// In-plane travel of the first touching finger that commits to gesture input.
    #[arg(long, default_value_t = 0.025)]
    pub gesture_commit_distance: f32,
    /// Two fingers hovering in the type zone at once commit to tap input.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub two_finger_tap: bool,

    #[arg(long, default_value_t = 60)]
    pub cursor_blink_ticks: u32,
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            candidates: 5,
            gesture_commit_distance: 0.025,
            two_finger_tap: true,
            cursor_blink_ticks: 60,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TfResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TfResult<()> {
        let t = &self.touch;
        if t.sigma_x <= 0.0 || t.sigma_y <= 0.0 {
            return Err(TypeForgeError::Config(
                "sigma_x and sigma_y must be positive".to_string(),
            ));
        }
        for (name, rate) in [
            ("insertion_error_rate", t.insertion_error_rate),
            ("omission_error_rate", t.omission_error_rate),
            ("swap_error_rate", t.swap_error_rate),
        ] {
            if !(rate > 0.0 && rate < 1.0) {
                return Err(TypeForgeError::Config(format!(
                    "{} must be in (0, 1), got {}",
                    name, rate
                )));
            }
        }
        if t.max_input_length == 0 {
            return Err(TypeForgeError::Config(
                "max_input_length must be at least 1".to_string(),
            ));
        }

        let g = &self.gesture;
        if g.coarse_points < 2 || g.coarse_points >= g.fine_points {
            return Err(TypeForgeError::Config(format!(
                "coarse_points ({}) must be at least 2 and below fine_points ({})",
                g.coarse_points, g.fine_points
            )));
        }
        if g.coarse_survivors == 0 {
            return Err(TypeForgeError::Config(
                "coarse_survivors must be at least 1".to_string(),
            ));
        }
        if self.decoder.candidates == 0 {
            return Err(TypeForgeError::Config(
                "candidates must be at least 1".to_string(),
            ));
        }
        if self.tap.dd_threshold <= 0.0 {
            return Err(TypeForgeError::Config(
                "dd_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(tap, type_zone_height);
        update_if_present!(tap, dd_threshold);
        update_if_present!(tap, min_depth_noise);
        update_if_present!(tap, depth_floor);
        update_if_present!(tap, buffer_capacity);

        update_if_present!(touch, touch_model);
        update_if_present!(touch, sigma_x);
        update_if_present!(touch, sigma_y);
        update_if_present!(touch, insertion_error_rate);
        update_if_present!(touch, omission_error_rate);
        update_if_present!(touch, swap_error_rate);
        update_if_present!(touch, bandwidth);
        update_if_present!(touch, max_input_length);

        update_if_present!(gesture, fine_points);
        update_if_present!(gesture, coarse_points);
        update_if_present!(gesture, coarse_survivors);
        update_if_present!(gesture, dtw_band);
        update_if_present!(gesture, frequency_weight);
        update_if_present!(gesture, prune_margin);

        update_if_present!(decoder, candidates);
        update_if_present!(decoder, gesture_commit_distance);
        update_if_present!(decoder, two_finger_tap);
        update_if_present!(decoder, cursor_blink_ticks);
    }
}
