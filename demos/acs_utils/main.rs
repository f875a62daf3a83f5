//! ACS Character File CLI Utility
//!
//! A command-line tool for inspecting agent character files and exporting
//! their assets.
//!
//! # Features
//!
//! - **info**: Print a JSON summary of a character file
//! - **animations**: List animations with transitions and frame counts
//! - **export-images**: Export every image as an indexed BMP
//! - **export-sounds**: Export every sound as a WAV file
//! - **play**: Step through an animation on the console in real time
//!
//! # Usage
//!
//! ```bash
//! # Summarize a character
//! cargo run --example acs_utils info genie.acs
//!
//! # Export all images to a directory
//! cargo run --example acs_utils export-images genie.acs out/
//!
//! # Play an animation, printing each frame as it is presented
//! cargo run --example acs_utils play genie.acs Greet
//! ```

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use agent_rs::player::{FrameView, Player, PlayerHost, TickToken};
use agent_rs::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "acs_utils")]
#[command(author = "agent-rs project")]
#[command(version = "1.0")]
#[command(about = "ACS character file utility - inspect, export, and play", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print a JSON summary of a character file
	Info {
		/// Character file path
		#[arg(value_name = "ACS_FILE")]
		input: PathBuf,
	},

	/// List animations with transitions and frame counts
	Animations {
		/// Character file path
		#[arg(value_name = "ACS_FILE")]
		input: PathBuf,
	},

	/// Export every image as an indexed BMP
	ExportImages {
		/// Character file path
		#[arg(value_name = "ACS_FILE")]
		input: PathBuf,

		/// Output directory
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,
	},

	/// Export every sound as a WAV file
	ExportSounds {
		/// Character file path
		#[arg(value_name = "ACS_FILE")]
		input: PathBuf,

		/// Output directory
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,
	},

	/// Play an animation, printing each frame as it is presented
	Play {
		/// Character file path
		#[arg(value_name = "ACS_FILE")]
		input: PathBuf,

		/// Animation name to play
		#[arg(value_name = "ANIMATION")]
		animation: String,

		/// Treat ANIMATION as a state name instead
		#[arg(short, long)]
		state: bool,
	},
}

#[derive(Serialize)]
struct CharacterSummary<'a> {
	name: &'a str,
	description: &'a str,
	guid: String,
	width: u16,
	height: u16,
	version: (u16, u16),
	tts_enabled: bool,
	balloon_enabled: bool,
	standard_animation_set: bool,
	palette_size: usize,
	transparent_index: u8,
	image_count: usize,
	sound_count: usize,
	animation_count: usize,
	states: &'a BTreeMap<String, Vec<String>>,
	voice: Option<&'a VoiceInfo>,
	balloon: &'a BalloonInfo,
}

fn handle_info(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
	let character = Character::open(&input)?;
	let summary = CharacterSummary {
		name: character.name(),
		description: character.description(),
		guid: character.guid().to_string(),
		width: character.width(),
		height: character.height(),
		version: character.version(),
		tts_enabled: character.tts_enabled(),
		balloon_enabled: character.balloon_enabled(),
		standard_animation_set: character.standard_animation_set(),
		palette_size: character.palette().len(),
		transparent_index: character.transparent_index(),
		image_count: character.images().len(),
		sound_count: character.sounds().len(),
		animation_count: character.animations().len(),
		states: character.states(),
		voice: character.voice(),
		balloon: character.balloon(),
	};
	println!("{}", serde_json::to_string_pretty(&summary)?);
	Ok(())
}

fn handle_animations(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
	let character = Character::open(&input)?;
	println!("{} animations:", character.animations().len());
	for (name, animation) in character.animations() {
		let transition = match animation.transition() {
			TransitionType::ReturnAnimation => {
				format!("return via {:?}", animation.return_animation())
			}
			TransitionType::ExitBranches => "exit branches".to_owned(),
			TransitionType::None => "none".to_owned(),
		};
		println!("  {name:<24} {:>4} frames  transition: {transition}", animation.frames().len());
	}
	Ok(())
}

fn handle_export_images(input: PathBuf, out_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
	let character = Character::open(&input)?;
	fs::create_dir_all(&out_dir)?;

	for (id, image) in character.images() {
		let path = out_dir.join(format!("image_{id:04}.bmp"));
		let mut file = fs::File::create(&path)?;
		image.write_bmp(&mut file, character.palette())?;
	}

	println!("✓ Exported {} images to {}", character.images().len(), out_dir.display());
	Ok(())
}

fn handle_export_sounds(input: PathBuf, out_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
	let character = Character::open(&input)?;
	fs::create_dir_all(&out_dir)?;

	for (id, sound) in character.sounds() {
		let path = out_dir.join(format!("sound_{id:04}.wav"));
		let mut file = fs::File::create(&path)?;
		sound.write_to(&mut file)?;
		match sound.wav_spec() {
			Ok(spec) => println!(
				"  sound {id}: {} Hz, {} ch, {} bit",
				spec.sample_rate, spec.channels, spec.bits_per_sample
			),
			Err(e) => println!("  sound {id}: unparseable container ({e})"),
		}
	}

	println!("✓ Exported {} sounds to {}", character.sounds().len(), out_dir.display());
	Ok(())
}

/// A host that prints playback events and sleeps out frame durations inline.
#[derive(Default)]
struct ConsoleHost {
	pending: Option<(Duration, TickToken)>,
}

impl PlayerHost for ConsoleHost {
	fn render_frame(&mut self, frame: FrameView<'_>) {
		println!(
			"  {} frame {:>3}  ({} layers)",
			frame.animation,
			frame.frame_index,
			frame.images.len()
		);
	}

	fn play_sound(&mut self, data: &[u8]) {
		println!("  ♪ sound effect ({} bytes)", data.len());
	}

	fn animation_completed(&mut self) {
		println!("  animation completed");
	}

	fn schedule(&mut self, delay: Duration, token: TickToken) {
		self.pending = Some((delay, token));
	}
}

fn handle_play(
	input: PathBuf,
	animation: String,
	state: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let character = Character::open(&input)?;
	let mut player = Player::new();
	let mut host = ConsoleHost::default();

	if state {
		player.set_state(&character, &mut host, &animation);
	} else {
		player.request(&character, &mut host, &animation);
	}

	while let Some((delay, token)) = host.pending.take() {
		thread::sleep(delay);
		player.tick(&character, &mut host, token)?;
	}

	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();

	match cli.command {
		Commands::Info {
			input,
		} => handle_info(input),

		Commands::Animations {
			input,
		} => handle_animations(input),

		Commands::ExportImages {
			input,
			out_dir,
		} => handle_export_images(input, out_dir),

		Commands::ExportSounds {
			input,
			out_dir,
		} => handle_export_sounds(input, out_dir),

		Commands::Play {
			input,
			animation,
			state,
		} => handle_play(input, animation, state),
	}
}
