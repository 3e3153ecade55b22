use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use transport::TimeRange;
use wave_engine::{
    clip::{ClipLevel, ClipPlacement},
    device_manager::{AudioDeviceManager as _, cpal_dm::CpalAudioDeviceManager},
    error::EngineResult,
    file::{AudioFile, ChannelSet, wav::WavFileCache},
    graph::{Node, PlaybackInitialisationInfo},
    nodes::{PluginNode, WaveNode},
    player::{NodePlayer, command::TransportCommand},
    plugin::{Saturator, WetDryPlugin},
};

const BLOCK_SIZE: usize = 512;

/// Plays a section of a WAV file as a clip on the timeline.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    file: PathBuf,

    /// Timeline second the clip starts at.
    #[arg(long, default_value_t = 0.0)]
    edit_start: f64,

    /// Clip length in seconds; defaults to the whole file.
    #[arg(long)]
    length: Option<f64>,

    /// Seconds into the file that line up with the clip start.
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// File seconds the clip loops from.
    #[arg(long, requires = "loop_end")]
    loop_start: Option<f64>,

    #[arg(long, requires = "loop_start")]
    loop_end: Option<f64>,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    gain_db: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan: f32,

    #[arg(long)]
    mute: bool,

    /// Runs the clip through a saturator with this drive (0..1).
    #[arg(long)]
    drive: Option<f32>,
}

fn build_graph(args: &Args) -> EngineResult<Box<dyn Node>> {
    let audio_file = AudioFile::new(&args.file);
    let info = audio_file.info();

    let length = args.length.unwrap_or_else(|| {
        if info.sample_rate > 0.0 {
            info.length_in_samples as f64 / info.sample_rate / args.speed
        } else {
            0.0
        }
    });

    let loop_range = args
        .loop_start
        .zip(args.loop_end)
        .map(|(start, end)| TimeRange::new(start, end));

    let placement = ClipPlacement::new(
        TimeRange::new(args.edit_start, args.edit_start + length),
        args.offset,
        loop_range,
        args.speed,
    )?;

    let level = ClipLevel {
        gain_db: args.gain_db,
        pan: args.pan,
        mute: args.mute,
    };

    let wave = WaveNode::new(
        audio_file,
        placement,
        level,
        ChannelSet::stereo(),
        Arc::new(WavFileCache),
        false,
    );

    Ok(match args.drive {
        Some(drive) => {
            let mut plugin = WetDryPlugin::new(Box::new(Saturator::new()));
            plugin.set_parameter("drive", drive);
            Box::new(PluginNode::new(Box::new(wave), plugin))
        }
        None => Box::new(wave),
    })
}

fn run(args: &Args) -> EngineResult<()> {
    let mut manager = CpalAudioDeviceManager::new();
    let output = manager.output_config()?;

    let (mut player, mut commands) = NodePlayer::with_command_queue(build_graph(args)?, 64);
    player.prepare(&PlaybackInitialisationInfo {
        sample_rate: output.sample_rate,
        block_size: BLOCK_SIZE,
    });

    if commands.push(TransportCommand::Play).is_err() {
        log::warn!("Transport queue full, play command dropped");
    }

    manager.start_output_stream(Box::new(player))?;
    log::info!("Playing {}", args.file.display());

    std::thread::park();
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("Playback failed: {e}");
        std::process::exit(1);
    }
}
