use clap::Parser;
use psgmml::sink::{AudioSink, PcmSink, WavSink};
use psgmml::synth::waveform::{Tone, FIRST_TABLE_TONE, TABLE_TONE_COUNT};
use psgmml::synth::TICKS_PER_SECOND;
use psgmml::{MmlSource, SynthEngine};
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "psgmml")]
#[command(version = "0.1.0")]
#[command(about = "Four-voice MML synthesizer", long_about = None)]
struct Args {
    /// Output file (.wav for WAV, anything else for raw S16_LE stereo PCM)
    #[arg(required_unless_present = "list_tones")]
    output: Option<PathBuf>,

    /// Input MML file, one line per channel (default programs if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Seconds of audio to render
    #[arg(short, long, default_value_t = 10)]
    seconds: u32,

    /// Master volume (0-15)
    #[arg(short = 'V', long, default_value_t = 10)]
    volume: i32,

    /// Ticks to drop before the first rendered one
    #[arg(long, default_value_t = 0)]
    skip: u32,

    /// List available tones
    #[arg(short = 'L', long)]
    list_tones: bool,

    /// Log every parsed note
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}

fn main() -> Result<(), psgmml::Error> {
    let args = Args::parse();
    setup_logging(args.verbose);

    if args.list_tones {
        println!("@0  {}", Tone::Pwm.name());
        for n in FIRST_TABLE_TONE..FIRST_TABLE_TONE + TABLE_TONE_COUNT as u32 {
            println!("@{:<2} {}", n, Tone::from_number(n).name());
        }
        return Ok(());
    }

    // clap enforces an output unless listing tones
    let Some(output) = args.output else {
        return Ok(());
    };

    let mut engine = SynthEngine::new();
    if let Some(path) = &args.input {
        let source = MmlSource::load(path)?;
        engine.load_source(&source)?;
    }
    engine.skip_frames(args.skip);

    let ticks = tick_count(args.seconds, args.skip);
    let is_wav = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        let mut sink = WavSink::create(&output)?;
        render(&mut engine, &mut sink, args.volume, ticks)?;
        info!("Wrote {} frames to {}", sink.frames_written(), output.display());
        sink.finalize()?;
    } else {
        let mut sink = PcmSink::new(File::create(&output)?);
        render(&mut engine, &mut sink, args.volume, ticks)?;
        info!("Wrote {} frames to {}", sink.frames_written(), output.display());
        sink.finish()?;
    }

    Ok(())
}

/// Ticks to run for `seconds` of audio after `skip` dropped ticks
fn tick_count(seconds: u32, skip: u32) -> u32 {
    seconds.saturating_mul(TICKS_PER_SECOND).saturating_add(skip)
}

fn render<S: AudioSink>(
    engine: &mut SynthEngine,
    sink: &mut S,
    volume: i32,
    ticks: u32,
) -> Result<(), psgmml::Error> {
    sink.set_volume(volume);
    for _ in 0..ticks {
        engine.play_slice(sink)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_count() {
        assert_eq!(tick_count(10, 0), 400);
        assert_eq!(tick_count(1, 3), 43);
    }

    #[test]
    fn test_tick_count_saturates() {
        assert_eq!(tick_count(u32::MAX, 5), u32::MAX);
        assert_eq!(tick_count(u32::MAX / TICKS_PER_SECOND, u32::MAX), u32::MAX);
    }
}
