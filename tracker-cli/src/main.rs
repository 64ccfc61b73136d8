mod config;
mod create_serial;
mod host_driver;

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use config::{read_tracker_config, TrackerConfig, TrackerConfigSerde};
use create_serial::create_serial;
use host_driver::{QueuedRadio, SimulatedClock, SystemClock};
use log::{debug, info, warn, LevelFilter};
use tokio::{io::AsyncWriteExt, sync::mpsc, time::interval};
use tokio_serial::{available_ports, SerialPortBuilderExt};
use tracker_common::{
    common::geo::{course_to_compass, format_position_nautical, maidenhead_locator},
    driver::{
        clock::Clock,
        gps::{UartGpsError, UartNmeaReader, GPS},
        radio::DummyRadio,
        weather::NoWeatherSensor,
    },
    tiny_aprs::{build_frame, parse_frame, PacketKind, Position, FRAME_LEAD_IN},
    tiny_nmea::{parse, NMEAMessage, TelemetrySnapshot},
    tracker::{tracker_event::TrackerEvent, TickOutcome, Tracker, TrackerError},
};

#[derive(Parser)]
#[command(name = "APRS Tracker CLI")]
#[command(bin_name = "tracker")]
struct Cli {
    /// Tracker configuration (JSON), built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log everything down to trace level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List all the serial ports connected to the host")]
    Detect,
    Replay(ReplayArgs),
    Track(TrackArgs),
    Encode(EncodeArgs),
    Decode(DecodeArgs),
}

#[derive(clap::Args)]
#[command(about = "Feed an NMEA log through the tracker with a simulated clock")]
struct ReplayArgs {
    file: PathBuf,

    /// Simulated time between two GGA sentences, one per fix epoch
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
}

#[derive(clap::Args)]
#[command(about = "Track live from a GNSS receiver on a serial port")]
struct TrackArgs {
    serial: String,

    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Serial port to write the frames to
    #[arg(long)]
    radio: Option<String>,

    #[arg(long, default_value_t = 115200)]
    radio_baud: u32,
}

#[derive(clap::Args)]
#[command(about = "Print the frame the tracker would send for a position")]
struct EncodeArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat: f32,

    #[arg(long, allow_negative_numbers = true)]
    lon: f32,

    /// Meters
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alt: f32,

    #[arg(long, default_value_t = 0)]
    frame_id: u32,

    /// Also print the raw bytes in hex
    #[arg(long)]
    hex: bool,
}

#[derive(clap::Args)]
#[command(about = "Decode a received frame")]
struct DecodeArgs {
    /// Frame text, the lead-in is added when missing
    frame: String,

    /// Frame is given as hex bytes
    #[arg(long)]
    hex: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut logger = env_logger::builder();
    logger.filter_level(if args.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    });
    logger.parse_default_env();
    logger.try_init()?;

    let config: TrackerConfig = match &args.config {
        Some(path) => read_tracker_config(path)?,
        None => TrackerConfigSerde::default().try_into()?,
    };

    match args.command {
        Commands::Detect => {
            let ports = available_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}", port.port_name);
            }
        }
        Commands::Replay(replay) => {
            let sent = run_replay(config, replay).await?;
            info!("replay done: {} position frames sent", sent);
        }
        Commands::Track(track) => run_track(config, track).await?,
        Commands::Encode(encode) => {
            let position = Position {
                lat: encode.lat,
                lon: encode.lon,
                altitude: encode.alt,
            };
            let frame = build_frame(
                &config.identity,
                &position,
                &PacketKind::Position,
                encode.frame_id,
            )
            .map_err(|e| anyhow!("{}", e))?;
            println!("{}", frame.text());
            if encode.hex {
                println!("{}", to_hex(frame.as_bytes()));
            }
        }
        Commands::Decode(decode) => {
            let bytes = if decode.hex {
                parse_hex(&decode.frame)?
            } else {
                let mut bytes = Vec::new();
                if !decode.frame.as_bytes().starts_with(&FRAME_LEAD_IN) {
                    bytes.extend_from_slice(&FRAME_LEAD_IN);
                }
                bytes.extend_from_slice(decode.frame.as_bytes());
                bytes
            };
            print_decoded(&bytes)?;
        }
    }
    Ok(())
}

/// Returns the number of position frames sent.
async fn run_replay(config: TrackerConfig, args: ReplayArgs) -> Result<u32> {
    let log = std::fs::read(&args.file)?;
    let clock = SimulatedClock::default();
    let mut gps = UartNmeaReader::new(log.as_slice(), clock.clone());
    let mut tracker = Tracker::new(
        clock.clone(),
        DummyRadio {},
        NoWeatherSensor {},
        |event: TrackerEvent| debug!("{:?}", event),
        config.identity,
        config.scheduler,
    );
    let mut snapshot = TelemetrySnapshot::new();

    loop {
        let sentence = match gps.next_nmea_sentence().await {
            Ok(sentence) => sentence,
            Err(UartGpsError::EndOfStream) => break,
            Err(e) => return Err(anyhow!("{:?}", e)),
        };
        let message = match parse(&sentence.sentence) {
            Ok(message) => message,
            Err(e) => {
                warn!("replay: dropping sentence: {}", e);
                continue;
            }
        };
        snapshot.apply(&message);
        // GGA and RMC both carry the fix, only GGA moves the clock
        if !matches!(message, NMEAMessage::GGA(_)) {
            continue;
        }

        clock.advance(args.tick_ms);
        report_tick(clock.now_ms(), tracker.tick(&snapshot));
    }

    debug!("last snapshot: {}", snapshot);
    Ok(tracker.tx_counter())
}

async fn run_track(config: TrackerConfig, args: TrackArgs) -> Result<()> {
    let clock = SystemClock::new();
    let (gps_rx, _) = create_serial(&args.serial, args.baud)?;
    let mut gps = UartNmeaReader::new(gps_rx, clock.clone());

    let radio = match &args.radio {
        Some(port) => {
            let mut radio_port =
                tokio_serial::new(port.as_str(), args.radio_baud).open_native_async()?;
            let (frame_tx, mut frame_rx) = mpsc::channel::<Vec<u8>>(1);
            tokio::spawn(async move {
                while let Some(frame) = frame_rx.recv().await {
                    if let Err(e) = radio_port.write_all(&frame).await {
                        warn!("radio: write failed: {}", e);
                    }
                }
            });
            QueuedRadio::new(frame_tx)
        }
        None => QueuedRadio::disconnected(),
    };
    let mut tracker = Tracker::new(
        clock.clone(),
        radio,
        NoWeatherSensor {},
        |event: TrackerEvent| debug!("{:?}", event),
        config.identity,
        config.scheduler,
    );
    let mut snapshot = TelemetrySnapshot::new();
    let mut ticker = interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            sentence = gps.next_nmea_sentence() => {
                let sentence = sentence.map_err(|e| anyhow!("gps: {:?}", e))?;
                snapshot.update(&sentence.sentence).ok();
            }
            _ = ticker.tick() => {
                debug!("{}", snapshot);
                report_tick(clock.now_ms(), tracker.tick(&snapshot));
            }
        }
    }
}

fn report_tick(now_ms: u64, result: Result<TickOutcome, TrackerError>) {
    match result {
        Ok(TickOutcome::Transmitted {
            kind,
            frame_id,
            reason,
            frame,
        }) => {
            println!(
                "[{:>8}ms] {:?} #{} {:?}: {}",
                now_ms,
                kind,
                frame_id,
                reason,
                frame.text()
            );
        }
        Ok(outcome) => debug!("tick: {:?}", outcome),
        Err(TrackerError::Encode(e)) => warn!("tick: {}", e),
        Err(e) => debug!("tick: {}", e),
    }
}

fn print_decoded(bytes: &[u8]) -> Result<()> {
    let frame = parse_frame(bytes).map_err(|e| anyhow!("{}", e))?;

    println!("source:    {}", frame.source);
    println!("dest:      {}", frame.dest);
    println!("via:       {}", frame.via);
    println!(
        "position:  {:.6}, {:.6} ({} {}, {})",
        frame.lat,
        frame.lon,
        format_position_nautical::<16>(frame.lat, 3, true),
        format_position_nautical::<16>(frame.lon, 3, false),
        maidenhead_locator(frame.lat, frame.lon),
    );
    println!("altitude:  {:.1} m", frame.altitude);
    println!("symbol:    {}{}", frame.table, frame.symbol);
    println!("dao:       {}", frame.dao);
    if let Some(weather) = frame.weather {
        if let Some(direction) = weather.wind_direction {
            println!("wind from: {}", course_to_compass(direction as f32));
        }
        println!("weather:   {:?}", weather);
    }
    println!("comment:   {}", frame.comment);
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(anyhow!("odd number of hex digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).map_err(|_| anyhow!("not a hex byte: '{}'", pair))
        })
        .collect()
}
