use std::env;
use std::time::Duration;

use log::{debug, warn};

use tonelib::config::{
    AMPLITUDE, DEFAULT_DEVICE, DEFAULT_LEFT, DEFAULT_RIGHT, FRAMES_PER_BUFFER, PLAY_SECONDS,
    SAMPLE_RATE, TABLE_SIZE,
};
use tonelib::devices;
use tonelib::error::ToneError;
use tonelib::route::ChannelRoute;
use tonelib::session::{CpalHost, StreamSession};
use tonelib::wavetable::{TonePlayer, WaveTable};

fn main() {
    env_logger::init();

    println!(
        "Tone output test: mono sine on a routed channel pair. SR = {}, BufSize = {}",
        SAMPLE_RATE, FRAMES_PER_BUFFER
    );

    let args: Vec<String> = env::args().collect();
    let device_name = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    let left = parse_channel(args.get(2), DEFAULT_LEFT);
    let right = parse_channel(args.get(3), DEFAULT_RIGHT);

    match run(&device_name, left, right) {
        Ok(()) => println!("Test finished."),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("An error occurred while using the audio stream");
            eprintln!("Error number: {}", code);
            eprintln!("Error message: {}", e);
            std::process::exit(code);
        }
    }
}

fn parse_channel(arg: Option<&String>, default: usize) -> usize {
    match arg {
        Some(raw) => match raw.parse() {
            Ok(index) => index,
            Err(_) => {
                warn!("Ignoring channel argument {:?}, using {}", raw, default);
                default
            }
        },
        None => default,
    }
}

fn run(device_name: &str, left: usize, right: usize) -> Result<(), ToneError> {
    let host = cpal::default_host();
    let enumeration = devices::enumerate(&host)?;

    let descriptor = match enumeration.catalog().resolve(device_name) {
        Ok(descriptor) => descriptor.clone(),
        Err(e) => {
            // not found: list everything we do know about, then bail
            for device in enumeration.catalog().iter() {
                println!("{} maps to {}", device.name, device.index);
            }
            return Err(e);
        }
    };
    println!("{} maps to {}", descriptor.name, descriptor.index);

    let route = ChannelRoute::new(&descriptor, left, right)?;
    debug!(
        "Routing tone to output channels {} and {} of {}",
        route.left(),
        route.right(),
        descriptor.name
    );

    let device = enumeration
        .into_handle(&descriptor)
        .ok_or_else(|| ToneError::DeviceNotFound(descriptor.name.clone()))?;
    let player = TonePlayer::new(WaveTable::sine(TABLE_SIZE, AMPLITUDE));
    let mut session = StreamSession::new(CpalHost::new(device, route, player));

    println!("Play for {} seconds.", PLAY_SECONDS);
    session.run(Duration::from_secs(PLAY_SECONDS))
}
