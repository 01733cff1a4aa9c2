//! Simulate a burst of attribute changes against one accessory and print the
//! bridge commands that come out.
//!
//! Run with: cargo run --example simulate -- --type fullColor brightness=3 wait=50 hue=200

use clap::Parser;
use futures::StreamExt;
use milight_accessory_rs::{
    Accessory, AttributeChange, BridgeConfig, BridgeConnection, ChannelSink, Outbound,
    PlatformConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "milight-simulate")]
#[command(about = "Print the MiLight commands produced by a series of changes", long_about = None)]
struct Cli {
    /// Plugin configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bulb type used when no configuration file is given
    #[arg(short = 't', long = "type", default_value = "rgbw")]
    bulb_type: String,

    /// Zone that receives the changes
    #[arg(short, long, default_value = "1")]
    zone: u8,

    /// Changes in order, e.g. `on=true`, `brightness=45`, `hue=200`,
    /// `saturation=0`, `ct=300`, or `wait=50` to pause for 50ms
    #[arg(value_parser = parse_input)]
    inputs: Vec<Input>,
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Change(AttributeChange),
    Wait(u64),
}

fn parse_input(arg: &str) -> Result<Input, String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {arg}"))?;
    let number = || {
        value
            .parse::<i32>()
            .map_err(|e| format!("invalid value for {key}: {e}"))
    };

    let input = match key {
        "on" => Input::Change(AttributeChange::On(
            value
                .parse()
                .map_err(|e| format!("invalid value for on: {e}"))?,
        )),
        "brightness" => Input::Change(AttributeChange::Brightness(number()?)),
        "hue" => Input::Change(AttributeChange::Hue(number()?)),
        "saturation" => Input::Change(AttributeChange::Saturation(number()?)),
        "ct" | "color_temperature" => Input::Change(AttributeChange::ColorTemperature(number()?)),
        "wait" => Input::Wait(
            value
                .parse()
                .map_err(|e| format!("invalid value for wait: {e}"))?,
        ),
        _ => return Err(format!("unknown attribute {key}")),
    };
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlatformConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PlatformConfig {
            bridges: vec![BridgeConfig {
                name: Some("demo".to_string()),
                bulb_type: Some(cli.bulb_type.clone()),
                zones: Some(
                    (1..=cli.zone)
                        .map(|n| Some(format!("Lamp {n}")))
                        .collect(),
                ),
                ..Default::default()
            }],
        },
    };

    let (bridges, errors) = config.validate();
    for e in &errors {
        eprintln!("Skipping bridge: {}", e);
    }
    let bridge = bridges
        .into_iter()
        .next()
        .ok_or("No usable bridge in configuration")?;

    let identity = bridge.bridge.identity();
    let accessory = bridge
        .accessories
        .into_iter()
        .find(|a| a.zone.number() == cli.zone)
        .ok_or_else(|| format!("Zone {} is not configured on {}", cli.zone, identity))?;
    let debounce = accessory.debounce;

    let (sink, mut commands) = ChannelSink::new(&identity);
    let connection = Arc::new(BridgeConnection::new(&identity, sink));
    let lamp = Accessory::new(accessory, Arc::clone(&connection))?;

    println!("{}", serde_json::to_string_pretty(&lamp.services())?);

    let start = Instant::now();
    let printer = tokio::spawn(async move {
        while let Some(item) = commands.next().await {
            let at = start.elapsed().as_millis();
            match item {
                Outbound::Command(command) => println!("{:>6}ms  {}", at, command),
                Outbound::Pause(pause) => println!("{:>6}ms  pause {}ms", at, pause.as_millis()),
            }
        }
    });

    for input in cli.inputs {
        match input {
            Input::Change(change) => {
                println!("{:>6}ms  request {:?}", start.elapsed().as_millis(), change);
                lamp.request_change(change).await;
            }
            Input::Wait(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    tokio::time::sleep(debounce * 2).await;
    lamp.flush().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    printer.abort();

    let summary = connection.history().await.summary();
    println!(
        "\n{} command(s), {} pause(s), {} error(s)",
        summary.command_count, summary.pause_count, summary.error_count
    );
    if let Some(error) = summary.last_error {
        println!("Last error: {}", error);
    }
    println!("Final state: {:?}", lamp.state().await);

    Ok(())
}
