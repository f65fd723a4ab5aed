// Hide console window on Windows for release builds (GUI app).
// The headless simulation prints to the parent console in debug builds.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;
use colored::Colorize;

use dicespin::shaker::simulation::{RoundReport, Simulation};
use dicespin::shaker::types::{DieVariant, RollStage, ShakerSettings, SkinPreset, SoundKind};
use dicespin::shaker::ShakerPlugin;

/// Dice Spin - shake a row of dice and reveal their total
#[derive(Parser, Debug)]
#[command(name = "dicespin")]
#[command(author, version, about = "Dice Spin - tap SPACE to shake the dice, let go to roll")]
struct Cli {
    /// Settings file (RON). Missing fields use defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of dice in the row
    #[arg(short, long)]
    dice: Option<usize>,

    /// Die rendering variant
    #[arg(long, value_enum)]
    variant: Option<DieVariant>,

    /// Face skin preset
    #[arg(long, value_enum)]
    skin: Option<SkinPreset>,

    /// Fixed RNG seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Run the roll headless and print the outcome instead of opening a window
    #[arg(long)]
    simulate: bool,

    /// Trigger time in seconds for --simulate. Repeat for several presses.
    #[arg(long = "press", value_name = "SECS")]
    presses: Vec<f32>,

    /// Fixed time step for --simulate
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// How long --simulate runs, in seconds
    #[arg(long, default_value_t = 6.0)]
    duration: f32,

    /// Print the --simulate report as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective settings to this file and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

impl Cli {
    /// Settings from the config file (or defaults) with CLI overrides applied.
    /// A config that fails to load is reported and replaced by defaults.
    fn settings(&self) -> (ShakerSettings, Option<String>) {
        let (mut settings, load_error) = match &self.config {
            Some(path) => match ShakerSettings::load(path) {
                Ok(settings) => (settings, None),
                Err(e) => (ShakerSettings::default(), Some(e.to_string())),
            },
            None => (ShakerSettings::default(), None),
        };

        if let Some(count) = self.dice {
            settings.dice.count = count.max(1);
        }
        if let Some(variant) = self.variant {
            settings.dice.variant = variant;
        }
        if let Some(preset) = self.skin {
            settings.skin.preset = preset;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        (settings, load_error)
    }
}

fn main() {
    let cli = Cli::parse();
    let (settings, load_error) = cli.settings();

    if let Some(path) = &cli.write_config {
        match settings.save(path) {
            Ok(()) => println!("{} {}", "Wrote".green().bold(), path.display()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    if cli.simulate {
        if let Some(error) = &load_error {
            eprintln!("{} {}; using defaults", "Warning:".yellow().bold(), error);
        }
        run_simulation(&cli, &settings);
    } else {
        run_app(settings, load_error);
    }
}

fn run_app(settings: ShakerSettings, load_error: Option<String>) {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Dice Spin".to_string(),
                    resolution: (1280u32, 720u32).into(),
                    ..default()
                }),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                filter: "info,wgpu=error".to_string(),
                ..default()
            }),
    )
    .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.12)))
    .add_plugins(ShakerPlugin::new(settings));

    if let Some(error) = load_error {
        app.add_systems(Startup, move || {
            warn!("Could not load settings ({}); using defaults", error);
        });
    }

    app.run();
}

fn run_simulation(cli: &Cli, settings: &ShakerSettings) {
    let presses = if cli.presses.is_empty() {
        vec![0.0]
    } else {
        cli.presses.clone()
    };

    let report = match settings.dice.variant {
        DieVariant::Volumetric => {
            let mut sim = Simulation::volumetric(settings);
            sim.run(&presses, cli.dt, cli.duration);
            sim.report()
        }
        DieVariant::Planar => {
            let mut sim = Simulation::planar(settings);
            sim.run(&presses, cli.dt, cli.duration);
            sim.report()
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}

fn print_report(report: &RoundReport) {
    let rule = "════════════════════════════════════════".cyan();
    println!("\n{}", rule);
    println!(
        "{} {} x{} {}",
        "Shaking:".bold().white(),
        report.variant.label().yellow().bold(),
        report.dice,
        report
            .seed
            .map(|s| format!("(seed {})", s))
            .unwrap_or_default()
            .dimmed()
    );

    for transition in &report.transitions {
        println!(
            "  {:>6.2}s  {}",
            transition.time,
            transition.stage.name().bright_white()
        );
    }

    println!(
        "{} {:.2}   {} {}   {} {}",
        "Peak energy:".bold().white(),
        report.peak_energy,
        "Ticks:".bold().white(),
        report.ticks,
        "Flips:".bold().white(),
        report.flips
    );
    let settles = report
        .one_shots
        .iter()
        .filter(|s| **s == SoundKind::Settle)
        .count();
    if settles > 0 {
        println!("{} {}", "Settled dice:".bold().white(), settles);
    }

    match report.total {
        Some(total) => {
            let faces: Vec<String> = report.faces.iter().map(|f| f.to_string()).collect();
            println!(
                "{} {}",
                "Dice:".bold().white(),
                format!("[{}]", faces.join(", ")).bright_green().bold()
            );
            if report.final_stage == RollStage::TotalShown {
                println!("{} {}", "Total:".bold().white(), total.to_string().green().bold());
            } else {
                println!(
                    "{} {} {}",
                    "Total:".bold().white(),
                    total.to_string().green(),
                    "(not revealed yet)".dimmed()
                );
            }
        }
        None => println!(
            "{} {}",
            "Result:".bold().white(),
            format!("still {}", report.final_stage.name()).yellow()
        ),
    }
    println!("{}", rule);
}
