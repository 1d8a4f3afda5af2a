//! ASEP Sim - Interactive shell
//!
//! Runs a single simulation and drives it one frame at a time from typed
//! commands. An optional first argument names a TOML preset to start from.

use asep_sim::core::config::SimulationParams;
use asep_sim::core::error::Result;
use asep_sim::render::{CanvasSize, RenderTarget, TextRenderer};
use asep_sim::simulation::{Action, ClickTarget, SimulationController};
use asep_sim::ui::EventLog;

use std::io::{self, Write};
use std::path::Path;

/// Wall-clock length of one frame
const FRAME_DT: f64 = 1.0 / 60.0;

/// Nominal canvas handed to the text renderer
const CANVAS: CanvasSize = CanvasSize {
    width: 80.0,
    height: 24.0,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asep_sim=info".into()),
        )
        .init();

    let params = match std::env::args().nth(1) {
        Some(path) => SimulationParams::load(Path::new(&path))?,
        None => SimulationParams::default(),
    };

    let mut controller: SimulationController = SimulationController::new(params)?;
    let mut renderer = TextRenderer::new();
    let mut log = EventLog::new();

    println!("\n=== ASEP SIM ===");
    println!("Particles hopping on a one-dimensional lattice with exclusion");
    println!();
    println!("Commands:");
    println!("  tick / t [dt]        - Advance one frame (or dt seconds)");
    println!("  run <n>              - Advance n frames");
    println!("  click <site|entry|exit> - Toggle a site or trigger a reservoir");
    println!("  reset                - Re-initialize with the current parameters");
    println!("  pause / p            - Toggle pause");
    println!("  status / s           - Show statistics");
    println!("  log                  - Show recent events");
    println!("  set <param> <value>  - Change a parameter");
    println!("  quit / q             - Exit");
    println!();

    loop {
        log.record(controller.drain_events());
        renderer.render(&controller.view(), CANVAS, controller.params());
        print!("{}", renderer.frame());

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let mut words = input.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match command {
            "quit" | "q" => break,
            "tick" | "t" => {
                let dt = match args.first() {
                    Some(arg) => match arg.parse::<f64>() {
                        Ok(dt) => dt,
                        Err(_) => {
                            println!("Usage: tick [dt]");
                            continue;
                        }
                    },
                    None => FRAME_DT,
                };
                let animating = controller.tick(dt);
                println!("Advanced {:.3}s{}", dt, if animating { " (animating)" } else { "" });
            }
            "run" => match args.first().and_then(|a| a.parse::<u32>().ok()) {
                Some(n) => {
                    for _ in 0..n {
                        controller.tick(FRAME_DT);
                    }
                    println!("Ran {} frames. Now at t={:.3}s.", n, controller.clock());
                }
                None => println!("Usage: run <number>"),
            },
            "click" => match args.first().and_then(|a| parse_target(a)) {
                Some(target) => match controller.handle_click(target) {
                    Ok(outcome) => println!("{:?}", outcome),
                    Err(e) => println!("Click failed: {}", e),
                },
                None => println!("Usage: click <site|entry|exit>"),
            },
            "reset" | "pause" | "p" | "reset-simulation" | "toggle-pause" => {
                let name = if command == "p" { "pause" } else { command };
                match name.parse::<Action>() {
                    Ok(action) => {
                        if let Err(e) = controller.apply_action(action) {
                            println!("{} failed: {}", action.name(), e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "status" | "s" => display_status(&controller),
            "log" => {
                for entry in log.recent(20) {
                    println!("  [{:>8.3}] {}", entry.time, entry.message);
                }
            }
            "set" => match args.as_slice() {
                [name, value] => {
                    let mut params = controller.params().clone();
                    match params
                        .set_field(name, value)
                        .and_then(|_| controller.update(params))
                    {
                        Ok(()) => println!("{} = {}", name, value),
                        Err(e) => println!("Could not set {}: {}", name, e),
                    }
                }
                _ => println!("Usage: set <param> <value>"),
            },
            _ => println!(
                "Unknown command. Available: tick, run <n>, click <target>, reset, pause, status, log, set, quit"
            ),
        }
    }

    controller.dispose();
    println!("\nGoodbye! Simulated {:.3}s.", controller.clock());
    Ok(())
}

fn parse_target(arg: &str) -> Option<ClickTarget> {
    match arg {
        "entry" => Some(ClickTarget::EntryReservoir),
        "exit" => Some(ClickTarget::ExitReservoir),
        site => site.parse().ok().map(ClickTarget::Site),
    }
}

/// Display running statistics
fn display_status(controller: &SimulationController) {
    use asep_sim::boundary::BoundaryPolicy;

    let stats = controller.stats();
    let scheduler = controller.scheduler();
    println!();
    println!("=== Status (t={:.3}s) ===", controller.clock());
    println!(
        "  Hops: {} right, {} left | Entries: {} | Exits: {} | Rejected: {}",
        stats.hops_right, stats.hops_left, stats.entries, stats.exits, stats.rejections
    );
    println!(
        "  Armed events: {} ({} queued) | Manual edits: {}",
        scheduler.armed_count(),
        scheduler.queued(),
        stats.manual_edits
    );
    println!(
        "  Mean density: {:.3} | Mean current: {:.4}",
        stats.mean_density(),
        stats.mean_current(controller.boundary().bond_count())
    );
    let profile: Vec<String> = stats
        .density_profile()
        .iter()
        .map(|d| format!("{:.2}", d))
        .collect();
    println!("  Profile: [{}]", profile.join(" "));
    println!();
}
