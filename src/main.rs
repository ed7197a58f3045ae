use std::process::ExitCode;

use log::error;
use serde_json::json;

use hexplates::config::Params;
use hexplates::geometry::Orientation;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let defaults = Params::default();
    let params = Params {
        seed: args.get(1).and_then(|s| s.parse().ok()).unwrap_or(defaults.seed),
        image_width: args.get(2).and_then(|s| s.parse().ok()).unwrap_or(defaults.image_width),
        image_height: args.get(3).and_then(|s| s.parse().ok()).unwrap_or(defaults.image_height),
        plate_count: args.get(4).and_then(|s| s.parse().ok()).unwrap_or(defaults.plate_count),
        hex_size: args.get(5).and_then(|s| s.parse().ok()).unwrap_or(defaults.hex_size),
        orientation: match args.get(6).map(String::as_str) {
            Some("horizontal") => Orientation::Horizontal,
            _ => Orientation::Vertical,
        },
        ..defaults
    };

    eprintln!(
        "Generating {}x{} map with seed={}, plates={}, hex={} {:?}",
        params.image_width,
        params.image_height,
        params.seed,
        params.plate_count,
        params.hex_size,
        params.orientation
    );

    let (session, timings) = match hexplates::generate(&params) {
        Ok(out) => out,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let plates: Vec<_> = session
        .plates()
        .iter()
        .map(|p| {
            json!({
                "index": p.index,
                "center": p.center,
                "color": p.color,
                "cells": p.cells.len(),
                "velocity": p.velocity,
            })
        })
        .collect();
    let summary = json!({
        "fit": session.fit(),
        "phase": session.phase(),
        "steps": session.steps(),
        "cells": session.grid().len(),
        "plates": plates,
    });

    match serde_json::to_string_pretty(&summary) {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to encode summary: {e}");
            ExitCode::FAILURE
        }
    }
}
