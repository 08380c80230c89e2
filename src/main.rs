/*
 *  main.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! One refresh per run, meant for cron or a systemd timer.
//!
//! A failed fetch still replaces the panel contents with "Connect Error"
//! unless `--keep-on-error` (or `output.show_errors: false`) is set, in
//! which case the last good dashboard stays up. Exit status is non-zero
//! only for configuration, font or sink failures.

use anyhow::Context;
use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info};

use tempest_dash::config::{self, Cli, Config};
use tempest_dash::display::{DashboardLayout, SinkFactory, SvgTextPainter};
use tempest_dash::refresh::{RunOutcome, refresh_once};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    if let Some(station) = out.station.as_mut() {
        if station.token.is_some() {
            station.token = Some("********".to_string());
        }
    }
    out
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = config::load_from(&cli);

    let level = match &loaded {
        Ok(cfg) => cfg.log_level().to_string(),
        Err(_) => cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Stdout)
        .format_timestamp_secs()
        .init();

    info!("{} - weather at a glance", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", BUILD_VERSION, BUILD_DATE);

    let cfg = loaded.inspect_err(|e| error!("{}", e)).context("invalid configuration")?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&redacted(&cfg))?);
        return Ok(());
    }

    // fonts first, nothing is drawn without them
    let assets = cfg.display().assets_dir();
    let painter = SvgTextPainter::load(&assets)
        .inspect_err(|e| error!("Font load failed: {}", e))
        .with_context(|| format!("loading fonts from {}", assets.display()))?;

    let layout = DashboardLayout::from_config(&cfg.display());
    let mut sink = SinkFactory::select(&cfg.output(), layout.width, layout.height);

    let outcome = refresh_once(&cfg, painter, sink.as_mut())
        .await
        .inspect_err(|e| error!("Display update failed: {}", e))
        .context("display update")?;

    match outcome {
        RunOutcome::Rendered { lightning: true } => info!("Done (lightning banner shown)."),
        RunOutcome::Rendered { lightning: false } => info!("Done."),
        RunOutcome::NoData => info!("Done, showing connection error."),
    }
    Ok(())
}
