/*
 *  refresh.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  One fetch, render, show cycle
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

use log::{error, info};

use crate::config::{Config, StationConfig};
use crate::display::{DashboardLayout, DashboardRenderer, DisplayError, OutputSink, TextPainter};
use crate::weather::{WeatherFlow, WeatherReading};

/// What the panel ended up showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Full dashboard; `lightning` when the banner replaced the forecast
    Rendered { lightning: bool },
    /// Fetch failed, error placeholder shown
    NoData,
}

/// Fetch a reading; every failure, client construction included, is "no data".
pub async fn fetch_reading(station: &StationConfig) -> Option<WeatherReading> {
    match WeatherFlow::new(station) {
        Ok(client) => client.fetch().await,
        Err(e) => {
            error!("Weather client: {}", e);
            None
        }
    }
}

/// Render `reading` (or the placeholder) and push it to `sink`.
pub fn render_and_show<P: TextPainter>(
    renderer: &mut DashboardRenderer<P>,
    reading: Option<&WeatherReading>,
    sink: &mut dyn OutputSink,
) -> Result<RunOutcome, DisplayError> {
    let outcome = match reading {
        Some(r) => RunOutcome::Rendered { lightning: r.has_lightning() },
        None => RunOutcome::NoData,
    };
    let canvas = renderer.render(reading)?;
    let caps = sink.capabilities();
    info!("Sending frame to {} ({:?})", sink.name(), caps.color_depth);
    if caps.slow_refresh {
        info!("Panel refresh in progress, this takes about 30 seconds");
    }
    sink.show(&canvas)?;
    Ok(outcome)
}

/// The whole run against an already chosen sink and loaded painter.
pub async fn refresh_once<P: TextPainter>(
    config: &Config,
    painter: P,
    sink: &mut dyn OutputSink,
) -> Result<RunOutcome, DisplayError> {
    let layout = DashboardLayout::from_config(&config.display());
    let mut renderer = DashboardRenderer::new(layout, config.thresholds(), painter);

    let reading = fetch_reading(&config.station()).await;
    if reading.is_none() {
        error!("Fetch failed.");
        if !config.output().show_errors() {
            info!("Leaving {} as it is", sink.name());
            return Ok(RunOutcome::NoData);
        }
    }
    render_and_show(&mut renderer, reading.as_ref(), sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use crate::display::drivers::mock::MockSink;
    use crate::display::{InkyColor, RecordingPainter};

    fn offline_config() -> Config {
        Config {
            station: Some(StationConfig {
                station_id: Some("77".into()),
                token: Some("secret".into()),
                api_base: Some("http://127.0.0.1:9".into()),
                timeout_secs: Some(2),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_offline_run_shows_placeholder() {
        let mut sink = MockSink::new(800, 480);
        let outcome = refresh_once(&offline_config(), RecordingPainter::new(), &mut sink).await.unwrap();
        assert_eq!(outcome, RunOutcome::NoData);

        let state = sink.state();
        let state = state.lock().unwrap();
        assert_eq!(state.show_count, 1);
        let frame = state.last_frame.as_ref().unwrap();
        assert!(frame.count(InkyColor::Red) > 0);
        assert_eq!(frame.count(InkyColor::Black), 0);
    }

    #[tokio::test]
    async fn test_keep_on_error_leaves_sink_alone() {
        let mut config = offline_config();
        config.output = Some(OutputConfig { show_errors: Some(false), ..Default::default() });
        let mut sink = MockSink::new(800, 480);
        let outcome = refresh_once(&config, RecordingPainter::new(), &mut sink).await.unwrap();
        assert_eq!(outcome, RunOutcome::NoData);
        assert_eq!(sink.state().lock().unwrap().show_count, 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_no_data() {
        assert!(fetch_reading(&StationConfig::default()).await.is_none());
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut renderer = DashboardRenderer::new(
            DashboardLayout::default(),
            Default::default(),
            RecordingPainter::new(),
        );
        let mut sink = MockSink::new(800, 480);
        sink.set_failing(true);
        let reading = WeatherReading { strikes: 2, ..Default::default() };
        assert!(render_and_show(&mut renderer, Some(&reading), &mut sink).is_err());

        sink.set_failing(false);
        let outcome = render_and_show(&mut renderer, Some(&reading), &mut sink).unwrap();
        assert_eq!(outcome, RunOutcome::Rendered { lightning: true });
    }
}
