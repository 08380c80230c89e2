/*
 *  display/drivers/mock.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Mock output sink for testing without hardware
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

use std::sync::{Arc, Mutex};

use crate::display::Canvas;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, OutputSink, SinkCapabilities};

/// Mock sink for testing
///
/// Keeps a copy of every frame it is shown. State is shared so a test can
/// hand the sink away as a `Box<dyn OutputSink>` and still inspect it.
#[derive(Debug, Clone)]
pub struct MockSink {
    capabilities: SinkCapabilities,
    state: Arc<Mutex<MockSinkState>>,
}

/// Internal state for the mock sink (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockSinkState {
    /// Number of successful show() calls
    pub show_count: usize,

    /// Last frame shown
    pub last_frame: Option<Canvas>,

    /// Simulate failures (for error testing)
    pub simulate_failure: bool,
}

impl MockSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: SinkCapabilities {
                width,
                height,
                color_depth: ColorDepth::Palette7,
                slow_refresh: false,
            },
            state: Arc::new(Mutex::new(MockSinkState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSinkState>> {
        Arc::clone(&self.state)
    }

    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.simulate_failure = failing;
        }
    }
}

impl OutputSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &SinkCapabilities {
        &self.capabilities
    }

    fn show(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        self.check_canvas(canvas)?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| DisplayError::Io(std::io::Error::other("mock state poisoned")))?;
        if state.simulate_failure {
            return Err(DisplayError::SpiError("Simulated show failure".to_string()));
        }
        state.show_count += 1;
        state.last_frame = Some(canvas.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::InkyColor;

    #[test]
    fn test_mock_sink_records_frames() {
        let mut sink = MockSink::new(16, 8);
        let state = sink.state();
        assert_eq!(state.lock().unwrap().show_count, 0);

        let mut canvas = Canvas::new(16, 8, InkyColor::White);
        canvas.set_pixel(3, 3, InkyColor::Green);
        sink.show(&canvas).unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.show_count, 1);
        assert_eq!(state.last_frame.as_ref().unwrap().pixel(3, 3), Some(InkyColor::Green));
    }

    #[test]
    fn test_mock_sink_simulated_failure() {
        let mut boxed: Box<dyn OutputSink> = Box::new(MockSink::new(4, 4));
        let canvas = Canvas::new(4, 4, InkyColor::White);
        assert!(boxed.show(&canvas).is_ok());

        let sink = MockSink::new(4, 4);
        sink.set_failing(true);
        let mut boxed: Box<dyn OutputSink> = Box::new(sink.clone());
        assert!(boxed.show(&canvas).is_err());
        assert_eq!(sink.state().lock().unwrap().show_count, 0);
    }

    #[test]
    fn test_mock_sink_checks_size() {
        let mut sink = MockSink::new(4, 4);
        let canvas = Canvas::new(8, 4, InkyColor::White);
        assert!(matches!(
            sink.show(&canvas),
            Err(DisplayError::BufferSizeMismatch { expected: 16, actual: 32 })
        ));
    }
}
