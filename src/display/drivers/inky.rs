/*
 *  display/drivers/inky.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Pimoroni Inky Impression 7.3" (AC073TC1A controller)
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

use std::io::Write;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use linux_embedded_hal::gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions};
use linux_embedded_hal::{Delay, I2cdev};
use log::{debug, info, warn};

use crate::config::OutputConfig;
use crate::display::Canvas;
use crate::display::color::InkyColor;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, OutputSink, SinkCapabilities};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 480;

/// Identification EEPROM on the HAT
pub const EEPROM_ADDRESS: u8 = 0x50;
/// width, height, colour, pcb variant, display variant, 22 byte pascal string
const EEPROM_LEN: usize = 29;

// BCM line offsets on the 40 pin header
const RESET_PIN: u32 = 27;
const BUSY_PIN: u32 = 17;
const DC_PIN: u32 = 22;
const CS_PIN: u32 = 8;

const SPI_SPEED_HZ: u32 = 5_000_000;
const SPI_CHUNK: usize = 4096;
const CONSUMER: &str = "tempest-dash";

// AC073TC1A commands
const PSR: u8 = 0x00;
const PWR: u8 = 0x01;
const POF: u8 = 0x02;
const POFS: u8 = 0x03;
const PON: u8 = 0x04;
const BTST1: u8 = 0x05;
const BTST2: u8 = 0x06;
const BTST3: u8 = 0x08;
const DTM: u8 = 0x10;
const DRF: u8 = 0x12;
const IPC: u8 = 0x13;
const PLL: u8 = 0x30;
const TSE: u8 = 0x41;
const CDI: u8 = 0x50;
const TCON: u8 = 0x60;
const TRES: u8 = 0x61;
const VDCS: u8 = 0x82;
const T_VDCS: u8 = 0x84;
const AGID: u8 = 0x86;
const CMDH: u8 = 0xAA;
const CCSET: u8 = 0xE0;
const PWS: u8 = 0xE3;
const TSSET: u8 = 0xE6;

/// Register writes issued after every reset
const SETUP_SEQUENCE: [(u8, &[u8]); 19] = [
    (CMDH, &[0x49, 0x55, 0x20, 0x08, 0x09, 0x18]),
    (PWR, &[0x3F, 0x00, 0x32, 0x2A, 0x0E, 0x2A]),
    (PSR, &[0x5F, 0x69]),
    (POFS, &[0x00, 0x54, 0x00, 0x44]),
    (BTST1, &[0x40, 0x1F, 0x1F, 0x2C]),
    (BTST2, &[0x6F, 0x1F, 0x16, 0x25]),
    (BTST3, &[0x6F, 0x1F, 0x1F, 0x22]),
    (IPC, &[0x00, 0x04]),
    (PLL, &[0x02]),
    (TSE, &[0x00]),
    (CDI, &[0x3F]),
    (TCON, &[0x02, 0x00]),
    (TRES, &[0x03, 0x20, 0x01, 0xE0]),
    (VDCS, &[0x1E]),
    (T_VDCS, &[0x00]),
    (AGID, &[0x00]),
    (PWS, &[0x2F]),
    (CCSET, &[0x00]),
    (TSSET, &[0x00]),
];

/// Known display variants, indexed by the EEPROM variant byte
const DISPLAY_VARIANTS: [&str; 23] = [
    "Unknown",
    "Red pHAT (High-Temp)",
    "Yellow wHAT",
    "Black wHAT",
    "Black pHAT",
    "Yellow pHAT",
    "Red wHAT",
    "Red wHAT (High-Temp)",
    "Red wHAT",
    "Unknown",
    "Black pHAT (SSD1608)",
    "Red pHAT (SSD1608)",
    "Yellow pHAT (SSD1608)",
    "Unknown",
    "7-Colour (UC8159)",
    "7-Colour 640x400 (UC8159)",
    "7-Colour 640x400 (UC8159)",
    "Black wHAT (SSD1683)",
    "Red wHAT (SSD1683)",
    "Yellow wHAT (SSD1683)",
    "7-Colour 800x480 (AC073TC1A)",
    "Spectra 6 13.3 1600 x 1200 (EL133UF1)",
    "Spectra 6 7.3 800 x 480 (E673)",
];

/// Decoded identification EEPROM
#[derive(Debug, Clone, PartialEq)]
pub struct EepromInfo {
    pub width: u16,
    pub height: u16,
    pub color: u8,
    pub pcb_variant: u8,
    pub display_variant: u8,
    pub write_time: String,
}

impl EepromInfo {
    pub fn parse(raw: &[u8]) -> Result<Self, DisplayError> {
        if raw.len() < 7 {
            return Err(DisplayError::NotDetected(format!("EEPROM returned {} bytes", raw.len())));
        }
        let stamp_len = raw.get(7).map_or(0, |&n| n as usize);
        let write_time = raw
            .get(8..8 + stamp_len.min(raw.len().saturating_sub(8)))
            .map(|b| String::from_utf8_lossy(b).trim_end_matches('\0').to_string())
            .unwrap_or_default();
        Ok(Self {
            width: u16::from_le_bytes([raw[0], raw[1]]),
            height: u16::from_le_bytes([raw[2], raw[3]]),
            color: raw[4],
            pcb_variant: raw[5],
            display_variant: raw[6],
            write_time,
        })
    }

    pub fn variant_name(&self) -> &'static str {
        DISPLAY_VARIANTS
            .get(self.display_variant as usize)
            .copied()
            .unwrap_or("Unknown")
    }

    pub fn is_supported(&self) -> bool {
        self.width as u32 == WIDTH && self.height as u32 == HEIGHT
    }
}

/// Read the HAT EEPROM and accept an 800x480 panel.
pub fn probe(i2c_bus: &str) -> Result<EepromInfo, DisplayError> {
    let mut i2c = I2cdev::new(i2c_bus)
        .map_err(|e| DisplayError::I2cError(format!("{}: {}", i2c_bus, e)))?;
    let mut raw = [0u8; EEPROM_LEN];
    i2c.write_read(EEPROM_ADDRESS, &[0x00, 0x00], &mut raw)?;

    let info = EepromInfo::parse(&raw)?;
    debug!("EEPROM: {:?}", info);
    if !info.is_supported() {
        return Err(DisplayError::NotDetected(format!(
            "{} is {}x{}, need {}x{}",
            info.variant_name(), info.width, info.height, WIDTH, HEIGHT
        )));
    }
    Ok(info)
}

/// Two palette indices per byte, high nibble first.
pub fn pack_frame(canvas: &Canvas) -> Vec<u8> {
    canvas
        .as_slice()
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].index() & 0x0F;
            let lo = pair.get(1).map_or(0, |c| c.index() & 0x0F);
            (hi << 4) | lo
        })
        .collect()
}

pub struct InkyImpression {
    capabilities: SinkCapabilities,
    info: EepromInfo,
    spi: Spidev,
    reset: LineHandle,
    busy: LineHandle,
    dc: LineHandle,
    cs: LineHandle,
    delay: Delay,
}

impl InkyImpression {
    /// Claim the SPI device and GPIO lines for a probed panel.
    pub fn new(config: &OutputConfig, info: EepromInfo) -> Result<Self, DisplayError> {
        info!(
            "Initializing {} on {} / {}",
            info.variant_name(), config.spi_bus(), config.gpio_chip()
        );

        let mut spi = Spidev::open(config.spi_bus())
            .map_err(|e| DisplayError::SpiError(format!("{}: {}", config.spi_bus(), e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_SPEED_HZ)
            .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::SpiError(e.to_string()))?;

        let mut chip = Chip::new(config.gpio_chip())?;
        let reset = chip.get_line(RESET_PIN)?.request(LineRequestFlags::OUTPUT, 1, CONSUMER)?;
        let busy = chip.get_line(BUSY_PIN)?.request(LineRequestFlags::INPUT, 0, CONSUMER)?;
        let dc = chip.get_line(DC_PIN)?.request(LineRequestFlags::OUTPUT, 0, CONSUMER)?;
        let cs = chip.get_line(CS_PIN)?.request(LineRequestFlags::OUTPUT, 1, CONSUMER)?;

        Ok(Self {
            capabilities: SinkCapabilities {
                width: WIDTH,
                height: HEIGHT,
                color_depth: ColorDepth::Palette7,
                slow_refresh: true,
            },
            info,
            spi,
            reset,
            busy,
            dc,
            cs,
            delay: Delay,
        })
    }

    pub fn info(&self) -> &EepromInfo {
        &self.info
    }

    fn spi_write(&mut self, data_mode: bool, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_value(0)?;
        self.dc.set_value(data_mode as u8)?;
        let written = bytes
            .chunks(SPI_CHUNK)
            .try_for_each(|chunk| self.spi.write_all(chunk));
        self.cs.set_value(1)?;
        written.map_err(|e| DisplayError::SpiError(e.to_string()))
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.spi_write(false, &[command])?;
        if !data.is_empty() {
            self.spi_write(true, data)?;
        }
        Ok(())
    }

    /// Busy is active low. A line already high on entry means the
    /// controller is not driving it, so just wait out the timeout.
    fn busy_wait(&mut self, timeout: Duration) -> Result<(), DisplayError> {
        if self.busy.get_value()? == 1 {
            debug!("busy line idle high, sleeping {:?}", timeout);
            self.delay.delay_ms(timeout.as_millis() as u32);
            return Ok(());
        }
        let start = Instant::now();
        while self.busy.get_value()? == 0 {
            self.delay.delay_ms(10);
            if start.elapsed() >= timeout {
                warn!("Busy wait timed out after {:.2}s", timeout.as_secs_f32());
                return Ok(());
            }
        }
        Ok(())
    }

    fn setup(&mut self) -> Result<(), DisplayError> {
        self.reset.set_value(0)?;
        self.delay.delay_ms(100);
        self.reset.set_value(1)?;
        self.delay.delay_ms(100);
        self.busy_wait(Duration::from_secs(1))?;

        for (command, data) in SETUP_SEQUENCE {
            self.command(command, data)?;
        }
        Ok(())
    }
}

impl OutputSink for InkyImpression {
    fn name(&self) -> &str {
        "inky-impression-7.3"
    }

    fn capabilities(&self) -> &SinkCapabilities {
        &self.capabilities
    }

    fn show(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        self.check_canvas(canvas)?;
        let frame = pack_frame(canvas);

        self.setup()?;
        self.command(DTM, &frame)?;

        self.command(PON, &[])?;
        self.busy_wait(Duration::from_millis(400))?;

        info!("Refreshing panel...");
        let start = Instant::now();
        self.command(DRF, &[0x00])?;
        self.busy_wait(Duration::from_secs(45))?;
        debug!("refresh took {:.1}s", start.elapsed().as_secs_f32());

        self.command(POF, &[0x00])?;
        self.busy_wait(Duration::from_millis(400))
    }
}
