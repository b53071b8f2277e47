// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared pieces of the Sprawl demos: a noise-based population density map
//! and a minimal stderr logger.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use kurbo::Rect;
use log::{LevelFilter, Log, Metadata, Record};
use sprawl_network::DensityField;

/// Population density built from three layers of simplex noise.
///
/// One coarse layer is modulated by a finer one and blended with a third,
/// offset copy; the result is squared to sharpen dense cores.
pub struct PopulationDensity {
    noise: FastNoiseLite,
    width: f64,
    height: f64,
    offset: f64,
}

impl core::fmt::Debug for PopulationDensity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // `FastNoiseLite` does not implement `Debug`.
        f.debug_struct("PopulationDensity")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl PopulationDensity {
    /// A density map whose features scale with `world`.
    pub fn new(world: Rect, seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(1.0));
        let width = world.width() * 0.25;
        Self {
            noise,
            width,
            height: world.height() * 0.25,
            offset: width * 0.025,
        }
    }

    fn layer(&self, x: f64, y: f64) -> f64 {
        // Noise is sampled in single precision.
        let value = self.noise.get_noise_2d(x as f32, y as f32);
        (f64::from(value) + 1.0) * 0.5
    }
}

impl DensityField for PopulationDensity {
    fn density(&self, x: f64, y: f64) -> f64 {
        let coarse = self.layer(x / (self.width * 0.5), y / (self.height * 0.5));
        let fine = self.layer(x / self.width + self.offset, y / self.height + self.offset);
        let shifted = self.layer(
            x / self.width + 2.0 * self.offset,
            y / self.height + 2.0 * self.offset,
        );
        ((coarse * fine + shifted) * 0.5).powi(2).clamp(0.0, 1.0)
    }
}

/// Writes records up to the installed level to stderr.
#[derive(Debug)]
pub struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl StderrLogger {
    /// Install as the global logger at `level`.
    pub fn install(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}
