//! Precomputed sine wavetable and the real-time render cursor

use std::f32::consts::PI;

use crate::route::ChannelRoute;

/// One full cycle of a sine tone at fixed amplitude.
///
/// Computed once at startup, read-only afterwards. `sine` is a pure
/// function of its inputs: identical arguments give bit-identical tables.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveTable {
    samples: Box<[f32]>,
}

impl WaveTable {
    /// samples[i] = amplitude * sin(2 * pi * i / size)
    pub fn sine(size: usize, amplitude: f32) -> WaveTable {
        let samples = (0..size)
            .map(|i| amplitude * (i as f32 / size as f32 * 2.0 * PI).sin())
            .collect();
        WaveTable { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample(&self, phase: usize) -> f32 {
        self.samples[phase]
    }
}

/// Owns the wavetable and the playback phase for one stream.
///
/// Moved into the output callback whole, so the real-time thread is the
/// exclusive owner; nothing here is shared or locked. `render` allocates
/// nothing and runs in time linear in the buffer length.
pub struct TonePlayer {
    table: WaveTable,
    phase: usize,
}

impl TonePlayer {
    pub fn new(table: WaveTable) -> TonePlayer {
        TonePlayer { table, phase: 0 }
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Fill an interleaved output buffer of `channels`-wide frames.
    ///
    /// Each frame gets the current table sample on both routed channels
    /// (mono content duplicated) and silence everywhere else; the phase
    /// advances by one per frame and wraps at the table length.
    pub fn render(&mut self, data: &mut [f32], channels: usize, route: &ChannelRoute) {
        let (left, right) = (route.left(), route.right());
        for frame in data.chunks_mut(channels) {
            let sample = self.table.sample(self.phase);
            for slot in frame.iter_mut() {
                *slot = 0.0;
            }
            frame[left] = sample;
            frame[right] = sample;
            self.phase += 1;
            if self.phase >= self.table.len() {
                self.phase -= self.table.len();
            }
        }
    }
}
