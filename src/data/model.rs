use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of trace slots shown in the trace panel.
pub const TRACE_COUNT: usize = 3;

/// Number of marker slots.
pub const MARKER_COUNT: usize = 2;

// ---------------------------------------------------------------------------
// Capture – one sweep delivered by the capture pipeline
// ---------------------------------------------------------------------------

/// A single spectrum capture: power samples evenly spread over
/// `[fstart, fstop]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Frequency of the first sample (Hz).
    pub fstart: f64,
    /// Frequency of the last sample (Hz).
    pub fstop: f64,
    /// Power per sample (dBm).
    pub power: Vec<f64>,
}

impl Capture {
    /// Frequency axis matching `power` sample-for-sample.
    pub fn frequencies(&self) -> Vec<f64> {
        linspace(self.fstart, self.fstop, self.power.len())
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// ViewWindow – visible frequency range of the plot
// ---------------------------------------------------------------------------

/// The frequency range currently visible on the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub f_lo: f64,
    pub f_hi: f64,
}

impl ViewWindow {
    pub fn new(f_lo: f64, f_hi: f64) -> Self {
        Self { f_lo, f_hi }
    }

    pub fn span(&self) -> f64 {
        self.f_hi - self.f_lo
    }

    /// Same span, moved so that `center` sits in the middle.
    pub fn centered_on(&self, center: f64) -> Self {
        let half = self.span() / 2.0;
        Self::new(center - half, center + half)
    }
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// How a trace reacts to incoming captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceMode {
    /// Follows the latest capture.
    Live,
    /// Keeps the highest power seen per sample.
    MaxHold,
    /// Keeps the lowest power seen per sample.
    MinHold,
    /// Hidden, holds no data.
    Blank,
}

impl TraceMode {
    /// Modes offered in the draw selector.
    pub const DRAWABLE: [TraceMode; 3] = [TraceMode::Live, TraceMode::MaxHold, TraceMode::MinHold];
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceMode::Live => write!(f, "Live"),
            TraceMode::MaxHold => write!(f, "Max"),
            TraceMode::MinHold => write!(f, "Min"),
            TraceMode::Blank => write!(f, "Blank"),
        }
    }
}

/// Power held by a trace together with the axis it was captured on.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub fstart: f64,
    pub fstop: f64,
    pub freqs: Vec<f64>,
    pub power: Vec<f64>,
}

impl Sweep {
    pub fn from_capture(capture: &Capture) -> Self {
        Self {
            fstart: capture.fstart,
            fstop: capture.fstop,
            freqs: capture.frequencies(),
            power: capture.power.clone(),
        }
    }

    /// Whether `capture` lands on the same frequency bins.
    fn same_axis(&self, capture: &Capture) -> bool {
        self.fstart == capture.fstart
            && self.fstop == capture.fstop
            && self.power.len() == capture.len()
    }
}

#[derive(Debug, Clone)]
pub struct Trace {
    pub name: String,
    pub mode: TraceMode,
    /// Mode restored when the trace is switched back on.
    pub draw: TraceMode,
    /// A paused trace keeps its data and ignores captures.
    pub paused: bool,
    pub data: Option<Sweep>,
}

impl Trace {
    /// Trace slot `index` with its default draw mode (Live, Max, Min).
    pub fn new(index: usize) -> Self {
        let draw = TraceMode::DRAWABLE[index % TraceMode::DRAWABLE.len()];
        Self {
            name: format!("Trace {}", index + 1),
            mode: if index == 0 { draw } else { TraceMode::Blank },
            draw,
            paused: false,
            data: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.mode == TraceMode::Blank
    }

    pub fn power(&self) -> Option<&[f64]> {
        self.data.as_ref().map(|s| s.power.as_slice())
    }

    /// Switch to `mode`. Entering or leaving a hold mode restarts the hold.
    pub fn set_mode(&mut self, mode: TraceMode) {
        if mode != self.mode {
            self.data = None;
        }
        if mode != TraceMode::Blank {
            self.draw = mode;
        }
        self.mode = mode;
    }

    pub fn blank(&mut self) {
        self.mode = TraceMode::Blank;
        self.data = None;
    }

    /// Fold a new capture into the trace. A hold restarts when the capture
    /// sits on different frequency bins.
    pub fn update(&mut self, capture: &Capture) {
        if self.paused || self.is_blank() {
            return;
        }
        let combine: fn(f64, f64) -> f64 = match self.mode {
            TraceMode::MaxHold => f64::max,
            TraceMode::MinHold => f64::min,
            TraceMode::Live | TraceMode::Blank => {
                self.data = Some(Sweep::from_capture(capture));
                return;
            }
        };
        match &mut self.data {
            Some(held) if held.same_axis(capture) => {
                for (h, &p) in held.power.iter_mut().zip(&capture.power) {
                    *h = combine(*h, p);
                }
            }
            _ => self.data = Some(Sweep::from_capture(capture)),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marker {
    pub enabled: bool,
    /// Trace this marker reads from.
    pub trace_index: usize,
    /// Sample index into the trace data; `None` means "not placed yet".
    pub data_index: Option<usize>,
    /// UI focus only.
    pub selected: bool,
}

impl Marker {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.data_index = None;
    }

    /// Drop the position if it no longer fits a trace of `len` samples.
    pub fn clamp_to(&mut self, len: usize) {
        if self.data_index.is_some_and(|i| i >= len) {
            self.data_index = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        assert_eq!(linspace(0.0, 10.0, 11)[10], 10.0);
        assert_eq!(linspace(0.0, 10.0, 11)[3], 3.0);
        assert_eq!(linspace(5.0, 9.0, 1), vec![5.0]);
        assert!(linspace(5.0, 9.0, 0).is_empty());
    }

    #[test]
    fn capture_axis_matches_power() {
        let cap = Capture {
            fstart: 2.4e9,
            fstop: 2.5e9,
            power: vec![-90.0; 101],
        };
        let f = cap.frequencies();
        assert_eq!(f.len(), 101);
        assert_eq!(f[0], 2.4e9);
        assert_eq!(f[100], 2.5e9);
    }

    #[test]
    fn default_traces() {
        let traces: Vec<Trace> = (0..TRACE_COUNT).map(Trace::new).collect();
        assert_eq!(traces[0].mode, TraceMode::Live);
        assert!(traces[1].is_blank());
        assert_eq!(traces[1].draw, TraceMode::MaxHold);
        assert_eq!(traces[2].draw, TraceMode::MinHold);
    }

    fn capture(fstart: f64, fstop: f64, power: &[f64]) -> Capture {
        Capture {
            fstart,
            fstop,
            power: power.to_vec(),
        }
    }

    #[test]
    fn live_follows_latest_capture() {
        let mut t = Trace::new(0);
        t.update(&capture(0.0, 1.0, &[1.0, 2.0]));
        t.update(&capture(0.0, 1.0, &[0.0, 5.0]));
        assert_eq!(t.power(), Some(&[0.0, 5.0][..]));
    }

    #[test]
    fn max_and_min_hold() {
        let mut max = Trace::new(1);
        max.set_mode(TraceMode::MaxHold);
        let mut min = Trace::new(2);
        min.set_mode(TraceMode::MinHold);
        for power in [[1.0, 5.0, 3.0], [4.0, 2.0, 3.5]] {
            max.update(&capture(0.0, 2.0, &power));
            min.update(&capture(0.0, 2.0, &power));
        }
        assert_eq!(max.power(), Some(&[4.0, 5.0, 3.5][..]));
        assert_eq!(min.power(), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn hold_restarts_on_length_change() {
        let mut t = Trace::new(1);
        t.set_mode(TraceMode::MaxHold);
        t.update(&capture(0.0, 1.0, &[9.0, 9.0]));
        t.update(&capture(0.0, 1.0, &[1.0, 1.0, 1.0]));
        assert_eq!(t.power(), Some(&[1.0, 1.0, 1.0][..]));
    }

    #[test]
    fn hold_restarts_when_span_moves() {
        let mut t = Trace::new(1);
        t.set_mode(TraceMode::MaxHold);
        t.update(&capture(0.0, 2.0, &[9.0, 9.0, 9.0]));
        t.update(&capture(100.0, 102.0, &[1.0, 2.0, 3.0]));

        let held = t.data.as_ref().unwrap();
        assert_eq!(held.power, vec![1.0, 2.0, 3.0]);
        assert_eq!(held.freqs, vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn paused_and_blank_ignore_captures() {
        let mut t = Trace::new(0);
        t.update(&capture(0.0, 0.0, &[1.0]));
        t.paused = true;
        t.update(&capture(5.0, 5.0, &[2.0]));
        assert_eq!(t.power(), Some(&[1.0][..]));
        assert_eq!(t.data.as_ref().map(|s| s.fstart), Some(0.0));

        t.blank();
        t.paused = false;
        t.update(&capture(0.0, 0.0, &[3.0]));
        assert_eq!(t.data, None);
    }

    #[test]
    fn enable_then_disable_marker_restores_default() {
        let mut m = Marker::default();
        m.enable();
        m.data_index = Some(12);
        m.disable();
        assert!(!m.enabled);
        assert_eq!(m.data_index, None);
    }

    #[test]
    fn clamp_drops_out_of_range_index() {
        let mut m = Marker {
            data_index: Some(50),
            ..Marker::default()
        };
        m.clamp_to(100);
        assert_eq!(m.data_index, Some(50));
        m.clamp_to(50);
        assert_eq!(m.data_index, None);
    }
}
