use crate::action::UiAction;
use crate::data::model::{
    Capture, Marker, Sweep, Trace, TraceMode, ViewWindow, MARKER_COUNT, TRACE_COUNT,
};
use crate::data::peaks::{self, SearchResult};
use crate::settings::PlotSettings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A view change the plot should apply on its next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRequest {
    pub window: ViewWindow,
    /// `[min, max]` of the power axis; `None` keeps the current one.
    pub levels: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Copy)]
enum PeakSearch {
    Global,
    Left,
    Right,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded capture sequence (empty until user loads a file).
    pub captures: Vec<Capture>,

    /// Index of the capture currently shown.
    pub current: Option<usize>,

    pub traces: Vec<Trace>,

    pub markers: Vec<Marker>,

    pub settings: PlotSettings,

    /// Visible frequency range, reported by the plot every frame.
    pub view: ViewWindow,

    /// Pending view change for the plot.
    pub view_request: Option<ViewRequest>,

    /// Whether captures are being stepped through automatically.
    pub playing: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            captures: Vec::new(),
            current: None,
            traces: (0..TRACE_COUNT).map(Trace::new).collect(),
            markers: vec![Marker::default(); MARKER_COUNT],
            settings: PlotSettings::default(),
            view: ViewWindow::new(0.0, 1.0),
            view_request: None,
            playing: false,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded capture sequence and show its first capture.
    pub fn set_captures(&mut self, captures: Vec<Capture>) {
        self.captures = captures;
        self.current = None;
        for trace in &mut self.traces {
            trace.data = None;
        }
        self.show_capture(0);
        self.apply(UiAction::Recenter);
        self.status_message = None;
    }

    /// Replace the settings and push the per-trace draw modes to the traces.
    pub fn set_settings(&mut self, settings: PlotSettings) {
        for (trace, &mode) in self.traces.iter_mut().zip(&settings.trace_draw_modes) {
            if trace.is_blank() {
                trace.draw = mode;
            } else {
                trace.set_mode(mode);
            }
        }
        self.settings = settings;
        self.apply(UiAction::Recenter);
        self.status_message = None;
    }

    pub fn current_capture(&self) -> Option<&Capture> {
        self.current.and_then(|i| self.captures.get(i))
    }

    /// Make capture `index` the current one and feed it to every trace.
    fn show_capture(&mut self, index: usize) {
        let Some(capture) = self.captures.get(index) else {
            return;
        };
        for trace in &mut self.traces {
            trace.update(capture);
        }
        // Paused traces keep their own axis, so clamp against the bound trace.
        for marker in &mut self.markers {
            let held = self.traces.get(marker.trace_index).and_then(|t| t.data.as_ref());
            if let Some(sweep) = held {
                marker.clamp_to(sweep.power.len());
            }
        }
        self.current = Some(index);
    }

    fn step_capture(&mut self, forward: bool) {
        let n = self.captures.len();
        if n == 0 {
            return;
        }
        let next = match self.current {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        self.show_capture(next);
    }

    /// Frequency and power under marker `index`, if it is placed.
    pub fn marker_reading(&self, index: usize) -> Option<(f64, f64)> {
        let marker = self.markers.get(index).filter(|m| m.enabled)?;
        let i = marker.data_index?;
        let sweep = self.traces.get(marker.trace_index)?.data.as_ref()?;
        Some((*sweep.freqs.get(i)?, *sweep.power.get(i)?))
    }

    // -----------------------------------------------------------------------
    // Action dispatch
    // -----------------------------------------------------------------------

    pub fn apply(&mut self, action: UiAction) {
        log::trace!("apply {action:?}");
        match action {
            UiAction::SetDrawMode { trace, mode } => self.set_draw_mode(trace, mode),
            UiAction::SetPaused { trace, paused } => {
                if let Some(t) = self.traces.get_mut(trace) {
                    t.paused = paused;
                }
            }
            UiAction::EnableTrace(trace) => {
                if let Some(t) = self.traces.get_mut(trace) {
                    t.paused = false;
                    t.set_mode(t.draw);
                }
            }
            UiAction::BlankTrace(trace) => self.blank_trace(trace),

            UiAction::AddMarker { trace } => self.add_marker(trace),
            UiAction::RemoveMarker(m) => {
                if let Some(marker) = self.markers.get_mut(m) {
                    marker.disable();
                }
            }
            UiAction::SelectMarker(m) => self.select_marker(m),
            UiAction::Peak(m) => self.search(m, PeakSearch::Global),
            UiAction::PeakLeft(m) => {
                if let Some(marker) = self.markers.get_mut(m) {
                    marker.enable();
                }
                self.search(m, PeakSearch::Left);
            }
            UiAction::PeakRight(m) => self.search(m, PeakSearch::Right),
            UiAction::CenterOnMarker(m) => {
                if let Some((freq, _)) = self.marker_reading(m) {
                    self.view_request = Some(ViewRequest {
                        window: self.view.centered_on(freq),
                        levels: None,
                    });
                }
            }

            UiAction::Recenter => {
                if let Some(capture) = self.current_capture() {
                    self.view_request = Some(ViewRequest {
                        window: ViewWindow::new(capture.fstart, capture.fstop),
                        levels: Some([self.settings.min_level, self.settings.ref_level]),
                    });
                }
            }
            UiAction::SetRefLevel(level) => {
                if level > self.settings.min_level {
                    self.settings.ref_level = level;
                    self.apply(UiAction::Recenter);
                } else {
                    log::warn!("ignoring reference level {level}: not above minimum level");
                }
            }
            UiAction::SetMinLevel(level) => {
                if level < self.settings.ref_level {
                    self.settings.min_level = level;
                    self.apply(UiAction::Recenter);
                } else {
                    log::warn!("ignoring minimum level {level}: not below reference level");
                }
            }
            UiAction::SetPeakThreshold(t) => {
                if t.is_finite() {
                    self.settings.peak_threshold = t;
                }
            }

            UiAction::NextCapture => self.step_capture(true),
            UiAction::PreviousCapture => self.step_capture(false),
            UiAction::TogglePlayback => {
                self.playing = !self.playing && !self.captures.is_empty();
            }
        }
    }

    fn set_draw_mode(&mut self, trace: usize, mode: TraceMode) {
        let Some(t) = self.traces.get_mut(trace) else {
            return;
        };
        if t.is_blank() {
            t.draw = mode;
        } else {
            t.set_mode(mode);
        }
        if let Some(slot) = self.settings.trace_draw_modes.get_mut(trace) {
            *slot = t.draw;
        }
    }

    fn blank_trace(&mut self, trace: usize) {
        let Some(t) = self.traces.get_mut(trace) else {
            return;
        };
        t.blank();
        for marker in self.markers.iter_mut().filter(|m| m.trace_index == trace) {
            marker.disable();
        }
    }

    /// Put the first free marker on `trace` and select it.
    fn add_marker(&mut self, trace: usize) {
        if self.traces.get(trace).map_or(true, Trace::is_blank) {
            return;
        }
        let Some(m) = self.markers.iter().position(|m| !m.enabled) else {
            log::debug!("no free marker for trace {trace}");
            return;
        };
        let marker = &mut self.markers[m];
        marker.enable();
        marker.trace_index = trace;
        self.select_marker(m);
    }

    fn select_marker(&mut self, index: usize) {
        for (i, marker) in self.markers.iter_mut().enumerate() {
            marker.selected = i == index;
        }
    }

    /// Run a peak search for marker `index` and move it on success.
    fn search(&mut self, index: usize, kind: PeakSearch) {
        let Some(marker) = self.markers.get(index) else {
            return;
        };
        let Some(Sweep { freqs, power, .. }) = self
            .traces
            .get(marker.trace_index)
            .and_then(|t| t.data.as_ref())
        else {
            log::debug!("marker {index}: trace {} has no data", marker.trace_index);
            return;
        };

        let threshold = self.settings.peak_threshold;
        let result: SearchResult = match kind {
            PeakSearch::Global => peaks::find_global_peak(freqs, power, self.view),
            PeakSearch::Right => {
                peaks::find_peak_right(freqs, power, self.view, marker.data_index, threshold)
            }
            PeakSearch::Left => {
                peaks::find_peak_left(freqs, power, self.view, marker.data_index, threshold)
            }
        };

        match result {
            Ok(i) => self.markers[index].data_index = Some(i),
            Err(reason) => log::debug!("marker {index}: {kind:?} search unavailable: {reason}"),
        }
    }
}
