use crate::data::model::TraceMode;

/// Every user intent the panels can raise.
///
/// Widgets never touch traces or markers directly: they push actions while
/// the frame is drawn and [`crate::state::AppState::apply`] runs them after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    // ---- Traces ----
    SetDrawMode { trace: usize, mode: TraceMode },
    SetPaused { trace: usize, paused: bool },
    EnableTrace(usize),
    BlankTrace(usize),

    // ---- Markers ----
    AddMarker { trace: usize },
    RemoveMarker(usize),
    SelectMarker(usize),
    Peak(usize),
    PeakLeft(usize),
    PeakRight(usize),
    CenterOnMarker(usize),

    // ---- View / levels ----
    Recenter,
    SetRefLevel(f64),
    SetMinLevel(f64),
    SetPeakThreshold(f64),

    // ---- Playback ----
    NextCapture,
    PreviousCapture,
    TogglePlayback,
}
