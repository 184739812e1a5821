use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text};

use crate::color::TraceColors;
use crate::data::model::ViewWindow;
use crate::state::AppState;
use crate::ui::panels::format_frequency;

// ---------------------------------------------------------------------------
// Spectrum plot (central panel)
// ---------------------------------------------------------------------------

/// Render traces and markers, apply pending view requests and report the
/// visible frequency range back into `state.view`.
pub fn spectrum_plot(ui: &mut Ui, state: &mut AppState, colors: &TraceColors) {
    if state.captures.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a capture file to view spectra  (File → Open captures…)");
        });
        return;
    }

    let request = state.view_request.take();
    let state_ref: &AppState = state;

    let response = Plot::new("spectrum_plot")
        .legend(Legend::default())
        .x_axis_label("Frequency")
        .y_axis_label("Power (dBm)")
        .x_axis_formatter(|mark, _range| format_frequency(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(req) = request {
                let current = plot_ui.plot_bounds();
                let [y_lo, y_hi] = req
                    .levels
                    .unwrap_or([current.min()[1], current.max()[1]]);
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [req.window.f_lo, y_lo],
                    [req.window.f_hi, y_hi],
                ));
            }

            for (t, trace) in state_ref.traces.iter().enumerate() {
                let Some(sweep) = trace.data.as_ref().filter(|_| !trace.is_blank()) else {
                    continue;
                };
                let points: PlotPoints = sweep
                    .freqs
                    .iter()
                    .zip(&sweep.power)
                    .map(|(&f, &p)| [f, p])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(format!("{} ({})", trace.name, trace.mode))
                        .color(colors.trace(t))
                        .width(1.5),
                );
            }

            for (m, marker) in state_ref.markers.iter().enumerate() {
                let Some((freq, power)) = state_ref.marker_reading(m) else {
                    continue;
                };
                let color = colors.marker(marker.selected);
                plot_ui.points(
                    Points::new(vec![[freq, power]])
                        .shape(MarkerShape::Diamond)
                        .filled(true)
                        .radius(6.0)
                        .color(color),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(freq, power),
                        RichText::new(format!("M{}", m + 1)).strong(),
                    )
                    .anchor(Align2::CENTER_BOTTOM)
                    .color(color),
                );
            }

            plot_ui.plot_bounds()
        });

    let bounds = response.inner;
    state.view = ViewWindow::new(bounds.min()[0], bounds.max()[0]);
}
