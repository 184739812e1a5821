use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::action::UiAction;
use crate::color::TraceColors;
use crate::data::model::TraceMode;
use crate::settings::PlotSettings;
use crate::state::AppState;

const REMOVE_BUTTON_WIDTH: f32 = 18.0;

// ---------------------------------------------------------------------------
// Left side panel – trace & marker controls
// ---------------------------------------------------------------------------

/// Render the trace/marker panel. Clicks are queued in `actions`.
pub fn side_panel(
    ui: &mut Ui,
    state: &AppState,
    colors: &TraceColors,
    actions: &mut Vec<UiAction>,
) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Trace Control");
            ui.separator();
            trace_grid(ui, state, colors, actions);

            ui.add_space(8.0);
            ui.heading("Markers");
            ui.separator();
            marker_readout(ui, state);

            ui.add_space(8.0);
            ui.heading("Plot Control");
            ui.separator();
            plot_controls(ui, &state.settings, actions);
        });
}

/// One row per trace, followed by two rows per marker bound to it.
fn trace_grid(
    ui: &mut Ui,
    state: &AppState,
    colors: &TraceColors,
    actions: &mut Vec<UiAction>,
) {
    let free_marker = state.markers.iter().any(|m| !m.enabled);

    egui::Grid::new("trace_controls")
        .num_columns(5)
        .spacing([6.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (t, trace) in state.traces.iter().enumerate() {
                color_icon(ui, colors.trace(t));

                if trace.is_blank() {
                    if ui
                        .button("+ Trace")
                        .on_hover_text("Enable this trace")
                        .clicked()
                    {
                        actions.push(UiAction::EnableTrace(t));
                    }
                    ui.end_row();
                    continue;
                }

                let mut draw = trace.draw;
                egui::ComboBox::from_id_salt(("trace_draw", t))
                    .selected_text(draw.to_string())
                    .show_ui(ui, |ui: &mut Ui| {
                        for mode in TraceMode::DRAWABLE {
                            ui.selectable_value(&mut draw, mode, mode.to_string());
                        }
                    })
                    .response
                    .on_hover_text("Select data source");
                if draw != trace.draw {
                    actions.push(UiAction::SetDrawMode { trace: t, mode: draw });
                }

                let mut paused = trace.paused;
                if ui
                    .checkbox(&mut paused, "Pause")
                    .on_hover_text("Pause trace updating")
                    .changed()
                {
                    actions.push(UiAction::SetPaused { trace: t, paused });
                }

                if free_marker {
                    if ui
                        .button("+ Marker")
                        .on_hover_text("Add a marker to this trace")
                        .clicked()
                    {
                        actions.push(UiAction::AddMarker { trace: t });
                    }
                } else {
                    ui.label("");
                }

                if remove_button(ui, "Disable this trace") {
                    actions.push(UiAction::BlankTrace(t));
                }
                ui.end_row();

                for (m, marker) in state.markers.iter().enumerate() {
                    if marker.enabled && marker.trace_index == t {
                        marker_rows(ui, m, marker.selected, actions);
                    }
                }
            }
        });
}

fn marker_rows(ui: &mut Ui, m: usize, selected: bool, actions: &mut Vec<UiAction>) {
    if ui.radio(selected, format!("Marker {}:", m + 1)).clicked() {
        actions.push(UiAction::SelectMarker(m));
    }
    ui.label("");
    if ui
        .button("Peak")
        .on_hover_text("Find the peak of the selected spectrum")
        .clicked()
    {
        actions.push(UiAction::Peak(m));
    }
    if ui
        .button("Center")
        .on_hover_text("Center the view on this marker")
        .clicked()
    {
        actions.push(UiAction::CenterOnMarker(m));
    }
    if remove_button(ui, "Remove this marker") {
        actions.push(UiAction::RemoveMarker(m));
    }
    ui.end_row();

    ui.label("");
    ui.label("");
    if ui
        .button("Peak Left")
        .on_hover_text("Find peak left of the marker")
        .clicked()
    {
        actions.push(UiAction::PeakLeft(m));
    }
    if ui
        .button("Peak Right")
        .on_hover_text("Find peak right of the marker")
        .clicked()
    {
        actions.push(UiAction::PeakRight(m));
    }
    ui.end_row();
}

fn color_icon(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(22.0, 6.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 0.0, color);
}

fn remove_button(ui: &mut Ui, hover: &str) -> bool {
    ui.add(egui::Button::new("-").min_size(egui::vec2(REMOVE_BUTTON_WIDTH, 0.0)))
        .on_hover_text(hover)
        .clicked()
}

/// Frequency / power readout of the enabled markers.
fn marker_readout(ui: &mut Ui, state: &AppState) {
    let rows: Vec<(usize, Option<(f64, f64)>)> = state
        .markers
        .iter()
        .enumerate()
        .filter(|(_, m)| m.enabled)
        .map(|(i, _)| (i, state.marker_reading(i)))
        .collect();

    if rows.is_empty() {
        ui.label("No markers.");
        return;
    }

    TableBuilder::new(ui)
        .id_salt("marker_readout")
        .striped(true)
        .vscroll(false)
        .column(Column::auto())
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Marker");
            });
            header.col(|ui| {
                ui.strong("Frequency");
            });
            header.col(|ui| {
                ui.strong("Power");
            });
        })
        .body(|mut body| {
            for (i, reading) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("M{}", i + 1));
                    });
                    match reading {
                        Some((freq, power)) => {
                            row.col(|ui| {
                                ui.label(format_frequency(freq));
                            });
                            row.col(|ui| {
                                ui.label(format!("{power:.2} dBm"));
                            });
                        }
                        None => {
                            row.col(|ui| {
                                ui.weak("not placed");
                            });
                            row.col(|_| {});
                        }
                    }
                });
            }
        });
}

fn plot_controls(ui: &mut Ui, settings: &PlotSettings, actions: &mut Vec<UiAction>) {
    egui::Grid::new("plot_controls")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            let mut ref_level = settings.ref_level;
            ui.label("Maximum Level:");
            if ui
                .add(egui::DragValue::new(&mut ref_level).speed(1.0).suffix(" dBm"))
                .changed()
            {
                actions.push(UiAction::SetRefLevel(ref_level));
            }
            ui.end_row();

            let mut min_level = settings.min_level;
            ui.label("Minimum Level:");
            if ui
                .add(egui::DragValue::new(&mut min_level).speed(1.0).suffix(" dBm"))
                .changed()
            {
                actions.push(UiAction::SetMinLevel(min_level));
            }
            ui.end_row();

            let mut threshold = settings.peak_threshold;
            ui.label("Peak Threshold:");
            if ui
                .add(
                    egui::DragValue::new(&mut threshold)
                        .speed(0.5)
                        .range(0.0..=100.0)
                        .suffix(" dB"),
                )
                .on_hover_text("Margin above the noise floor for Peak Left / Peak Right")
                .changed()
            {
                actions.push(UiAction::SetPeakThreshold(threshold));
            }
            ui.end_row();
        });

    if ui
        .button("Recenter")
        .on_hover_text("Center the plot view around the available spectrum")
        .clicked()
    {
        actions.push(UiAction::Recenter);
    }
}

/// Human-readable frequency with an SI prefix.
pub fn format_frequency(hz: f64) -> String {
    let abs = hz.abs();
    if abs >= 1e9 {
        format!("{:.6} GHz", hz / 1e9)
    } else if abs >= 1e6 {
        format!("{:.4} MHz", hz / 1e6)
    } else if abs >= 1e3 {
        format!("{:.3} kHz", hz / 1e3)
    } else {
        format!("{hz:.1} Hz")
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, actions: &mut Vec<UiAction>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open captures…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let has_captures = !state.captures.is_empty();
        if ui.add_enabled(has_captures, egui::Button::new("⏮")).clicked() {
            actions.push(UiAction::PreviousCapture);
        }
        let play_label = if state.playing { "⏸ Pause" } else { "▶ Play" };
        if ui.add_enabled(has_captures, egui::Button::new(play_label)).clicked() {
            actions.push(UiAction::TogglePlayback);
        }
        if ui.add_enabled(has_captures, egui::Button::new("⏭")).clicked() {
            actions.push(UiAction::NextCapture);
        }

        if let Some(i) = state.current {
            ui.label(format!("Capture {} / {}", i + 1, state.captures.len()));
        }
        if let Some(capture) = state.current_capture() {
            ui.separator();
            ui.label(format!(
                "{} – {}, {} points",
                format_frequency(capture.fstart),
                format_frequency(capture.fstop),
                capture.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectrum captures")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        load_captures(state, &path);
    }
}

/// Load a capture file into `state`, reporting failures in the status bar.
pub fn load_captures(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_file(path) {
        Ok(captures) => {
            log::info!(
                "Loaded {} captures of {} points from {}",
                captures.len(),
                captures[0].len(),
                path.display()
            );
            state.set_captures(captures);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn load_settings_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Load settings")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    match PlotSettings::load(&path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            state.set_settings(settings);
        }
        Err(e) => {
            log::error!("Failed to load settings: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn save_settings_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save settings")
        .add_filter("JSON", &["json"])
        .set_file_name("rusty-sweep.json")
        .save_file()
    else {
        return;
    };
    if let Err(e) = state.settings.save(&path) {
        log::error!("Failed to save settings: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_prefixes() {
        assert_eq!(format_frequency(2.4e9), "2.400000 GHz");
        assert_eq!(format_frequency(433.92e6), "433.9200 MHz");
        assert_eq!(format_frequency(12_500.0), "12.500 kHz");
        assert_eq!(format_frequency(50.0), "50.0 Hz");
    }
}
