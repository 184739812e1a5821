use std::time::Duration;

use eframe::egui;

use crate::action::UiAction;
use crate::color::TraceColors;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustySweepApp {
    pub state: AppState,
    colors: TraceColors,
    /// egui time (seconds) of the last playback step.
    last_step: f64,
}

impl RustySweepApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// Advance playback when the interval has elapsed and schedule the next frame.
    fn drive_playback(&mut self, ctx: &egui::Context) {
        if !self.state.playing {
            return;
        }
        let interval = Duration::from_millis(self.state.settings.playback_interval_ms);
        let now = ctx.input(|i| i.time);
        if now - self.last_step >= interval.as_secs_f64() {
            self.state.apply(UiAction::NextCapture);
            self.last_step = now;
        }
        ctx.request_repaint_after(interval);
    }
}

impl eframe::App for RustySweepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_playback(ctx);

        let mut actions = Vec::new();

        // ---- Top panel: menu bar + playback ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &mut actions);
        });

        // ---- Left side panel: traces, markers, levels ----
        egui::SidePanel::left("trace_panel")
            .default_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state, &self.colors, &mut actions);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectrum_plot(ui, &mut self.state, &self.colors);
        });

        if !actions.is_empty() {
            for action in actions {
                self.state.apply(action);
            }
            ctx.request_repaint();
        }
    }
}
