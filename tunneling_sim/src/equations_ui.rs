//! Equations sidebar, status bar and floating labels
//!
//! Everything here is drawn with egui on top of the GPU scene.

use crate::simulator::SimulationStats;
use egui::{Align2, Color32, Context, FontFamily, FontId, RichText};

/// Equation entry with label and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

/// Draw a styled equation sidebar
pub fn draw_equations_sidebar(
    ctx: &Context,
    title: &str,
    equations: &[Equation],
    variables: &[(&str, &str)],
) {
    egui::SidePanel::right("equations_panel")
        .min_width(280.0)
        .max_width(350.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(title).color(Color32::from_rgb(100, 200, 255)));
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            ui.label(RichText::new("Equations").strong().color(Color32::from_rgb(255, 200, 100)));
            ui.add_space(5.0);

            for eq in equations {
                draw_equation(ui, eq);
                ui.add_space(8.0);
            }

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            ui.label(RichText::new("Variables").strong().color(Color32::from_rgb(255, 200, 100)));
            ui.add_space(5.0);

            for (symbol, meaning) in variables {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(*symbol).color(Color32::from_rgb(150, 255, 150))
                        .font(FontId::new(14.0, FontFamily::Monospace)));
                    ui.label(RichText::new("=").color(Color32::GRAY));
                    ui.label(RichText::new(*meaning).color(Color32::LIGHT_GRAY));
                });
            }
        });
}

fn draw_equation(ui: &mut egui::Ui, eq: &Equation) {
    ui.group(|ui| {
        ui.label(RichText::new(eq.name).strong().color(Color32::WHITE));
        ui.label(
            RichText::new(eq.formula)
                .font(FontId::new(16.0, FontFamily::Monospace))
                .color(Color32::from_rgb(200, 220, 255))
        );
        ui.label(RichText::new(eq.description).small().color(Color32::GRAY));
    });
}

/// What the status bar shows besides the counters
pub struct StatusLine<'a> {
    pub scene: &'a str,
    pub live: usize,
    pub capacity: usize,
    pub tunnel_probability: f32,
    pub paused: bool,
}

pub fn draw_status_bar(ctx: &Context, status: &StatusLine<'_>, stats: &SimulationStats) {
    egui::TopBottomPanel::top("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(status.scene);
            ui.separator();
            ui.label(format!("Live: {}/{}", status.live, status.capacity));
            ui.separator();
            ui.label(RichText::new(format!("Tunneled: {}", stats.tunneled)).color(Color32::from_rgb(0x34, 0xd3, 0x99)));
            ui.label(RichText::new(format!("Reflected: {}", stats.reflected)).color(Color32::from_rgb(0xf8, 0x71, 0x71)));
            ui.separator();
            match stats.tunnel_ratio() {
                Some(ratio) => ui.label(format!(
                    "Observed {:.1}% (p = {:.0}%)",
                    ratio * 100.0,
                    status.tunnel_probability * 100.0
                )),
                None => ui.label(format!("p = {:.0}%", status.tunnel_probability * 100.0)),
            };
            if status.paused {
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            }
        });
    });
}

/// A label already projected to screen space, in egui points
pub struct ScreenLabel {
    pub position: egui::Pos2,
    pub text: &'static str,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// Paint floating labels above everything else
pub fn draw_labels(ctx: &Context, labels: &[ScreenLabel]) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("particle_labels"),
    ));
    for label in labels {
        let alpha = (label.opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let [r, g, b] = label.color;
        // Shadow first so the text stays readable over the barrier glow
        painter.text(
            label.position + egui::vec2(1.0, 1.0),
            Align2::LEFT_BOTTOM,
            label.text,
            FontId::proportional(12.0),
            Color32::from_black_alpha(alpha / 2),
        );
        painter.text(
            label.position,
            Align2::LEFT_BOTTOM,
            label.text,
            FontId::proportional(12.0),
            Color32::from_rgba_unmultiplied(r, g, b, alpha),
        );
    }
}

pub const TUNNELING_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Barrier Trial",
        formula: "P(tunnel) = p",
        description: "One draw per particle at the barrier",
    },
    Equation {
        name: "Reflection",
        formula: "v → -v",
        description: "Happens with probability 1 - p",
    },
    Equation {
        name: "Transmission Coefficient",
        formula: "T ≈ e^(-2κa)",
        description: "Real barriers: depends on width and energy",
    },
    Equation {
        name: "Decay Constant",
        formula: "κ = √(2m(V₀-E))/ℏ",
        description: "Exponential decay in barrier",
    },
];

pub const TUNNELING_VARIABLES: &[(&str, &str)] = &[
    ("p", "Fixed tunneling chance (0.1)"),
    ("v", "Particle velocity"),
    ("T", "Transmission coefficient"),
    ("κ", "Decay constant"),
    ("a", "Barrier width"),
    ("V₀", "Barrier height"),
    ("E", "Particle energy"),
];
