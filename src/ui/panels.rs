use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::page::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and navigation
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            genre_filter(ui, state);
            ui.separator();
            year_filter(ui, state);
            ui.separator();
            navigation(ui, state);
        });
}

fn genre_filter(ui: &mut Ui, state: &mut AppState) {
    // Clone what we need so we can mutate state inside the loop.
    let genres: Vec<String> = state.dataset.genres.iter().cloned().collect();
    if genres.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    let header_text = format!(
        "Select Genres  ({}/{})",
        state.selection.genres.len(),
        genres.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("genres")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_genres();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_genres();
                }
            });

            for genre in &genres {
                let mut checked = state.selection.genres.contains(genre);
                let text = RichText::new(genre).color(state.colors.color_for(genre));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_genre(genre);
                }
            }
        });
}

fn year_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Year Range");
    let (lo, hi) = state.year_bounds();
    let mut from = state.selection.year_min;
    let mut to = state.selection.year_max;

    let from_changed = ui
        .add(egui::Slider::new(&mut from, lo..=hi).text("from"))
        .changed();
    let to_changed = ui
        .add(egui::Slider::new(&mut to, lo..=hi).text("to"))
        .changed();

    if from_changed || to_changed {
        // Dragging one end past the other pushes it along.
        if from_changed && from > to {
            to = from;
        }
        if to_changed && to < from {
            from = to;
        }
        state.set_year_range(from, to);
    }
}

fn navigation(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Go to");
    let mut page = state.page;
    for p in Page::ALL {
        ui.radio_value(&mut page, p, p.label());
    }
    state.set_page(page);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded, {} selected",
            state.dataset.len(),
            state.view.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_dataset(&path);
    }
}
