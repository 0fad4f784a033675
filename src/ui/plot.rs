use std::collections::BTreeMap;
use std::path::Path;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, HLine, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points, Polygon,
    Text,
};

use crate::color::{GenreColors, diverging_color, label_color};
use crate::data::aggregate::{CorrelationMatrix, GenreAverage, SalesTrend, ScatterPoint};
use crate::data::model::SalesMeasure;
use crate::page::PageContent;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – one page at a time
// ---------------------------------------------------------------------------

/// Render the current page in the central panel.
pub fn page(ui: &mut Ui, state: &AppState) {
    match &state.content {
        PageContent::Landing => landing(ui, state),
        PageContent::GenreSummary(rows) => {
            ui.heading("Average Sales by Genre");
            if state.view.is_empty() {
                no_data(ui);
            } else {
                genre_bar_chart(ui, rows, &state.colors);
            }
        }
        PageContent::Trend(trend) => {
            ui.heading("Sales Trends Over Time");
            if trend.points.is_empty() {
                no_data(ui);
            } else {
                trend_line_chart(ui, trend, &state.colors);
            }
        }
        PageContent::Regional {
            scatter,
            correlation,
        } => {
            ui.heading("Regional Sales Analysis");
            if state.view.is_empty() {
                no_data(ui);
            } else {
                let charts = state.content.chart_kinds().len().max(1) as f32;
                let height = ((ui.available_height() - 80.0) / charts).max(100.0);
                ui.strong("NA vs. EU Sales by Genre");
                regional_scatter_plot(ui, scatter, &state.colors, height);
                ui.strong("Regional Sales Correlation");
                if correlation.is_undefined() {
                    ui.label("Correlation needs at least two records with varying sales.");
                } else {
                    correlation_heatmap(ui, correlation, height);
                }
            }
        }
    }

    if let Some(text) = state.content.insight() {
        ui.add_space(6.0);
        ui.label(RichText::new(format!("Insight: {text}")).italics());
    }
}

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label("No records match the current filters.");
    });
}

// ---------------------------------------------------------------------------
// Landing page
// ---------------------------------------------------------------------------

fn landing(ui: &mut Ui, state: &AppState) {
    ui.heading("Video Game Sales Explorer");
    ui.add_space(8.0);
    ui.strong("Welcome!");
    ui.label("This dashboard explores video game sales trends by genre, platform and year.");
    ui.label(format!(
        "• Dataset: {} records of global and regional sales.",
        state.dataset.len()
    ));
    ui.label("• Goal: insights into market trends, genre performance and regional dynamics.");
    ui.label("• Features: interactive plots with genre and year filters.");
    ui.label("Use the side panel to navigate and filter data!");
    ui.add_space(8.0);

    landing_image(ui, &state.config.image_path);
}

fn landing_image(ui: &mut Ui, path: &Path) {
    if path.exists() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(format!("file://{}", path.display()))
                    .max_width(ui.available_width() * 0.8)
                    .max_height((ui.available_height() - 30.0).max(60.0)),
            );
            ui.label(RichText::new("Video Game Sales Graphic").weak());
        });
    } else {
        log::debug!("Landing image {} is missing", path.display());
        egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(format!("Image not found: {}", path.display())).weak());
        });
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Label for an integer grid mark on a categorical axis.
fn category_label(labels: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

fn genre_bar_chart(ui: &mut Ui, rows: &[GenreAverage], colors: &GenreColors) {
    let labels: Vec<String> = rows.iter().map(|r| r.genre.clone()).collect();

    Plot::new("genre_bar")
        .legend(Legend::default())
        .x_axis_label("Genre")
        .y_axis_label("Average Global_Sales (millions)")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, row) in rows.iter().enumerate() {
                let color = colors.color_for(&row.genre);
                let bar = Bar::new(i as f64, row.global_sales)
                    .name(&row.genre)
                    .fill(color)
                    .width(0.7);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&row.genre).color(color));
            }
        });
}

fn trend_line_chart(ui: &mut Ui, trend: &SalesTrend, colors: &GenreColors) {
    Plot::new("trend_line")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Global_Sales (millions)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for genre in &trend.genres {
                let points: PlotPoints = trend
                    .series(genre)
                    .map(|p| [p.year as f64, p.global_sales])
                    .collect();
                let line = Line::new(points)
                    .name(genre)
                    .color(colors.color_for(genre))
                    .width(3.0);
                plot_ui.line(line);
            }
            if let Some(cap) = trend.cap {
                plot_ui.hline(
                    HLine::new(cap)
                        .name("cap")
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}

/// Marker radius grows with the square root of global sales, in half-pixel steps.
fn marker_radius(global_sales: f64) -> f32 {
    let r = (2.0 + global_sales.max(0.0).sqrt() * 3.0).min(20.0);
    ((r * 2.0).round() / 2.0) as f32
}

fn regional_scatter_plot(ui: &mut Ui, points: &[ScatterPoint], colors: &GenreColors, height: f32) {
    // One series per (genre, marker size); the legend merges same-named series.
    let mut series: BTreeMap<(&str, u32), Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        let key = (p.genre.as_str(), (marker_radius(p.global_sales) * 2.0) as u32);
        series.entry(key).or_default().push([p.na_sales, p.eu_sales]);
    }

    Plot::new("regional_scatter")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("NA_Sales")
        .y_axis_label("EU_Sales")
        .label_formatter(|name, value| hover_label(points, name, value))
        .show(ui, |plot_ui| {
            for ((genre, size), coords) in series {
                let markers = Points::new(PlotPoints::new(coords))
                    .name(genre)
                    .color(colors.color_for(genre))
                    .radius(size as f32 / 2.0)
                    .filled(true);
                plot_ui.points(markers);
            }
        });
}

/// Title of the game nearest to the hovered position within the hovered genre.
fn hover_label(points: &[ScatterPoint], genre: &str, value: &PlotPoint) -> String {
    let nearest = points
        .iter()
        .filter(|p| p.genre == genre)
        .min_by(|a, b| {
            let da = (a.na_sales - value.x).powi(2) + (a.eu_sales - value.y).powi(2);
            let db = (b.na_sales - value.x).powi(2) + (b.eu_sales - value.y).powi(2);
            da.total_cmp(&db)
        });
    match nearest {
        Some(p) => format!(
            "{}\n{}\nNA {:.2}  EU {:.2}  Global {:.2}",
            p.title, p.genre, p.na_sales, p.eu_sales, p.global_sales
        ),
        None => format!("NA {:.2}  EU {:.2}", value.x, value.y),
    }
}

fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix, height: f32) {
    let labels: Vec<String> = SalesMeasure::ALL
        .iter()
        .map(|m| m.label().to_string())
        .collect();
    let n = labels.len();
    // Rows are drawn top-down, so the y axis reads the labels in reverse.
    let y_labels: Vec<String> = labels.iter().rev().cloned().collect();

    Plot::new("correlation_heatmap")
        .height(height)
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .y_axis_formatter(move |mark, _range| category_label(&y_labels, mark.value))
        .show(ui, |plot_ui| {
            for (i, &row) in SalesMeasure::ALL.iter().enumerate() {
                let y = (n - 1 - i) as f64;
                for (j, &col) in SalesMeasure::ALL.iter().enumerate() {
                    let x = j as f64;
                    let value = matrix.get(row, col);
                    let cell = PlotPoints::new(vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]);
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(diverging_color(value))
                            .stroke(Stroke::NONE),
                    );
                    let text = if value.is_nan() {
                        "NaN".to_string()
                    } else {
                        format!("{value:.2}")
                    };
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(text).color(label_color(value)),
                    ));
                }
            }
        });
}
