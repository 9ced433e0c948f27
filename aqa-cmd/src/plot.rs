//! SVG charts drawn with plotters.
//!
//! Each chart renders into a `String`; writing the file is left to
//! [`crate::output::OutputWriter`]. Colors come from the [`Palette`] in the
//! run config.

use aqa_data::{
    decomposition::DecompositionResult, monthly::MonthlyDistribution, pipeline::AnalysisResults,
    seasonal::SeasonSummary,
};
use aqa_series::{
    config::{Palette, Rgb},
    pollutant::Pollutant,
    season::Season,
    series::TimeSeries,
};
use aqa_utils::dates::month_abbreviation;
use chrono::{NaiveDate, TimeDelta};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

pub const TIMESERIES_FILE: &str = "pollutants_timeseries.svg";
pub const SEASONAL_FILE: &str = "seasonal_analysis.svg";

const FONT: &str = "sans-serif";

pub fn boxplot_file(pollutant: Pollutant) -> String {
    format!("monthly_boxplot_{}.svg", pollutant.slug())
}

pub fn decomposition_file(pollutant: Pollutant) -> String {
    format!("decomposition_{}.svg", pollutant.slug())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Decimals used when labelling a value of `pollutant` on a chart.
fn label_decimals(pollutant: Pollutant) -> usize {
    match pollutant {
        Pollutant::O3 => 3,
        _ => 0,
    }
}

/// Contiguous runs of present values. Each run is drawn as its own line so
/// gaps stay visible.
fn segments(series: &TimeSeries) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (date, value) in series.iter() {
        match value {
            Some(v) => current.push((date, v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        lo.abs().max(1.0) * 0.1
    };
    (lo - pad)..(hi + pad)
}

/// Y range covering every present value of `series`.
fn value_range(series: &[&TimeSeries]) -> Range<f64> {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.observations())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(v), hi.max(v))
        });
    padded(lo, hi)
}

fn date_axis(dates: &[NaiveDate]) -> RangedDate<NaiveDate> {
    let start = dates.first().copied().unwrap_or_default();
    let end = dates.last().copied().unwrap_or(start);
    let end = if end > start {
        end
    } else {
        start + TimeDelta::days(1)
    };
    (start..end).into()
}

/// 2x2 grid: gap-filled daily values, the rolling mean over `window_days` and
/// the labelled peaks.
pub fn timeseries_svg(
    results: &AnalysisResults,
    window_days: usize,
    palette: &Palette,
) -> anyhow::Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1600, 1200)).into_drawing_area();
        root.fill(&rgb(palette.background))?;
        let title = format!(
            "Daily Air Quality ({} to {})",
            results.raw.start(),
            results.raw.end()
        );
        let root = root.titled(&title, (FONT, 30).into_font().color(&rgb(palette.text)))?;
        let panels = root.split_evenly((2, 2));
        for (pollutant, panel) in Pollutant::ALL.iter().zip(panels.iter()) {
            draw_timeseries_panel(panel, *pollutant, results, window_days, palette)?;
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_timeseries_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    pollutant: Pollutant,
    results: &AnalysisResults,
    window_days: usize,
    palette: &Palette,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let filled = results.gap_filled.series(pollutant);
    let rolling = results.rolling_for(pollutant);
    let peaks = results.peaks.get(pollutant);
    let color = rgb(palette.color(pollutant));
    let dark = rgb(palette.dark(pollutant));
    let text = rgb(palette.text);

    let mut chart = ChartBuilder::on(area)
        .caption(pollutant.chart_title(), (FONT, 22).into_font().color(&text))
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(date_axis(filled.dates()), value_range(&[filled, rolling]))?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%b %Y").to_string())
        .y_desc(pollutant.unit())
        .draw()?;

    if filled.valid_count() == 0 {
        let anchor = (filled.dates().first().copied().unwrap_or_default(), 0.5);
        chart.draw_series(std::iter::once(Text::new(
            "no data",
            anchor,
            (FONT, 18).into_font().color(&text),
        )))?;
        return Ok(());
    }

    for (i, run) in segments(filled).into_iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(run, color.mix(0.6)))?;
        if i == 0 {
            series
                .label("Daily")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }
    for (i, run) in segments(rolling).into_iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(run, dark.stroke_width(2)))?;
        if i == 0 {
            series.label(format!("{}-day trend", window_days)).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], dark.stroke_width(2))
            });
        }
    }

    chart.draw_series(
        peaks
            .iter()
            .map(|p| Circle::new((p.date, p.value), 3, text.filled())),
    )?;
    let decimals = label_decimals(pollutant);
    chart.draw_series(peaks.iter().map(|p| {
        Text::new(
            format!("{:.*}", decimals, p.value),
            (p.date, p.value),
            (FONT, 12).into_font().color(&text),
        )
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn month_label(x: f64) -> String {
    let month = x.round();
    if (x - month).abs() < 1e-6 && (1.0..=12.0).contains(&month) {
        month_abbreviation(month as u32).to_string()
    } else {
        String::new()
    }
}

/// Box per calendar month: quartile box, median bar and min/max whiskers.
pub fn monthly_boxplot_svg(
    distribution: &MonthlyDistribution,
    palette: &Palette,
) -> anyhow::Result<String> {
    let pollutant = distribution.pollutant;
    let color = rgb(palette.color(pollutant));
    let dark = rgb(palette.dark(pollutant));
    let text = rgb(palette.text);
    let (lo, hi) = distribution
        .months
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.min), hi.max(b.max))
        });

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1200, 700)).into_drawing_area();
        root.fill(&rgb(palette.background))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Monthly {} Boxplot", pollutant.label()),
                (FONT, 26).into_font().color(&text),
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.5f64..12.5f64, padded(lo, hi))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(12)
            .x_label_formatter(&|x: &f64| month_label(*x))
            .y_desc(pollutant.chart_title())
            .draw()?;

        for (i, stats) in distribution.months.iter().enumerate() {
            let Some(stats) = stats else {
                continue;
            };
            let x = (i + 1) as f64;
            chart.draw_series([
                Rectangle::new([(x - 0.3, stats.q1), (x + 0.3, stats.q3)], color.mix(0.5).filled()),
                Rectangle::new([(x - 0.3, stats.q1), (x + 0.3, stats.q3)], dark.stroke_width(1)),
            ])?;
            chart.draw_series([
                PathElement::new(vec![(x, stats.min), (x, stats.q1)], dark),
                PathElement::new(vec![(x, stats.q3), (x, stats.max)], dark),
                PathElement::new(vec![(x - 0.15, stats.min), (x + 0.15, stats.min)], dark),
                PathElement::new(vec![(x - 0.15, stats.max), (x + 0.15, stats.max)], dark),
                PathElement::new(
                    vec![(x - 0.3, stats.median), (x + 0.3, stats.median)],
                    dark.stroke_width(2),
                ),
            ])?;
        }
        root.present()?;
    }
    Ok(svg)
}

/// Grouped bars, one group per season and one bar per pollutant. Cells
/// without data get no bar.
pub fn seasonal_svg(seasonal: &SeasonSummary, palette: &Palette) -> anyhow::Result<String> {
    let text = rgb(palette.text);
    let top = Season::ALL
        .iter()
        .flat_map(|&s| Pollutant::ALL.map(|p| seasonal.mean(s, p)))
        .flatten()
        .fold(0.0f64, f64::max);
    let top = if top > 0.0 { top * 1.1 } else { 1.0 };
    let width = 0.2;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1200, 800)).into_drawing_area();
        root.fill(&rgb(palette.background))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Seasonal Averages by Pollutant",
                (FONT, 26).into_font().color(&text),
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..3.5f64, 0f64..top)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(4)
            .x_label_formatter(&|x: &f64| {
                let i = x.round();
                if (*x - i).abs() < 1e-6 && (0.0..4.0).contains(&i) {
                    Season::ALL[i as usize].label().to_string()
                } else {
                    String::new()
                }
            })
            .y_desc("Average concentration")
            .draw()?;

        for (j, pollutant) in Pollutant::ALL.iter().enumerate() {
            let color = rgb(palette.color(*pollutant));
            let offset = (j as f64 - 1.5) * width;
            let bars: Vec<Rectangle<(f64, f64)>> = Season::ALL
                .iter()
                .enumerate()
                .filter_map(|(i, season)| {
                    let mean = seasonal.mean(*season, *pollutant)?;
                    let x = i as f64 + offset;
                    Some(Rectangle::new(
                        [(x - width / 2.0, 0.0), (x + width / 2.0, mean)],
                        color.filled(),
                    ))
                })
                .collect();
            chart
                .draw_series(bars)?
                .label(pollutant.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
    }
    Ok(svg)
}

/// Observed, trend, seasonal and residual panels stacked vertically.
pub fn decomposition_svg(
    decomposition: &DecompositionResult,
    palette: &Palette,
) -> anyhow::Result<String> {
    let pollutant = decomposition.pollutant;
    let components = [
        ("Observed", &decomposition.observed, rgb(palette.color(pollutant))),
        ("Trend", &decomposition.trend, rgb(palette.dark(pollutant))),
        ("Seasonal", &decomposition.seasonal, rgb(palette.color(pollutant))),
        ("Residual", &decomposition.residual, rgb(palette.text)),
    ];

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1400, 1400)).into_drawing_area();
        root.fill(&rgb(palette.background))?;
        let title = format!(
            "Additive decomposition of {} (period {})",
            pollutant.label(),
            decomposition.period
        );
        let root = root.titled(&title, (FONT, 28).into_font().color(&rgb(palette.text)))?;
        let panels = root.split_evenly((components.len(), 1));
        for ((name, series, color), panel) in components.iter().zip(panels.iter()) {
            draw_component_panel(panel, name, series, *color, palette)?;
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_component_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    name: &str,
    series: &TimeSeries,
    color: RGBColor,
    palette: &Palette,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mut chart = ChartBuilder::on(area)
        .caption(name, (FONT, 20).into_font().color(&rgb(palette.text)))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(date_axis(series.dates()), value_range(&[series]))?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%b %Y").to_string())
        .draw()?;
    for run in segments(series) {
        chart.draw_series(LineSeries::new(run, color.stroke_width(1)))?;
    }
    Ok(())
}
