//! Terminal visualization using braille graphics
//!
//! Xbar and R control charts plus a one-line tolerance bar, drawn with
//! Unicode braille characters.

use drawille::Canvas;

use crate::cli::helpers::smart_round;
use crate::core::analysis::DimensionAnalysis;

/// Default canvas size for control charts
pub const CHART_WIDTH: u32 = 120;
pub const CHART_HEIGHT: u32 = 40;

/// A series to plot against its center line and control limits
pub struct ChartSeries<'a> {
    pub title: &'a str,
    pub points: &'a [f64],
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Render one control chart
///
/// Limits are drawn dashed, the center line dotted and the series as a
/// polyline with each point marked.
///
/// # Example Output
/// ```text
/// Xbar  UCL=6.0251  CL=6.0120  LCL=5.9989
/// ⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤
/// ⠀⠀⢀⠔⠢⡀⠀⠀⠀⠀⠀⣀⠤⠒⠉⠑⢄⠀⠀⠀
/// ⠒⠊⠁⠂⠐⠈⠢⠤⠒⠊⠉⠂⠐⠂⠐⠂⠐⠑⠂⠐
/// ⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤⠀⠤⠤
/// ```
pub fn render_control_chart(series: &ChartSeries<'_>, width: u32, height: u32) -> String {
    let header = format!(
        "{}  UCL={}  CL={}  LCL={}",
        series.title,
        smart_round(series.upper, series.upper - series.lower),
        smart_round(series.center, series.upper - series.lower),
        smart_round(series.lower, series.upper - series.lower)
    );

    if series.points.is_empty() {
        return format!("{}\n  (no subgroups)", header);
    }

    // View spans the limits and every point, with a margin
    let (lo, hi) = series
        .points
        .iter()
        .fold((series.lower, series.upper), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        });
    let span = (hi - lo).abs().max(1e-9);
    let view_min = lo - span * 0.1;
    let view_max = hi + span * 0.1;

    let max_y = height.saturating_sub(1);
    let to_y = |value: f64| -> u32 {
        let frac = ((value - view_min) / (view_max - view_min)).clamp(0.0, 1.0);
        max_y - (frac * max_y as f64).round() as u32
    };

    let mut canvas = Canvas::new(width, height);

    let (y_ucl, y_cl, y_lcl) = (to_y(series.upper), to_y(series.center), to_y(series.lower));
    for x in 0..width {
        if x % 6 < 4 {
            canvas.set(x, y_ucl);
            canvas.set(x, y_lcl);
        }
        if x % 4 == 0 {
            canvas.set(x, y_cl);
        }
    }

    let max_x = width.saturating_sub(1);
    let to_x = |i: usize| -> u32 {
        if series.points.len() == 1 {
            max_x / 2
        } else {
            (i as f64 / (series.points.len() - 1) as f64 * max_x as f64).round() as u32
        }
    };

    let mut previous: Option<(u32, u32)> = None;
    for (i, &point) in series.points.iter().enumerate() {
        let (x, y) = (to_x(i), to_y(point));
        if let Some((px, py)) = previous {
            canvas.line(px, py, x, y);
        }
        // Point marker
        canvas.set(x, y);
        canvas.set(x.saturating_sub(1), y);
        canvas.set((x + 1).min(max_x), y);
        previous = Some((x, y));
    }

    format!("{}\n{}", header, canvas.frame())
}

/// Xbar and R charts for one analyzed dimension
pub fn render_xbar_r(analysis: &DimensionAnalysis, width: u32, height: u32) -> String {
    let means: Vec<f64> = analysis.subgroups.iter().map(|s| s.mean).collect();
    let ranges: Vec<f64> = analysis.subgroups.iter().map(|s| s.range).collect();
    let limits = &analysis.limits;

    let mut output = Vec::new();
    output.push(render_control_chart(
        &ChartSeries {
            title: "Xbar",
            points: &means,
            center: limits.x_bar_bar,
            upper: limits.ucl_x,
            lower: limits.lcl_x,
        },
        width,
        height,
    ));
    output.push(out_of_control_line(&analysis.x_out_of_control));
    output.push(String::new());
    output.push(render_control_chart(
        &ChartSeries {
            title: "R",
            points: &ranges,
            center: limits.r_bar,
            upper: limits.ucl_r,
            lower: limits.lcl_r,
        },
        width,
        height / 2,
    ));
    output.push(out_of_control_line(&analysis.r_out_of_control));
    output.join("\n")
}

fn out_of_control_line(indices: &[usize]) -> String {
    if indices.is_empty() {
        "  in control".to_string()
    } else {
        let list: Vec<String> = indices.iter().map(|i| format!("#{}", i + 1)).collect();
        format!("  out of control: subgroups {}", list.join(", "))
    }
}

/// Render a simple 1D tolerance range bar
///
/// Shows min/max range with spec limits
pub fn render_range_bar(min: f64, max: f64, lower_limit: f64, upper_limit: f64) -> String {
    let bar_width = 60;

    let full_range = (upper_limit - lower_limit).abs().max(1e-9);
    let spec_margin = full_range * 0.1; // 10% margin outside spec

    let view_min = lower_limit.min(min) - spec_margin;
    let view_max = upper_limit.max(max) + spec_margin;
    let view_range = view_max - view_min;

    let position = |value: f64| -> usize {
        let pos = ((value - view_min) / view_range * bar_width as f64).max(0.0) as usize;
        pos.min(bar_width - 1)
    };
    let pos_lower = position(lower_limit);
    let pos_upper = position(upper_limit);
    let pos_min = position(min);
    let pos_max = position(max);

    let mut bar: Vec<char> = vec!['─'; bar_width];

    // Mark spec limits
    bar[pos_lower] = '│';
    bar[pos_upper] = '│';

    // Mark result range
    for cell in bar.iter_mut().take(pos_max + 1).skip(pos_min) {
        *cell = if *cell == '│' { '╋' } else { '═' };
    }

    // Mark min/max endpoints
    bar[pos_min] = if bar[pos_min] == '╋' { '╟' } else { '[' };
    bar[pos_max] = if bar[pos_max] == '╋' { '╢' } else { ']' };

    let bar_str: String = bar.into_iter().collect();
    let band = upper_limit - lower_limit;

    format!(
        "  LSL={}  USL={}\n  {}\n  Min={}  Max={}",
        smart_round(lower_limit, band),
        smart_round(upper_limit, band),
        bar_str,
        smart_round(min, band),
        smart_round(max, band)
    )
}
