//! SVG rendering of the characteristic and resistance charts.

use std::ops::Range;
use std::path::Path;

use log::{info, warn};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use subcurve::error::{ErrorSource, Result, SubcurveError};
use subcurve::io::create_dir_all;

use crate::curve::{dynamic_resistance, is_plottable, scale_currents, static_resistance};
use crate::shockley::ShockleyDiode;
use crate::sweep::{DiodeCurve, TemperatureSweep};

/// Forward voltage at which a silicon diode starts to conduct.
pub const SILICON_THRESHOLD: f64 = 0.7;
/// Leading dynamic resistance points left out of the resistance chart.
pub const DYNAMIC_SKIP: usize = 10;
/// The series resistance that bounds the diode resistance from below.
pub const SERIES_RESISTANCE: f64 = 1.0;

const VOLTAGE_RANGE: Range<f64> = -2.0..2.0;
const CURRENT_RANGE: Range<f64> = -500.0..750.0;
const RESISTANCE_VOLTAGE_RANGE: Range<f64> = -2.0..3.0;

const FONT: &str = "sans-serif";
const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Image width, in pixels.
    pub width: u32,
    /// Image height, in pixels.
    pub height: u32,
    /// Model name shown in the characteristic chart title.
    pub model: String,
    /// The reference sweep. Its diode voltage is the x axis of the
    /// characteristic chart, and its resistance is charted.
    pub resistance_temperature: f64,
    /// The ideal diode overlaid on the characteristic chart.
    pub reference: ShockleyDiode,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1000,
            model: "1N4148".to_string(),
            resistance_temperature: 25.0,
            reference: ShockleyDiode::default(),
        }
    }
}

/// Formats a scaled current for the characteristic chart's y axis.
///
/// Non-negative values are in mA. Negative values are in units of 10 pA
/// and are shown in nA.
pub fn current_tick_label(value: f64) -> String {
    if value >= 0.0 {
        format!("{value} mA")
    } else {
        format!("{} nA", value / 100.0)
    }
}

/// `(voltage, scaled current)` points of one sweep, drawn against the
/// diode voltage of the reference sweep.
///
/// Samples are paired by sweep index. The reference voltage also selects
/// the scale factor of each sample, so every sweep shares one partition.
pub fn characteristic_series(
    reference: &DiodeCurve,
    curve: &DiodeCurve,
) -> Result<Vec<(f64, f64)>> {
    let scaled = scale_currents(&reference.voltage, &curve.current)?;
    Ok(reference.voltage.iter().copied().zip(scaled).collect())
}

/// `(voltage, scaled current)` points of the ideal diode at the given voltages.
pub fn shockley_series(diode: &ShockleyDiode, voltages: &[f64]) -> Result<Vec<(f64, f64)>> {
    let scaled = scale_currents(voltages, &diode.currents(voltages))?;
    Ok(voltages.iter().copied().zip(scaled).collect())
}

/// Plottable `(voltage, static resistance)` points.
pub fn static_series(curve: &DiodeCurve) -> Result<Vec<(f64, f64)>> {
    let r = static_resistance(&curve.voltage, &curve.current)?;
    Ok(curve
        .voltage
        .iter()
        .copied()
        .zip(r)
        .filter(|(_, r)| is_plottable(*r))
        .collect())
}

/// Plottable `(voltage, dynamic resistance)` points, without the first
/// [`DYNAMIC_SKIP`] slopes.
pub fn dynamic_series(curve: &DiodeCurve) -> Result<Vec<(f64, f64)>> {
    Ok(dynamic_resistance(&curve.voltage, &curve.current)?
        .into_iter()
        .skip(DYNAMIC_SKIP)
        .filter(|p| is_plottable(p.resistance))
        .map(|p| (p.voltage, p.resistance))
        .collect())
}

/// Picks the sweep at `temperature`, falling back to the first sweep.
pub fn resistance_sweep(
    sweeps: &[TemperatureSweep],
    temperature: f64,
) -> Result<&TemperatureSweep> {
    if let Some(sweep) = sweeps
        .iter()
        .find(|s| (s.temperature - temperature).abs() < 1e-9)
    {
        return Ok(sweep);
    }
    let first = sweeps
        .first()
        .ok_or_else(|| ErrorSource::InvalidArgs("no sweeps to plot".into()))?;
    warn!(
        "no sweep at {temperature} °C, charting resistance at {} °C",
        first.temperature
    );
    Ok(first)
}

/// Renders both charts into an SVG file, creating its directory if needed.
pub fn render_svg_file(
    path: impl AsRef<Path>,
    sweeps: &[TemperatureSweep],
    opts: &PlotOptions,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let root = SVGBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    draw(&root, sweeps, opts)?;
    info!("wrote {path:?}");
    Ok(())
}

/// Renders both charts and returns the SVG document.
pub fn render_svg_string(sweeps: &[TemperatureSweep], opts: &PlotOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (opts.width, opts.height)).into_drawing_area();
        draw(&root, sweeps, opts)?;
    }
    Ok(svg)
}

fn render_err<E>(err: DrawingAreaErrorKind<E>) -> SubcurveError
where
    E: std::error::Error + Send + Sync,
{
    ErrorSource::Render(err.to_string()).into()
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    sweeps: &[TemperatureSweep],
    opts: &PlotOptions,
) -> Result<()> {
    let reference = resistance_sweep(sweeps, opts.resistance_temperature)?;

    root.fill(&WHITE).map_err(render_err)?;
    let panels = root.split_evenly((1, 2));
    draw_characteristic(&panels[0], sweeps, reference, opts)?;
    draw_resistance(&panels[1], reference)?;
    root.present().map_err(render_err)?;
    Ok(())
}

/// Keeps the points that fall inside the chart.
fn clip(points: Vec<(f64, f64)>, x: Range<f64>, y: Range<f64>) -> Vec<(f64, f64)> {
    points
        .into_iter()
        .filter(|(px, py)| x.start <= *px && *px <= x.end && y.start <= *py && *py <= y.end)
        .collect()
}

/// Shading for the reverse, sub-threshold and conducting regions.
fn regions(x_end: f64, y: Range<f64>) -> [Rectangle<(f64, f64)>; 3] {
    [
        Rectangle::new([(-2.0, y.start), (0.0, y.end)], GREEN.mix(0.2).filled()),
        Rectangle::new(
            [(0.0, y.start), (SILICON_THRESHOLD, y.end)],
            BLUE.mix(0.1).filled(),
        ),
        Rectangle::new(
            [(SILICON_THRESHOLD, y.start), (x_end, y.end)],
            BLUE.mix(0.2).filled(),
        ),
    ]
}

fn vline(x: f64, y: Range<f64>, color: RGBColor) -> PathElement<(f64, f64)> {
    PathElement::new(vec![(x, y.start), (x, y.end)], color.stroke_width(1))
}

fn hline(y: f64, x: Range<f64>, color: RGBColor) -> PathElement<(f64, f64)> {
    PathElement::new(vec![(x.start, y), (x.end, y)], color.stroke_width(1))
}

fn draw_characteristic<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    sweeps: &[TemperatureSweep],
    reference: &TemperatureSweep,
    opts: &PlotOptions,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(format!("{} Characteristic Curve", opts.model), (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(VOLTAGE_RANGE, CURRENT_RANGE)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Voltage [V]")
        .y_desc("Current")
        .y_label_formatter(&|v: &f64| current_tick_label(*v))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(regions(VOLTAGE_RANGE.end, CURRENT_RANGE))
        .map_err(render_err)?;

    for (idx, sweep) in sweeps.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let points = clip(
            characteristic_series(&reference.curve, &sweep.curve)?,
            VOLTAGE_RANGE,
            CURRENT_RANGE,
        );
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(render_err)?
            .label(format!("@ {} °C", sweep.temperature))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    let diode = &opts.reference;
    let points = clip(
        shockley_series(diode, &reference.curve.voltage)?,
        VOLTAGE_RANGE,
        CURRENT_RANGE,
    );
    chart
        .draw_series(LineSeries::new(points, BLACK.stroke_width(2)))
        .map_err(render_err)?
        .label(format!(
            "Shockley Diode Model Is = {} nA",
            (diode.is * 1e12).round() / 1e3
        ))
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2))
        });

    chart
        .draw_series([
            vline(0.0, CURRENT_RANGE, BLACK),
            hline(0.0, VOLTAGE_RANGE, BLACK),
            vline(SILICON_THRESHOLD, CURRENT_RANGE, RED),
        ])
        .map_err(render_err)?;

    let centered =
        TextStyle::from((FONT, 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series([
            Text::new("Reverse Biased Region", (-1.0, -100.0), centered.clone()),
            Text::new("Forward Biased Region", (1.0, -100.0), centered),
        ])
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .label_font((FONT, 20))
        .draw()
        .map_err(render_err)?;

    Ok(())
}

/// The y range of the resistance chart, always including [`SERIES_RESISTANCE`].
fn resistance_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|r| is_plottable(*r))
        .chain(std::iter::once(SERIES_RESISTANCE))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r), hi.max(r))
        });
    (min / 2.0)..(max * 2.0)
}

fn draw_resistance<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    sweep: &TemperatureSweep,
) -> Result<()> {
    let statics = clip(
        static_series(&sweep.curve)?,
        RESISTANCE_VOLTAGE_RANGE,
        0.0..f64::INFINITY,
    );
    let dynamics = clip(
        dynamic_series(&sweep.curve)?,
        RESISTANCE_VOLTAGE_RANGE,
        0.0..f64::INFINITY,
    );
    let y_range = resistance_range(statics.iter().chain(dynamics.iter()).map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Resistance @ {} °C", sweep.temperature), (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(RESISTANCE_VOLTAGE_RANGE, y_range.clone().log_scale())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Voltage [V]")
        .y_desc("Resistance [Ω]")
        .y_label_formatter(&|v: &f64| format!("{v:e}"))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(regions(RESISTANCE_VOLTAGE_RANGE.end, y_range.clone()))
        .map_err(render_err)?;

    for (idx, (label, points)) in [("Static Resistance", statics), ("Dynamic Resistance", dynamics)]
        .into_iter()
        .enumerate()
    {
        let color = SERIES_COLORS[idx];
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(render_err)?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .draw_series([
            vline(0.0, y_range.clone(), BLACK),
            vline(SILICON_THRESHOLD, y_range, RED),
            hline(SERIES_RESISTANCE, RESISTANCE_VOLTAGE_RANGE, RED),
        ])
        .map_err(render_err)?;

    chart
        .draw_series(std::iter::once(Text::new(
            format!("R limitation = {SERIES_RESISTANCE} Ω"),
            (-1.5, 1.1),
            TextStyle::from((FONT, 20).into_font()).color(&RED),
        )))
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .label_font((FONT, 20))
        .draw()
        .map_err(render_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    fn sweep(temperature: f64) -> TemperatureSweep {
        let diode = ShockleyDiode {
            temperature,
            ..ShockleyDiode::default()
        };
        let voltage = (-200..=100).map(|i| i as f64 * 0.01).collect::<Vec<_>>();
        let current = diode.currents(&voltage);
        TemperatureSweep {
            temperature,
            curve: DiodeCurve {
                sweep: voltage.clone(),
                voltage,
                current,
            },
        }
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(current_tick_label(250.0), "250 mA");
        assert_eq!(current_tick_label(0.0), "0 mA");
        assert_eq!(current_tick_label(-200.0), "-2 nA");
        assert_eq!(current_tick_label(-50.0), "-0.5 nA");
    }

    #[test]
    fn test_series() {
        let s = sweep(25.0);
        let points = characteristic_series(&s.curve, &s.curve).unwrap();
        assert_eq!(points.len(), s.curve.len());
        // -Is at -2 V is -4 nA, i.e. -400 reverse units.
        assert_float_eq!(points[0].1, -400.0, r2nd <= 1e-9);

        let statics = static_series(&s.curve).unwrap();
        assert!(statics.iter().all(|(_, r)| *r > 0.0 && r.is_finite()));
        // The zero-current sample at 0 V is dropped.
        assert!(statics.len() < s.curve.len());

        let dynamics = dynamic_series(&s.curve).unwrap();
        assert!(!dynamics.is_empty());
        assert!(dynamics.len() <= s.curve.len() - 1 - DYNAMIC_SKIP);
        assert!(dynamics.iter().all(|(v, _)| *v >= -1.89 - 1e-12));
    }

    #[test]
    fn test_characteristic_uses_reference_voltage() {
        let reference = DiodeCurve {
            sweep: vec![-1.0, 0.5, 1.0],
            voltage: vec![-1.0, 0.0, 0.6],
            current: vec![-4e-9, 0.0, 0.4],
        };
        // A hotter sweep sits at lower voltages for the same input.
        let hot = DiodeCurve {
            sweep: reference.sweep.clone(),
            voltage: vec![-1.0, 0.3, 0.5],
            current: vec![-8e-9, 0.2, 0.5],
        };

        let points = characteristic_series(&reference, &hot).unwrap();
        let voltages = points.iter().map(|p| p.0).collect::<Vec<_>>();
        assert_eq!(voltages, reference.voltage);
        assert_float_eq!(points[0].1, -800.0, r2nd <= 1e-12);
        // 0 V on the reference selects the reverse scale even though the
        // hot sweep is forward biased at that index.
        assert_float_eq!(points[1].1, 0.2e11, r2nd <= 1e-12);
        assert_float_eq!(points[2].1, 500.0, r2nd <= 1e-12);

        let short = DiodeCurve {
            sweep: vec![0.0],
            voltage: vec![0.0],
            current: vec![0.0],
        };
        assert!(characteristic_series(&reference, &short).is_err());
    }

    #[test]
    fn test_resistance_sweep() {
        let sweeps = vec![sweep(0.0), sweep(25.0), sweep(100.0)];
        assert_eq!(resistance_sweep(&sweeps, 25.0).unwrap().temperature, 25.0);
        assert_eq!(resistance_sweep(&sweeps, 27.0).unwrap().temperature, 0.0);
        assert!(resistance_sweep(&[], 25.0).is_err());
    }

    #[test]
    fn test_resistance_range() {
        let range = resistance_range([1e3, f64::INFINITY, -5.0, 1e9].into_iter());
        assert_float_eq!(range.start, 0.5, r2nd <= 1e-12);
        assert_float_eq!(range.end, 2e9, r2nd <= 1e-12);

        let range = resistance_range(std::iter::empty());
        assert_float_eq!(range.start, 0.5, r2nd <= 1e-12);
        assert_float_eq!(range.end, 2.0, r2nd <= 1e-12);
    }

    #[test]
    fn test_clip() {
        let points = vec![(-3.0, 0.0), (0.0, 0.0), (1.0, 800.0), (2.0, 750.0)];
        assert_eq!(
            clip(points, VOLTAGE_RANGE, CURRENT_RANGE),
            vec![(0.0, 0.0), (2.0, 750.0)]
        );
    }

    #[test]
    fn test_render_svg() {
        let sweeps = vec![sweep(0.0), sweep(25.0), sweep(100.0)];
        let svg = render_svg_string(&sweeps, &PlotOptions::default()).unwrap();
        assert!(svg.contains("<svg"));
        for text in [
            "1N4148 Characteristic Curve",
            "Resistance @ 25 °C",
            "@ 100 °C",
            "Shockley Diode Model Is = 4 nA",
            "Reverse Biased Region",
            "Forward Biased Region",
            "R limitation = 1 Ω",
            "Dynamic Resistance",
        ] {
            assert!(svg.contains(text), "missing {text:?}");
        }
    }
}
