use log::warn;
use serde::Serialize;
use crate::config::{DisplayConfig, YScale};
use crate::drivers::AccumulatedState;
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}
/// One channel's plottable series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    /// Buffer key the samples came from.
    #[serde(skip)]
    pub channel: String,
    /// Legend label.
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub line: LineStyle,
}
impl Trace {
    pub fn color(&self) -> &str {
        &self.line.color
    }
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(rename = "showgrid")]
    pub show_grid: bool,
    #[serde(rename = "gridcolor")]
    pub grid_color: String,
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub margin: Margin,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
    pub font: Font,
    #[serde(rename = "xaxis")]
    pub x_axis: Axis,
    #[serde(rename = "yaxis")]
    pub y_axis: Axis,
    #[serde(rename = "showlegend")]
    pub show_legend: bool,
}
/// Render-ready output: traces plus layout. Serializes in the plotly figure shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    #[serde(rename = "data")]
    pub traces: Vec<Trace>,
    pub layout: Layout,
}
impl Figure {
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
/// Colors of the surrounding chrome; channel colors come from [`DisplayConfig`].
#[derive(Clone, Debug)]
pub struct Theme {
    pub background: String,
    pub font: String,
    pub grid: String,
    pub margin: Margin,
    pub line_width: f64,
}
impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#25262b".to_owned(),
            font: "#c1c2c5".to_owned(),
            grid: "#373A40".to_owned(),
            margin: Margin { l: 0, r: 0, t: 0, b: 0 },
            line_width: 1.0,
        }
    }
}
/// Turns accumulated channel windows into a [`Figure`].
#[derive(Clone, Debug, Default)]
pub struct FigureBuilder {
    theme: Theme,
}
impl FigureBuilder {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
    pub fn theme(&self) -> &Theme {
        &self.theme
    }
    /// Builds the figure for `state`.
    ///
    /// The X axis always spans `[0, buffer_length]`. Time values are synthesized
    /// from the sample index, so channels are aligned by index. When channels hold
    /// different sample counts, every trace shows the newest `n` samples where `n`
    /// is the shortest non-empty channel; channels without samples produce an empty
    /// trace but keep their color slot.
    pub fn build(&self, state: Option<&AccumulatedState>, config: &DisplayConfig) -> Figure {
        let mut layout = self.layout(config);
        let Some(state) = state.filter(|s| !s.is_empty()) else {
            return Figure {
                traces: Vec::new(),
                layout,
            };
        };
        let (shortest, longest) = state
            .iter()
            .map(|(_, buffer)| buffer.len())
            .filter(|&len| len > 0)
            .fold((usize::MAX, 0), |(lo, hi), len| (lo.min(len), hi.max(len)));
        if shortest != longest {
            warn!("channel lengths differ ({shortest}..{longest}); plotting newest {shortest}");
        }
        let x = time_axis(shortest, config.sample_rate);
        let traces = state
            .iter()
            .enumerate()
            .map(|(idx, (channel, buffer))| {
                let y = buffer.latest(shortest);
                Trace {
                    channel: channel.to_owned(),
                    name: config.legend_for(idx, channel).to_owned(),
                    x: x[..y.len()].to_vec(),
                    y,
                    mode: "lines",
                    line: LineStyle {
                        color: config.color_for(idx).to_owned(),
                        width: self.theme.line_width,
                    },
                }
            })
            .collect();
        if let YScale::Fixed { min, max } = config.y_scale() {
            layout.y_axis.range = Some([min, max]);
        }
        Figure { traces, layout }
    }
    fn layout(&self, config: &DisplayConfig) -> Layout {
        let axis = |title: &str, range: Option<[f64; 2]>| Axis {
            title: title.to_owned(),
            range,
            show_grid: true,
            grid_color: self.theme.grid.clone(),
        };
        Layout {
            title: config.title.clone(),
            margin: self.theme.margin,
            plot_bgcolor: self.theme.background.clone(),
            paper_bgcolor: self.theme.background.clone(),
            font: Font {
                color: self.theme.font.clone(),
            },
            x_axis: axis(&config.x_title, Some([0.0, config.buffer_length])),
            y_axis: axis(&config.y_title, None),
            show_legend: config.show_legend,
        }
    }
}
/// `i / sample_rate` for each index. A non-positive rate falls back to one
/// unit per sample rather than producing infinities.
fn time_axis(len: usize, sample_rate: f64) -> Vec<f64> {
    let rate = if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        1.0
    };
    (0..len).map(|i| i as f64 / rate).collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{merge_batch, SampleBatch};
    fn config(sample_rate: f64, buffer_length: f64) -> DisplayConfig {
        DisplayConfig {
            sample_rate,
            buffer_length,
            colors: vec!["#111111".into(), "#222222".into(), "#333333".into()],
            ..DisplayConfig::default()
        }
    }
    fn state_of(batch: SampleBatch, cfg: &DisplayConfig) -> AccumulatedState {
        merge_batch(None, Some(&batch), cfg)
    }
    #[test]
    fn empty_inputs_give_the_placeholder_figure() {
        let cfg = config(10.0, 4.0);
        let builder = FigureBuilder::default();
        let drained = state_of(SampleBatch::new().with("ch1", Vec::<f64>::new()), &cfg);
        for state in [None, Some(&AccumulatedState::new()), Some(&drained)] {
            let figure = builder.build(state, &cfg);
            assert!(figure.traces.is_empty());
            assert_eq!(figure.layout.x_axis.range, Some([0.0, 4.0]));
            assert_eq!(figure.layout.y_axis.range, None);
        }
    }
    #[test]
    fn empty_figure_ignores_fixed_y_scale() {
        let mut cfg = config(10.0, 4.0);
        cfg.auto_scale = false;
        let figure = FigureBuilder::default().build(None, &cfg);
        assert_eq!(figure.layout.y_axis.range, None);
    }
    #[test]
    fn two_channels_share_the_time_axis_and_cycle_colors() {
        let cfg = config(1.0, 10.0);
        let state = state_of(
            SampleBatch::new()
                .with("ch1", vec![1.0, 2.0, 3.0])
                .with("ch2", vec![4.0, 5.0, 6.0]),
            &cfg,
        );
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.traces.len(), 2);
        let (ch1, ch2) = (&figure.traces[0], &figure.traces[1]);
        assert_eq!(ch1.channel, "ch1");
        assert_eq!(ch1.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(ch2.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(ch1.y, vec![1.0, 2.0, 3.0]);
        assert_eq!(ch2.y, vec![4.0, 5.0, 6.0]);
        assert_eq!(ch1.color(), cfg.colors[0]);
        assert_eq!(ch2.color(), cfg.colors[1 % cfg.colors.len()]);
        assert_eq!(figure.layout.x_axis.range, Some([0.0, 10.0]));
        assert_eq!(figure.layout.y_axis.range, None);
    }
    #[test]
    fn colors_wrap_and_survive_an_empty_palette() {
        let mut cfg = config(2.0, 1.0);
        let batch: SampleBatch = (0..4).map(|i| (format!("c{i}"), vec![i as f64])).collect();
        let state = state_of(batch, &cfg);
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.traces[3].color(), "#111111");
        cfg.colors.clear();
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert!(figure
            .traces
            .iter()
            .all(|t| t.color() == crate::config::FALLBACK_COLOR));
    }
    #[test]
    fn fixed_scale_pins_the_y_range() {
        let mut cfg = config(10.0, 1.0);
        cfg.auto_scale = false;
        cfg.y_min = -1.0;
        cfg.y_max = 1.0;
        let state = state_of(SampleBatch::new().with("ch1", vec![250.0, -900.0]), &cfg);
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.layout.y_axis.range, Some([-1.0, 1.0]));
    }
    #[test]
    fn x_values_are_seconds_since_window_start() {
        let cfg = config(4.0, 2.0);
        let state = state_of(SampleBatch::new().with("ch1", vec![0.0; 6]), &cfg);
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.traces[0].x, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25]);
        assert_eq!(figure.layout.x_axis.range, Some([0.0, 2.0]));
    }
    #[test]
    fn uneven_channels_are_cut_to_the_shortest_newest_tail() {
        let cfg = config(1.0, 10.0);
        let state = state_of(
            SampleBatch::new()
                .with("long", vec![1.0, 2.0, 3.0, 4.0])
                .with("short", vec![7.0, 8.0])
                .with("idle", Vec::<f64>::new()),
            &cfg,
        );
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.traces.len(), 3);
        assert_eq!(figure.traces[0].y, vec![3.0, 4.0]);
        assert_eq!(figure.traces[1].y, vec![7.0, 8.0]);
        assert_eq!(figure.traces[0].x, vec![0.0, 1.0]);
        assert!(figure.traces[2].x.is_empty() && figure.traces[2].y.is_empty());
        assert_eq!(figure.traces[2].color(), "#333333");
    }
    #[test]
    fn legend_names_and_titles_flow_into_the_figure() {
        let mut cfg = config(1.0, 5.0);
        cfg.title = Some("Signal Monitor 1".into());
        cfg.legend_names = vec!["Sensor A".into()];
        cfg.show_legend = true;
        let state = state_of(SampleBatch::new().with("Dev1/ai0", vec![1.0]), &cfg);
        let figure = FigureBuilder::default().build(Some(&state), &cfg);
        assert_eq!(figure.traces[0].name, "Sensor A");
        assert_eq!(figure.layout.title.as_deref(), Some("Signal Monitor 1"));
        assert_eq!(figure.layout.x_axis.title, "Time (s)");
        assert!(figure.layout.show_legend);
    }
    #[test]
    fn json_export_uses_plotly_field_names() {
        let cfg = config(1.0, 3.0);
        let state = state_of(SampleBatch::new().with("ch1", vec![1.0, 2.0]), &cfg);
        let json = FigureBuilder::default()
            .build(Some(&state), &cfg)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data"][0]["line"]["color"], "#111111");
        assert_eq!(value["data"][0]["mode"], "lines");
        assert_eq!(value["layout"]["xaxis"]["range"][1], 3.0);
        assert!(value["layout"]["yaxis"].get("range").is_none());
        assert_eq!(value["layout"]["plot_bgcolor"], "#25262b");
    }
}
