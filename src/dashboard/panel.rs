//! Toggleable chart panels.
//!
//! A panel owns the dataset it was loaded with and the mode it is currently
//! showing, so switching modes re-renders without fetching again.

use serde::Serialize;

use crate::calculate::{bar_thickness, race_mmr_bars, team_comp_bars};
use crate::models::{CompositionEntry, CompositionViews, MmrBar, MmrMode, RaceMmr, TeamCompMmr};

/// A chart mode with exactly two states.
pub trait PanelMode: Copy + Default + PartialEq + std::fmt::Debug + Serialize {
    fn toggled(self) -> Self;
}

impl PanelMode for MmrMode {
    fn toggled(self) -> Self {
        MmrMode::toggled(self)
    }
}

/// Ordering of the team composition chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionOrder {
    #[default]
    Frequency,
    WinRate,
}

impl PanelMode for CompositionOrder {
    fn toggled(self) -> Self {
        match self {
            CompositionOrder::Frequency => CompositionOrder::WinRate,
            CompositionOrder::WinRate => CompositionOrder::Frequency,
        }
    }
}

/// Data that can be drawn in more than one mode.
pub trait Chart {
    type Mode: PanelMode;
    type Output: Serialize;

    fn title(&self, mode: Self::Mode) -> &'static str;

    fn render(&self, mode: Self::Mode) -> Self::Output;
}

/// A chart drawn in one mode, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered<M, T> {
    pub title: &'static str,
    pub mode: M,
    pub data: T,
}

/// Bars plus the thickness to draw them with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub bars: Vec<MmrBar>,
    pub bar_thickness: u32,
}

/// Rating change per race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceMmrChart(pub Vec<RaceMmr>);

impl Chart for RaceMmrChart {
    type Mode = MmrMode;
    type Output = BarChart;

    fn title(&self, mode: MmrMode) -> &'static str {
        match mode {
            MmrMode::Total => "Total MMR Gained with Each Race",
            MmrMode::PerGame => "MMR Gained per Game with Each Race",
        }
    }

    fn render(&self, mode: MmrMode) -> BarChart {
        BarChart {
            bars: race_mmr_bars(&self.0, mode),
            bar_thickness: bar_thickness(self.0.len()),
        }
    }
}

/// Rating change per team composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCompChart(pub Vec<TeamCompMmr>);

impl Chart for TeamCompChart {
    type Mode = MmrMode;
    type Output = BarChart;

    fn title(&self, mode: MmrMode) -> &'static str {
        match mode {
            MmrMode::Total => "Total MMR Gained with Each Team Comp.",
            MmrMode::PerGame => "MMR Gained per Game with Each Team Comp.",
        }
    }

    fn render(&self, mode: MmrMode) -> BarChart {
        BarChart {
            bars: team_comp_bars(&self.0, mode),
            bar_thickness: bar_thickness(self.0.len()),
        }
    }
}

impl Chart for CompositionViews {
    type Mode = CompositionOrder;
    type Output = Vec<CompositionEntry>;

    fn title(&self, mode: CompositionOrder) -> &'static str {
        match mode {
            CompositionOrder::Frequency => "Team Compositions by Popularity",
            CompositionOrder::WinRate => "Team Compositions by Win Rate",
        }
    }

    fn render(&self, mode: CompositionOrder) -> Vec<CompositionEntry> {
        match mode {
            CompositionOrder::Frequency => self.by_frequency.clone(),
            CompositionOrder::WinRate => self.by_win_rate.clone(),
        }
    }
}

/// A chart with its cached dataset and current mode.
#[derive(Debug)]
pub struct ChartPanel<C: Chart> {
    data: Option<C>,
    mode: C::Mode,
}

impl<C: Chart> Default for ChartPanel<C> {
    fn default() -> Self {
        Self {
            data: None,
            mode: C::Mode::default(),
        }
    }
}

impl<C: Chart> ChartPanel<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dataset and return to the default mode.
    pub fn load(&mut self, data: C) -> Rendered<C::Mode, C::Output> {
        self.mode = C::Mode::default();
        let rendered = Self::draw(&data, self.mode);
        self.data = Some(data);
        rendered
    }

    /// Switch to the other mode and redraw. Does nothing until loaded.
    pub fn toggle(&mut self) -> Option<Rendered<C::Mode, C::Output>> {
        let data = self.data.as_ref()?;
        self.mode = self.mode.toggled();
        Some(Self::draw(data, self.mode))
    }

    /// Draw the loaded dataset in `mode` without changing the panel's mode.
    pub fn render(&self, mode: C::Mode) -> Option<Rendered<C::Mode, C::Output>> {
        self.data.as_ref().map(|data| Self::draw(data, mode))
    }

    pub fn current(&self) -> Option<Rendered<C::Mode, C::Output>> {
        self.render(self.mode)
    }

    /// Drop the dataset, e.g. before loading another player.
    pub fn reset(&mut self) {
        self.data = None;
        self.mode = C::Mode::default();
    }

    pub fn mode(&self) -> C::Mode {
        self.mode
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    fn draw(data: &C, mode: C::Mode) -> Rendered<C::Mode, C::Output> {
        Rendered {
            title: data.title(mode),
            mode,
            data: data.render(mode),
        }
    }
}
