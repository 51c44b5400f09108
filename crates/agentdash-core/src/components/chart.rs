//! Bounded metric series for the CPU and memory charts.

use std::collections::VecDeque;

use strum::{Display, EnumIter};

use crate::config::DEFAULT_CHART_WINDOW;
use crate::model::{MetricSample, local_time_label};

/// Identifies one chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SeriesId {
    #[strum(to_string = "CPU Usage")]
    Cpu,
    #[strum(to_string = "Memory Usage")]
    Memory,
}

impl SeriesId {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Cpu => "%",
            Self::Memory => "MB",
        }
    }
}

/// A FIFO window of the most recent samples.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    id: SeriesId,
    samples: VecDeque<MetricSample>,
    window: usize,
}

impl MetricSeries {
    pub fn new(id: SeriesId, window: usize) -> Self {
        let window = window.max(1);
        Self {
            id,
            samples: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    pub fn push(&mut self, value: f64, timestamp: Option<String>) {
        self.samples.push_back(MetricSample {
            label: timestamp.unwrap_or_else(local_time_label),
            value,
        });
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
    }

    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Plot points with x = position in the window.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, s.value))
            .collect()
    }

    /// Y axis range starting at zero, with headroom above the peak.
    pub fn y_bounds(&self) -> [f64; 2] {
        let peak = self
            .samples
            .iter()
            .map(|s| s.value)
            .fold(0.0_f64, f64::max);
        if peak <= 0.0 {
            [0.0, 1.0]
        } else {
            [0.0, peak * 1.1]
        }
    }
}

/// The two independent dashboard series.
#[derive(Debug, Clone)]
pub struct MetricsChart {
    cpu: MetricSeries,
    memory: MetricSeries,
}

impl MetricsChart {
    pub fn new(window: usize) -> Self {
        Self {
            cpu: MetricSeries::new(SeriesId::Cpu, window),
            memory: MetricSeries::new(SeriesId::Memory, window),
        }
    }

    /// Append a sample to one series. `None` labels it with local time.
    pub fn push_sample(&mut self, series: SeriesId, value: f64, timestamp: Option<String>) {
        self.series_mut(series).push(value, timestamp);
    }

    pub fn series(&self, id: SeriesId) -> &MetricSeries {
        match id {
            SeriesId::Cpu => &self.cpu,
            SeriesId::Memory => &self.memory,
        }
    }

    fn series_mut(&mut self, id: SeriesId) -> &mut MetricSeries {
        match id {
            SeriesId::Cpu => &mut self.cpu,
            SeriesId::Memory => &mut self.memory,
        }
    }
}

impl Default for MetricsChart {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_WINDOW)
    }
}
