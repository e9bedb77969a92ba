use tracing::debug;

use crate::model::{BoundingBox, TextFragment};

/// Geometry thresholds for turning fragments into reading-order lines. All
/// values are in normalized page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructConfig {
    pub min_line_threshold: f64,
    pub line_height_factor: f64,
    pub min_column_lines: usize,
    pub column_gap_threshold: f64,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            min_line_threshold: 0.012,
            line_height_factor: 0.6,
            min_column_lines: 6,
            column_gap_threshold: 0.15,
        }
    }
}

#[derive(Debug, Clone)]
struct ReconstructedLine {
    text: String,
    bounds: BoundingBox,
}

impl ReconstructedLine {
    fn mid_y(&self) -> f64 {
        self.bounds.mid_y()
    }

    fn min_x(&self) -> f64 {
        self.bounds.min_x()
    }
}

#[derive(Debug)]
struct LineCluster<'a> {
    members: Vec<&'a TextFragment>,
    bounds: BoundingBox,
    mid_y_sum: f64,
}

impl<'a> LineCluster<'a> {
    fn start(fragment: &'a TextFragment) -> Self {
        Self {
            members: vec![fragment],
            bounds: fragment.bounding_box,
            mid_y_sum: fragment.bounding_box.mid_y(),
        }
    }

    fn running_mid_y(&self) -> f64 {
        self.mid_y_sum / self.members.len() as f64
    }

    fn accepts(&self, fragment: &TextFragment, config: &ReconstructConfig) -> bool {
        let threshold = config
            .min_line_threshold
            .max(self.bounds.height * config.line_height_factor);
        (fragment.bounding_box.mid_y() - self.running_mid_y()).abs() <= threshold
    }

    fn push(&mut self, fragment: &'a TextFragment) {
        self.bounds = self.bounds.union(&fragment.bounding_box);
        self.mid_y_sum += fragment.bounding_box.mid_y();
        self.members.push(fragment);
    }

    fn finish(mut self) -> ReconstructedLine {
        self.members
            .sort_by(|a, b| a.bounding_box.min_x().total_cmp(&b.bounding_box.min_x()));
        let text = self
            .members
            .iter()
            .map(|fragment| fragment.text.trim())
            .collect::<Vec<&str>>()
            .join(" ");
        ReconstructedLine {
            text,
            bounds: self.bounds,
        }
    }
}

/// Orders unordered OCR fragments into natural reading order, handling
/// single-column lists and two-column vocabulary pages.
pub fn reconstruct_lines(fragments: &[TextFragment], config: &ReconstructConfig) -> Vec<String> {
    let lines = cluster_lines(fragments, config);
    let split = detect_column_split(&lines, config);
    debug!(
        fragments = fragments.len(),
        lines = lines.len(),
        column_split = ?split,
        "reconstructed fragment lines"
    );

    order_lines(lines, split)
        .into_iter()
        .map(|line| line.text)
        .collect()
}

/// Joins reconstructed lines into the text block handed to the normalizer.
pub fn reconstruct_text(fragments: &[TextFragment], config: &ReconstructConfig) -> String {
    reconstruct_lines(fragments, config).join("\n")
}

fn cluster_lines(fragments: &[TextFragment], config: &ReconstructConfig) -> Vec<ReconstructedLine> {
    let mut sorted = fragments
        .iter()
        .filter(|fragment| !fragment.text.trim().is_empty())
        .collect::<Vec<&TextFragment>>();
    sorted.sort_by(|a, b| b.bounding_box.mid_y().total_cmp(&a.bounding_box.mid_y()));

    let mut lines = Vec::new();
    let mut current: Option<LineCluster> = None;

    for fragment in sorted {
        if let Some(cluster) = current.as_mut() {
            if cluster.accepts(fragment, config) {
                cluster.push(fragment);
                continue;
            }
        }

        if let Some(cluster) = current.take() {
            lines.push(cluster.finish());
        }
        current = Some(LineCluster::start(fragment));
    }

    if let Some(cluster) = current {
        lines.push(cluster.finish());
    }

    lines
}

fn detect_column_split(lines: &[ReconstructedLine], config: &ReconstructConfig) -> Option<f64> {
    if lines.len() < config.min_column_lines {
        return None;
    }

    let mut min_xs = lines.iter().map(ReconstructedLine::min_x).collect::<Vec<f64>>();
    min_xs.sort_by(f64::total_cmp);

    let (gap, upper) = min_xs
        .windows(2)
        .map(|pair| (pair[1] - pair[0], pair[1]))
        .fold((0.0_f64, None), |best, (gap, upper)| {
            if gap > best.0 {
                (gap, Some(upper))
            } else {
                best
            }
        });

    if gap > config.column_gap_threshold {
        upper
    } else {
        None
    }
}

fn order_lines(lines: Vec<ReconstructedLine>, split: Option<f64>) -> Vec<ReconstructedLine> {
    fn top_to_bottom(lines: &mut [ReconstructedLine]) {
        lines.sort_by(|a, b| b.mid_y().total_cmp(&a.mid_y()));
    }

    let Some(split) = split else {
        let mut lines = lines;
        top_to_bottom(&mut lines);
        return lines;
    };

    let (mut left, mut right): (Vec<ReconstructedLine>, Vec<ReconstructedLine>) =
        lines.into_iter().partition(|line| line.min_x() < split);
    top_to_bottom(&mut left);
    top_to_bottom(&mut right);
    left.extend(right);
    left
}
