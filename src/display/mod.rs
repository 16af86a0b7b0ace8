use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;
use num_traits::{Float, FromPrimitive, ToPrimitive};

use crate::hypothesis::TL2TestResult;
use crate::resample::Enumeration;

impl<F> TL2TestResult<F>
where
    F: Float + Display + ToPrimitive + FromPrimitive,
{
    /// Renders the result as a terminal table.
    pub fn display(&self) -> String {
        let c = |x: f64| F::from_f64(x).expect("Failed to convert constant to F");

        let p_0001 = c(0.0001);
        let p_05 = c(0.05);
        let p_10 = c(0.10);
        let stat_999 = c(999.0);

        let p_display = if self.p_value < p_0001 {
            "< 0.0001".to_string()
        } else {
            format!("{:.4}", self.p_value)
        };

        let stat_display = if self.observed_statistic > stat_999 {
            format!("{:.1e}", self.observed_statistic.to_f64().unwrap_or(0.0))
        } else {
            format!("{:.4}", self.observed_statistic)
        };

        let p_interpretation = if self.p_value < p_05 {
            "🔴 Reject exchangeability"
        } else if self.p_value < p_10 {
            "🟠 Weak evidence against exchangeability"
        } else {
            "🟢 Cannot reject exchangeability"
        };

        let assignments_display = match self.enumeration {
            Enumeration::Exact => format!("{} (exact enumeration)", self.n_assignments),
            Enumeration::Sampled => format!("{} (randomly sampled)", self.n_assignments),
        };

        let mut title_table = Table::new();
        title_table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .add_row(vec![
                Cell::new("Two-Sample Permutation Test for Functional Data")
                    .set_alignment(CellAlignment::Center),
            ]);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Metric").set_alignment(CellAlignment::Center),
                Cell::new("Value").set_alignment(CellAlignment::Center),
                Cell::new("Interpretation").set_alignment(CellAlignment::Center),
            ]);

        table
            .add_row(vec![
                Cell::new("Data").set_alignment(CellAlignment::Left),
                Cell::new(&self.data_name).set_alignment(CellAlignment::Right),
                Cell::new("").set_alignment(CellAlignment::Left),
            ])
            .add_row(vec![
                Cell::new("p-value").set_alignment(CellAlignment::Left),
                Cell::new(&p_display).set_alignment(CellAlignment::Right),
                Cell::new(p_interpretation).set_alignment(CellAlignment::Left),
            ])
            .add_row(vec![
                Cell::new(format!("Statistic {}", self.statistic.name()))
                    .set_alignment(CellAlignment::Left),
                Cell::new(&stat_display).set_alignment(CellAlignment::Right),
                Cell::new("pointwise studentized L2 distance").set_alignment(CellAlignment::Left),
            ])
            .add_row(vec![
                Cell::new("Alternative").set_alignment(CellAlignment::Left),
                Cell::new(self.alternative).set_alignment(CellAlignment::Right),
                Cell::new("").set_alignment(CellAlignment::Left),
            ])
            .add_row(vec![
                Cell::new("Assignments").set_alignment(CellAlignment::Left),
                Cell::new(&assignments_display).set_alignment(CellAlignment::Right),
                Cell::new("").set_alignment(CellAlignment::Left),
            ]);

        format!("{}\n{}", title_table, table)
    }
}

impl<F> Display for TL2TestResult<F>
where
    F: Float + Display + ToPrimitive + FromPrimitive,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use crate::{FdSample, TL2Test};

    #[test]
    fn rendering_mentions_the_key_fields() {
        let grid: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let sample1 = FdSample::from_curves(
            grid.clone(),
            &[
                (0..8).map(|i| i as f64 * 0.1).collect(),
                (0..8).map(|i| i as f64 * 0.2 + 0.3).collect(),
                (0..8).map(|i| i as f64 * 0.15 - 0.1).collect(),
            ],
        );
        let sample2 = FdSample::from_curves(
            grid,
            &[
                (0..8).map(|i| i as f64 * 0.12 + 0.05).collect(),
                (0..8).map(|i| i as f64 * 0.18).collect(),
                (0..8).map(|i| i as f64 * 0.1 + 0.2).collect(),
            ],
        );
        let result = TL2Test::exhaustive().compute(&sample1, &sample2).unwrap();
        let rendered = result.to_string();
        assert!(rendered.contains("Statistic T"));
        assert!(rendered.contains("p-value"));
        assert!(rendered.contains("exact enumeration"));
        assert!(rendered.contains("sample1 and sample2"));
    }
}
