//! Plain-text report of an analysis.

use std::fmt;

use super::bootstrap::BootstrapCi;
use super::types::{AnovaResult, Effect, EffectEntry};

/// Renders an [`AnovaResult`], optionally with bootstrap half-widths and
/// parameter names.
///
/// # Example
///
/// ```
/// use iffd::IffdBuilder;
/// use iffd::anova::{analyze, AnalysisReport};
///
/// let design = IffdBuilder::new()
///     .parameter(0.0, 1.0)
///     .parameter(0.0, 1.0)
///     .replicates(10)
///     .order(12)
///     .zero_replicates(2)
///     .build()
///     .unwrap();
/// let y: Vec<f64> = design.samples().rows().into_iter().map(|x| x[0] * x[1]).collect();
/// let result = analyze(&y, design.levels()).unwrap();
///
/// let text = AnalysisReport::new(&result).with_names(["slope", "roughness"]).to_string();
/// assert!(text.contains("Parameter slope:"));
/// assert!(text.contains("Parameters slope & roughness:"));
/// assert!(text.contains("R2-2:"));
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisReport<'a> {
    result: &'a AnovaResult,
    ci: Option<&'a BootstrapCi>,
    names: Vec<String>,
}

impl<'a> AnalysisReport<'a> {
    /// Report on `result` with numeric parameter labels.
    #[must_use]
    pub fn new(result: &'a AnovaResult) -> Self {
        Self {
            result,
            ci: None,
            names: Vec::new(),
        }
    }

    /// Print `± half-width` next to each F.
    #[must_use]
    pub fn with_ci(mut self, ci: &'a BootstrapCi) -> Self {
        self.ci = Some(ci);
        self
    }

    /// Label parameters by name; parameters without a name keep their index.
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    fn label(&self, param: usize) -> String {
        self.names
            .get(param)
            .cloned()
            .unwrap_or_else(|| param.to_string())
    }

    fn write_entry(&self, f: &mut fmt::Formatter<'_>, entry: &EffectEntry) -> fmt::Result {
        match entry.effect {
            Effect::Main(i) => write!(f, "  Parameter {}: ", self.label(i))?,
            Effect::Interaction(i, j) => {
                write!(f, "  Parameters {} & {}: ", self.label(i), self.label(j))?;
            }
        }

        let Some(value) = entry.f_ratio else {
            let reason = entry.degeneracy.map(|d| d.to_string()).unwrap_or_default();
            write!(f, "F undefined ({reason})")?;
            return write_empty_cells(f, entry);
        };

        write!(f, "F = {value:.4}")?;
        if let Some(ci) = self.ci {
            let index = entry.effect.flat_index(self.result.nparam);
            match ci.half_widths.get(index) {
                Some(h) if h.is_finite() => write!(f, " ± {h:.4}")?,
                _ => write!(f, " ± n/a")?,
            }
        }
        if let Some(p) = entry.p_value {
            write!(f, " (p = {p:.3e})")?;
        }
        write_empty_cells(f, entry)
    }
}

fn write_empty_cells(f: &mut fmt::Formatter<'_>, entry: &EffectEntry) -> fmt::Result {
    if entry.empty_cells > 0 {
        write!(f, " [{} empty cells]", entry.empty_cells)?;
    }
    writeln!(f)
}

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Main Effects")?;
        for entry in self.result.main_effects() {
            self.write_entry(f, entry)?;
        }

        if !self.result.interactions().is_empty() {
            writeln!(f, "Interaction Effects")?;
            for entry in self.result.interactions() {
                self.write_entry(f, entry)?;
            }
        }

        writeln!(f, "R2-1: {:.4}", self.result.r2_main)?;
        writeln!(f, "R2-2: {:.4}", self.result.r2_total)?;
        writeln!(
            f,
            "Note: R2 values add per-effect variance shares over a non-orthogonal design; \
             they approximate explained variance and are not a partition of it."
        )
    }
}
