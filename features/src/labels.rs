use common::FALLBACK_CLASS;

/// Maps symbolic or numeric labels to integer class codes.
///
/// The i-th known class gets code `i + 1`. Any label that matches none of
/// the known classes maps to [`FALLBACK_CLASS`] instead of failing the load,
/// so a dataset with stray labels can still be trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    classes: Vec<String>,
    fallback: String,
}

impl LabelMap {
    /// Create a new label map
    ///
    /// # Arguments:
    /// classes: The known class names, in code order
    /// fallback: Display name of the category unknown labels fall into
    pub fn new<S: Into<String>>(classes: Vec<String>, fallback: S) -> Self {
        Self {
            classes,
            fallback: fallback.into(),
        }
    }

    /// The code of a known label, matching by name first and by numeric value second
    pub fn code(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        if let Some(i) = self.classes.iter().position(|c| c == label) {
            return Some(i + 1);
        }
        let value: f64 = label.parse().ok()?;
        self.classes
            .iter()
            .position(|c| c.parse::<f64>().map(|c| c == value).unwrap_or(false))
            .map(|i| i + 1)
    }

    /// The code of a label, or the fallback code if it is not known
    #[inline(always)]
    pub fn code_or_fallback(&self, label: &str) -> usize {
        self.code(label).unwrap_or(FALLBACK_CLASS)
    }

    /// The display name of a class code
    pub fn name(&self, code: usize) -> &str {
        match code {
            FALLBACK_CLASS => &self.fallback,
            c => self.classes.get(c - 1).map(|s| s.as_str()).unwrap_or(&self.fallback),
        }
    }

    /// Number of known classes, excluding the fallback
    #[inline(always)]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Codes of all known classes, excluding the fallback
    #[inline(always)]
    pub fn codes(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.classes.len()
    }
}
