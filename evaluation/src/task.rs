use common::ProblemType;
use features::LabelMap;
use lin_reg::CostFunction;

/// What is being learned from the targets of a `FeatureSet`
#[derive(Debug, Clone)]
pub enum Task {
    /// Targets are the continuous response
    Regression,
    /// Targets are class codes, a row is positive iff its code is `positive_class`
    Binary {
        labels: LabelMap,
        positive_class: usize,
    },
    /// Targets are class codes, one classifier per known class
    Multiclass { labels: LabelMap },
}

impl Task {
    pub fn problem_type(&self) -> ProblemType {
        match self {
            Task::Regression => ProblemType::Regression,
            Task::Binary { .. } => ProblemType::BinaryClassification,
            Task::Multiclass { .. } => ProblemType::MulticlassClassification,
        }
    }

    #[inline(always)]
    pub fn cost_fn(&self) -> CostFunction {
        CostFunction::for_hypothesis(self.problem_type().hypothesis())
    }

    /// The label map of classification tasks
    pub fn labels(&self) -> Option<&LabelMap> {
        match self {
            Task::Regression => None,
            Task::Binary { labels, .. } | Task::Multiclass { labels } => Some(labels),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Task::Regression => "regression",
            Task::Binary { .. } => "binary",
            Task::Multiclass { .. } => "multiclass",
        }
    }
}
