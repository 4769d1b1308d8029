//! Read-time aggregation of per-answer ratings into an interview-level score.

use serde::Serialize;

use crate::feedback::RatingMap;
use crate::llm_client::Provider;

/// Average for one provider across every answer in an interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderAverage {
    /// Rounded to one decimal place.
    pub average: f64,
    /// How many answers carried a numeric rating from this provider.
    pub rated_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallRating {
    pub answer_count: usize,
    pub gemini: ProviderAverage,
    pub cohere: ProviderAverage,
}

/// Per-provider arithmetic mean over ALL answers.
///
/// Non-numeric and missing ratings contribute 0 but still count in the denominator,
/// so unavailable feedback lowers the average.
pub fn overall_rating(ratings: &[RatingMap]) -> OverallRating {
    OverallRating {
        answer_count: ratings.len(),
        gemini: provider_average(ratings, Provider::Gemini),
        cohere: provider_average(ratings, Provider::Cohere),
    }
}

fn provider_average(ratings: &[RatingMap], provider: Provider) -> ProviderAverage {
    if ratings.is_empty() {
        return ProviderAverage {
            average: 0.0,
            rated_count: 0,
        };
    }

    let numeric: Vec<f64> = ratings
        .iter()
        .filter_map(|r| r.get(provider).and_then(|rating| rating.as_number()))
        .collect();
    let total: f64 = numeric.iter().sum();

    ProviderAverage {
        average: round_one_decimal(total / ratings.len() as f64),
        rated_count: numeric.len(),
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
