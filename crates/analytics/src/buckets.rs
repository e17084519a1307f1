use crate::error::AnalyticsError;
use rust_decimal::Decimal;

/// Entry-price buckets defined by ascending lower edges.
///
/// Bucket `i` covers `[edges[i], edges[i + 1])`; the last bucket is open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBuckets {
    edges: Vec<Decimal>,
}

impl PriceBuckets {
    pub fn new(edges: Vec<Decimal>) -> Result<Self, AnalyticsError> {
        if edges.is_empty() {
            return Err(AnalyticsError::InvalidBuckets("no edges given".to_string()));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::InvalidBuckets(format!(
                "edges must be strictly ascending, got {edges:?}"
            )));
        }
        if edges[0].is_sign_negative() && !edges[0].is_zero() {
            return Err(AnalyticsError::InvalidBuckets(format!(
                "first edge must not be negative, got {}",
                edges[0]
            )));
        }
        Ok(Self { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Index of the bucket holding `price`, or `None` below the first edge.
    pub fn index_of(&self, price: Decimal) -> Option<usize> {
        self.edges.iter().rposition(|edge| price >= *edge)
    }

    /// Inclusive lower and exclusive upper bound of bucket `index`.
    pub fn bounds(&self, index: usize) -> (Decimal, Option<Decimal>) {
        (self.edges[index], self.edges.get(index + 1).copied())
    }

    /// Display label such as `$1-3` or `$10+`.
    pub fn label(&self, index: usize) -> String {
        match self.bounds(index) {
            (lower, Some(upper)) => format!("${}-{}", lower.normalize(), upper.normalize()),
            (lower, None) => format!("${}+", lower.normalize()),
        }
    }
}
