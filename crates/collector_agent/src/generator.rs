use async_trait::async_trait;
use chrono::Utc;
use common::domain::{DomainError, DomainResult, Reading};
use rand::Rng;

/// Source of meter readings for a customer
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReadingGenerator: Send + Sync {
    async fn generate(&self, customer_id: i32) -> Reading;
}

/// Readings drawn uniformly from `[min_value, max_value)`, stamped with the current time
#[derive(Debug, Clone)]
pub struct RandomReadingGenerator {
    min_value: f64,
    max_value: f64,
}

impl RandomReadingGenerator {
    pub fn new(min_value: f64, max_value: f64) -> DomainResult<Self> {
        if !(min_value.is_finite() && max_value.is_finite() && min_value < max_value) {
            return Err(DomainError::ValidationError(format!(
                "reading range [{}, {}) is empty or not finite",
                min_value, max_value
            )));
        }

        Ok(Self {
            min_value,
            max_value,
        })
    }
}

#[async_trait]
impl ReadingGenerator for RandomReadingGenerator {
    async fn generate(&self, customer_id: i32) -> Reading {
        let value = rand::thread_rng().gen_range(self.min_value..self.max_value);

        Reading {
            customer_id,
            value,
            timestamp: Utc::now(),
        }
    }
}
