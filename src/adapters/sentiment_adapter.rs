//! Sentiment source adapters.
//!
//! `FixedSentiment` returns a configured score. `RandomSentiment` stands in for
//! a real news/LLM-backed oracle and draws a uniform score in [-1, 1].

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::domain::error::MactraderError;
use crate::ports::sentiment_port::SentimentPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSentiment {
    score: f64,
}

impl FixedSentiment {
    pub fn new(score: f64) -> Result<Self, MactraderError> {
        if !(-1.0..=1.0).contains(&score) {
            return Err(MactraderError::config_invalid(
                "sentiment",
                "score",
                "score must be within [-1, 1]",
            ));
        }
        Ok(Self { score })
    }
}

impl SentimentPort for FixedSentiment {
    fn sentiment(&self, symbol: &str) -> Result<f64, MactraderError> {
        info!(symbol, score = self.score, "using fixed sentiment");
        Ok(self.score)
    }
}

pub struct RandomSentiment {
    rng: Mutex<StdRng>,
}

impl RandomSentiment {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SentimentPort for RandomSentiment {
    fn sentiment(&self, symbol: &str) -> Result<f64, MactraderError> {
        let mut rng = self.rng.lock().map_err(|_| MactraderError::Sentiment {
            reason: "random sentiment generator poisoned".into(),
        })?;
        let score = rng.gen_range(-1.0..=1.0);
        info!(symbol, score = %format!("{score:.2}"), "simulated sentiment score");
        Ok(score)
    }
}
