use std::sync::Arc;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CHOCOLATE_PRIZE: &str = "CHOCOLATE BAR";
pub const JACKPOT_PRIZE: &str = "JACKPOT! MEGA PRIZE";
pub const DARE_PREFIX: &str = "DARE: ";

/// Prize categories, in weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeCategory {
    Chocolate,
    Jackpot,
    Dare,
}

impl PrizeCategory {
    pub const ALL: [PrizeCategory; 3] = [
        PrizeCategory::Chocolate,
        PrizeCategory::Jackpot,
        PrizeCategory::Dare,
    ];

    /// Classify a prize label produced by a [`PrizeTable`].
    pub fn of_label(label: &str) -> Option<Self> {
        match label {
            CHOCOLATE_PRIZE => Some(PrizeCategory::Chocolate),
            JACKPOT_PRIZE => Some(PrizeCategory::Jackpot),
            l if l.starts_with(DARE_PREFIX) => Some(PrizeCategory::Dare),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrizeError {
    #[error("invalid prize weights: {0}")]
    Weights(String),
    #[error("dare list is empty")]
    NoDares,
}

/// Built-in dare pool.
pub fn default_dares() -> Vec<String> {
    [
        "Do your best robot dance for 10 seconds",
        "High-five three strangers",
        "Sing the chorus of your favourite song",
        "Strike a superhero pose for a photo",
        "Speak like a pirate until your next game",
        "Do 10 jumping jacks right now",
        "Tell the operator your best joke",
        "Moonwalk back to the lobby",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Weighted prize distribution: chocolate, jackpot or a random dare.
#[derive(Debug, Clone)]
pub struct PrizeTable {
    weights: [u32; 3],
    index: WeightedIndex<u32>,
    dares: Vec<String>,
}

impl PrizeTable {
    pub fn new(
        chocolate_weight: u32,
        jackpot_weight: u32,
        dare_weight: u32,
        dares: Vec<String>,
    ) -> Result<Self, PrizeError> {
        let dares: Vec<String> = dares
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        if dares.is_empty() {
            return Err(PrizeError::NoDares);
        }
        let weights = [chocolate_weight, jackpot_weight, dare_weight];
        let index = WeightedIndex::new(weights).map_err(|e| PrizeError::Weights(e.to_string()))?;
        Ok(Self {
            weights,
            index,
            dares,
        })
    }

    pub fn weight(&self, category: PrizeCategory) -> u32 {
        self.weights[category as usize]
    }

    pub fn total_weight(&self) -> u32 {
        self.weights.iter().sum()
    }

    /// Configured probability of `category`, in `[0, 1]`.
    pub fn probability(&self, category: PrizeCategory) -> f64 {
        f64::from(self.weight(category)) / f64::from(self.total_weight())
    }

    pub fn dares(&self) -> &[String] {
        &self.dares
    }

    pub fn draw_category<R: Rng + ?Sized>(&self, rng: &mut R) -> PrizeCategory {
        PrizeCategory::ALL[self.index.sample(rng)]
    }

    /// `DARE: <text>` with a uniformly chosen dare.
    pub fn random_dare<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let dare = self.dares.choose(rng).map(String::as_str).unwrap_or_default();
        format!("{DARE_PREFIX}{dare}")
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.draw_category(rng) {
            PrizeCategory::Chocolate => CHOCOLATE_PRIZE.to_string(),
            PrizeCategory::Jackpot => JACKPOT_PRIZE.to_string(),
            PrizeCategory::Dare => self.random_dare(rng),
        }
    }
}

impl Default for PrizeTable {
    fn default() -> Self {
        let weights = [10, 5, 85];
        Self {
            weights,
            index: WeightedIndex::new(weights).expect("built-in prize weights are valid"),
            dares: default_dares(),
        }
    }
}

/// Prize-selection collaborator handed to a game: draws need no input.
#[derive(Debug, Clone)]
pub struct PrizeDraw {
    table: Arc<PrizeTable>,
    rng: StdRng,
}

impl PrizeDraw {
    pub fn new(table: Arc<PrizeTable>, seed: u64) -> Self {
        Self {
            table,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn draw(&mut self) -> String {
        self.table.draw(&mut self.rng)
    }

    pub fn dare(&mut self) -> String {
        self.table.random_dare(&mut self.rng)
    }

    pub fn table(&self) -> &PrizeTable {
        &self.table
    }
}
