//! Isobaric label channels

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const CHANNELS: [&str; 18] = [
    "126", "127N", "127C", "128N", "128C", "129N", "129C", "130N", "130C", "131N", "131C", "132N",
    "132C", "133N", "133C", "134N", "134C", "135N",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Isobaric {
    Tmt10,
    Tmt11,
    Tmt16,
    Tmt18,
}

impl Isobaric {
    pub fn channels(&self) -> usize {
        match self {
            Isobaric::Tmt10 => 10,
            Isobaric::Tmt11 => 11,
            Isobaric::Tmt16 => 16,
            Isobaric::Tmt18 => 18,
        }
    }

    /// Reporter ion names, in channel order
    pub fn headers(&self) -> &'static [&'static str] {
        &CHANNELS[..self.channels()]
    }
}

impl FromStr for Isobaric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10" => Ok(Isobaric::Tmt10),
            "11" => Ok(Isobaric::Tmt11),
            "16" => Ok(Isobaric::Tmt16),
            "18" => Ok(Isobaric::Tmt18),
            other => Err(Error::UnsupportedPlex(other.into())),
        }
    }
}

/// Reporter ion intensities of one protein, in channel order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub Vec<f64>);

impl Labels {
    /// Channels beyond what was quantified read as zero
    pub fn intensity(&self, channel: usize) -> f64 {
        self.0.get(channel).copied().unwrap_or(0.0)
    }
}
