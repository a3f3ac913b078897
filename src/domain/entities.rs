//! Domain entities. Pure data structures for the core business.
//!
//! No database, model, or image types here; adapters map into these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the square input the classifier expects.
pub const IMAGE_SIZE: usize = 64;
/// Colour channels per pixel.
pub const CHANNELS: usize = 3;
/// Number of classifier outputs.
pub const NUM_CLASSES: usize = 16;

/// A registered user as stored by the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// PHC-formatted PBKDF2 hash. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Registration form as submitted by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Classification categories. Discriminants are the model's output indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseLabel {
    #[serde(rename = "Pepper_bell_Bacterial_spot")]
    PepperBellBacterialSpot = 0,
    #[serde(rename = "Pepperbell_healthy")]
    PepperBellHealthy = 1,
    #[serde(rename = "Potato_Early_blight")]
    PotatoEarlyBlight = 2,
    #[serde(rename = "Potato_Bacterial_wilt")]
    PotatoBacterialWilt = 3,
    #[serde(rename = "Cucumber_mosaic_virus")]
    CucumberMosaicVirus = 4,
    #[serde(rename = "Potato__Late_blight")]
    PotatoLateBlight = 5,
    #[serde(rename = "Tomato_Bacterial_spot")]
    TomatoBacterialSpot = 6,
    #[serde(rename = "Tomato_Early_blight")]
    TomatoEarlyBlight = 7,
    #[serde(rename = "Tomato_healthy")]
    TomatoHealthy = 8,
    #[serde(rename = "Tomato_Late_blight")]
    TomatoLateBlight = 9,
    #[serde(rename = "Tomato_Leaf_Mold")]
    TomatoLeafMold = 10,
    #[serde(rename = "Tomato_Septoria_leaf_spot")]
    TomatoSeptoriaLeafSpot = 11,
    #[serde(rename = "Tomato_Spider_mites_Two_spotted_spider_mite")]
    TomatoSpiderMites = 12,
    #[serde(rename = "Tomato_Target_Spot")]
    TomatoTargetSpot = 13,
    #[serde(rename = "Tomato_mosaic_virus")]
    TomatoMosaicVirus = 14,
    #[serde(rename = "Tomato_YellowLeaf_Curl_Virus")]
    TomatoYellowLeafCurlVirus = 15,
}

impl DiseaseLabel {
    /// Output index -> label. Position in this table is the model's output index;
    /// reordering it silently mislabels every prediction.
    pub const ALL: [DiseaseLabel; NUM_CLASSES] = [
        DiseaseLabel::PepperBellBacterialSpot,
        DiseaseLabel::PepperBellHealthy,
        DiseaseLabel::PotatoEarlyBlight,
        DiseaseLabel::PotatoBacterialWilt,
        DiseaseLabel::CucumberMosaicVirus,
        DiseaseLabel::PotatoLateBlight,
        DiseaseLabel::TomatoBacterialSpot,
        DiseaseLabel::TomatoEarlyBlight,
        DiseaseLabel::TomatoHealthy,
        DiseaseLabel::TomatoLateBlight,
        DiseaseLabel::TomatoLeafMold,
        DiseaseLabel::TomatoSeptoriaLeafSpot,
        DiseaseLabel::TomatoSpiderMites,
        DiseaseLabel::TomatoTargetSpot,
        DiseaseLabel::TomatoMosaicVirus,
        DiseaseLabel::TomatoYellowLeafCurlVirus,
    ];

    /// Label for a model output index. `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Model output index for this label.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Dataset identifier, e.g. `Tomato_healthy`.
    pub fn as_str(self) -> &'static str {
        match self {
            DiseaseLabel::PepperBellBacterialSpot => "Pepper_bell_Bacterial_spot",
            DiseaseLabel::PepperBellHealthy => "Pepperbell_healthy",
            DiseaseLabel::PotatoEarlyBlight => "Potato_Early_blight",
            DiseaseLabel::PotatoBacterialWilt => "Potato_Bacterial_wilt",
            DiseaseLabel::CucumberMosaicVirus => "Cucumber_mosaic_virus",
            DiseaseLabel::PotatoLateBlight => "Potato__Late_blight",
            DiseaseLabel::TomatoBacterialSpot => "Tomato_Bacterial_spot",
            DiseaseLabel::TomatoEarlyBlight => "Tomato_Early_blight",
            DiseaseLabel::TomatoHealthy => "Tomato_healthy",
            DiseaseLabel::TomatoLateBlight => "Tomato_Late_blight",
            DiseaseLabel::TomatoLeafMold => "Tomato_Leaf_Mold",
            DiseaseLabel::TomatoSeptoriaLeafSpot => "Tomato_Septoria_leaf_spot",
            DiseaseLabel::TomatoSpiderMites => "Tomato_Spider_mites_Two_spotted_spider_mite",
            DiseaseLabel::TomatoTargetSpot => "Tomato_Target_Spot",
            DiseaseLabel::TomatoMosaicVirus => "Tomato_mosaic_virus",
            DiseaseLabel::TomatoYellowLeafCurlVirus => "Tomato_YellowLeaf_Curl_Virus",
        }
    }
}

impl fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiseaseLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown disease label: {s}"))
    }
}

/// Preprocessed leaf image: 64x64x3, height-major then width then channel,
/// each value in [0.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    /// Number of values in one image.
    pub const LEN: usize = IMAGE_SIZE * IMAGE_SIZE * CHANNELS;

    /// Wrap raw HWC values. Returns `None` unless exactly `LEN` values are given.
    pub fn from_hwc(data: Vec<f32>) -> Option<Self> {
        (data.len() == Self::LEN).then_some(Self { data })
    }

    /// Value at row `y`, column `x`, channel `c`. `None` outside the image.
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= IMAGE_SIZE || x >= IMAGE_SIZE || c >= CHANNELS {
            return None;
        }
        self.data.get((y * IMAGE_SIZE + x) * CHANNELS + c).copied()
    }

    pub fn as_hwc(&self) -> &[f32] {
        &self.data
    }

    /// Re-lay the values channel-major (CHW), as convolution backends expect.
    pub fn to_chw(&self) -> Vec<f32> {
        let plane = IMAGE_SIZE * IMAGE_SIZE;
        let mut out = vec![0.0f32; Self::LEN];
        for (i, px) in self.data.chunks_exact(CHANNELS).enumerate() {
            for (c, v) in px.iter().enumerate() {
                out[c * plane + i] = *v;
            }
        }
        out
    }
}

/// Classifier output for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: DiseaseLabel,
    /// Probability of `label`.
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Argmax over a probability vector. Ties resolve to the lowest index.
    /// Returns `None` unless the vector has exactly `NUM_CLASSES` entries.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Option<Self> {
        if probabilities.len() != NUM_CLASSES {
            return None;
        }
        let mut best = 0usize;
        for (i, p) in probabilities.iter().enumerate().skip(1) {
            if *p > probabilities[best] {
                best = i;
            }
        }
        let label = DiseaseLabel::from_index(best)?;
        Some(Self {
            label,
            confidence: probabilities[best],
            probabilities,
        })
    }
}

/// What the authenticated screen shows after an upload.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub prediction: Prediction,
    pub precautions: Vec<String>,
    /// Width and height of the uploaded image before resizing.
    pub original_dimensions: (u32, u32),
}
