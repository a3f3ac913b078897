//! Treatment advice per disease label.
//!
//! Static table; labels without an entry get a single fallback line.

use super::DiseaseLabel;

/// Returned for any label missing from the table.
pub const NO_PRECAUTIONS: &[&str] = &["No specific precautions available."];

const HEALTHY: &[&str] = &["No action needed. Plant is healthy!"];

const EARLY_BLIGHT: &[&str] = &[
    "Practice crop rotation and avoid planting potatoes in the same soil consecutively.",
    "Remove and dispose of plant debris properly.",
    "Apply fungicides during periods of high humidity.",
];

/// Table entry for `label`, if one exists.
///
/// Spider mites and yellow leaf curl have no entry yet.
fn table(label: DiseaseLabel) -> Option<&'static [&'static str]> {
    use DiseaseLabel::*;
    let steps: &'static [&'static str] = match label {
        PepperBellBacterialSpot => &[
            "Remove and destroy infected plants.",
            "Avoid overhead watering to reduce leaf moisture.",
            "Use copper-based bactericides as a preventive measure.",
        ],
        TomatoLeafMold => &[
            "Maintain good air circulation by spacing plants properly.",
            "Avoid excessive humidity by ensuring proper ventilation in greenhouses.",
            "Water plants at the base, not overhead, to reduce leaf wetness.",
        ],
        TomatoBacterialSpot => &[
            "Practice crop rotation to reduce bacterial populations.",
            "Avoid working in the garden when plants are wet.",
            "Use disease-free seeds and resistant plant varieties.",
        ],
        PotatoBacterialWilt => &[
            "Avoid planting in previously infected soils.",
            "Ensure proper drainage to prevent waterlogging.",
            "Sanitize tools and avoid damage to tubers during harvesting.",
        ],
        TomatoMosaicVirus => &[
            "Remove and destroy infected plants immediately.",
            "Disinfect tools and wash hands thoroughly after handling plants.",
            "Control insect vectors such as aphids and whiteflies.",
        ],
        CucumberMosaicVirus => &[
            "Use virus-free seeds and resistant varieties.",
            "Control aphids with insecticidal soaps or natural predators.",
            "Remove weeds that can host the virus.",
        ],
        TomatoLateBlight => &[
            "Avoid overhead watering and ensure good air circulation.",
            "Apply fungicides as a preventive measure.",
            "Remove and destroy infected leaves or plants.",
        ],
        PotatoEarlyBlight | TomatoEarlyBlight => EARLY_BLIGHT,
        TomatoSeptoriaLeafSpot => &[
            "Water at the base of the plant to keep foliage dry.",
            "Space plants properly to improve airflow.",
            "Remove and destroy infected leaves.",
        ],
        PotatoLateBlight => &[
            "Avoid overhead irrigation, especially in the evening, to keep leaves dry.",
            "Ensure proper spacing between plants for good airflow.",
            "Remove and destroy infected plants immediately.",
        ],
        TomatoTargetSpot => &[
            "Remove infected leaves. Improve air circulation.",
            "Avoid overhead watering. Water at the base.",
            "Use disease-resistant tomato varieties. Apply mulch.",
        ],
        TomatoHealthy | PepperBellHealthy => HEALTHY,
        TomatoSpiderMites | TomatoYellowLeafCurlVirus => return None,
    };
    Some(steps)
}

/// Ordered precautions for `label`, or [`NO_PRECAUTIONS`].
pub fn precautions(label: DiseaseLabel) -> &'static [&'static str] {
    table(label).unwrap_or(NO_PRECAUTIONS)
}
