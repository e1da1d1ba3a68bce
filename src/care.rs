use crate::models::Plant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareInfo {
    pub sunlight: &'static str,
    pub ph: &'static str,
    pub temperature: &'static str,
    pub ec: &'static str,
    pub fertilizer: &'static str,
}

const DEFAULT_CARE: CareInfo = CareInfo {
    sunlight: "N/A",
    ph: "N/A",
    temperature: "N/A",
    ec: "N/A",
    fertilizer: "N/A - Check specific plant needs",
};

fn care_by_name(name: &str) -> Option<CareInfo> {
    let info = match name {
        "Lettuce" => CareInfo {
            sunlight: "6-8 hours",
            ph: "6.0-7.0",
            temperature: "15-20°C",
            ec: "1.2-1.8 mS/cm",
            fertilizer: "Balanced NPK, high Nitrogen",
        },
        "Tomato" => CareInfo {
            sunlight: "8+ hours",
            ph: "5.5-6.5",
            temperature: "20-25°C",
            ec: "2.0-3.5 mS/cm",
            fertilizer: "High Potassium during fruiting",
        },
        "Basil" => CareInfo {
            sunlight: "6-8 hours",
            ph: "5.5-6.5",
            temperature: "20-30°C",
            ec: "1.0-1.6 mS/cm",
            fertilizer: "Balanced NPK",
        },
        "Strawberry" => CareInfo {
            sunlight: "6-10 hours",
            ph: "5.5-6.5",
            temperature: "15-25°C",
            ec: "1.4-2.2 mS/cm",
            fertilizer: "High Potassium and Phosphorus",
        },
        "Spinach" => CareInfo {
            sunlight: "4-6 hours (can tolerate partial shade)",
            ph: "6.0-7.5",
            temperature: "10-20°C",
            ec: "1.8-2.3 mS/cm",
            fertilizer: "High Nitrogen",
        },
        _ => return None,
    };
    Some(info)
}

/// Care guidance for a plant, keyed on the first word of its name
/// ("Tomato Cherry" uses the Tomato sheet). There are no per-type sheets,
/// so anything else gets the default.
pub fn care_info(plant: &Plant) -> CareInfo {
    let first_word = plant.name.split(' ').next().unwrap_or_default();
    care_by_name(first_word).unwrap_or(DEFAULT_CARE)
}
