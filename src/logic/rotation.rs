use crate::models::{CropFamily, Nutrient, SoilHealth};

/// Crop name to family, in lookup (and example) order.
const CROP_FAMILIES: &[(&str, CropFamily)] = &[
    ("Corn", CropFamily::Grass),
    ("Rice", CropFamily::Grass),
    ("Wheat", CropFamily::Grass),
    ("Soybean", CropFamily::Legume),
    ("Chickpea", CropFamily::Legume),
    ("Cotton", CropFamily::Mallow),
    ("Potato", CropFamily::Nightshade),
    ("Tomato", CropFamily::Nightshade),
    ("Carrot", CropFamily::Umbellifer),
    ("Cabbage", CropFamily::Brassica),
    ("Sunflower", CropFamily::Aster),
];

/// `COMPATIBILITY[previous][next]`: 1 compatible, 0 neutral, -1 avoid.
/// Rows and columns follow `CropFamily` declaration order.
const COMPATIBILITY: [[i8; 7]; 7] = [
    // Grass Legume Nightshade Brassica Umbellifer Mallow Aster
    [-1, 1, 0, 1, 0, 0, 0],  // Grass
    [1, -1, 1, 0, 0, 0, 0],  // Legume
    [0, 1, -1, 0, 0, 0, 0],  // Nightshade
    [1, 0, 0, -1, 0, 0, 0],  // Brassica
    [0, 0, 0, 0, -1, 0, 0],  // Umbellifer
    [0, 0, 0, 0, 0, -1, 0],  // Mallow
    [0, 0, 0, 0, 0, 0, -1],  // Aster
];

const MAX_EXAMPLES: usize = 3;

/// Plans multi-year crop family sequences from a fixed compatibility matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationPlanner;

impl RotationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive crop lookup.
    pub fn family_of(&self, crop: &str) -> Option<CropFamily> {
        let crop = crop.trim();
        CROP_FAMILIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(crop))
            .map(|(_, family)| *family)
    }

    pub fn compatibility(&self, previous: CropFamily, next: CropFamily) -> i8 {
        COMPATIBILITY[previous.index()][next.index()]
    }

    /// Net effect of a family on one soil nutrient.
    pub fn nutrient_impact(&self, family: CropFamily, nutrient: Nutrient) -> i8 {
        let (n, p, k) = match family {
            CropFamily::Grass => (-2, -1, -1),
            CropFamily::Legume => (2, -1, -1),
            CropFamily::Nightshade => (-2, -2, -2),
            CropFamily::Brassica => (-2, -1, -1),
            CropFamily::Umbellifer => (-1, -1, -1),
            CropFamily::Mallow => (-2, -1, -1),
            CropFamily::Aster => (-1, -1, -1),
        };
        match nutrient {
            Nutrient::N => n,
            Nutrient::P => p,
            Nutrient::K => k,
        }
    }

    /// Families to plant over the next `years`, not including the current one.
    ///
    /// Empty for an unknown crop. Each step picks the first family with the
    /// highest score among those different from the previous step.
    pub fn suggest_rotation(
        &self,
        crop: &str,
        soil_health: Option<&SoilHealth>,
        years: usize,
    ) -> Vec<CropFamily> {
        let Some(mut previous) = self.family_of(crop) else {
            tracing::warn!(crop, "Unknown crop, cannot suggest rotation");
            return Vec::new();
        };

        let mut plan = Vec::new();
        for _ in 0..years {
            let mut best: Option<(CropFamily, f64)> = None;
            for &candidate in CropFamily::all() {
                if candidate == previous {
                    continue;
                }
                let score = self.score(previous, candidate, soil_health);
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((candidate, score));
                }
            }
            // At least six candidates always remain
            let Some((next, _)) = best else { break };
            plan.push(next);
            previous = next;
        }

        tracing::debug!(crop, years, plan = ?plan, "Rotation planned");
        plan
    }

    fn score(&self, previous: CropFamily, candidate: CropFamily, soil: Option<&SoilHealth>) -> f64 {
        let mut score = f64::from(self.compatibility(previous, candidate));
        if let Some(soil) = soil {
            for (nutrient, level) in soil.levels() {
                let impact = self.nutrient_impact(candidate, nutrient);
                if level < 0 && impact > 0 {
                    score += 1.0;
                } else if level > 0 && impact < 0 {
                    score += 0.5;
                }
            }
        }
        score
    }

    pub fn crop_examples(&self, family: CropFamily) -> Vec<&'static str> {
        CROP_FAMILIES
            .iter()
            .filter(|(_, f)| *f == family)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Human-readable plan with example crops and benefits per year.
    pub fn format_rotation_plan(&self, crop: &str, plan: &[CropFamily]) -> String {
        let current = match (plan.is_empty(), self.family_of(crop)) {
            (false, Some(family)) => family,
            _ => return "Could not generate a rotation plan for this crop.".to_string(),
        };

        let mut lines = vec![
            format!("Current crop: {} (Family: {})", crop, current),
            "Recommended rotation plan:".to_string(),
        ];

        for (i, family) in plan.iter().enumerate() {
            let examples = self.crop_examples(*family);
            let shown = &examples[..examples.len().min(MAX_EXAMPLES)];
            lines.push(format!(
                "Year {}: {} family (e.g., {})",
                i + 1,
                family,
                shown.join(", ")
            ));

            let mut benefits = Vec::new();
            if *family == CropFamily::Legume {
                benefits.push("fixes nitrogen in soil");
            }
            if self.compatibility(current, *family) > 0 {
                benefits.push("breaks pest/disease cycles");
            }
            if !benefits.is_empty() {
                lines.push(format!("  Benefits: {}", benefits.join(", ")));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rice_alternates_grass_and_legume() {
        let plan = RotationPlanner::new().suggest_rotation("Rice", None, 3);
        assert_eq!(
            plan,
            vec![CropFamily::Legume, CropFamily::Grass, CropFamily::Legume]
        );
    }

    #[test]
    fn long_horizons_alternate_without_preallocating() {
        let plan = RotationPlanner::new().suggest_rotation("Rice", None, 1000);
        assert_eq!(plan.len(), 1000);
        assert_eq!(plan[998], CropFamily::Legume);
        assert_eq!(plan[999], CropFamily::Grass);
    }

    #[test]
    fn lookup_ignores_case() {
        let planner = RotationPlanner::new();
        assert_eq!(planner.family_of("soybean"), Some(CropFamily::Legume));
        assert_eq!(planner.suggest_rotation("COTTON", None, 2).len(), 2);
    }

    #[test]
    fn unknown_crop_gives_empty_plan() {
        let planner = RotationPlanner::new();
        assert!(planner.suggest_rotation("Durian", None, 3).is_empty());
        assert_eq!(
            planner.format_rotation_plan("Durian", &[]),
            "Could not generate a rotation plan for this crop."
        );
    }

    #[test]
    fn soil_surplus_shifts_choice() {
        let planner = RotationPlanner::new();
        // Cotton rows are all neutral; a nitrogen deficit favours legumes.
        let plain = planner.suggest_rotation("Cotton", None, 1);
        assert_eq!(plain, vec![CropFamily::Grass]);

        let deficit = SoilHealth::new(-2, 0, 0);
        let plan = planner.suggest_rotation("Cotton", Some(&deficit), 1);
        assert_eq!(plan, vec![CropFamily::Legume]);
    }

    #[test]
    fn surplus_rewards_consumers() {
        let planner = RotationPlanner::new();
        // Legume previous: Grass and Nightshade both score 1, plus 0.5 for
        // consuming surplus nitrogen. Grass comes first.
        let surplus = SoilHealth::new(3, 0, 0);
        let plan = planner.suggest_rotation("Chickpea", Some(&surplus), 1);
        assert_eq!(plan, vec![CropFamily::Grass]);
    }

    #[test]
    fn formatted_plan_lists_examples_and_benefits() {
        let planner = RotationPlanner::new();
        let plan = planner.suggest_rotation("Corn", None, 2);
        let text = planner.format_rotation_plan("Corn", &plan);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Current crop: Corn (Family: Grass)");
        assert_eq!(lines[1], "Recommended rotation plan:");
        assert_eq!(lines[2], "Year 1: Legume family (e.g., Soybean, Chickpea)");
        assert_eq!(
            lines[3],
            "  Benefits: fixes nitrogen in soil, breaks pest/disease cycles"
        );
        assert_eq!(lines[4], "Year 2: Grass family (e.g., Corn, Rice, Wheat)");
        assert_eq!(lines.len(), 5);
    }

    proptest! {
        #[test]
        fn plan_has_requested_length_without_repeats(
            crop_idx in 0usize..CROP_FAMILIES.len(),
            years in 0usize..12,
            n in -3i32..4,
            p in -3i32..4,
            k in -3i32..4,
            with_soil in any::<bool>(),
        ) {
            let planner = RotationPlanner::new();
            let crop = CROP_FAMILIES[crop_idx].0;
            let soil = SoilHealth::new(n, p, k);
            let plan = planner.suggest_rotation(crop, with_soil.then_some(&soil), years);

            prop_assert_eq!(plan.len(), years);
            let start = planner.family_of(crop).unwrap();
            let mut previous = start;
            for family in plan {
                prop_assert_ne!(family, previous);
                previous = family;
            }
        }
    }
}
