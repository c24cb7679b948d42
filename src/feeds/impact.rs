use crate::models::DisasterType;

/// Affected radius in km. Earthquakes, cyclones and volcanoes are banded by
/// magnitude/intensity; floods and untyped events by stated population.
pub(crate) fn radius_for(disaster_type: DisasterType, magnitude: Option<f64>, population: u64) -> f64 {
    let m = magnitude.unwrap_or(0.0);
    match disaster_type {
        DisasterType::Earthquake => match m {
            m if m >= 7.0 => 200.0,
            m if m >= 6.0 => 100.0,
            m if m >= 5.0 => 50.0,
            m if m >= 4.0 => 25.0,
            _ => 10.0,
        },
        DisasterType::Cyclone => match m {
            m if m >= 4.0 => 300.0,
            m if m >= 3.0 => 200.0,
            m if m >= 2.0 => 150.0,
            m if m >= 1.0 => 100.0,
            _ => 75.0,
        },
        DisasterType::VolcanicActivity => match m {
            m if m >= 4.0 => 100.0,
            m if m >= 3.0 => 50.0,
            _ => 25.0,
        },
        DisasterType::Wildfire => 20.0,
        DisasterType::Drought => 200.0,
        DisasterType::Flood => by_population(population, [20.0, 40.0, 75.0, 150.0]),
        _ => by_population(population, [15.0, 25.0, 50.0, 100.0]),
    }
}

fn by_population(population: u64, bands: [f64; 4]) -> f64 {
    match population {
        p if p > 1_000_000 => bands[3],
        p if p > 100_000 => bands[2],
        p if p > 10_000 => bands[1],
        _ => bands[0],
    }
}

/// Halves round away from zero: 2 500 is "3K", 1 250 000 is "1.3M".
pub(crate) fn format_population(population: u64) -> String {
    if population >= 1_000_000 {
        let tenths = (population as f64 / 100_000.0).round();
        format!("{:.1}M people", tenths / 10.0)
    } else if population >= 1_000 {
        format!("{:.0}K people", (population as f64 / 1_000.0).round())
    } else {
        format!("{population} people")
    }
}

pub(crate) fn impact_description(
    disaster_type: DisasterType,
    magnitude: Option<f64>,
    population: u64,
) -> String {
    let mut parts = Vec::with_capacity(2);
    if population > 0 {
        parts.push(format!("{} affected", format_population(population)));
    }
    if let Some(m) = magnitude.filter(|m| *m > 0.0) {
        let label = if disaster_type == DisasterType::Earthquake {
            "Magnitude"
        } else {
            "Intensity"
        };
        parts.push(format!("{label} {m}"));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earthquake_bands() {
        let r = |m| radius_for(DisasterType::Earthquake, Some(m), 0);
        assert_eq!(r(3.9), 10.0);
        assert_eq!(r(4.0), 25.0);
        assert_eq!(r(5.5), 50.0);
        assert_eq!(r(6.0), 100.0);
        assert_eq!(r(7.8), 200.0);
        assert_eq!(radius_for(DisasterType::Earthquake, None, 0), 10.0);
    }

    #[test]
    fn cyclone_and_volcano_bands() {
        assert_eq!(radius_for(DisasterType::Cyclone, None, 0), 75.0);
        assert_eq!(radius_for(DisasterType::Cyclone, Some(3.0), 0), 200.0);
        assert_eq!(radius_for(DisasterType::Cyclone, Some(5.0), 0), 300.0);
        assert_eq!(radius_for(DisasterType::VolcanicActivity, Some(2.0), 0), 25.0);
        assert_eq!(radius_for(DisasterType::VolcanicActivity, Some(4.0), 0), 100.0);
    }

    #[test]
    fn fixed_radii() {
        assert_eq!(radius_for(DisasterType::Wildfire, Some(9.0), 5_000_000), 20.0);
        assert_eq!(radius_for(DisasterType::Drought, None, 0), 200.0);
    }

    #[test]
    fn population_banded_types() {
        assert_eq!(radius_for(DisasterType::Flood, None, 10_000), 20.0);
        assert_eq!(radius_for(DisasterType::Flood, None, 10_001), 40.0);
        assert_eq!(radius_for(DisasterType::Flood, None, 250_000), 75.0);
        assert_eq!(radius_for(DisasterType::Flood, None, 2_000_000), 150.0);
        assert_eq!(radius_for(DisasterType::Tsunami, None, 0), 15.0);
        assert_eq!(radius_for(DisasterType::Other, None, 1_000_001), 100.0);
    }

    #[test]
    fn population_formatting() {
        assert_eq!(format_population(2_500_000), "2.5M people");
        assert_eq!(format_population(850_000), "850K people");
        assert_eq!(format_population(500), "500 people");
        assert_eq!(format_population(999), "999 people");
        assert_eq!(format_population(1_000), "1K people");
        assert_eq!(format_population(1_000_000), "1.0M people");
    }

    #[test]
    fn population_halves_round_up() {
        assert_eq!(format_population(2_500), "3K people");
        assert_eq!(format_population(1_500), "2K people");
        assert_eq!(format_population(2_499), "2K people");
        assert_eq!(format_population(1_250_000), "1.3M people");
        assert_eq!(format_population(1_050_000), "1.1M people");
        assert_eq!(format_population(1_249_999), "1.2M people");
    }

    #[test]
    fn description_clauses() {
        assert_eq!(
            impact_description(DisasterType::Earthquake, Some(6.2), 800_000),
            "800K people affected, Magnitude 6.2"
        );
        assert_eq!(
            impact_description(DisasterType::Flood, Some(8.5), 10_000_000),
            "10.0M people affected, Intensity 8.5"
        );
        assert_eq!(impact_description(DisasterType::Wildfire, None, 180_000), "180K people affected");
        assert_eq!(impact_description(DisasterType::Earthquake, Some(5.0), 0), "Magnitude 5");
        assert_eq!(impact_description(DisasterType::Drought, Some(0.0), 0), "");
    }
}
