use std::f64::consts::PI;

use crate::geo::{haversine_km, Coordinate};
use crate::models::PopulationData;

pub(crate) const ESTIMATION_METHOD: &str = "regional_density_estimation";

/// Cities further than this do not influence the density.
const CITY_INFLUENCE_KM: f64 = 100.0;
const MIN_PROXIMITY_FACTOR: f64 = 0.1;

/// Coarse density tiers in persons per km².
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DensityTier {
    AsiaHigh,
    EuropeHigh,
    AfricaHigh,
    AsiaMedium,
    EuropeMedium,
    AfricaMedium,
    AmericasMedium,
    AsiaLow,
    AmericasLow,
    OceaniaLow,
}

impl DensityTier {
    pub fn per_km2(self) -> f64 {
        match self {
            Self::AsiaHigh => 500.0,
            Self::EuropeHigh => 300.0,
            Self::AfricaHigh => 400.0,
            Self::AsiaMedium => 150.0,
            Self::EuropeMedium => 100.0,
            Self::AfricaMedium => 80.0,
            Self::AmericasMedium => 50.0,
            Self::AsiaLow => 30.0,
            Self::AmericasLow => 5.0,
            Self::OceaniaLow => 3.0,
        }
    }
}

pub(crate) struct PopulationCenter {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub population: f64,
    /// km
    pub radius: f64,
}

impl PopulationCenter {
    const fn new(name: &'static str, lat: f64, lon: f64, population: f64, radius: f64) -> Self {
        Self { name, lat, lon, population, radius }
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate { lat: self.lat, lon: self.lon }
    }

    fn density(&self) -> f64 {
        self.population / (PI * self.radius * self.radius)
    }
}

pub(crate) const POPULATION_CENTERS: &[PopulationCenter] = &[
    PopulationCenter::new("Delhi", 28.7, 77.1, 30_000_000.0, 50.0),
    PopulationCenter::new("Tokyo", 35.7, 139.7, 38_000_000.0, 60.0),
    PopulationCenter::new("Shanghai", 31.2, 121.5, 27_000_000.0, 45.0),
    PopulationCenter::new("Beijing", 39.9, 116.4, 21_500_000.0, 40.0),
    PopulationCenter::new("Mumbai", 19.1, 72.9, 20_400_000.0, 35.0),
    PopulationCenter::new("Manila", 14.6, 121.0, 13_500_000.0, 30.0),
    PopulationCenter::new("Jakarta", -6.2, 106.8, 10_800_000.0, 25.0),
    PopulationCenter::new("Karachi", 24.9, 67.0, 16_000_000.0, 30.0),
    PopulationCenter::new("Dhaka", 23.8, 90.4, 9_000_000.0, 20.0),
    PopulationCenter::new("New York", 40.7, -74.0, 8_400_000.0, 25.0),
    PopulationCenter::new("Los Angeles", 34.1, -118.2, 4_000_000.0, 30.0),
    PopulationCenter::new("Mexico City", 19.4, -99.1, 21_800_000.0, 40.0),
    PopulationCenter::new("São Paulo", -23.5, -46.6, 12_300_000.0, 30.0),
    PopulationCenter::new("Buenos Aires", -34.6, -58.4, 3_000_000.0, 20.0),
    PopulationCenter::new("London", 51.5, -0.1, 9_000_000.0, 25.0),
    PopulationCenter::new("Paris", 48.9, 2.3, 2_200_000.0, 15.0),
    PopulationCenter::new("Istanbul", 41.0, 28.9, 15_500_000.0, 35.0),
    PopulationCenter::new("Moscow", 55.8, 37.6, 12_500_000.0, 30.0),
    PopulationCenter::new("Lagos", 6.5, 3.4, 15_000_000.0, 30.0),
    PopulationCenter::new("Cairo", 30.0, 31.2, 20_900_000.0, 35.0),
    PopulationCenter::new("Kinshasa", -4.3, 15.3, 14_300_000.0, 25.0),
];

#[inline]
fn within(v: f64, lo: f64, hi: f64) -> bool {
    v > lo && v < hi
}

/// Rough affected-population model: regional density rectangles boosted by
/// proximity to a fixed list of major cities. Deterministic and offline.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PopulationEstimator;

impl PopulationEstimator {
    pub fn estimate(&self, at: Coordinate, radius_km: f64) -> PopulationData {
        let density = self.effective_density(at);
        let area = PI * radius_km * radius_km;

        PopulationData {
            estimated_population: (density * area).round().max(0.0) as u64,
            density: density.round(),
            area: area.round(),
            method: ESTIMATION_METHOD,
        }
    }

    /// Regional density, raised to the city's density (scaled by proximity)
    /// when a listed city lies within 100 km.
    pub fn effective_density(&self, at: Coordinate) -> f64 {
        let regional = Self::regional_tier(at.lat, at.lon).per_km2();
        match Self::nearest_center(at) {
            Some((center, distance)) if distance < CITY_INFLUENCE_KM => {
                let proximity = (1.0 - distance / CITY_INFLUENCE_KM).max(MIN_PROXIMITY_FACTOR);
                log::debug!("{:.0} km from {}, proximity {proximity:.2}", distance, center.name);
                regional.max(center.density() * proximity)
            }
            _ => regional,
        }
    }

    /// Approximate rectangles, not political boundaries. Bounds are exclusive.
    pub fn regional_tier(lat: f64, lon: f64) -> DensityTier {
        // Asia
        if within(lon, 60.0, 150.0) && within(lat, 10.0, 55.0) {
            if within(lon, 70.0, 140.0) && within(lat, 20.0, 40.0) {
                return DensityTier::AsiaHigh;
            }
            return DensityTier::AsiaMedium;
        }
        // Europe
        if within(lon, -10.0, 40.0) && within(lat, 35.0, 70.0) {
            if within(lon, 0.0, 25.0) && within(lat, 45.0, 60.0) {
                return DensityTier::EuropeHigh;
            }
            return DensityTier::EuropeMedium;
        }
        // Africa: Nile valley and the West African coast are dense
        if within(lon, -20.0, 55.0) && within(lat, -35.0, 35.0) {
            if (within(lon, 30.0, 45.0) && within(lat, 25.0, 35.0))
                || (within(lon, -5.0, 15.0) && within(lat, 5.0, 15.0))
            {
                return DensityTier::AfricaHigh;
            }
            return DensityTier::AfricaMedium;
        }
        // North America
        if within(lon, -170.0, -50.0) && within(lat, 15.0, 70.0) {
            if within(lon, -125.0, -70.0) && within(lat, 25.0, 50.0) {
                return DensityTier::AmericasMedium;
            }
            return DensityTier::AmericasLow;
        }
        // South America
        if within(lon, -85.0, -30.0) && within(lat, -55.0, 15.0) {
            return DensityTier::AmericasMedium;
        }
        // Australia / Oceania
        if within(lon, 110.0, 180.0) && within(lat, -50.0, -10.0) {
            return DensityTier::OceaniaLow;
        }
        DensityTier::AsiaLow
    }

    pub fn nearest_center(at: Coordinate) -> Option<(&'static PopulationCenter, f64)> {
        POPULATION_CENTERS
            .iter()
            .map(|c| (c, haversine_km(at, c.coordinate())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
