pub(crate) mod facilities;
pub(crate) mod gdacs;
pub(crate) mod ifrc;
pub(crate) mod population;

pub(crate) use facilities::{FacilityFilter, FacilityRepository};
pub(crate) use gdacs::{FloodFilter, GdacsRepository, SourceSelection};
pub(crate) use ifrc::{DocumentParams, IfrcClient};
