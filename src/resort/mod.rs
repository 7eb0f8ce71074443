pub mod types;
pub mod wire;

pub use types::{
    Altitude, AvalancheLevel, GeoPoint, OperatingStatus, ResortSnapshot, ShredScoreBreakdown,
};
