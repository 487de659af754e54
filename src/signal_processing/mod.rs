pub mod agc;
pub mod math;
pub mod update_law;

pub use agc::Agc;
pub use math::{Real, amplitude_to_db, energy, power_to_db};
pub use update_law::UpdateLaw;
