//! Water chemistry model: ions, profiles, the additive catalog, and masses.

mod catalog;
mod ion;
mod quantities;

pub use catalog::{catalog, Additive, AdditiveId, ADDITIVE_COUNT};
pub use ion::{Ion, IonProfile, ION_COUNT};
pub use quantities::{round_for_display, AdditiveMasses, DisplayMasses, DisplayProfile};
