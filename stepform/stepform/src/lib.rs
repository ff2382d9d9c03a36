pub mod capacity;
pub mod form;
pub mod move_liquid;
pub mod patch;
pub mod well_ratio;

pub use form::{ChangeTip, MoveLiquidForm, NumericInput, TransferPath};
pub use move_liquid::dependent_fields_update_move_liquid;
pub use patch::{chain_patch_updaters, FieldPatch, FormPatch};
pub use well_ratio::{well_ratio, WellRatio};

#[cfg(test)]
mod tests;
