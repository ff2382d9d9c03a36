use pipetting::{pipette_capacity, PipetteEntities, PipetteSpecLookup};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::form::{MoveLiquidForm, NumericInput, TransferPath};

/// Decimal digits a disposal volume is rounded to before clamping.
pub const DISPOSAL_VOLUME_DIGITS: u32 = 1;

fn numeric(field: &Option<NumericInput>) -> Decimal {
    field
        .as_ref()
        .and_then(NumericInput::value)
        .unwrap_or(Decimal::ZERO)
}

/// Whether the transfer volume fits the pipette for the multi-well paths,
/// which aspirate (or dispense) the programmed volume at least twice per tip.
///
/// The disposal volume is not counted here; it is clamped into the remaining
/// headroom separately. An unresolvable pipette gives no basis to reject.
pub fn volume_in_capacity_for_multi(
    applied: &MoveLiquidForm,
    entities: &PipetteEntities,
    specs: &dyn PipetteSpecLookup,
) -> bool {
    let Some(capacity) = pipette_capacity(applied.pipette.as_ref(), entities, specs) else {
        return true;
    };

    let volume = numeric(&applied.volume);
    match applied.path {
        Some(TransferPath::MultiAspirate) | Some(TransferPath::MultiDispense) => {
            volume > Decimal::ZERO && volume * dec!(2) <= capacity
        }
        _ => true,
    }
}

/// Largest disposal volume a multi-dispense run can still accommodate, the
/// tip capacity minus the two programmed dispenses. `None` off the
/// multi-dispense path or when the pipette does not resolve.
pub fn max_disposal_volume_for_multi_dispense(
    applied: &MoveLiquidForm,
    entities: &PipetteEntities,
    specs: &dyn PipetteSpecLookup,
) -> Option<Decimal> {
    if applied.path != Some(TransferPath::MultiDispense) {
        return None;
    }
    let capacity = pipette_capacity(applied.pipette.as_ref(), entities, specs)?;

    Some(capacity - numeric(&applied.volume) * dec!(2))
}
