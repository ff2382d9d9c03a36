use pipetting::{LabwareId, PipetteId, WellName};

use crate::form::{ChangeTip, MoveLiquidForm, NumericInput, TransferPath};

/// One cell of a form patch.
///
/// `Keep` leaves the field untouched, `Clear` explicitly empties it, `Set`
/// replaces it. The serialized shape matches the designer's edit events: an
/// absent field is `Keep`, `null` is `Clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldPatch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldPatch::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldPatch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Right-biased compose: `self` wins unless it keeps the field.
    fn over(self, earlier: Self) -> Self {
        match self {
            FieldPatch::Keep => earlier,
            other => other,
        }
    }
}

impl<T: Clone> FieldPatch<T> {
    pub fn apply_to(&self, current: &Option<T>) -> Option<T> {
        match self {
            FieldPatch::Keep => current.clone(),
            FieldPatch::Clear => None,
            FieldPatch::Set(value) => Some(value.clone()),
        }
    }
}

impl FieldPatch<bool> {
    /// Flag fields have no empty state; a clear applies as `false`.
    pub fn apply_to_flag(&self, current: bool) -> bool {
        match self {
            FieldPatch::Keep => current,
            FieldPatch::Clear => false,
            FieldPatch::Set(value) => *value,
        }
    }
}

impl<T: serde::Serialize> serde::Serialize for FieldPatch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            FieldPatch::Keep | FieldPatch::Clear => serializer.serialize_none(),
            FieldPatch::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldPatch::Set(value),
            None => FieldPatch::Clear,
        })
    }
}

/// A partial edit to a [`MoveLiquidForm`]; untouched fields stay `Keep`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormPatch {
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub pipette: FieldPatch<PipetteId>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub volume: FieldPatch<NumericInput>,

    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_labware: FieldPatch<LabwareId>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_wells: FieldPatch<Vec<WellName>>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_flow_rate: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_mix_volume: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_mm_from_bottom: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub aspirate_touch_tip_mm_from_bottom: FieldPatch<NumericInput>,

    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_labware: FieldPatch<LabwareId>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_wells: FieldPatch<Vec<WellName>>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_flow_rate: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_mix_volume: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_mm_from_bottom: FieldPatch<NumericInput>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub dispense_touch_tip_mm_from_bottom: FieldPatch<NumericInput>,

    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub path: FieldPatch<TransferPath>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub change_tip: FieldPatch<ChangeTip>,

    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub disposal_volume_checkbox: FieldPatch<bool>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub disposal_volume_volume: FieldPatch<NumericInput>,
}

impl FormPatch {
    /// The effective form: `form` with this patch merged on top.
    pub fn applied_to(&self, form: &MoveLiquidForm) -> MoveLiquidForm {
        MoveLiquidForm {
            pipette: self.pipette.apply_to(&form.pipette),
            volume: self.volume.apply_to(&form.volume),
            aspirate_labware: self.aspirate_labware.apply_to(&form.aspirate_labware),
            aspirate_wells: self.aspirate_wells.apply_to(&form.aspirate_wells),
            aspirate_flow_rate: self.aspirate_flow_rate.apply_to(&form.aspirate_flow_rate),
            aspirate_mix_volume: self.aspirate_mix_volume.apply_to(&form.aspirate_mix_volume),
            aspirate_mm_from_bottom: self
                .aspirate_mm_from_bottom
                .apply_to(&form.aspirate_mm_from_bottom),
            aspirate_touch_tip_mm_from_bottom: self
                .aspirate_touch_tip_mm_from_bottom
                .apply_to(&form.aspirate_touch_tip_mm_from_bottom),
            dispense_labware: self.dispense_labware.apply_to(&form.dispense_labware),
            dispense_wells: self.dispense_wells.apply_to(&form.dispense_wells),
            dispense_flow_rate: self.dispense_flow_rate.apply_to(&form.dispense_flow_rate),
            dispense_mix_volume: self.dispense_mix_volume.apply_to(&form.dispense_mix_volume),
            dispense_mm_from_bottom: self
                .dispense_mm_from_bottom
                .apply_to(&form.dispense_mm_from_bottom),
            dispense_touch_tip_mm_from_bottom: self
                .dispense_touch_tip_mm_from_bottom
                .apply_to(&form.dispense_touch_tip_mm_from_bottom),
            path: self.path.apply_to(&form.path),
            change_tip: self.change_tip.apply_to(&form.change_tip),
            disposal_volume_checkbox: self
                .disposal_volume_checkbox
                .apply_to_flag(form.disposal_volume_checkbox),
            disposal_volume_volume: self
                .disposal_volume_volume
                .apply_to(&form.disposal_volume_volume),
        }
    }

    /// Right-biased compose: `later` wins on every field it touches.
    pub fn merge(self, later: FormPatch) -> FormPatch {
        FormPatch {
            pipette: later.pipette.over(self.pipette),
            volume: later.volume.over(self.volume),
            aspirate_labware: later.aspirate_labware.over(self.aspirate_labware),
            aspirate_wells: later.aspirate_wells.over(self.aspirate_wells),
            aspirate_flow_rate: later.aspirate_flow_rate.over(self.aspirate_flow_rate),
            aspirate_mix_volume: later.aspirate_mix_volume.over(self.aspirate_mix_volume),
            aspirate_mm_from_bottom: later
                .aspirate_mm_from_bottom
                .over(self.aspirate_mm_from_bottom),
            aspirate_touch_tip_mm_from_bottom: later
                .aspirate_touch_tip_mm_from_bottom
                .over(self.aspirate_touch_tip_mm_from_bottom),
            dispense_labware: later.dispense_labware.over(self.dispense_labware),
            dispense_wells: later.dispense_wells.over(self.dispense_wells),
            dispense_flow_rate: later.dispense_flow_rate.over(self.dispense_flow_rate),
            dispense_mix_volume: later.dispense_mix_volume.over(self.dispense_mix_volume),
            dispense_mm_from_bottom: later
                .dispense_mm_from_bottom
                .over(self.dispense_mm_from_bottom),
            dispense_touch_tip_mm_from_bottom: later
                .dispense_touch_tip_mm_from_bottom
                .over(self.dispense_touch_tip_mm_from_bottom),
            path: later.path.over(self.path),
            change_tip: later.change_tip.over(self.change_tip),
            disposal_volume_checkbox: later
                .disposal_volume_checkbox
                .over(self.disposal_volume_checkbox),
            disposal_volume_volume: later
                .disposal_volume_volume
                .over(self.disposal_volume_volume),
        }
    }
}

/// Folds a patch through an ordered list of updaters; each updater sees the
/// cumulative patch produced by the ones before it.
pub fn chain_patch_updaters<P>(initial: P, updaters: Vec<Box<dyn FnOnce(P) -> P + '_>>) -> P {
    updaters
        .into_iter()
        .fold(initial, |patch, updater| updater(patch))
}
