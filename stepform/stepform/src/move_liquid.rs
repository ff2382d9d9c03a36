use pipetting::{
    channels, pipette_min_volume, ChannelCount, LabwareDefLookup, LabwareEntities, LabwareId, PipetteEntities,
    PipetteSpecLookup, WellName,
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::error;

use crate::capacity::{max_disposal_volume_for_multi_dispense, volume_in_capacity_for_multi, DISPOSAL_VOLUME_DIGITS};
use crate::form::{ChangeTip, MoveLiquidForm, NumericInput, TransferPath};
use crate::patch::{chain_patch_updaters, FieldPatch, FormPatch};
use crate::well_ratio::{well_ratio, well_ratio_transitions, TransferSetting, TransferSettingValue};

/// Resolves a proposed edit to a liquid-transfer step into the complete set
/// of field changes the form needs to stay consistent.
///
/// The patch is refined by a fixed sequence of updaters; each updater sees
/// the cumulative patch produced by the ones before it, against the same raw
/// form snapshot. The output contains the requested changes (possibly
/// overridden) plus every derived change.
pub fn dependent_fields_update_move_liquid(
    patch: FormPatch,
    form: &MoveLiquidForm,
    pipette_entities: &PipetteEntities,
    labware_entities: &LabwareEntities,
    pipette_specs: &dyn PipetteSpecLookup,
    labware_defs: &dyn LabwareDefLookup,
) -> FormPatch {
    chain_patch_updaters(patch, vec![
        Box::new(|chain_patch| update_patch_on_labware_change(chain_patch, form)),
        Box::new(|chain_patch| {
            update_patch_on_pipette_channel_change(
                chain_patch,
                form,
                labware_entities,
                pipette_entities,
                pipette_specs,
                labware_defs,
            )
        }),
        Box::new(|chain_patch| update_patch_on_pipette_change(chain_patch, form)),
        Box::new(|chain_patch| update_patch_on_well_ratio_change(chain_patch, form)),
        Box::new(|chain_patch| update_patch_path_field(chain_patch, form, pipette_entities, pipette_specs)),
        Box::new(|chain_patch| {
            update_patch_disposal_volume_fields(chain_patch, form, pipette_entities, pipette_specs)
        }),
        Box::new(|chain_patch| clamp_disposal_volume(chain_patch, form, pipette_entities, pipette_specs)),
    ])
}

/// A new piece of labware invalidates the well selection and the tip
/// positioning offsets measured against the old one. Each side resets
/// independently.
fn update_patch_on_labware_change(patch: FormPatch, form: &MoveLiquidForm) -> FormPatch {
    let source_labware_changed =
        matches!(&patch.aspirate_labware, FieldPatch::Set(labware) if form.aspirate_labware.as_ref() != Some(labware));
    let dest_labware_changed =
        matches!(&patch.dispense_labware, FieldPatch::Set(labware) if form.dispense_labware.as_ref() != Some(labware));

    if !source_labware_changed && !dest_labware_changed {
        return patch;
    }

    let mut patch = patch;
    if source_labware_changed {
        patch.aspirate_wells = FieldPatch::Clear;
        patch.aspirate_mm_from_bottom = FieldPatch::Clear;
        patch.aspirate_touch_tip_mm_from_bottom = FieldPatch::Clear;
    }
    if dest_labware_changed {
        patch.dispense_wells = FieldPatch::Clear;
        patch.dispense_mm_from_bottom = FieldPatch::Clear;
        patch.dispense_touch_tip_mm_from_bottom = FieldPatch::Clear;
    }
    patch
}

/// Well selections are channel-layout specific: primary wells for a
/// multichannel pipette, literal wells for a single-channel one.
fn update_patch_on_pipette_channel_change(
    patch: FormPatch,
    form: &MoveLiquidForm,
    labware_entities: &LabwareEntities,
    pipette_entities: &PipetteEntities,
    pipette_specs: &dyn PipetteSpecLookup,
    labware_defs: &dyn LabwareDefLookup,
) -> FormPatch {
    if patch.pipette.is_keep() {
        return patch;
    }

    let prev_channels = channels(form.pipette.as_ref(), pipette_entities, pipette_specs);
    let next_channels = match &patch.pipette {
        FieldPatch::Set(pipette) => channels(Some(pipette), pipette_entities, pipette_specs),
        _ => None,
    };

    let single_to_multi =
        prev_channels == Some(ChannelCount::Single) && next_channels == Some(ChannelCount::Eight);
    let multi_to_single =
        prev_channels == Some(ChannelCount::Eight) && next_channels == Some(ChannelCount::Single);

    let mut patch = patch;
    if matches!(patch.pipette, FieldPatch::Clear) || single_to_multi {
        // the old selection cannot be reinterpreted, force re-selection
        patch.aspirate_wells = FieldPatch::Clear;
        patch.dispense_wells = FieldPatch::Clear;
    } else if multi_to_single {
        // primary wells become the full set of wells the tips occupied
        patch.aspirate_wells = expand_primary_wells(
            form.aspirate_wells.as_deref(),
            form.aspirate_labware.as_ref(),
            labware_entities,
            labware_defs,
        );
        patch.dispense_wells = expand_primary_wells(
            form.dispense_wells.as_deref(),
            form.dispense_labware.as_ref(),
            labware_entities,
            labware_defs,
        );
    }
    patch
}

fn expand_primary_wells(
    primary_wells: Option<&[WellName]>,
    labware: Option<&LabwareId>,
    labware_entities: &LabwareEntities,
    labware_defs: &dyn LabwareDefLookup,
) -> FieldPatch<Vec<WellName>> {
    let Some(primary_wells) = primary_wells else {
        return FieldPatch::Clear;
    };
    let Some(entity) = labware.and_then(|labware| labware_entities.get(labware)) else {
        return FieldPatch::Clear;
    };
    let Some(definition) = labware_defs.labware_definition(&entity.kind) else {
        return FieldPatch::Clear;
    };

    FieldPatch::Set(definition.all_wells_from_primary_wells(primary_wells))
}

/// Flow rates, mix volumes and disposal volumes are ranges of the selected
/// pipette and cannot carry over to another one.
fn update_patch_on_pipette_change(patch: FormPatch, form: &MoveLiquidForm) -> FormPatch {
    let pipette_changed = match &patch.pipette {
        FieldPatch::Keep => false,
        FieldPatch::Clear => form.pipette.is_some(),
        FieldPatch::Set(pipette) => form.pipette.as_ref() != Some(pipette),
    };
    if !pipette_changed {
        return patch;
    }

    let mut patch = patch;
    patch.aspirate_flow_rate = FieldPatch::Clear;
    patch.dispense_flow_rate = FieldPatch::Clear;
    patch.aspirate_mix_volume = FieldPatch::Clear;
    patch.dispense_mix_volume = FieldPatch::Clear;
    patch.disposal_volume_volume = FieldPatch::Clear;
    patch
}

fn update_patch_on_well_ratio_change(patch: FormPatch, form: &MoveLiquidForm) -> FormPatch {
    let applied = patch.applied_to(form);
    let prev_ratio = well_ratio(form.aspirate_wells.as_deref(), form.dispense_wells.as_deref());
    let next_ratio = well_ratio(applied.aspirate_wells.as_deref(), applied.dispense_wells.as_deref());

    let (Some(prev_ratio), Some(next_ratio)) = (prev_ratio, next_ratio) else {
        // unexpressible well combination (2:3, 0:1, ...), fall back to a
        // plain transfer and drop per-side tip exchange with it
        let mut patch = patch;
        patch.path = FieldPatch::Set(TransferPath::Single);
        if matches!(applied.change_tip, Some(ChangeTip::PerSource | ChangeTip::PerDest)) {
            patch.change_tip = FieldPatch::Set(ChangeTip::Always);
        }
        return patch;
    };

    if next_ratio == prev_ratio {
        return patch;
    }

    let updates = well_ratio_transitions().updates(&prev_ratio, &next_ratio, |setting| match setting {
        TransferSetting::ChangeTip => applied
            .change_tip
            .map(TransferSettingValue::ChangeTip),
        TransferSetting::Path => applied.path.map(TransferSettingValue::Path),
    });

    let mut patch = patch;
    for (_, value) in updates {
        match value {
            TransferSettingValue::ChangeTip(change_tip) => {
                patch.change_tip = FieldPatch::Set(change_tip);
            }
            TransferSettingValue::Path(path) => {
                patch.path = FieldPatch::Set(path);
            }
        }
    }
    patch
}

fn update_patch_path_field(
    patch: FormPatch,
    form: &MoveLiquidForm,
    pipette_entities: &PipetteEntities,
    pipette_specs: &dyn PipetteSpecLookup,
) -> FormPatch {
    let applied = patch.applied_to(form);

    let Some(path) = applied.path else {
        // cleared upstream, fall back to a plain transfer
        let mut patch = patch;
        patch.path = FieldPatch::Set(TransferPath::Single);
        return patch;
    };

    let mut pipette_capacity_exceeded = false;
    let volume_entered = applied
        .volume
        .as_ref()
        .is_some_and(|volume| !volume.is_empty());
    let pipette_known = applied
        .pipette
        .as_ref()
        .is_some_and(|pipette| pipette_entities.contains_key(pipette));
    if volume_entered && pipette_known {
        pipette_capacity_exceeded = !volume_in_capacity_for_multi(&applied, pipette_entities, pipette_specs);
    }

    let incompatible_path = matches!(
        (applied.change_tip, path),
        (Some(ChangeTip::PerSource), TransferPath::MultiAspirate)
            | (Some(ChangeTip::PerDest), TransferPath::MultiDispense)
    );

    if pipette_capacity_exceeded || incompatible_path {
        let mut patch = patch;
        patch.path = FieldPatch::Set(TransferPath::Single);
        return patch;
    }
    patch
}

fn clear_disposal_volume_fields(mut patch: FormPatch) -> FormPatch {
    patch.disposal_volume_volume = FieldPatch::Clear;
    patch.disposal_volume_checkbox = FieldPatch::Set(false);
    patch
}

fn update_patch_disposal_volume_fields(
    patch: FormPatch,
    form: &MoveLiquidForm,
    pipette_entities: &PipetteEntities,
    pipette_specs: &dyn PipetteSpecLookup,
) -> FormPatch {
    let applied = patch.applied_to(form);

    let path_changed_from_multi_dispense =
        matches!(patch.path, FieldPatch::Set(path) if path != TransferPath::MultiDispense)
            && form.path == Some(TransferPath::MultiDispense);
    if path_changed_from_multi_dispense || patch.disposal_volume_checkbox == FieldPatch::Set(false) {
        return clear_disposal_volume_fields(patch);
    }

    let path_changed_to_multi_dispense = patch.path == FieldPatch::Set(TransferPath::MultiDispense)
        && form.path != Some(TransferPath::MultiDispense);
    let pipette_changed =
        matches!(&patch.pipette, FieldPatch::Set(pipette) if form.pipette.as_ref() != Some(pipette));
    let checkbox_checked = patch.disposal_volume_checkbox == FieldPatch::Set(true);

    if path_changed_to_multi_dispense || pipette_changed || checkbox_checked {
        // seed with the recommended minimum; clamping reduces it when needed
        let recommended_minimum = pipette_min_volume(applied.pipette.as_ref(), pipette_entities, pipette_specs)
            .unwrap_or(Decimal::ZERO);

        let mut patch = patch;
        patch.disposal_volume_checkbox = FieldPatch::Set(true);
        patch.disposal_volume_volume = FieldPatch::Set(NumericInput::from(recommended_minimum));
        return patch;
    }
    patch
}

/// Keeps the disposal volume inside `[0, capacity - 2 * volume]`, rounding to
/// the accepted precision first. Text the user is mid-way through typing is
/// left alone.
fn clamp_disposal_volume(
    patch: FormPatch,
    form: &MoveLiquidForm,
    pipette_entities: &PipetteEntities,
    pipette_specs: &dyn PipetteSpecLookup,
) -> FormPatch {
    let applied = patch.applied_to(form);
    if applied.path != Some(TransferPath::MultiDispense) {
        return patch;
    }
    if applied
        .disposal_volume_volume
        .as_ref()
        .is_some_and(NumericInput::is_partial)
    {
        return patch;
    }

    let Some(max_disposal_volume) = max_disposal_volume_for_multi_dispense(&applied, pipette_entities, pipette_specs)
    else {
        error!("no max disposal volume for a multi-dispense transfer, pipette reference data is inconsistent");
        return patch;
    };

    let candidate = applied
        .disposal_volume_volume
        .as_ref()
        .and_then(NumericInput::value)
        .unwrap_or(Decimal::ZERO);
    let next = candidate
        .round_dp_with_strategy(DISPOSAL_VOLUME_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .min(max_disposal_volume)
        .max(Decimal::ZERO);

    if next == candidate {
        // preserves decimals the user typed, e.g. a trailing `5.`
        return patch;
    }

    let mut patch = patch;
    if next > Decimal::ZERO {
        patch.disposal_volume_volume = FieldPatch::Set(NumericInput::from(next));
        return patch;
    }

    // no headroom left: zero it on an established multi-dispense, clear both
    // fields when multi-dispense is only now being entered
    if form.path == Some(TransferPath::MultiDispense) {
        patch.disposal_volume_volume = if applied.disposal_volume_checkbox {
            FieldPatch::Set(NumericInput::from(Decimal::ZERO))
        } else {
            FieldPatch::Clear
        };
        patch
    } else {
        clear_disposal_volume_fields(patch)
    }
}





#[cfg(test)]
mod path_field_tests {
    use super::update_patch_path_field;
    use crate::form::{ChangeTip, TransferPath};
    use crate::patch::{FieldPatch, FormPatch};
    use crate::tests::support;

    #[test]
    fn missing_path_falls_back_to_a_plain_transfer() {
        // given
        let mut form = support::form_with_selections();
        form.path = None;

        // when
        let patch = update_patch_path_field(
            FormPatch::default(),
            &form,
            &support::pipette_entities(),
            &support::pipette_specs(),
        );

        // then
        assert_eq!(patch.path, FieldPatch::Set(TransferPath::Single));
    }

    #[test]
    fn per_source_cannot_multi_aspirate() {
        // given
        let mut form = support::form_with_selections();
        form.path = Some(TransferPath::MultiAspirate);
        form.change_tip = Some(ChangeTip::PerSource);

        // when
        let patch = update_patch_path_field(
            FormPatch::default(),
            &form,
            &support::pipette_entities(),
            &support::pipette_specs(),
        );

        // then
        assert_eq!(patch.path, FieldPatch::Set(TransferPath::Single));
    }

    #[test]
    fn per_dest_cannot_multi_dispense() {
        // given
        let mut form = support::form_with_selections();
        form.path = Some(TransferPath::MultiDispense);
        form.change_tip = Some(ChangeTip::PerDest);

        // when
        let patch = update_patch_path_field(
            FormPatch::default(),
            &form,
            &support::pipette_entities(),
            &support::pipette_specs(),
        );

        // then
        assert_eq!(patch.path, FieldPatch::Set(TransferPath::Single));
    }

    #[test]
    fn capacity_overrun_falls_back_to_a_plain_transfer() {
        // given - 2 x 160 does not fit a 300 µL tip
        let mut form = support::form_with_selections();
        form.path = Some(TransferPath::MultiAspirate);
        form.volume = Some("160".into());

        // when
        let patch = update_patch_path_field(
            FormPatch::default(),
            &form,
            &support::pipette_entities(),
            &support::pipette_specs(),
        );

        // then
        assert_eq!(patch.path, FieldPatch::Set(TransferPath::Single));
    }

    #[test]
    fn a_fitting_multi_path_passes_through() {
        // given
        let mut form = support::form_with_selections();
        form.path = Some(TransferPath::MultiAspirate);
        form.volume = Some("100".into());

        // when
        let patch = update_patch_path_field(
            FormPatch::default(),
            &form,
            &support::pipette_entities(),
            &support::pipette_specs(),
        );

        // then
        assert_eq!(patch.path, FieldPatch::Keep);
    }
}


#[cfg(test)]
mod clamp_disposal_volume_tests {
    use super::clamp_disposal_volume;
    use crate::form::TransferPath;
    use crate::patch::{FieldPatch, FormPatch};
    use crate::tests::support;

    fn multi_dispense_form(volume: &str) -> crate::form::MoveLiquidForm {
        let mut form = support::form_with_selections();
        form.path = Some(TransferPath::MultiDispense);
        form.volume = Some(volume.into());
        form.disposal_volume_checkbox = true;
        form.disposal_volume_volume = Some("5".into());
        form
    }

    #[test]
    fn clamps_to_the_remaining_headroom() {
        // given - capacity 300, 2 x 144 leaves 12
        let form = multi_dispense_form("144");
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("9999".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("12".into()));
    }

    #[test]
    fn rounds_before_clamping() {
        // given
        let form = multi_dispense_form("100");
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("5.55".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("5.6".into()));
    }

    #[test]
    fn an_in_range_value_is_left_exactly_as_typed() {
        // given
        let form = multi_dispense_form("100");
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("5.0".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then - not rewritten to "5"
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("5.0".into()));
    }

    #[test]
    fn a_bare_decimal_point_is_not_fought_over() {
        // given
        let form = multi_dispense_form("100");
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set(".".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set(".".into()));
    }

    #[test]
    fn other_paths_are_ignored() {
        // given
        let mut form = multi_dispense_form("100");
        form.path = Some(TransferPath::Single);
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("9999".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("9999".into()));
    }

    #[test]
    fn no_headroom_on_an_established_multi_dispense_zeroes_the_volume() {
        // given - 2 x 150 fills the tip completely
        let form = multi_dispense_form("150");
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("5".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("0".into()));
    }

    #[test]
    fn no_headroom_with_the_box_unchecked_clears_the_volume() {
        // given
        let mut form = multi_dispense_form("150");
        form.disposal_volume_checkbox = false;
        form.disposal_volume_volume = None;
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("5".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Clear);
    }

    #[test]
    fn no_headroom_when_entering_multi_dispense_clears_both_fields() {
        // given - the form was not multi-dispensing yet
        let mut form = multi_dispense_form("150");
        form.path = Some(TransferPath::Single);
        let patch = FormPatch {
            path: FieldPatch::Set(TransferPath::MultiDispense),
            disposal_volume_volume: FieldPatch::Set("5".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Clear);
        assert_eq!(patch.disposal_volume_checkbox, FieldPatch::Set(false));
    }

    #[test]
    fn an_unresolvable_pipette_leaves_the_patch_alone() {
        // given
        let mut form = multi_dispense_form("100");
        form.pipette = Some("ghost".into());
        let patch = FormPatch {
            disposal_volume_volume: FieldPatch::Set("9999".into()),
            ..FormPatch::default()
        };

        // when
        let patch = clamp_disposal_volume(patch, &form, &support::pipette_entities(), &support::pipette_specs());

        // then
        assert_eq!(patch.disposal_volume_volume, FieldPatch::Set("9999".into()));
    }
}
