pub mod entities;
pub mod labware;
pub mod pipette;
pub mod well;

pub use entities::{
    channels, pipette_capacity, pipette_min_volume, LabwareEntities, LabwareEntity, LabwareId, PipetteEntities,
    PipetteEntity, PipetteId,
};
pub use labware::{LabwareCatalog, LabwareDefLookup, LabwareDefinition, LabwareKind};
pub use pipette::{ChannelCount, PipetteCatalog, PipetteModel, PipetteSpec, PipetteSpecLookup};
pub use well::WellName;
