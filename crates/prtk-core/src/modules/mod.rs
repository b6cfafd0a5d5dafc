pub mod annihilation;
pub mod bremsstrahlung;
pub mod compton;
pub mod elastic;
pub mod excitation;
pub mod ionization;
pub mod pair;
pub mod photoelectric;
pub mod proton;
pub mod serialization;
pub mod stopping;

mod context;
mod helpers;
mod registry;
mod traits;

pub use context::MaterialContext;
pub use proton::{FileProtonStopping, ProtonStoppingProvider};
pub use registry::ChannelRegistry;
pub use traits::{ChannelProcessor, build_table};

#[cfg(test)]
pub(crate) use context::fixtures;

use crate::tables::ParticleDomain;
use serialization::{DISTRIBUTION_CELL, FieldSpec, RowLayout};
use std::fmt::{Display, Formatter};

/// Interaction channels in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    StoppingPower,
    Annihilation,
    Excitation,
    Elastic,
    Bremsstrahlung,
    Photoelectric,
    Compton,
    PairProduction,
    Ionization,
    ProtonStopping,
}

const SCALAR_4: [FieldSpec; 3] = [
    FieldSpec::left(12, 4, "   "),
    FieldSpec::left(12, 4, "   "),
    FieldSpec::left(12, 4, ""),
];
const EXCITATION_FIELDS: [FieldSpec; 3] = [
    FieldSpec::left(12, 5, "   "),
    FieldSpec::left(12, 5, "       "),
    FieldSpec::left(12, 5, ""),
];
const ANNIHILATION_FIELDS: [FieldSpec; 2] =
    [FieldSpec::left(12, 5, "   "), FieldSpec::left(12, 5, "")];
const DISTRIBUTION_FIELDS: [FieldSpec; 2] =
    [FieldSpec::left(12, 5, "  "), FieldSpec::left(12, 4, "      ")];
const IONIZATION_FIELDS: [FieldSpec; 3] = [
    FieldSpec::left(14, 6, "     "),
    FieldSpec::left(14, 6, "      "),
    FieldSpec::left(14, 6, " "),
];
const PROTON_FIELDS: [FieldSpec; 2] = [FieldSpec::scientific("\t"), FieldSpec::scientific("")];

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::StoppingPower,
        Channel::Annihilation,
        Channel::Excitation,
        Channel::Elastic,
        Channel::Bremsstrahlung,
        Channel::Photoelectric,
        Channel::Compton,
        Channel::PairProduction,
        Channel::Ionization,
        Channel::ProtonStopping,
    ];

    /// Output file stem; the layer index is appended as three digits.
    pub const fn stem(self) -> &'static str {
        match self {
            Self::StoppingPower => "FBB_E_",
            Self::Annihilation => "_ANN_",
            Self::Excitation => "_EXC_",
            Self::Elastic => "_ELA_",
            Self::Bremsstrahlung => "_BRM_",
            Self::Photoelectric => "_FOT_",
            Self::Compton => "_KOM_",
            Self::PairProduction => "_PAR_",
            Self::Ionization => "_ION_",
            Self::ProtonStopping => "FBB_P_",
        }
    }

    /// Raw-table key the channel is known by in the processing chain.
    pub const fn key(self) -> &'static str {
        match self {
            Self::StoppingPower => "xer",
            Self::Annihilation => "ann",
            Self::Excitation => "528",
            Self::Elastic => "526",
            Self::Bremsstrahlung => "527",
            Self::Photoelectric => "522",
            Self::Compton => "ive",
            Self::PairProduction => "516",
            Self::Ionization => "555",
            Self::ProtonStopping => "stp",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::StoppingPower => "electron stopping power",
            Self::Annihilation => "positron annihilation",
            Self::Excitation => "electron excitation",
            Self::Elastic => "elastic scattering",
            Self::Bremsstrahlung => "bremsstrahlung",
            Self::Photoelectric => "photoelectric effect",
            Self::Compton => "compton scattering",
            Self::PairProduction => "pair production",
            Self::Ionization => "ionization",
            Self::ProtonStopping => "proton stopping power",
        }
    }

    /// Domain of the channel's primary particle; `None` for externally
    /// supplied data.
    pub const fn domain(self) -> Option<ParticleDomain> {
        match self {
            Self::Photoelectric | Self::Compton | Self::PairProduction => {
                Some(ParticleDomain::Photon)
            }
            Self::ProtonStopping => None,
            _ => Some(ParticleDomain::Electron),
        }
    }

    pub const fn layout(self) -> RowLayout {
        match self {
            Self::StoppingPower | Self::Photoelectric => RowLayout {
                leading: " ",
                fields: &SCALAR_4,
                data_cell: None,
                bootstrap_cell: None,
            },
            Self::Excitation => RowLayout {
                leading: " ",
                fields: &EXCITATION_FIELDS,
                data_cell: None,
                bootstrap_cell: None,
            },
            Self::Annihilation => RowLayout {
                leading: " ",
                fields: &ANNIHILATION_FIELDS,
                data_cell: None,
                bootstrap_cell: None,
            },
            Self::Elastic => RowLayout {
                leading: " ",
                fields: &DISTRIBUTION_FIELDS,
                data_cell: Some(FieldSpec::right(12, 5, " ")),
                bootstrap_cell: Some(DISTRIBUTION_CELL),
            },
            Self::Bremsstrahlung | Self::Compton | Self::PairProduction => RowLayout {
                leading: " ",
                fields: &DISTRIBUTION_FIELDS,
                data_cell: Some(DISTRIBUTION_CELL),
                bootstrap_cell: Some(DISTRIBUTION_CELL),
            },
            Self::Ionization => RowLayout {
                leading: " ",
                fields: &IONIZATION_FIELDS,
                data_cell: Some(DISTRIBUTION_CELL),
                bootstrap_cell: Some(DISTRIBUTION_CELL),
            },
            Self::ProtonStopping => RowLayout {
                leading: "",
                fields: &PROTON_FIELDS,
                data_cell: None,
                bootstrap_cell: None,
            },
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.stem())
    }
}
