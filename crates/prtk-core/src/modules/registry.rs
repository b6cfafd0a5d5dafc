use super::annihilation::Annihilation;
use super::bremsstrahlung::Bremsstrahlung;
use super::compton::Compton;
use super::elastic::Elastic;
use super::excitation::Excitation;
use super::ionization::Ionization;
use super::pair::PairProduction;
use super::photoelectric::Photoelectric;
use super::proton::{ProtonStopping, ProtonStoppingProvider};
use super::stopping::StoppingPower;
use super::{Channel, MaterialContext, build_table};
use crate::domain::{ChannelTable, TableError, TableResult};
use crate::numerics::TargetGrid;
use crate::tables::{NoReferenceData, ReferenceDataProvider};

/// Start-up wiring of the channel processors: the shared target grid and
/// the pluggable data providers.
pub struct ChannelRegistry {
    grid: TargetGrid,
    reference: Box<dyn ReferenceDataProvider>,
    proton: Option<Box<dyn ProtonStoppingProvider>>,
}

impl ChannelRegistry {
    pub fn new(grid: TargetGrid, reference: Box<dyn ReferenceDataProvider>) -> Self {
        Self {
            grid,
            reference,
            proton: None,
        }
    }

    pub fn with_proton_provider(mut self, provider: Box<dyn ProtonStoppingProvider>) -> Self {
        self.proton = Some(provider);
        self
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }

    pub fn reference(&self) -> &dyn ReferenceDataProvider {
        self.reference.as_ref()
    }

    /// Proton stopping needs a provider; every other channel is always built.
    pub fn is_available(&self, channel: Channel) -> bool {
        channel != Channel::ProtonStopping || self.proton.is_some()
    }

    /// Available channels in processing order.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.is_available(*channel))
            .collect()
    }

    pub fn build(&self, channel: Channel, ctx: &MaterialContext<'_>) -> TableResult<ChannelTable> {
        let grid = &self.grid;
        match channel {
            Channel::StoppingPower => build_table(&StoppingPower::new(self.reference()), ctx, grid),
            Channel::Annihilation => build_table(&Annihilation, ctx, grid),
            Channel::Excitation => build_table(&Excitation, ctx, grid),
            Channel::Elastic => build_table(&Elastic, ctx, grid),
            Channel::Bremsstrahlung => build_table(&Bremsstrahlung, ctx, grid),
            Channel::Photoelectric => build_table(&Photoelectric, ctx, grid),
            Channel::Compton => build_table(&Compton, ctx, grid),
            Channel::PairProduction => build_table(&PairProduction, ctx, grid),
            Channel::Ionization => build_table(&Ionization, ctx, grid),
            Channel::ProtonStopping => match self.proton.as_deref() {
                Some(provider) => build_table(&ProtonStopping::new(provider), ctx, grid),
                None => Err(TableError::internal(
                    "RUN.PROTON_PROVIDER",
                    "proton stopping requested without a proton data provider",
                )),
            },
        }
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(TargetGrid::default(), Box::new(NoReferenceData))
    }
}
