//! [`Contract`]-related read definitions.

#[cfg(doc)]
use crate::domain::Contract;

pub mod list {
    //! [`Contract`]s list definitions.

    use crate::domain::{contract, vehicle, Contract};

    /// Filter of the stored [`Contract`]s.
    ///
    /// Empty [`Filter`] matches every [`Contract`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`contract::Kind`] to restrict the list to, if any.
        pub kind: Option<contract::Kind>,

        /// [`vehicle::Vin`] of the transacted [`Vehicle`] to restrict the list
        /// to, if any.
        ///
        /// [`Vehicle`]: crate::domain::Vehicle
        pub vin: Option<vehicle::Vin>,
    }

    impl Filter {
        /// Checks whether the provided [`Contract`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, contract: &Contract) -> bool {
            self.kind.map_or(true, |k| contract.kind() == k)
                && self
                    .vin
                    .as_ref()
                    .map_or(true, |vin| contract.vehicle().vin == *vin)
        }
    }
}
