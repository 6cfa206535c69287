use std::fmt::{Display, Formatter};

/// Rydberg unit of energy expressed in the other supported units.
pub const RYDBERG_IN_INVERSE_CM: f64 = 109_737.315_68;
pub const RYDBERG_IN_EV: f64 = 13.605_693_12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyUnit {
    InverseCm,
    Rydberg,
    ElectronVolt,
}

impl EnergyUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InverseCm => "cm-1",
            Self::Rydberg => "ryd",
            Self::ElectronVolt => "eV",
        }
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Pure unit conversion between the supported energy units, routed through
/// Rydbergs.
pub fn convert_energy(value: f64, from: EnergyUnit, to: EnergyUnit) -> f64 {
    if from == to {
        return value;
    }
    let rydbergs = match from {
        EnergyUnit::InverseCm => value / RYDBERG_IN_INVERSE_CM,
        EnergyUnit::Rydberg => value,
        EnergyUnit::ElectronVolt => value / RYDBERG_IN_EV,
    };
    match to {
        EnergyUnit::InverseCm => rydbergs * RYDBERG_IN_INVERSE_CM,
        EnergyUnit::Rydberg => rydbergs,
        EnergyUnit::ElectronVolt => rydbergs * RYDBERG_IN_EV,
    }
}

#[cfg(test)]
mod tests {
    use super::{convert_energy, EnergyUnit, RYDBERG_IN_INVERSE_CM};

    #[test]
    fn wavenumber_to_rydberg_matches_the_defining_constant() {
        let converted = convert_energy(RYDBERG_IN_INVERSE_CM, EnergyUnit::InverseCm, EnergyUnit::Rydberg);
        assert!((converted - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn identity_conversion_is_exact() {
        let value = 123_456.789;
        assert_eq!(
            convert_energy(value, EnergyUnit::InverseCm, EnergyUnit::InverseCm),
            value
        );
    }

    #[test]
    fn wavenumber_round_trips_through_electron_volts() {
        let value = 438_908.8;
        let ev = convert_energy(value, EnergyUnit::InverseCm, EnergyUnit::ElectronVolt);
        let back = convert_energy(ev, EnergyUnit::ElectronVolt, EnergyUnit::InverseCm);
        assert!((back - value).abs() < 1.0e-6);
    }
}
