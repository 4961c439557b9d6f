#![allow(non_upper_case_globals)]

//! Conversion between atomic units and laboratory units.
//!
//! All propagation is done in atomic units (ħ = mₑ = e = 4πε₀ = 1). Concrete
//! physical constants are taken from NIST.

use std::f64::consts::PI;

/// Planck constant (kg m^2 s^-1)
pub const h: f64 = 6.62607015e-34;
//             +/- 0 (exact)

/// reduced Planck constant (kg m^2 s^-1)
pub const hbar: f64 = h / 2.0 / PI;
//                +/- 0 (exact)

/// speed of light in vacuum (m s^-1)
pub const c: f64 = 2.99792458e8;
//             +/- 0 (exact)

/// elementary charge (C)
pub const e: f64 = 1.602176634e-19;
//             +/- 0 (exact)

/// electric permittivity in vacuum (F m^-1)
pub const e0: f64 = 8.8541878128e-12;
//              +/- 0.0000000013e-12

/// electron mass (kg)
pub const me: f64 = 9.1093837015e-31;
//              +/- 0.0000000028e-31

/// Bohr radius (m)
pub const a0: f64 = 5.29177210903e-11;
//              +/- 0.00000000080e-11

/// Hartree energy (J)
pub const Eh: f64 = 4.3597447222071e-18;
//              +/- 0.0000000000085e-18

/// atomic unit of time (s) = ħ / Eh
pub const t_au: f64 = hbar / Eh;

/// atomic unit of electric field (V m^-1) = Eh / (e a0)
pub const E_au: f64 = Eh / e / a0;

/// atomic unit of intensity (W cm^-2) = ε₀ c E_au² / 2
pub const I_au: f64 = 0.5 * e0 * c * E_au * E_au * 1e-4;

/// Convert a time in femtoseconds to atomic units.
pub fn fs_to_au(t: f64) -> f64 { t * 1e-15 / t_au }

/// Convert a time in atomic units to femtoseconds.
pub fn au_to_fs(t: f64) -> f64 { t * t_au * 1e15 }

/// Convert an energy in electronvolts to atomic units.
pub fn ev_to_au(en: f64) -> f64 { en * e / Eh }

/// Convert an energy in atomic units to electronvolts.
pub fn au_to_ev(en: f64) -> f64 { en * Eh / e }

/// Photon angular frequency in atomic units for a wavelength in nanometers.
///
/// ```
/// use splitstep::units::omega_from_wavelength;
/// assert!((omega_from_wavelength(800.0) - 0.056954).abs() < 1e-6);
/// ```
pub fn omega_from_wavelength(wavelength_nm: f64) -> f64 {
    h * c / (wavelength_nm * 1e-9) / Eh
}

/// Peak field amplitude in atomic units for a peak intensity in W/cm².
pub fn field_from_intensity(intensity: f64) -> f64 {
    (intensity / I_au).sqrt()
}
