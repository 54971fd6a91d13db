//! # Cylinder Geometry and Efficiency
//!
//! Swept volume, clearance and efficiency relations for reciprocating
//! compressor cylinders.
//!
//! ## Notation
//!
//! - `D` = cylinder bore (m)
//! - `d` = piston rod diameter (m)
//! - `L` = stroke (m)
//! - `N` = speed (rpm)
//! - `C` = clearance volume as a fraction of swept volume
//!
//! ```text
//!   head end          crank end
//!  ┌────────┬══════════┬────────┐
//!  │        │  piston  │ ▒▒rod▒▒▒▒▒▒▒▒ crosshead
//!  └────────┴══════════┴────────┘
//!   area A               area A - a
//! ```

use std::f64::consts::PI;

/// Lower bound of the isentropic efficiency correlation
pub const MIN_ISENTROPIC_EFFICIENCY: f64 = 0.65;

/// Upper bound of the isentropic efficiency correlation
pub const MAX_ISENTROPIC_EFFICIENCY: f64 = 0.92;

/// Circular area, A = pi D^2 / 4
#[inline]
pub fn circular_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

/// Piston displacement of one cylinder in m3/s.
///
/// # Formula
/// - Single acting (head end only): PD = A L N / 60
/// - Double acting: PD = (2A - a) L N / 60
///
/// # Example
/// ```rust
/// use compressor_core::equations::cylinder::piston_displacement;
///
/// // 0.2 m bore, no rod, 0.1 m stroke, 600 rpm, single acting
/// let pd = piston_displacement(0.2, 0.0, 0.1, 600.0, false);
/// assert!((pd - 0.0314159).abs() < 1e-6);
/// ```
pub fn piston_displacement(bore_m: f64, rod_diameter_m: f64, stroke_m: f64, speed_rpm: f64, double_acting: bool) -> f64 {
    let head_end = circular_area(bore_m);
    let swept_area = if double_acting {
        2.0 * head_end - circular_area(rod_diameter_m)
    } else {
        head_end
    };
    swept_area * stroke_m * speed_rpm / 60.0
}

/// Volumetric efficiency (GPSA).
///
/// # Formula
/// VE = 0.96 - r/100 - C ((Zs/Zd) r^(1/k) - 1)
///
/// The 0.96 term and the r/100 term account for valve and piston ring
/// leakage; the clearance term is the re-expansion loss.
///
/// # Example
/// ```rust
/// use compressor_core::equations::cylinder::volumetric_efficiency;
///
/// let ve = volumetric_efficiency(3.0, 0.10, 1.3, 1.0, 1.0);
/// assert!(ve > 0.70 && ve < 0.80);
/// ```
pub fn volumetric_efficiency(ratio: f64, clearance_fraction: f64, k: f64, z_suction: f64, z_discharge: f64) -> f64 {
    let reexpansion = (z_suction / z_discharge) * ratio.powf(1.0 / k) - 1.0;
    0.96 - ratio / 100.0 - clearance_fraction * reexpansion
}

/// Isentropic efficiency estimated from cylinder configuration.
///
/// # Formula
/// eta = clamp(0.65 + 0.15 SACE/100 - 0.05 VVCP/100 + 0.10 CL/100, 0.65, 0.92)
///
/// All arguments are percentages.
pub fn isentropic_efficiency(sace_pct: f64, vvcp_pct: f64, clearance_pct: f64) -> f64 {
    let eta = 0.65 + 0.15 * (sace_pct / 100.0) - 0.05 * (vvcp_pct / 100.0) + 0.10 * (clearance_pct / 100.0);
    eta.clamp(MIN_ISENTROPIC_EFFICIENCY, MAX_ISENTROPIC_EFFICIENCY)
}

/// Effective clearance fraction: fixed clearance plus opened VVCP pocket volume
#[inline]
pub fn effective_clearance(clearance_pct: f64, vvcp_pct: f64) -> f64 {
    (clearance_pct + vvcp_pct) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_acting_subtracts_rod() {
        let single = piston_displacement(0.2, 0.05, 0.1, 600.0, false);
        let double = piston_displacement(0.2, 0.05, 0.1, 600.0, true);
        let rod = circular_area(0.05) * 0.1 * 600.0 / 60.0;
        assert!((double - (2.0 * single - rod)).abs() < 1e-12);
    }

    #[test]
    fn test_volumetric_efficiency_zero_clearance() {
        let ve = volumetric_efficiency(4.0, 0.0, 1.3, 1.0, 1.0);
        assert!((ve - 0.92).abs() < 1e-12);
    }

    #[test]
    fn test_volumetric_efficiency_drops_with_clearance() {
        let low = volumetric_efficiency(4.0, 0.05, 1.3, 1.0, 1.0);
        let high = volumetric_efficiency(4.0, 0.20, 1.3, 1.0, 1.0);
        assert!(high < low);
    }

    #[test]
    fn test_isentropic_efficiency_clamped() {
        assert_eq!(isentropic_efficiency(0.0, 100.0, 0.0), MIN_ISENTROPIC_EFFICIENCY);
        assert_eq!(isentropic_efficiency(200.0, 0.0, 100.0), MAX_ISENTROPIC_EFFICIENCY);
        // Form defaults: SACE 5, VVCP 5, clearance 5
        let eta = isentropic_efficiency(5.0, 5.0, 5.0);
        assert!((eta - 0.66).abs() < 1e-12);
    }

    #[test]
    fn test_effective_clearance() {
        assert!((effective_clearance(5.0, 5.0) - 0.10).abs() < 1e-12);
    }
}
