//! # Gas Compression Thermodynamics
//!
//! Ideal/real-gas relations for one compression stage.
//!
//! ## Notation
//!
//! - `r` = stage pressure ratio (discharge / suction, absolute)
//! - `k` = ratio of specific heats cp/cv
//! - `Ts`, `Td` = suction and discharge temperature (K)
//! - `Z` = compressibility factor
//! - `MW` = molecular weight (kg/kmol)
//!
//! ## References
//!
//! - GPSA Engineering Data Book, 13th Edition, Section 13 (Compressors and Expanders)
//! - API 618, 5th Edition: Reciprocating Compressors for Petroleum, Chemical, and Gas Industry Services

/// Universal gas constant in kJ/(kmol K)
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8.314_462_618;

/// Normal reference temperature for Nm3 (0 degC)
pub const NORMAL_TEMPERATURE_K: f64 = 273.15;

/// Normal reference pressure for Nm3 (1 atm)
pub const NORMAL_PRESSURE_BAR: f64 = 1.01325;

// =============================================================================
// GAS PROPERTIES
// =============================================================================

/// Specific gas constant R_s = R / MW in kJ/(kg K)
///
/// # Example
/// ```rust
/// use compressor_core::equations::thermo::specific_gas_constant;
///
/// // Air, MW = 28.964
/// let r = specific_gas_constant(28.964);
/// assert!((r - 0.28706).abs() < 1e-5);
/// ```
#[inline]
pub fn specific_gas_constant(molecular_weight: f64) -> f64 {
    UNIVERSAL_GAS_CONSTANT / molecular_weight
}

/// Ideal-gas specific heat at constant pressure, cp = k R_s / (k - 1), kJ/(kg K)
#[inline]
pub fn specific_heat_cp(molecular_weight: f64, k: f64) -> f64 {
    k * specific_gas_constant(molecular_weight) / (k - 1.0)
}

/// Real-gas density from the equation of state, rho = P MW / (Z R T)
///
/// # Arguments
/// * `pressure_bar` - Absolute pressure (bar)
/// * `temperature_k` - Absolute temperature (K)
/// * `molecular_weight` - kg/kmol
/// * `z` - Compressibility factor
///
/// # Returns
/// Density in kg/m3
#[inline]
pub fn gas_density(pressure_bar: f64, temperature_k: f64, molecular_weight: f64, z: f64) -> f64 {
    let pressure_kpa = pressure_bar * 100.0;
    pressure_kpa * molecular_weight / (z * UNIVERSAL_GAS_CONSTANT * temperature_k)
}

// =============================================================================
// STAGE PRESSURES
// =============================================================================

/// Equal per-stage pressure ratio for `stages` stages.
///
/// Interstage equipment drops a fraction `interstage_drop` of the pressure
/// between consecutive stages; the stage ratio is raised so that the last stage
/// still delivers the overall discharge pressure.
///
/// # Formula
/// r = ((Pd/Ps) / (1 - d)^(n-1))^(1/n)
///
/// # Example
/// ```rust
/// use compressor_core::equations::thermo::stage_pressure_ratio;
///
/// let r = stage_pressure_ratio(16.0, 2, 0.0);
/// assert!((r - 4.0).abs() < 1e-12);
/// ```
pub fn stage_pressure_ratio(overall_ratio: f64, stages: u32, interstage_drop: f64) -> f64 {
    let n = f64::from(stages.max(1));
    let losses = (1.0 - interstage_drop).powf(n - 1.0);
    (overall_ratio / losses).powf(1.0 / n)
}

// =============================================================================
// DISCHARGE TEMPERATURE
// =============================================================================

/// Isentropic discharge temperature, Td_s = Ts r^((k-1)/k)
///
/// # Example
/// ```rust
/// use compressor_core::equations::thermo::isentropic_discharge_temperature;
///
/// // Air (k = 1.4) compressed 3:1 from 300 K
/// let td = isentropic_discharge_temperature(300.0, 3.0, 1.4);
/// assert!((td - 410.6).abs() < 0.1);
/// ```
#[inline]
pub fn isentropic_discharge_temperature(suction_temperature_k: f64, ratio: f64, k: f64) -> f64 {
    suction_temperature_k * ratio.powf((k - 1.0) / k)
}

/// Actual discharge temperature from the isentropic efficiency,
/// Td = Ts + (Td_s - Ts) / eta
#[inline]
pub fn actual_discharge_temperature(
    suction_temperature_k: f64,
    isentropic_discharge_k: f64,
    isentropic_efficiency: f64,
) -> f64 {
    suction_temperature_k + (isentropic_discharge_k - suction_temperature_k) / isentropic_efficiency
}

/// Polytropic exponent n implied by the actual temperature rise.
///
/// # Formula
/// (n - 1) / n = ln(Td/Ts) / ln(r), so n = 1 / (1 - ln(Td/Ts) / ln(r))
///
/// Requires `ratio > 1` and `Td > Ts`.
pub fn polytropic_exponent(suction_temperature_k: f64, discharge_temperature_k: f64, ratio: f64) -> f64 {
    let x = (discharge_temperature_k / suction_temperature_k).ln() / ratio.ln();
    1.0 / (1.0 - x)
}

// =============================================================================
// POWER AND FLOW
// =============================================================================

/// Stage gas power (kW) for mass flow `m` (kg/s).
///
/// # Formula
/// W = m Zavg R_s Ts k/(k-1) (r^((k-1)/k) - 1) / eta
///
/// For an ideal gas (Z = 1) this equals m cp (Td - Ts).
pub fn gas_power_kw(
    mass_flow_kg_s: f64,
    suction_temperature_k: f64,
    ratio: f64,
    k: f64,
    molecular_weight: f64,
    z_average: f64,
    isentropic_efficiency: f64,
) -> f64 {
    let exponent = (k - 1.0) / k;
    let isentropic_head = z_average
        * specific_gas_constant(molecular_weight)
        * suction_temperature_k
        * (k / (k - 1.0))
        * (ratio.powf(exponent) - 1.0);
    mass_flow_kg_s * isentropic_head / isentropic_efficiency
}

/// Volume flow at normal conditions (0 degC, 1.01325 bar) in Nm3/h
pub fn normal_volume_flow_nm3_h(mass_flow_kg_s: f64, molecular_weight: f64) -> f64 {
    let rho_normal = gas_density(NORMAL_PRESSURE_BAR, NORMAL_TEMPERATURE_K, molecular_weight, 1.0);
    mass_flow_kg_s / rho_normal * 3600.0
}
