//! Common utilities for equipment calculations.

use crate::error::{EquipmentError, EquipmentResult};
use pf_core::numeric::ensure_finite;
use pf_thermo::StreamState;

/// Mass flow below which a machine is treated as idle (kg/s)
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning EquipmentError if not.
pub fn check_finite(value: f64, what: &'static str) -> EquipmentResult<()> {
    ensure_finite(value, what).map_err(|_| EquipmentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> EquipmentResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EquipmentError::InvalidArg { what });
    }
    Ok(())
}

/// Ensure an efficiency lies in (0, 1].
pub fn check_efficiency(eta: f64, what: &'static str) -> EquipmentResult<()> {
    if !eta.is_finite() || eta <= 0.0 || eta > 1.0 {
        return Err(EquipmentError::InvalidArg { what });
    }
    Ok(())
}

/// Indices of the hottest and coldest stream by temperature.
///
/// Ties keep the first index encountered. Returns `None` for an empty slice.
pub fn hottest_and_coldest(streams: &[StreamState]) -> Option<(usize, usize)> {
    let mut hottest: Option<(usize, f64)> = None;
    let mut coldest: Option<(usize, f64)> = None;
    for (i, stream) in streams.iter().enumerate() {
        let t = stream.temperature().value;
        if hottest.is_none_or(|(_, th)| t > th) {
            hottest = Some((i, t));
        }
        if coldest.is_none_or(|(_, tc)| t < tc) {
            coldest = Some((i, t));
        }
    }
    Some((hottest?.0, coldest?.0))
}
